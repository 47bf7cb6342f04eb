//! Field checks shared by the directory records.

/// Length of a GSTIN.
pub const GSTIN_LEN: usize = 15;
/// Length of an IFSC bank routing code.
pub const IFSC_LEN: usize = 11;

/// Copies every present field of a patch onto a record.
///
/// Each listed field must be `Option<T>` on the patch and `T` on the record;
/// for clearable record fields `T` is itself an `Option`.
macro_rules! apply_patch {
    ($patch:expr => $record:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$patch.$field {
                $record.$field.clone_from(value);
            }
        )+
    };
}

pub(crate) use apply_patch;

/// Optional text field: `None` or whitespace-only means "not provided".
pub(crate) fn provided(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn require_name(errors: &mut Vec<String>, name: &str, message: &str) {
    if name.trim().is_empty() {
        errors.push(message.to_string());
    }
}

pub(crate) fn check_email(errors: &mut Vec<String>, email: Option<&str>) {
    if provided(email).is_some_and(|e| !e.contains('@')) {
        errors.push("Invalid email format".to_string());
    }
}

pub(crate) fn check_gstin(errors: &mut Vec<String>, gstin: Option<&str>) {
    if provided(gstin).is_some_and(|g| g.chars().count() != GSTIN_LEN) {
        errors.push("GSTIN must be 15 characters".to_string());
    }
}

pub(crate) fn check_pincode(errors: &mut Vec<String>, pincode: Option<&str>) {
    if provided(pincode).is_some_and(|p| !p.chars().all(|c| c.is_ascii_digit())) {
        errors.push("Pincode must be numeric".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(check: fn(&mut Vec<String>, Option<&str>), value: Option<&str>) -> Vec<String> {
        let mut errors = Vec::new();
        check(&mut errors, value);
        errors
    }

    #[test]
    fn test_absent_values_pass() {
        let checks: [fn(&mut Vec<String>, Option<&str>); 3] =
            [check_email, check_gstin, check_pincode];
        for check in checks {
            assert!(run(check, None).is_empty());
            assert!(run(check, Some("")).is_empty());
        }
    }

    #[test]
    fn test_email() {
        assert!(run(check_email, Some("ops@acme.in")).is_empty());
        assert_eq!(run(check_email, Some("ops.acme.in")), vec!["Invalid email format"]);
    }

    #[test]
    fn test_gstin_length() {
        assert!(run(check_gstin, Some("27AAPFU0939F1ZV")).is_empty());
        assert_eq!(run(check_gstin, Some("27AAPFU0939F1Z")), vec!["GSTIN must be 15 characters"]);
    }

    #[test]
    fn test_pincode_digits() {
        assert!(run(check_pincode, Some("400001")).is_empty());
        assert_eq!(run(check_pincode, Some("40 001")), vec!["Pincode must be numeric"]);
    }
}
