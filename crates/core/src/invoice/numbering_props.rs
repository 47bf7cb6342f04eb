//! Property tests for invoice number allocation.

use chrono::NaiveDate;
use proptest::prelude::*;

use super::numbering::{format_invoice_number, month_prefix, next_invoice_number, parse_sequence};

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// N sequential allocations in one month yield 1..=N.
    #[test]
    fn prop_sequential_within_month(today in date_strategy(), n in 1usize..60) {
        let prefix = month_prefix(today);
        let mut issued: Vec<String> = Vec::new();

        for expected in 1..=n {
            let number = next_invoice_number(today, issued.iter().map(String::as_str)).unwrap();
            prop_assert_eq!(parse_sequence(&number, &prefix), Some(u32::try_from(expected).unwrap()));
            issued.push(number);
        }
    }

    /// The next number follows the highest sequence, whatever the input order
    /// and however many digits the sequences have.
    #[test]
    fn prop_next_follows_highest_sequence(
        today in date_strategy(),
        sequences in prop::collection::vec(1u32..200_000, 1..20),
    ) {
        let prefix = month_prefix(today);
        let issued: Vec<String> = sequences
            .iter()
            .map(|s| format_invoice_number(today, *s))
            .collect();
        let highest = sequences.iter().copied().max().unwrap();

        let number = next_invoice_number(today, issued.iter().map(String::as_str)).unwrap();
        prop_assert_eq!(parse_sequence(&number, &prefix), Some(highest + 1));
    }

    /// A new month always starts at 1.
    #[test]
    fn prop_fresh_month_starts_at_one(today in date_strategy()) {
        let number = next_invoice_number(today, []).unwrap();
        prop_assert!(number.ends_with("-0001"));
        prop_assert!(number.starts_with(&month_prefix(today)));
    }
}
