//! Property tests for the invoice permission gate.

use proptest::prelude::*;
use uuid::Uuid;

use super::permission::{Actor, can_delete, can_edit};
use super::status::InvoiceStatus;

fn status_strategy() -> impl Strategy<Value = InvoiceStatus> {
    prop_oneof![
        Just(InvoiceStatus::Draft),
        Just(InvoiceStatus::Sent),
        Just(InvoiceStatus::Paid),
        Just(InvoiceStatus::Cancelled),
    ]
}

fn actor_strategy() -> impl Strategy<Value = Actor> {
    (any::<u128>(), any::<bool>(), any::<bool>())
        .prop_map(|(id, is_admin, is_active)| Actor::new(Uuid::from_u128(id), is_admin, is_active))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Non-admins are locked out of everything but drafts.
    #[test]
    fn prop_non_admin_blocked_outside_draft(
        status in status_strategy().prop_filter("non-draft", |s| *s != InvoiceStatus::Draft),
        id in any::<u128>(),
        is_active in any::<bool>(),
    ) {
        let actor = Actor::new(Uuid::from_u128(id), false, is_active);
        prop_assert!(!can_edit(&actor, status));
        prop_assert!(!can_delete(&actor, status));
    }

    /// Active admins pass regardless of status.
    #[test]
    fn prop_active_admin_always_allowed(status in status_strategy(), id in any::<u128>()) {
        let admin = Actor::new(Uuid::from_u128(id), true, true);
        prop_assert!(can_edit(&admin, status));
        prop_assert!(can_delete(&admin, status));
    }

    /// Edit and delete never disagree.
    #[test]
    fn prop_edit_and_delete_agree(actor in actor_strategy(), status in status_strategy()) {
        prop_assert_eq!(can_edit(&actor, status), can_delete(&actor, status));
    }

    /// Inactive actors are denied even on drafts.
    #[test]
    fn prop_inactive_denied(actor in actor_strategy(), status in status_strategy()) {
        let inactive = Actor { is_active: false, ..actor };
        prop_assert!(!can_edit(&inactive, status));
    }
}
