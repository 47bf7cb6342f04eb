//! Capability checks for invoice mutation.
//!
//! The gate is consulted before editing or deleting an invoice or any of
//! its items. Changing the status goes through its own operation and does
//! not consult the gate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::InvoiceStatus;

/// The user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User ID.
    pub user_id: Uuid,
    /// Administrators bypass the status restriction.
    pub is_admin: bool,
    /// Inactive users can do nothing.
    pub is_active: bool,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(user_id: Uuid, is_admin: bool, is_active: bool) -> Self {
        Self {
            user_id,
            is_admin,
            is_active,
        }
    }
}

/// Returns true if `actor` may edit an invoice in `status`.
#[must_use]
pub const fn can_edit(actor: &Actor, status: InvoiceStatus) -> bool {
    if !actor.is_active {
        return false;
    }
    if actor.is_admin {
        return true;
    }
    matches!(status, InvoiceStatus::Draft)
}

/// Returns true if `actor` may delete an invoice in `status`.
///
/// Same rule as [`can_edit`].
#[must_use]
pub const fn can_delete(actor: &Actor, status: InvoiceStatus) -> bool {
    can_edit(actor, status)
}
