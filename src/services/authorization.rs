//! Ownership and role checks for mutation paths.
//!
//! The guard is pure: the authenticated actor's id and roles are passed in
//! explicitly, never read from ambient state. The active-ownership check
//! that blocks account deletion runs inside the deletion transaction
//! instead, against the rows it is about to remove.

use crate::domain::UserId;
use crate::models::user::RoleSet;

/// True iff the actor owns the resource or holds ADMIN.
///
/// Callers that get `false` back are expected to surface their own
/// Unauthorized error; this function carries no error context of its own.
#[must_use]
pub fn can_mutate(actor: UserId, resource_owner: UserId, actor_roles: &RoleSet) -> bool {
    actor == resource_owner || actor_roles.is_admin()
}
