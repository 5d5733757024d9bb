//! Access policy: who may mutate what, and who may see what.
//!
//! # Invariants
//! - Predicates are pure; the caller is always passed explicitly.
//! - Mutation rights never gate reading `Public` entries.

use crate::model::entry::Entry;
use crate::model::fields::Visibility;
use crate::model::user::{Role, User};

/// Returns whether `user` may edit or delete something owned by
/// `owner_department_id`.
///
/// - Admins may mutate anything.
/// - Heads of department may mutate records of their own department only;
///   a head without a department, or a record without an owner, is denied.
/// - Unauthenticated callers (`None`) may mutate nothing.
pub fn can_mutate(user: Option<&User>, owner_department_id: Option<&str>) -> bool {
    let Some(user) = user else {
        return false;
    };
    match user.role {
        Role::Admin => true,
        Role::HeadDepartment => match (user.department_id.as_deref(), owner_department_id) {
            (Some(own), Some(owner)) => own == owner,
            _ => false,
        },
    }
}

/// Only admins may add or list users.
pub fn can_manage_users(user: Option<&User>) -> bool {
    user.is_some_and(User::is_admin)
}

/// Read filter: anonymous viewers see public entries; any signed-in user sees all.
pub fn can_view(viewer: Option<&User>, entry: &Entry) -> bool {
    viewer.is_some() || entry.visibility == Visibility::Public
}

pub fn visible_entries<'a>(viewer: Option<&User>, entries: &'a [Entry]) -> Vec<&'a Entry> {
    entries
        .iter()
        .filter(|entry| can_view(viewer, entry))
        .collect()
}
