//! Role/permission graph → authority strings.
//!
//! Role authorities are `ROLE_` + upper-cased role name; permission authorities
//! are the raw permission name (case preserved, no prefix). The asymmetry is
//! intentional and checks against these strings are case-sensitive.

use std::collections::BTreeSet;

use super::credentials::{Permission, Role};

pub const ROLE_PREFIX: &str = "ROLE_";

pub fn role_authority(role_name: &str) -> String {
    format!("{ROLE_PREFIX}{}", role_name.to_uppercase())
}

/// Effective authorities of a principal holding `role` with `permissions`.
///
/// An absent role yields the empty set: the principal is still authenticated,
/// it just carries nothing to check against.
pub fn resolve(role: Option<&Role>, permissions: &[Permission]) -> BTreeSet<String> {
    let Some(role) = role else {
        return BTreeSet::new();
    };

    std::iter::once(role_authority(&role.name))
        .chain(permissions.iter().map(|p| p.name.clone()))
        .collect()
}

/// Shorthand for a role together with the permissions it owns.
pub fn resolve_role(role: &Role) -> BTreeSet<String> {
    resolve(Some(role), &role.permissions)
}
