//! Admin override heuristic.
//!
//! A user counts as administrator when a role name looks administrative or a
//! role carries one of the reserved numeric ids. This is a naming convention,
//! not an explicit flag: "administration-readonly" grants full access too.

use brokerdesk_core::RoleId;

use crate::RoleRef;

/// Role ids reserved for administrator roles on the backend.
pub const ADMIN_ROLE_IDS: [RoleId; 2] = [RoleId::new(1), RoleId::new(2)];

const ADMIN_NAME_FRAGMENTS: [&str; 2] = ["admin", "super"];
const ADMIN_NAMES: [&str; 2] = ["administrator", "superuser"];

/// Whether a (lowercased) role name marks an administrator.
pub fn is_admin_name(name: &str) -> bool {
    let name = name.trim().to_lowercase();
    ADMIN_NAMES.iter().any(|n| *n == name) || ADMIN_NAME_FRAGMENTS.iter().any(|f| name.contains(f))
}

pub fn is_admin_role(role: &RoleRef) -> bool {
    role.name().is_some_and(is_admin_name) || role.id().is_some_and(|id| ADMIN_ROLE_IDS.contains(&id))
}

/// Whether any of `roles` grants the admin override.
pub fn is_admin(roles: &[RoleRef]) -> bool {
    roles.iter().any(is_admin_role)
}
