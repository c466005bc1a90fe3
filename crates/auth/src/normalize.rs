//! Role normalizer: heterogeneous role list → effective permission set.

use std::sync::Arc;

use crate::{FallbackTable, PermissionSet, RoleRef};

/// Resolves roles against an injected [`FallbackTable`].
#[derive(Debug, Clone)]
pub struct RoleNormalizer {
    fallback: Arc<FallbackTable>,
}

impl RoleNormalizer {
    pub fn new(fallback: Arc<FallbackTable>) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> &Arc<FallbackTable> {
        &self.fallback
    }

    /// Permissions contributed by a single role.
    ///
    /// Explicit lists are authoritative and bypass the table; named roles go
    /// through exact-then-partial fallback; anything else contributes nothing.
    pub fn resolve_role(&self, role: &RoleRef) -> PermissionSet {
        match role {
            RoleRef::WithPermissions { permissions, .. } if !permissions.is_empty() => {
                permissions.iter().cloned().collect()
            }
            RoleRef::WithPermissions { name: Some(name), .. }
            | RoleRef::NameOnly { name, .. }
            | RoleRef::Bare(name) => self.fallback.resolve(name).unwrap_or_default(),
            RoleRef::WithPermissions { name: None, .. } | RoleRef::Unrecognized(_) => {
                PermissionSet::new()
            }
        }
    }

    /// Union of every role's permissions.
    pub fn resolve(&self, roles: &[RoleRef]) -> PermissionSet {
        let mut effective = PermissionSet::new();
        for role in roles {
            let granted = self.resolve_role(role);
            if granted.is_empty() {
                tracing::debug!(role = %role.label(), "role contributed no permissions");
            }
            effective.extend(granted);
        }
        effective
    }
}
