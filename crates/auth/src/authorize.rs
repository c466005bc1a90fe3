//! Authorization query API.
//!
//! Every answer here is a UI hint. The backend enforces access on its own.

use chrono::{DateTime, Utc};
use serde::Serialize;

use brokerdesk_core::UserId;

use crate::catalog::{self, Action, Module};
use crate::{FallbackTable, PermissionSet, RoleNormalizer, User, admin};

/// Resolved access state for one user at one point in time.
///
/// Immutable once built; the session swaps whole snapshots. All queries are
/// total: with no user every check is `false` and no module is accessible.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccessSnapshot {
    user: Option<User>,
    permissions: PermissionSet,
    is_admin: bool,
    resolved_at: Option<DateTime<Utc>>,
}

impl AccessSnapshot {
    /// The empty, logged-out state.
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// Resolve `user` into a snapshot.
    ///
    /// Administrators short-circuit: the normalizer and fallback table are not
    /// consulted and the effective set stays empty.
    pub fn resolve(user: User, normalizer: &RoleNormalizer) -> Self {
        let is_admin = admin::is_admin(&user.roles);
        let permissions = if is_admin {
            PermissionSet::new()
        } else {
            normalizer.resolve(&user.roles)
        };

        Self {
            user: Some(user),
            permissions,
            is_admin,
            resolved_at: Some(Utc::now()),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_some() && self.is_admin
    }

    /// Effective permission set (empty for administrators, see [`Self::resolve`]).
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        self.is_admin || self.permissions.contains(permission)
    }

    pub fn has_any_permission<I, S>(&self, permissions: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.is_authenticated() && permissions.into_iter().any(|p| self.has_permission(p.as_ref()))
    }

    /// Universal check. Vacuously true for an empty list once authenticated.
    pub fn has_all_permissions<I, S>(&self, permissions: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.is_authenticated() && permissions.into_iter().all(|p| self.has_permission(p.as_ref()))
    }

    /// View check. Unmapped modules are visible to any authenticated user.
    pub fn can_view_module(&self, module: Module) -> bool {
        self.can(module, Action::View)
    }

    /// Create check. Unmapped modules deny.
    pub fn can_create(&self, module: Module) -> bool {
        self.can(module, Action::Create)
    }

    pub fn can_edit(&self, module: Module) -> bool {
        self.can(module, Action::Edit)
    }

    pub fn can_delete(&self, module: Module) -> bool {
        self.can(module, Action::Delete)
    }

    /// Generic module/action check.
    ///
    /// Order: authentication, admin override, module override token, then the
    /// catalog mapping. A missing mapping allows `View` and denies the rest.
    pub fn can(&self, module: Module, action: Action) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        if self.is_admin {
            return true;
        }
        if let Some(token) = catalog::module_override(module) {
            if self.permissions.contains(token) {
                return true;
            }
        }
        match catalog::permission_for(module, action) {
            Some(permission) => self.has_permission(permission),
            None => action == Action::View,
        }
    }

    /// Modules passing [`Self::can_view_module`], in navigation order.
    pub fn accessible_modules(&self) -> Vec<Module> {
        Module::ALL
            .into_iter()
            .filter(|m| self.can_view_module(*m))
            .collect()
    }

    /// Explain a [`Self::has_permission`] decision.
    ///
    /// `fallback` is only consulted to suggest roles that would grant a
    /// missing permission.
    pub fn explain(&self, permission: &str, fallback: &FallbackTable) -> AuthorizationExplanation {
        let state = self.state();

        if !self.is_authenticated() {
            return AuthorizationExplanation {
                required_permission: permission.to_string(),
                granted: false,
                reason: "No authenticated user in the current session".to_string(),
                state,
                denial_reason: Some(DenialReason {
                    kind: DenialKind::Unauthenticated,
                    message: "The permission session is empty".to_string(),
                    suggestions: vec!["Log in or wait for the session refresh to complete".to_string()],
                }),
            };
        }

        if self.is_admin {
            let roles: Vec<String> = self
                .user
                .iter()
                .flat_map(|u| u.roles.iter())
                .filter(|r| admin::is_admin_role(r))
                .map(|r| r.label())
                .collect();
            return AuthorizationExplanation {
                required_permission: permission.to_string(),
                granted: true,
                reason: format!("Admin override granted by role(s) {:?}", roles),
                state,
                denial_reason: None,
            };
        }

        if self.permissions.contains(permission) {
            return AuthorizationExplanation {
                required_permission: permission.to_string(),
                granted: true,
                reason: format!("Effective permission set contains '{}'", permission),
                state,
                denial_reason: None,
            };
        }

        let mut suggestions = vec![format!(
            "Assign a role whose permission list includes '{}'",
            permission
        )];
        let granting = fallback.roles_granting(permission);
        if !granting.is_empty() {
            suggestions.insert(
                0,
                format!("Fallback roles that would grant this permission: {:?}", granting),
            );
        }
        if !catalog::is_known(permission) {
            suggestions.push(format!(
                "'{}' is not in the permission catalog; check the identifier against the backend",
                permission
            ));
        }

        AuthorizationExplanation {
            required_permission: permission.to_string(),
            granted: false,
            reason: format!(
                "Effective permission set does not contain '{}'. Current permissions: {:?}",
                permission, state.effective_permissions
            ),
            state,
            denial_reason: Some(DenialReason {
                kind: DenialKind::MissingPermission,
                message: format!("Missing required permission: '{}'", permission),
                suggestions,
            }),
        }
    }

    fn state(&self) -> SnapshotState {
        SnapshotState {
            user_id: self.user_id(),
            roles: self
                .user
                .iter()
                .flat_map(|u| u.roles.iter())
                .map(|r| r.label())
                .collect(),
            effective_permissions: self.permissions.iter().map(|p| p.as_str().to_string()).collect(),
            is_admin: self.is_admin(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (diagnostics)
// ─────────────────────────────────────────────────────────────────────────────

/// Why a permission check passed or failed.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub required_permission: String,
    pub granted: bool,
    pub reason: String,
    pub state: SnapshotState,
    pub denial_reason: Option<DenialReason>,
}

/// Session state at the time of the explanation.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotState {
    pub user_id: Option<UserId>,
    pub roles: Vec<String>,
    pub effective_permissions: Vec<String>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    Unauthenticated,
    MissingPermission,
}
