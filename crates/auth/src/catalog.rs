//! Permission catalog: every identifier the console knows about and the
//! module → permission lookup tables used by the query API.
//!
//! Identifiers here must match the backend's naming exactly.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use brokerdesk_core::DomainError;

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

pub const USERS_VIEW: &str = "users.view";
pub const USERS_CREATE: &str = "users.create";
pub const USERS_EDIT: &str = "users.edit";
pub const USERS_DELETE: &str = "users.delete";
pub const USERS_ASSIGN_ROLES: &str = "users.assign_roles";

// ─────────────────────────────────────────────────────────────────────────────
// Brokers and broker profiles
// ─────────────────────────────────────────────────────────────────────────────

pub const BROKERS_VIEW: &str = "brokers.view";
pub const BROKERS_CREATE: &str = "brokers.create";
pub const BROKERS_EDIT: &str = "brokers.edit";
pub const BROKERS_DELETE: &str = "brokers.delete";

pub const BROKER_PROFILES_VIEW: &str = "broker_profiles.view";
pub const BROKER_PROFILES_CREATE: &str = "broker_profiles.create";
pub const BROKER_PROFILES_EDIT: &str = "broker_profiles.edit";
pub const BROKER_PROFILES_DELETE: &str = "broker_profiles.delete";

// ─────────────────────────────────────────────────────────────────────────────
// Roles and groups
// ─────────────────────────────────────────────────────────────────────────────

pub const ROLES_VIEW: &str = "roles.view";
pub const ROLES_CREATE: &str = "roles.create";
pub const ROLES_EDIT: &str = "roles.edit";
pub const ROLES_DELETE: &str = "roles.delete";
pub const ROLES_ASSIGN_PERMISSIONS: &str = "roles.assign_permissions";

pub const GROUPS_VIEW: &str = "groups.view";
pub const GROUPS_CREATE: &str = "groups.create";
pub const GROUPS_EDIT: &str = "groups.edit";
pub const GROUPS_DELETE: &str = "groups.delete";

// ─────────────────────────────────────────────────────────────────────────────
// Trading
// ─────────────────────────────────────────────────────────────────────────────

pub const TRADES_VIEW: &str = "trades.view";
pub const TRADES_CREATE: &str = "trades.create";
pub const TRADES_EDIT: &str = "trades.edit";
pub const TRADES_DELETE: &str = "trades.delete";

pub const RULES_VIEW: &str = "rules.view";
pub const RULES_CREATE: &str = "rules.create";
pub const RULES_EDIT: &str = "rules.edit";
pub const RULES_DELETE: &str = "rules.delete";
/// Module override token: grants every action inside the rules module.
pub const RULES_MANAGE: &str = "rules.manage";

// ─────────────────────────────────────────────────────────────────────────────
// Observability screens
// ─────────────────────────────────────────────────────────────────────────────

pub const AUDIT_LOGS_VIEW: &str = "audit_logs.view";
pub const LOGS_VIEW: &str = "logs.view";
pub const METRICS_VIEW: &str = "metrics.view";
pub const PERMISSIONS_VIEW: &str = "permissions.view";

/// Every identifier known to the console, grouped by category.
pub const ALL_PERMISSIONS: &[&str] = &[
    USERS_VIEW,
    USERS_CREATE,
    USERS_EDIT,
    USERS_DELETE,
    USERS_ASSIGN_ROLES,
    BROKERS_VIEW,
    BROKERS_CREATE,
    BROKERS_EDIT,
    BROKERS_DELETE,
    BROKER_PROFILES_VIEW,
    BROKER_PROFILES_CREATE,
    BROKER_PROFILES_EDIT,
    BROKER_PROFILES_DELETE,
    ROLES_VIEW,
    ROLES_CREATE,
    ROLES_EDIT,
    ROLES_DELETE,
    ROLES_ASSIGN_PERMISSIONS,
    GROUPS_VIEW,
    GROUPS_CREATE,
    GROUPS_EDIT,
    GROUPS_DELETE,
    TRADES_VIEW,
    TRADES_CREATE,
    TRADES_EDIT,
    TRADES_DELETE,
    RULES_VIEW,
    RULES_CREATE,
    RULES_EDIT,
    RULES_DELETE,
    RULES_MANAGE,
    AUDIT_LOGS_VIEW,
    LOGS_VIEW,
    METRICS_VIEW,
    PERMISSIONS_VIEW,
];

// ─────────────────────────────────────────────────────────────────────────────
// Modules and actions
// ─────────────────────────────────────────────────────────────────────────────

/// Functional area of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Users,
    Brokers,
    BrokerProfiles,
    Roles,
    Groups,
    Trades,
    Rules,
    AuditLogs,
    Logs,
    Profile,
    Dashboard,
}

impl Module {
    /// All modules in navigation order.
    pub const ALL: [Module; 11] = [
        Module::Users,
        Module::Brokers,
        Module::BrokerProfiles,
        Module::Roles,
        Module::Groups,
        Module::Trades,
        Module::Rules,
        Module::AuditLogs,
        Module::Logs,
        Module::Profile,
        Module::Dashboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Users => "users",
            Module::Brokers => "brokers",
            Module::BrokerProfiles => "broker_profiles",
            Module::Roles => "roles",
            Module::Groups => "groups",
            Module::Trades => "trades",
            Module::Rules => "rules",
            Module::AuditLogs => "audit_logs",
            Module::Logs => "logs",
            Module::Profile => "profile",
            Module::Dashboard => "dashboard",
        }
    }
}

impl core::fmt::Display for Module {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Module::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| DomainError::validation(format!("unknown module '{}'", s)))
    }
}

/// Gated action inside a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::View, Action::Create, Action::Edit, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of the lookup tables: `[view, create, edit, delete]`.
fn module_row(module: Module) -> [Option<&'static str>; 4] {
    match module {
        Module::Users => [Some(USERS_VIEW), Some(USERS_CREATE), Some(USERS_EDIT), Some(USERS_DELETE)],
        Module::Brokers => [
            Some(BROKERS_VIEW),
            Some(BROKERS_CREATE),
            Some(BROKERS_EDIT),
            Some(BROKERS_DELETE),
        ],
        Module::BrokerProfiles => [
            Some(BROKER_PROFILES_VIEW),
            Some(BROKER_PROFILES_CREATE),
            Some(BROKER_PROFILES_EDIT),
            Some(BROKER_PROFILES_DELETE),
        ],
        Module::Roles => [Some(ROLES_VIEW), Some(ROLES_CREATE), Some(ROLES_EDIT), Some(ROLES_DELETE)],
        Module::Groups => [
            Some(GROUPS_VIEW),
            Some(GROUPS_CREATE),
            Some(GROUPS_EDIT),
            Some(GROUPS_DELETE),
        ],
        Module::Trades => [
            Some(TRADES_VIEW),
            Some(TRADES_CREATE),
            Some(TRADES_EDIT),
            Some(TRADES_DELETE),
        ],
        Module::Rules => [Some(RULES_VIEW), Some(RULES_CREATE), Some(RULES_EDIT), Some(RULES_DELETE)],
        Module::AuditLogs => [Some(AUDIT_LOGS_VIEW), None, None, None],
        Module::Logs => [Some(LOGS_VIEW), None, None, None],
        Module::Profile | Module::Dashboard => [None, None, None, None],
    }
}

/// Permission gating `action` in `module`, if the catalog maps one.
pub fn permission_for(module: Module, action: Action) -> Option<&'static str> {
    let row = module_row(module);
    match action {
        Action::View => row[0],
        Action::Create => row[1],
        Action::Edit => row[2],
        Action::Delete => row[3],
    }
}

pub fn view_permission(module: Module) -> Option<&'static str> {
    permission_for(module, Action::View)
}

pub fn create_permission(module: Module) -> Option<&'static str> {
    permission_for(module, Action::Create)
}

pub fn edit_permission(module: Module) -> Option<&'static str> {
    permission_for(module, Action::Edit)
}

pub fn delete_permission(module: Module) -> Option<&'static str> {
    permission_for(module, Action::Delete)
}

/// Token that unlocks every action of `module` on its own.
///
/// Only `rules` defines one.
pub fn module_override(module: Module) -> Option<&'static str> {
    match module {
        Module::Rules => Some(RULES_MANAGE),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Metadata (for admin screens and diagnostics)
// ─────────────────────────────────────────────────────────────────────────────

/// Permission definition with display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionDefinition {
    pub name: &'static str,
    pub category: &'static str,
    pub description: String,
}

/// Definitions for every catalog identifier, in catalog order.
pub fn definitions() -> Vec<PermissionDefinition> {
    ALL_PERMISSIONS.iter().copied().map(describe).collect()
}

/// Definition of a single identifier, if it belongs to the catalog.
pub fn definition(name: &str) -> Option<PermissionDefinition> {
    ALL_PERMISSIONS.iter().copied().find(|p| *p == name).map(describe)
}

pub fn is_known(name: &str) -> bool {
    ALL_PERMISSIONS.iter().any(|p| *p == name)
}

fn describe(perm: &'static str) -> PermissionDefinition {
    let (category, action) = perm.split_once('.').unwrap_or((perm, ""));
    let subject = category.replace('_', " ");

    let description = match action {
        "view" => format!("View {}", subject),
        "create" => format!("Create {}", subject),
        "edit" => format!("Edit {}", subject),
        "delete" => format!("Delete {}", subject),
        "manage" => format!("Full control of {}", subject),
        other => format!("{} for {}", other.replace('_', " "), subject),
    };

    PermissionDefinition {
        name: perm,
        category,
        description,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn identifiers_are_unique() {
        let unique: HashSet<_> = ALL_PERMISSIONS.iter().collect();
        assert_eq!(unique.len(), ALL_PERMISSIONS.len());
    }

    #[test]
    fn every_mapped_permission_is_in_the_catalog() {
        for module in Module::ALL {
            for action in Action::ALL {
                if let Some(p) = permission_for(module, action) {
                    assert!(is_known(p), "{} is not catalogued", p);
                }
            }
            if let Some(token) = module_override(module) {
                assert!(is_known(token));
            }
        }
    }

    #[test]
    fn profile_and_dashboard_are_unmapped() {
        for action in Action::ALL {
            assert_eq!(permission_for(Module::Profile, action), None);
            assert_eq!(permission_for(Module::Dashboard, action), None);
        }
    }

    #[test]
    fn log_modules_are_view_only() {
        assert_eq!(view_permission(Module::AuditLogs), Some(AUDIT_LOGS_VIEW));
        assert_eq!(create_permission(Module::AuditLogs), None);
        assert_eq!(edit_permission(Module::Logs), None);
        assert_eq!(delete_permission(Module::Logs), None);
    }

    #[test]
    fn module_names_round_trip() {
        for module in Module::ALL {
            assert_eq!(module.as_str().parse::<Module>().unwrap(), module);
        }
        assert_eq!(" Broker_Profiles ".parse::<Module>().unwrap(), Module::BrokerProfiles);
        assert!("metrics".parse::<Module>().is_err());
    }

    #[test]
    fn definitions_describe_action_and_subject() {
        let def = definition(BROKER_PROFILES_EDIT).unwrap();
        assert_eq!(def.category, "broker_profiles");
        assert_eq!(def.description, "Edit broker profiles");

        let token = definition(RULES_MANAGE).unwrap();
        assert_eq!(token.description, "Full control of rules");

        assert_eq!(definitions().len(), ALL_PERMISSIONS.len());
        assert!(definition("nope.view").is_none());
    }
}
