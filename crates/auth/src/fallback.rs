//! Role fallback table: lowercase role name → permission set.
//!
//! Used whenever a role arrives without an explicit permission list. The table
//! is seeded with defaults and merge-updated from authoritative server data;
//! entries are replaced wholesale per role name and never reset.
//!
//! Iteration order is sorted by key. Partial matching relies on that order:
//! the first key (alphabetically) contained in a role name wins.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use serde_json::Value;

use crate::catalog::{self, Action, Module};
use crate::error::ConfigError;
use crate::roles::normalize_role_name;
use crate::{Permission, PermissionSet, RoleRef};

/// Roles seeded into [`FallbackTable::with_defaults`].
pub const DEFAULT_ROLES: &[&str] = &["broker", "compliance", "manager", "support", "trader", "viewer"];

/// Built-in role-to-permission mapping.
pub fn default_role_permissions(role: &str) -> Vec<String> {
    let perms: Vec<&str> = match role {
        "manager" => {
            let mut perms = Vec::new();
            for module in [
                Module::Users,
                Module::Brokers,
                Module::BrokerProfiles,
                Module::Groups,
                Module::Trades,
            ] {
                perms.extend(
                    [Action::View, Action::Create, Action::Edit]
                        .into_iter()
                        .filter_map(|a| catalog::permission_for(module, a)),
                );
            }
            perms.push(catalog::RULES_VIEW);
            perms.push(catalog::AUDIT_LOGS_VIEW);
            perms
        }
        "broker" => vec![
            catalog::BROKERS_VIEW,
            catalog::BROKER_PROFILES_VIEW,
            catalog::BROKER_PROFILES_EDIT,
            catalog::TRADES_VIEW,
            catalog::TRADES_CREATE,
        ],
        "trader" => vec![
            catalog::TRADES_VIEW,
            catalog::TRADES_CREATE,
            catalog::TRADES_EDIT,
            catalog::BROKER_PROFILES_VIEW,
        ],
        "compliance" => vec![
            catalog::AUDIT_LOGS_VIEW,
            catalog::LOGS_VIEW,
            catalog::RULES_MANAGE,
            catalog::TRADES_VIEW,
        ],
        "support" => vec![catalog::USERS_VIEW, catalog::USERS_EDIT, catalog::GROUPS_VIEW],
        "viewer" => Module::ALL.into_iter().filter_map(catalog::view_permission).collect(),
        _ => Vec::new(),
    };
    perms.into_iter().map(str::to_string).collect()
}

/// Shared, mutable fallback table.
///
/// Hand out one `Arc<FallbackTable>` per engine; every resolver holding it
/// sees merges immediately. Concurrent merges are last-write-wins per key.
#[derive(Debug, Default)]
pub struct FallbackTable {
    entries: RwLock<BTreeMap<String, PermissionSet>>,
}

impl FallbackTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table seeded with [`default_role_permissions`] for every [`DEFAULT_ROLES`] entry.
    pub fn with_defaults() -> Self {
        Self::from_entries(
            DEFAULT_ROLES
                .iter()
                .map(|role| (role.to_string(), default_role_permissions(role))),
        )
    }

    pub fn from_entries<I, K, P, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: AsRef<str>,
        P: IntoIterator<Item = S>,
        S: Into<Permission>,
    {
        let table = Self::empty();
        for (role, perms) in entries {
            table.insert(role.as_ref(), perms.into_iter().map(Into::into).collect());
        }
        table
    }

    /// Exact lookup by role name (trimmed and lowercased first).
    pub fn get(&self, role: &str) -> Option<PermissionSet> {
        self.read().get(&normalize_role_name(role)).cloned()
    }

    /// Replace the entry for `role`. Blank names are ignored.
    pub fn insert(&self, role: &str, permissions: PermissionSet) -> Option<PermissionSet> {
        let key = normalize_role_name(role);
        if key.is_empty() {
            return None;
        }
        self.write().insert(key, permissions)
    }

    /// Record authoritative role data.
    ///
    /// Every role that carries both a name and a non-empty explicit permission
    /// list overwrites its entry. Returns the number of entries written.
    pub fn merge<'a, I>(&self, roles: I) -> usize
    where
        I: IntoIterator<Item = &'a RoleRef>,
    {
        let mut written = 0;
        let mut entries = self.write();
        for role in roles {
            let (Some(key), Some(perms)) = (role.normalized_name(), role.explicit_permissions()) else {
                continue;
            };
            if key.is_empty() {
                continue;
            }
            tracing::debug!(role = %key, permissions = perms.len(), "fallback entry updated");
            entries.insert(key, perms.iter().cloned().collect());
            written += 1;
        }
        written
    }

    /// Resolve a role name: exact match first, then the first key (in sorted
    /// order) that the name contains.
    pub fn resolve(&self, role_name: &str) -> Option<PermissionSet> {
        let name = normalize_role_name(role_name);
        if name.is_empty() {
            return None;
        }

        let entries = self.read();
        if let Some(perms) = entries.get(&name) {
            return Some(perms.clone());
        }

        entries
            .iter()
            .find(|(key, _)| !key.is_empty() && name.contains(key.as_str()))
            .map(|(key, perms)| {
                tracing::debug!(role = %name, matched = %key, "partial fallback match");
                perms.clone()
            })
    }

    /// Load `{ "<role>": ["perm", ...] }` overrides. Each listed role replaces
    /// its entry. Returns the number of entries written.
    pub fn load_json(&self, json: &str) -> Result<usize, ConfigError> {
        let parsed: BTreeMap<String, Vec<Value>> =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut written = 0;
        for (role, raw) in parsed {
            let mut perms = PermissionSet::new();
            for value in raw {
                match value {
                    Value::String(p) if !p.trim().is_empty() => {
                        perms.insert(Permission::new(p.trim().to_string()));
                    }
                    other => {
                        return Err(ConfigError::InvalidValue {
                            key: role,
                            message: format!("expected permission string, got {}", other),
                        });
                    }
                }
            }
            if self.insert(&role, perms).is_some() {
                tracing::debug!(role = %role, "fallback entry overridden");
            }
            written += 1;
        }
        Ok(written)
    }

    /// Roles (sorted) whose entry grants `permission`.
    pub fn roles_granting(&self, permission: &str) -> Vec<String> {
        self.read()
            .iter()
            .filter(|(_, perms)| perms.contains(permission))
            .map(|(role, _)| role.clone())
            .collect()
    }

    /// Point-in-time copy of every entry.
    pub fn snapshot(&self) -> BTreeMap<String, PermissionSet> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, PermissionSet>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, PermissionSet>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(perms: &[&'static str]) -> PermissionSet {
        perms.iter().copied().map(Permission::from).collect()
    }

    #[test]
    fn defaults_cover_every_seeded_role() {
        let table = FallbackTable::with_defaults();
        assert_eq!(table.len(), DEFAULT_ROLES.len());
        for role in DEFAULT_ROLES {
            let perms = table.get(role).unwrap();
            assert!(!perms.is_empty(), "{} has no permissions", role);
            assert!(perms.iter().all(|p| catalog::is_known(p.as_str())));
        }
    }

    #[test]
    fn viewer_gets_every_mapped_view_permission() {
        let viewer = FallbackTable::with_defaults().get("viewer").unwrap();
        assert!(viewer.contains(catalog::USERS_VIEW));
        assert!(viewer.contains(catalog::LOGS_VIEW));
        assert!(!viewer.contains(catalog::USERS_EDIT));
    }

    #[test]
    fn merge_overwrites_named_entries_only() {
        let table = FallbackTable::from_entries([("editor", ["users.view"])]);
        let roles = vec![
            RoleRef::with_permissions("Editor", ["users.edit"]),
            RoleRef::named("Viewer"),
            RoleRef::bare("trader"),
        ];

        assert_eq!(table.merge(&roles), 1);
        assert_eq!(table.get("editor"), Some(set(&["users.edit"])));
        assert_eq!(table.get("viewer"), None);
    }

    #[test]
    fn merge_skips_nameless_explicit_roles() {
        let table = FallbackTable::empty();
        let role = RoleRef::from_value(serde_json::json!({ "permissions": ["logs.view"] }));
        assert_eq!(table.merge([&role]), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn resolve_prefers_exact_then_first_sorted_partial() {
        let table = FallbackTable::from_entries([
            ("moderator", vec!["logs.view"]),
            ("mod", vec!["users.view"]),
            ("moderator-7", vec!["trades.view"]),
        ]);

        assert_eq!(table.resolve(" Moderator-7 "), Some(set(&["trades.view"])));
        // "mod" sorts before "moderator" and is contained in the name.
        assert_eq!(table.resolve("moderator-8"), Some(set(&["users.view"])));
        assert_eq!(table.resolve("guest"), None);
        assert_eq!(table.resolve("  "), None);
    }

    #[test]
    fn load_json_replaces_listed_roles() {
        let table = FallbackTable::with_defaults();
        let written = table
            .load_json(r#"{ "Trader": ["trades.view"], "auditor": ["audit_logs.view"] }"#)
            .unwrap();

        assert_eq!(written, 2);
        assert_eq!(table.get("trader"), Some(set(&["trades.view"])));
        assert_eq!(table.get("auditor"), Some(set(&["audit_logs.view"])));
    }

    #[test]
    fn load_json_rejects_non_string_permissions() {
        let table = FallbackTable::empty();
        let err = table.load_json(r#"{ "ops": [1] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "ops"));

        assert!(matches!(table.load_json("[]"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn roles_granting_lists_sorted_roles() {
        let table = FallbackTable::with_defaults();
        assert_eq!(table.roles_granting(catalog::TRADES_CREATE), vec!["broker", "manager", "trader"]);
    }
}
