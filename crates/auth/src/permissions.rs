use std::borrow::{Borrow, Cow};
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are opaque dotted strings (e.g. "users.edit"). The engine does
/// no structural validation: identifiers must match the backend's vocabulary
/// exactly, and that is kept in lockstep by convention.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

/// De-duplicated, ordered set of permissions.
pub type PermissionSet = BTreeSet<Permission>;

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Segment before the first dot (`"users"` for `"users.edit"`).
    pub fn category(&self) -> &str {
        self.as_str().split('.').next().unwrap_or_default()
    }

    /// Segment after the last dot (`"edit"` for `"users.edit"`).
    pub fn action(&self) -> &str {
        self.as_str().rsplit('.').next().unwrap_or_default()
    }
}

impl Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&'static str> for Permission {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_category_and_action() {
        let p = Permission::from_static("broker_profiles.delete");
        assert_eq!(p.category(), "broker_profiles");
        assert_eq!(p.action(), "delete");
    }

    #[test]
    fn set_lookup_by_str() {
        let set: PermissionSet = [Permission::from("users.view")].into_iter().collect();
        assert!(set.contains("users.view"));
        assert!(!set.contains("users.edit"));
    }

    #[test]
    fn owned_and_borrowed_compare_equal() {
        assert_eq!(Permission::from("trades.view"), Permission::from("trades.view".to_string()));
    }
}
