//! User record as returned by the backend's user directory.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use brokerdesk_core::UserId;

use crate::RoleRef;

/// Authoritative user record.
///
/// `roles` tolerates anything the backend sends: `null` or a non-array value
/// yields no roles, and each element is classified by [`RoleRef::from_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "lenient_roles")]
    pub roles: Vec<RoleRef>,
}

impl User {
    pub fn new(id: UserId, roles: Vec<RoleRef>) -> Self {
        Self {
            id,
            username: None,
            email: None,
            roles,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Display label: username, then email, then the numeric id.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| format!("user #{}", self.id))
    }
}

fn lenient_roles<'de, D>(deserializer: D) -> Result<Vec<RoleRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let roles = match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(RoleRef::from_value).collect(),
        _ => Vec::new(),
    };
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_mixed_role_shapes() {
        let user: User = serde_json::from_value(json!({
            "id": 17,
            "username": "jdoe",
            "roles": [
                "trader",
                { "id": 5, "name": "Support" },
                { "name": "Editor", "permissions": [{ "name": "users.edit" }] },
                7
            ]
        }))
        .unwrap();

        assert_eq!(user.id, UserId::new(17));
        assert_eq!(user.roles.len(), 4);
        assert!(matches!(user.roles[0], RoleRef::Bare(_)));
        assert!(matches!(user.roles[1], RoleRef::NameOnly { .. }));
        assert!(matches!(user.roles[2], RoleRef::WithPermissions { .. }));
        assert!(matches!(user.roles[3], RoleRef::Unrecognized(_)));
    }

    #[test]
    fn missing_or_null_roles_mean_no_roles() {
        let missing: User = serde_json::from_value(json!({ "id": 1 })).unwrap();
        assert!(missing.roles.is_empty());

        let null: User = serde_json::from_value(json!({ "id": 1, "roles": null })).unwrap();
        assert!(null.roles.is_empty());

        let scalar: User = serde_json::from_value(json!({ "id": 1, "roles": "admin" })).unwrap();
        assert!(scalar.roles.is_empty());
    }

    #[test]
    fn display_name_prefers_username() {
        let user = User::new(UserId::new(3), vec![]);
        assert_eq!(user.display_name(), "user #3");
        assert_eq!(user.with_username("ana").display_name(), "ana");
    }
}
