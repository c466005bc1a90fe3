use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};

use brokerdesk_core::RoleId;

use crate::Permission;

/// A role as delivered by the backend.
///
/// The same user record may carry roles in different shapes, so each shape
/// is its own variant and the normalizer matches on them exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleRef {
    /// A plain role name (`"trader"`).
    Bare(String),

    /// A role object with a populated permission list. Authoritative.
    WithPermissions {
        id: Option<RoleId>,
        name: Option<String>,
        permissions: Vec<Permission>,
    },

    /// A role object carrying a name but no (or an empty) permission list.
    NameOnly { id: Option<RoleId>, name: String },

    /// Anything else. Kept verbatim and contributes no permissions.
    Unrecognized(Value),
}

impl RoleRef {
    pub fn bare(name: impl Into<String>) -> Self {
        Self::Bare(name.into())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::NameOnly {
            id: None,
            name: name.into(),
        }
    }

    pub fn with_permissions<I, P>(name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        Self::WithPermissions {
            id: None,
            name: Some(name.into()),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Attach a numeric id (no-op for bare names and unrecognized shapes).
    pub fn with_id(mut self, role_id: RoleId) -> Self {
        match &mut self {
            Self::WithPermissions { id, .. } | Self::NameOnly { id, .. } => *id = Some(role_id),
            Self::Bare(_) | Self::Unrecognized(_) => {}
        }
        self
    }

    /// Classify a raw JSON role entry.
    pub fn from_value(value: Value) -> Self {
        let map = match value {
            Value::String(name) => return Self::Bare(name),
            Value::Object(map) => map,
            other => return Self::Unrecognized(other),
        };

        let id = map.get("id").and_then(Value::as_i64).map(RoleId::new);
        let name = map
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .map(str::to_string);
        let permissions = map
            .get("permissions")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(permission_entry).collect::<Vec<_>>())
            .unwrap_or_default();

        match (name, permissions.is_empty()) {
            (name, false) => Self::WithPermissions { id, name, permissions },
            (Some(name), true) => Self::NameOnly { id, name },
            (None, true) => Self::Unrecognized(Value::Object(map)),
        }
    }

    /// Role name as delivered, if the shape carries one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Bare(name) | Self::NameOnly { name, .. } => Some(name.as_str()),
            Self::WithPermissions { name, .. } => name.as_deref(),
            Self::Unrecognized(_) => None,
        }
    }

    /// Trimmed, lowercased name: the key used against the fallback table.
    pub fn normalized_name(&self) -> Option<String> {
        self.name().map(normalize_role_name)
    }

    /// Numeric id, including one found on an otherwise unrecognized object.
    pub fn id(&self) -> Option<RoleId> {
        match self {
            Self::WithPermissions { id, .. } | Self::NameOnly { id, .. } => *id,
            Self::Unrecognized(value) => value.get("id").and_then(Value::as_i64).map(RoleId::new),
            Self::Bare(_) => None,
        }
    }

    /// Explicit permission list, only when it is authoritative (non-empty).
    pub fn explicit_permissions(&self) -> Option<&[Permission]> {
        match self {
            Self::WithPermissions { permissions, .. } if !permissions.is_empty() => {
                Some(permissions.as_slice())
            }
            _ => None,
        }
    }

    /// Short human label for diagnostics.
    pub fn label(&self) -> String {
        match (self.name(), self.id()) {
            (Some(name), _) => name.to_string(),
            (None, Some(id)) => format!("#{}", id),
            (None, None) => "<unrecognized>".to_string(),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Bare(name) => Value::String(name.clone()),
            Self::WithPermissions { id, name, permissions } => {
                let mut map = Map::new();
                if let Some(id) = id {
                    map.insert("id".into(), json!(id));
                }
                if let Some(name) = name {
                    map.insert("name".into(), json!(name));
                }
                let entries: Vec<Value> = permissions.iter().map(|p| json!({ "name": p })).collect();
                map.insert("permissions".into(), Value::Array(entries));
                Value::Object(map)
            }
            Self::NameOnly { id, name } => match id {
                Some(id) => json!({ "id": id, "name": name }),
                None => json!({ "name": name }),
            },
            Self::Unrecognized(value) => value.clone(),
        }
    }
}

/// Trim and lowercase a role name for table lookups.
pub fn normalize_role_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A permission list entry is either `"users.view"` or `{ "name": "users.view" }`.
fn permission_entry(entry: &Value) -> Option<Permission> {
    let name = match entry {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("name").and_then(Value::as_str)?,
        _ => return None,
    };
    let name = name.trim();
    (!name.is_empty()).then(|| Permission::new(name.to_string()))
}

impl From<&str> for RoleRef {
    fn from(value: &str) -> Self {
        Self::bare(value)
    }
}

impl Serialize for RoleRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RoleRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}
