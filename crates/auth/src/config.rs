//! Engine configuration from environment variables.
//!
//! - `BROKERDESK_ROLE_FALLBACKS`: path to a JSON file of fallback overrides
//!   (`{ "<role>": ["perm", ...] }`)
//! - `BROKERDESK_SEED_DEFAULTS`: `true`/`false`, whether built-in roles are seeded (default `true`)

use std::path::PathBuf;

use crate::{ConfigError, FallbackTable};

pub const ROLE_FALLBACKS_VAR: &str = "BROKERDESK_ROLE_FALLBACKS";
pub const SEED_DEFAULTS_VAR: &str = "BROKERDESK_SEED_DEFAULTS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub role_fallbacks_path: Option<PathBuf>,
    pub seed_defaults: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            role_fallbacks_path: None,
            seed_defaults: true,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a closure over a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let role_fallbacks_path = lookup(ROLE_FALLBACKS_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let seed_defaults = match lookup(SEED_DEFAULTS_VAR) {
            None => true,
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: SEED_DEFAULTS_VAR.to_string(),
                message: format!("expected true/false, got '{}'", raw),
            })?,
        };

        Ok(Self {
            role_fallbacks_path,
            seed_defaults,
        })
    }

    /// Fallback table as configured: optional defaults, then file overrides.
    pub fn build_fallback_table(&self) -> Result<FallbackTable, ConfigError> {
        let table = if self.seed_defaults {
            FallbackTable::with_defaults()
        } else {
            FallbackTable::empty()
        };

        if let Some(path) = &self.role_fallbacks_path {
            let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            let written = table.load_json(&json)?;
            tracing::info!(path = %path.display(), roles = written, "loaded fallback overrides");
        }

        Ok(table)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(!config.build_fallback_table().unwrap().is_empty());
    }

    #[test]
    fn seed_flag_accepts_common_spellings() {
        let off = EngineConfig::from_lookup(lookup(&[(SEED_DEFAULTS_VAR, "No")])).unwrap();
        assert!(!off.seed_defaults);
        assert!(off.build_fallback_table().unwrap().is_empty());

        let err = EngineConfig::from_lookup(lookup(&[(SEED_DEFAULTS_VAR, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn overrides_file_is_applied_on_top_of_defaults() {
        let path = std::env::temp_dir().join(format!("brokerdesk-fallbacks-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "trader": ["trades.view"] }"#).unwrap();

        let config = EngineConfig::from_lookup(lookup(&[(ROLE_FALLBACKS_VAR, path.to_str().unwrap())])).unwrap();
        let table = config.build_fallback_table().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(table.get("trader").unwrap().len(), 1);
        assert!(table.get("viewer").is_some());
    }

    #[test]
    fn missing_overrides_file_is_a_read_error() {
        let config = EngineConfig {
            role_fallbacks_path: Some(PathBuf::from("/nonexistent/brokerdesk.json")),
            seed_defaults: false,
        };
        assert!(matches!(config.build_fallback_table(), Err(ConfigError::Read { .. })));
    }
}
