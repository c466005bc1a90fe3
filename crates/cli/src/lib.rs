//! Inspect how the console engine resolves a user (`brokerdesk-access` binary).
//!
//! Reads a user record exported from the backend, runs it through the same
//! session path the console uses, and reports the resulting access.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use serde::Serialize;

use brokerdesk_auth::catalog;
use brokerdesk_auth::{
    AccessSnapshot, Action, AuthorizationExplanation, DirectoryError, EngineConfig, FallbackTable,
    Module, PermissionDefinition, PermissionSession, User, UserDirectory,
};
use brokerdesk_core::UserId;
use brokerdesk_events::AuthEvent;

#[derive(Debug, Clone, Parser)]
#[command(name = "brokerdesk-access", about = "Resolve a console user's effective permissions")]
pub struct Args {
    /// User record (JSON) as returned by the backend's current-user endpoint.
    pub user: PathBuf,

    /// JSON file of fallback overrides: { "<role>": ["perm", ...] }.
    #[arg(long, env = "BROKERDESK_ROLE_FALLBACKS")]
    pub fallbacks: Option<PathBuf>,

    /// Start from an empty fallback table instead of the built-in roles.
    #[arg(long)]
    pub no_defaults: bool,

    /// Explain the decision for this permission (repeatable).
    #[arg(long = "check", value_name = "PERMISSION")]
    pub checks: Vec<String>,

    /// Include the permission catalog in the report.
    #[arg(long)]
    pub catalog: bool,
}

/// User directory backed by a JSON file on disk.
///
/// A missing file means "no session token".
#[derive(Debug, Clone)]
pub struct FileDirectory {
    path: PathBuf,
}

impl FileDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl UserDirectory for FileDirectory {
    async fn current_user(&self) -> Result<Option<User>, DirectoryError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DirectoryError::Unavailable(e.to_string())),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| DirectoryError::Malformed(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleAccess {
    pub module: Module,
    pub view: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessReport {
    pub user_id: Option<UserId>,
    pub user: Option<String>,
    pub is_admin: bool,
    pub effective_permissions: Vec<String>,
    pub accessible_modules: Vec<Module>,
    pub modules: Vec<ModuleAccess>,
    pub checks: Vec<AuthorizationExplanation>,
    pub fallback_roles: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<Vec<PermissionDefinition>>,
}

/// Assemble a report from a resolved snapshot.
pub fn build_report(
    access: &AccessSnapshot,
    fallback: &FallbackTable,
    checks: &[String],
    include_catalog: bool,
) -> AccessReport {
    let modules = Module::ALL
        .into_iter()
        .map(|module| ModuleAccess {
            module,
            view: access.can(module, Action::View),
            create: access.can(module, Action::Create),
            edit: access.can(module, Action::Edit),
            delete: access.can(module, Action::Delete),
        })
        .collect();

    AccessReport {
        user_id: access.user_id(),
        user: access.user().map(User::display_name),
        is_admin: access.is_admin(),
        effective_permissions: access.permissions().iter().map(|p| p.to_string()).collect(),
        accessible_modules: access.accessible_modules(),
        modules,
        checks: checks.iter().map(|p| access.explain(p, fallback)).collect(),
        fallback_roles: fallback
            .snapshot()
            .into_iter()
            .map(|(role, perms)| (role, perms.iter().map(|p| p.to_string()).collect()))
            .collect(),
        catalog: include_catalog.then(catalog::definitions),
    }
}

/// Resolve the user in `args.user` the way the console would after login.
pub async fn run(args: &Args) -> anyhow::Result<AccessReport> {
    let mut config = EngineConfig::from_env().context("invalid engine configuration")?;
    if let Some(path) = &args.fallbacks {
        config.role_fallbacks_path = Some(path.clone());
    }
    if args.no_defaults {
        config.seed_defaults = false;
    }

    let fallback = Arc::new(
        config
            .build_fallback_table()
            .context("failed to build fallback table")?,
    );
    let session = PermissionSession::new(FileDirectory::new(&args.user), fallback.clone());

    session
        .handle_event(&AuthEvent::logged_in(None))
        .await
        .with_context(|| format!("failed to resolve user from {}", args.user.display()))?;

    let access = session.access();
    if !access.is_authenticated() {
        tracing::warn!(path = %args.user.display(), "no user record found; reporting unauthenticated state");
    }

    Ok(build_report(&access, &fallback, &args.checks, args.catalog))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn write_user(name: &str, value: serde_json::Value) -> PathBuf {
        let path = std::env::temp_dir().join(format!("brokerdesk-{}-{}.json", name, std::process::id()));
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn args(user: PathBuf) -> Args {
        Args {
            user,
            fallbacks: None,
            no_defaults: false,
            checks: vec![],
            catalog: false,
        }
    }

    #[tokio::test]
    async fn reports_fallback_resolved_user() {
        let path = write_user("trader", json!({ "id": 5, "username": "tina", "roles": ["Senior Trader"] }));
        let mut args = args(path.clone());
        args.checks = vec!["trades.delete".to_string()];

        let report = run(&args).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(report.user.as_deref(), Some("tina"));
        assert!(!report.is_admin);
        assert!(report.effective_permissions.contains(&"trades.create".to_string()));

        let trades = report.modules.iter().find(|m| m.module == Module::Trades).unwrap();
        assert!(trades.view && trades.create && trades.edit && !trades.delete);

        assert_eq!(report.checks.len(), 1);
        assert!(!report.checks[0].granted);
        assert!(report.catalog.is_none());
    }

    #[tokio::test]
    async fn missing_file_reports_unauthenticated() {
        let args = args(PathBuf::from("/nonexistent/brokerdesk-user.json"));
        let report = run(&args).await.unwrap();

        assert_eq!(report.user_id, None);
        assert!(report.accessible_modules.is_empty());
        assert!(report.modules.iter().all(|m| !m.view));
    }

    #[tokio::test]
    async fn malformed_record_is_an_error() {
        let path = write_user("broken", json!({ "roles": [] }));
        let result = run(&args(path.clone())).await;
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }

    #[test]
    fn admin_report_lists_every_module() {
        let fallback = FallbackTable::empty();
        let normalizer = brokerdesk_auth::RoleNormalizer::new(Arc::new(FallbackTable::empty()));
        let access = AccessSnapshot::resolve(
            User::new(UserId::new(1), vec!["admin".into()]),
            &normalizer,
        );

        let report = build_report(&access, &fallback, &[], true);
        assert!(report.is_admin);
        assert_eq!(report.accessible_modules, Module::ALL.to_vec());
        assert_eq!(report.catalog.unwrap().len(), catalog::ALL_PERMISSIONS.len());
    }
}
