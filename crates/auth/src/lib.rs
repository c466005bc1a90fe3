//! Client-side permission resolution for the admin console.
//!
//! Turns a user's roles into an effective permission set and answers the
//! "can this user do X in module Y" questions the UI gates on. Advisory only:
//! the backend remains the access-control boundary.

pub mod admin;
pub mod authorize;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fallback;
pub mod listener;
pub mod normalize;
pub mod permissions;
pub mod roles;
pub mod session;
pub mod user;

pub use admin::is_admin;
pub use authorize::{AccessSnapshot, AuthorizationExplanation, DenialKind, DenialReason, SnapshotState};
pub use catalog::{Action, Module, PermissionDefinition};
pub use config::EngineConfig;
pub use error::{ConfigError, DirectoryError, SessionError};
pub use fallback::{FallbackTable, default_role_permissions};
pub use listener::{AuthListener, ListenerHandle};
pub use normalize::RoleNormalizer;
pub use permissions::{Permission, PermissionSet};
pub use roles::RoleRef;
pub use session::{PermissionSession, UserDirectory};
pub use user::User;
