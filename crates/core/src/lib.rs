//! Shared building blocks for the console engine.
//!
//! This crate carries no policy: identifiers and the domain error only.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{RoleId, UserId};
