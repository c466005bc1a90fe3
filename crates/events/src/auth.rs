//! Auth-state change signals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brokerdesk_core::UserId;

use crate::Event;

/// Fired by the auth collaborator whenever the authentication state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthEvent {
    /// A login completed and a session token is now available.
    LoggedIn {
        user_id: Option<UserId>,
        occurred_at: DateTime<Utc>,
    },
    /// The token was refreshed or the user record may have changed server-side.
    AuthUpdated { occurred_at: DateTime<Utc> },
    /// The user logged out explicitly.
    LoggedOut { occurred_at: DateTime<Utc> },
    /// The token was rejected or expired.
    TokenInvalidated { occurred_at: DateTime<Utc> },
}

impl AuthEvent {
    pub fn logged_in(user_id: Option<UserId>) -> Self {
        Self::LoggedIn {
            user_id,
            occurred_at: Utc::now(),
        }
    }

    pub fn auth_updated() -> Self {
        Self::AuthUpdated {
            occurred_at: Utc::now(),
        }
    }

    pub fn logged_out() -> Self {
        Self::LoggedOut {
            occurred_at: Utc::now(),
        }
    }

    pub fn token_invalidated() -> Self {
        Self::TokenInvalidated {
            occurred_at: Utc::now(),
        }
    }

    /// Whether this signal ends the authenticated session.
    pub fn ends_session(&self) -> bool {
        matches!(self, Self::LoggedOut { .. } | Self::TokenInvalidated { .. })
    }
}

impl Event for AuthEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AuthEvent::LoggedIn { .. } => "auth.logged_in",
            AuthEvent::AuthUpdated { .. } => "auth.updated",
            AuthEvent::LoggedOut { .. } => "auth.logged_out",
            AuthEvent::TokenInvalidated { .. } => "auth.token_invalidated",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AuthEvent::LoggedIn { occurred_at, .. }
            | AuthEvent::AuthUpdated { occurred_at }
            | AuthEvent::LoggedOut { occurred_at }
            | AuthEvent::TokenInvalidated { occurred_at } => *occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_logout_and_invalidation_end_the_session() {
        assert!(AuthEvent::logged_out().ends_session());
        assert!(AuthEvent::token_invalidated().ends_session());
        assert!(!AuthEvent::logged_in(None).ends_session());
        assert!(!AuthEvent::auth_updated().ends_session());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(AuthEvent::logged_in(Some(UserId::new(3)))).unwrap();
        assert_eq!(json["kind"], "logged_in");
        assert_eq!(json["user_id"], 3);
    }
}
