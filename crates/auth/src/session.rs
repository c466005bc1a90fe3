//! Permission session state.
//!
//! One cell holds the current [`AccessSnapshot`]. Queries read whatever
//! snapshot is installed; refreshes build a new one and swap it in. There is
//! no queuing or cancellation: overlapping refreshes all complete and the last
//! one to finish wins.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use brokerdesk_events::AuthEvent;

use crate::{AccessSnapshot, DirectoryError, FallbackTable, RoleNormalizer, SessionError, User};

/// Source of the authoritative user record (the backend's "current user"
/// endpoint in production).
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `Ok(None)` means no session token is held.
    async fn current_user(&self) -> Result<Option<User>, DirectoryError>;
}

#[async_trait]
impl<T> UserDirectory for Arc<T>
where
    T: UserDirectory + ?Sized,
{
    async fn current_user(&self) -> Result<Option<User>, DirectoryError> {
        (**self).current_user().await
    }
}

/// Process-wide permission session.
///
/// Only `set_session`, `clear_session` and `refresh` mutate the cell; they are
/// meant to be driven by the auth-event listener.
pub struct PermissionSession<D> {
    directory: D,
    normalizer: RoleNormalizer,
    current: RwLock<Arc<AccessSnapshot>>,
}

impl<D> PermissionSession<D>
where
    D: UserDirectory,
{
    pub fn new(directory: D, fallback: Arc<FallbackTable>) -> Self {
        Self {
            directory,
            normalizer: RoleNormalizer::new(fallback),
            current: RwLock::new(Arc::new(AccessSnapshot::unauthenticated())),
        }
    }

    /// Snapshot to answer queries against.
    pub fn access(&self) -> Arc<AccessSnapshot> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn fallback(&self) -> &Arc<FallbackTable> {
        self.normalizer.fallback()
    }

    pub fn normalizer(&self) -> &RoleNormalizer {
        &self.normalizer
    }

    /// Install `user`: merge its explicit role data into the fallback table,
    /// resolve its permissions, and swap the snapshot in.
    pub fn set_session(&self, user: User) -> Arc<AccessSnapshot> {
        let merged = self.fallback().merge(&user.roles);
        let snapshot = Arc::new(AccessSnapshot::resolve(user, &self.normalizer));

        tracing::info!(
            user_id = ?snapshot.user_id(),
            is_admin = snapshot.is_admin(),
            permissions = snapshot.permissions().len(),
            fallback_entries_merged = merged,
            "permission session installed"
        );

        self.install(snapshot.clone());
        snapshot
    }

    /// Drop back to the unauthenticated state.
    pub fn clear_session(&self) {
        self.install(Arc::new(AccessSnapshot::unauthenticated()));
        tracing::info!("permission session cleared");
    }

    /// Re-fetch the current user and rebuild the snapshot.
    ///
    /// A rejected token clears the session like "no current user". Any other
    /// directory failure leaves the installed snapshot untouched. Both return
    /// the error; retries belong to the caller.
    pub async fn refresh(&self) -> Result<Arc<AccessSnapshot>, SessionError> {
        match self.directory.current_user().await {
            Ok(Some(user)) => Ok(self.set_session(user)),
            Ok(None) => {
                self.clear_session();
                Ok(self.access())
            }
            Err(DirectoryError::Unauthorized) => {
                tracing::warn!("session token rejected by user directory");
                self.clear_session();
                Err(DirectoryError::Unauthorized.into())
            }
            Err(err) => {
                tracing::warn!(error = %err, "permission session refresh failed; keeping previous state");
                Err(err.into())
            }
        }
    }

    /// React to an auth-state change.
    pub async fn handle_event(&self, event: &AuthEvent) -> Result<(), SessionError> {
        if event.ends_session() {
            self.clear_session();
            return Ok(());
        }
        self.refresh().await.map(|_| ())
    }

    fn install(&self, snapshot: Arc<AccessSnapshot>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}
