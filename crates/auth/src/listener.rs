//! Background listener wiring auth events to the permission session.

use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::warn;

use brokerdesk_events::{AuthEvent, Event, EventBus, Subscription};

use crate::{PermissionSession, UserDirectory};

/// Handle to stop and join the listener thread.
#[derive(Debug)]
pub struct ListenerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Request shutdown and wait for the listener to stop.
    ///
    /// Refreshes already spawned on the runtime keep running to completion.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Subscribes a [`PermissionSession`] to an auth-event bus.
#[derive(Debug)]
pub struct AuthListener;

impl AuthListener {
    /// Spawn the listener thread.
    ///
    /// An initial refresh is spawned on `runtime` right away, so a process
    /// starting with a stored token picks up its user without waiting for an
    /// event. Session-ending events clear the session inline. Every other
    /// event spawns an independent refresh on `runtime`, so overlapping
    /// refreshes race and the last to complete wins.
    pub fn spawn<B, D>(bus: &B, session: Arc<PermissionSession<D>>, runtime: Handle) -> std::io::Result<ListenerHandle>
    where
        B: EventBus<AuthEvent>,
        D: UserDirectory + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let sub = bus.subscribe();

        let initial = Arc::clone(&session);
        runtime.spawn(async move {
            if let Err(err) = initial.refresh().await {
                warn!(error = %err, "initial session refresh failed");
            }
        });

        let join = thread::Builder::new()
            .name("auth-listener".to_string())
            .spawn(move || listen(sub, shutdown_rx, session, runtime))?;

        Ok(ListenerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        })
    }
}

fn listen<D>(
    sub: Subscription<AuthEvent>,
    shutdown_rx: mpsc::Receiver<()>,
    session: Arc<PermissionSession<D>>,
    runtime: Handle,
) where
    D: UserDirectory + 'static,
{
    let tick = Duration::from_millis(250);

    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        match sub.recv_timeout(tick) {
            Ok(event) => {
                tracing::debug!(event = event.event_type(), "auth event received");
                if event.ends_session() {
                    session.clear_session();
                    continue;
                }

                let session = Arc::clone(&session);
                runtime.spawn(async move {
                    if let Err(err) = session.refresh().await {
                        warn!(event = event.event_type(), error = %err, "session refresh after auth event failed");
                    }
                });
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::FallbackTable;
    use crate::session::tests::{ScriptedDirectory, editor};
    use brokerdesk_events::InMemoryEventBus;

    async fn wait_until(mut check: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn login_and_logout_events_drive_the_session() {
        let bus = InMemoryEventBus::<AuthEvent>::new();
        let session = Arc::new(PermissionSession::new(
            ScriptedDirectory::new(vec![Ok(Some(editor()))]),
            Arc::new(FallbackTable::empty()),
        ));

        let handle = AuthListener::spawn(&bus, session.clone(), Handle::current()).unwrap();

        bus.publish(AuthEvent::logged_in(None)).unwrap();
        assert!(wait_until(|| session.access().is_authenticated()).await);

        bus.publish(AuthEvent::logged_out()).unwrap();
        assert!(wait_until(|| !session.access().is_authenticated()).await);

        handle.shutdown();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stored_token_is_loaded_without_any_event() {
        let bus = InMemoryEventBus::<AuthEvent>::new();
        let session = Arc::new(PermissionSession::new(
            ScriptedDirectory::new(vec![Ok(Some(editor()))]),
            Arc::new(FallbackTable::empty()),
        ));

        let handle = AuthListener::spawn(&bus, session.clone(), Handle::current()).unwrap();

        assert!(wait_until(|| session.access().is_authenticated()).await);
        assert!(session.access().has_permission("users.edit"));

        handle.shutdown();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn listener_stops_when_bus_is_dropped() {
        let bus = InMemoryEventBus::<AuthEvent>::new();
        let session = Arc::new(PermissionSession::new(
            ScriptedDirectory::default(),
            Arc::new(FallbackTable::empty()),
        ));

        let handle = AuthListener::spawn(&bus, session, Handle::current()).unwrap();
        drop(bus);

        let join = tokio::task::spawn_blocking(move || handle.shutdown());
        assert!(tokio::time::timeout(Duration::from_secs(5), join).await.is_ok());
    }
}
