use chrono::{DateTime, Utc};

/// A signal published on a bus.
///
/// Events are immutable facts with a stable type name.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "auth.logged_in").
    fn event_type(&self) -> &'static str;

    /// When the event occurred.
    fn occurred_at(&self) -> DateTime<Utc>;
}
