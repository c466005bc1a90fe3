//! Auth-state signals and the bus that carries them.
//!
//! The engine never authenticates anyone itself; an external auth collaborator
//! publishes [`AuthEvent`]s here and the permission session reacts to them.

pub mod auth;
pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use auth::AuthEvent;
pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
