//! Notification side-channel.
//!
//! The bet service publishes a [`BetEvent`] for every committed state change.
//! Events are ephemeral: a subscriber that falls behind loses events and is
//! expected to re-read the current state from the database.
//!
//! # Flow
//!
//! 1. `BetService` commits a transaction and publishes its events.
//! 2. [`EventBus`] fans them out to every subscriber.
//! 3. The fight WebSocket relays the events scoped to its fight.

pub mod bus;
pub mod types;

pub use bus::{DEFAULT_BUS_CAPACITY, EventBus};
pub use types::BetEvent;
