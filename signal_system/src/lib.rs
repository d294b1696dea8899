//! Signal system for order workflow notifications
//!
//! This crate provides the observability collaborator of the order workflow:
//! subscribers are told about created and failed orders, and running
//! counters are kept for success/failure totals. Nothing a subscriber does
//! can influence the outcome of the workflow that emitted the event.

pub mod event;
pub mod manager;
pub mod prelude;
pub mod types;

pub use event::{OrderEvent, OrderEventType};
pub use manager::{SignalManager, SignalStats};
pub use types::{AsyncEventCallback, EventCallback};
