//! Convenience re-exports for common signal-system usage

pub use crate::event::{OrderEvent, OrderEventType};
pub use crate::manager::{SignalManager, SignalStats};
pub use crate::types::{AsyncEventCallback, EventCallback};

// Common external dependencies
pub use futures::future::BoxFuture;
pub use futures::FutureExt;
