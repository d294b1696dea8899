//! Callback type definitions for the signal system

use crate::event::OrderEvent;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Synchronous callback, invoked inline on the emitting task
pub type EventCallback = Arc<dyn Fn(&OrderEvent) + Send + Sync>;

/// Async event callback type that returns a Result
pub type AsyncEventCallback =
    Arc<dyn Fn(OrderEvent) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;
