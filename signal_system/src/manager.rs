use crate::event::{OrderEvent, OrderEventType};
use crate::types::{AsyncEventCallback, EventCallback};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

/// Snapshot of the workflow counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalStats {
    pub orders_created: u64,
    pub orders_failed: u64,
    pub revenue_cents: i64,
}

/// Signal manager for order workflow notifications
pub struct SignalManager {
    callbacks: std::sync::RwLock<Vec<EventCallback>>,
    async_callbacks: std::sync::RwLock<Vec<AsyncEventCallback>>,
    orders_created: AtomicU64,
    orders_failed: AtomicU64,
    revenue_cents: AtomicI64,
}

impl std::fmt::Debug for SignalManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalManager")
            .field("callback_count", &self.callback_count())
            .field("stats", &self.stats())
            .finish()
    }
}

impl SignalManager {
    pub fn new() -> Self {
        Self {
            callbacks: std::sync::RwLock::new(Vec::new()),
            async_callbacks: std::sync::RwLock::new(Vec::new()),
            orders_created: AtomicU64::new(0),
            orders_failed: AtomicU64::new(0),
            revenue_cents: AtomicI64::new(0),
        }
    }

    /// Add event callback, run inline on the emitting task
    ///
    /// A panicking callback is logged and skipped. Callbacks may register or
    /// clear callbacks; changes apply from the next event.
    pub fn add_callback<F>(&self, callback: F)
    where
        F: Fn(&OrderEvent) + Send + Sync + 'static,
    {
        if let Ok(mut callbacks) = self.callbacks.write() {
            callbacks.push(Arc::new(callback));
        }
    }

    /// Add async event callback, spawned on the current tokio runtime
    pub fn add_async_callback<F>(&self, callback: F)
    where
        F: Fn(OrderEvent) -> futures::future::BoxFuture<'static, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        if let Ok(mut callbacks) = self.async_callbacks.write() {
            callbacks.push(Arc::new(callback));
        }
    }

    /// Record the event in the counters and notify every subscriber
    pub fn emit(&self, event: OrderEvent) {
        match event.event_type {
            OrderEventType::Created => {
                self.orders_created.fetch_add(1, Ordering::Relaxed);
                self.revenue_cents
                    .fetch_add(event.total_cents, Ordering::Relaxed);
            }
            OrderEventType::Failed => {
                self.orders_failed.fetch_add(1, Ordering::Relaxed);
            }
        }

        let callbacks: Vec<EventCallback> = match self.callbacks.read() {
            Ok(callbacks) => callbacks.iter().cloned().collect(),
            Err(_) => Vec::new(),
        };
        for (index, callback) in callbacks.iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
                tracing::warn!(callback_index = index, "Order event callback panicked");
            }
        }

        let async_callbacks: Vec<AsyncEventCallback> = match self.async_callbacks.read() {
            Ok(callbacks) => callbacks.iter().cloned().collect(),
            Err(_) => return,
        };
        if async_callbacks.is_empty() {
            return;
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(
                    callbacks = async_callbacks.len(),
                    "No tokio runtime available, async order callbacks skipped"
                );
                return;
            }
        };

        for (index, callback) in async_callbacks.into_iter().enumerate() {
            let event = event.clone();
            handle.spawn(async move {
                if let Err(e) = callback(event).await {
                    tracing::warn!(callback_index = index, error = %e, "Order event callback failed");
                }
            });
        }
    }

    /// Clear all callbacks
    pub fn clear_callbacks(&self) {
        if let Ok(mut callbacks) = self.callbacks.write() {
            callbacks.clear();
        }
        if let Ok(mut callbacks) = self.async_callbacks.write() {
            callbacks.clear();
        }
    }

    /// Get number of registered callbacks
    pub fn callback_count(&self) -> usize {
        let sync = self.callbacks.read().map(|c| c.len()).unwrap_or(0);
        let async_ = self.async_callbacks.read().map(|c| c.len()).unwrap_or(0);
        sync + async_
    }

    pub fn stats(&self) -> SignalStats {
        SignalStats {
            orders_created: self.orders_created.load(Ordering::Relaxed),
            orders_failed: self.orders_failed.load(Ordering::Relaxed),
            revenue_cents: self.revenue_cents.load(Ordering::Relaxed),
        }
    }
}

impl Default for SignalManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::Mutex;
    use std::time::Duration;
    use uuid::Uuid;

    #[test]
    fn test_stats_count_created_and_failed() {
        let manager = SignalManager::new();
        let customer = Uuid::new_v4();

        manager.emit(OrderEvent::created(Uuid::new_v4(), customer, 1_500, 1));
        manager.emit(OrderEvent::created(Uuid::new_v4(), customer, 2_500, 2));
        manager.emit(OrderEvent::failed(customer, 1, "product_not_found"));

        assert_eq!(
            manager.stats(),
            SignalStats {
                orders_created: 2,
                orders_failed: 1,
                revenue_cents: 4_000,
            }
        );
    }

    #[test]
    fn test_sync_callbacks_see_every_event() {
        let manager = SignalManager::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        manager.add_callback(move |event| {
            sink.lock().unwrap().push(event.event_type);
        });

        manager.emit(OrderEvent::failed(Uuid::new_v4(), 1, "customer_not_found"));
        manager.emit(OrderEvent::created(Uuid::new_v4(), Uuid::new_v4(), 10, 1));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![OrderEventType::Failed, OrderEventType::Created]
        );
        assert_eq!(manager.callback_count(), 1);

        manager.clear_callbacks();
        assert_eq!(manager.callback_count(), 0);
    }

    #[test]
    fn test_panicking_callback_is_contained() {
        let manager = SignalManager::new();
        let seen = Arc::new(Mutex::new(0));
        let sink = seen.clone();
        manager.add_callback(|_event| panic!("subscriber bug"));
        manager.add_callback(move |_event| {
            *sink.lock().unwrap() += 1;
        });

        manager.emit(OrderEvent::created(Uuid::new_v4(), Uuid::new_v4(), 500, 1));

        assert_eq!(*seen.lock().unwrap(), 1);
        assert_eq!(manager.stats().orders_created, 1);
    }

    #[test]
    fn test_callback_may_clear_callbacks() {
        let manager = Arc::new(SignalManager::new());
        let inner = manager.clone();
        manager.add_callback(move |_event| inner.clear_callbacks());

        manager.emit(OrderEvent::failed(Uuid::new_v4(), 1, "order_not_found"));

        assert_eq!(manager.callback_count(), 0);
    }

    #[tokio::test]
    async fn test_async_callback_failure_does_not_propagate() {
        let manager = SignalManager::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        manager.add_async_callback(|_event| async { Err::<(), _>(anyhow::anyhow!("subscriber down")) }.boxed());
        manager.add_async_callback(move |event| {
            let tx = tx.clone();
            async move {
                tx.send(event.total_cents)?;
                Ok::<(), anyhow::Error>(())
            }
            .boxed()
        });

        manager.emit(OrderEvent::created(Uuid::new_v4(), Uuid::new_v4(), 42, 1));

        let received = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(received, Some(42));
        assert_eq!(manager.stats().orders_created, 1);
    }

    #[test]
    fn test_async_callbacks_without_runtime_are_skipped() {
        let manager = SignalManager::new();
        manager.add_async_callback(|_event| async { Ok::<(), anyhow::Error>(()) }.boxed());

        manager.emit(OrderEvent::failed(Uuid::new_v4(), 1, "deadline_exceeded"));

        assert_eq!(manager.stats().orders_failed, 1);
    }
}
