//! Order creation workflow
//!
//! One request runs inside one transaction: the customer is verified, each
//! line's product is read, its price snapshotted and its stock decremented,
//! then the order row and its item rows are written. Either every write
//! commits or the transaction is rolled back and the first error is returned.

use super::error::OrderError;
use super::request::{CreateOrderRequest, OrderLine};
use config::WorkflowConfig;
use signal_system::{OrderEvent, SignalManager};
use std::sync::Arc;
use std::time::{Duration, Instant};
use store_object::{
    CustomerRepository, NewOrder, NewOrderItem, Order, OrderItemRepository, OrderRepository,
    OrderStatus, Product, ProductRepository, Repositories, StoreBackend, StoreError,
    TransactionHandle, TransactionManager,
};
use tracing::{error, info, warn};
use uuid::Uuid;

/// A line after its product was read: price snapshot and subtotal
#[derive(Debug, Clone, Copy)]
struct PricedLine {
    product_id: Uuid,
    quantity: i32,
    price_cents: i64,
    sub_total_cents: i64,
}

/// Outcome of an aborted unit of work: the error returned to the caller and
/// the rollback failure, if any, kept only as a diagnostic
#[derive(Debug)]
pub(super) struct Aborted {
    pub(super) error: OrderError,
    pub(super) rollback_error: Option<StoreError>,
}

impl From<OrderError> for Aborted {
    fn from(error: OrderError) -> Self {
        Self {
            error,
            rollback_error: None,
        }
    }
}

/// Runs order workflows against one storage engine
pub struct OrderService<B: StoreBackend> {
    pub(super) manager: B::Manager,
    pub(super) repositories: Repositories<B>,
    pub(super) config: WorkflowConfig,
    pub(super) signals: Option<Arc<SignalManager>>,
}

impl<B: StoreBackend> std::fmt::Debug for OrderService<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService")
            .field("manager", &self.manager)
            .field("config", &self.config)
            .field("signals", &self.signals.is_some())
            .finish()
    }
}

impl<B: StoreBackend> OrderService<B> {
    pub fn new(manager: B::Manager, repositories: Repositories<B>, config: WorkflowConfig) -> Self {
        Self {
            manager,
            repositories,
            config,
            signals: None,
        }
    }

    /// Report every final outcome to `signals`
    pub fn with_signals(mut self, signals: Arc<SignalManager>) -> Self {
        self.signals = Some(signals);
        self
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Pool-backed repositories, for reads outside any unit of work
    pub fn repositories(&self) -> &Repositories<B> {
        &self.repositories
    }

    /// Create an order and its items, decrementing stock, all or nothing
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, OrderError> {
        let started = Instant::now();
        let customer_id = request.customer_id;
        let item_count = request.items.len();
        info!(%customer_id, item_count, "creating order");

        let outcome = match request.validate() {
            Ok(()) => self.run_create(&request).await,
            Err(error) => Err(Aborted::from(error)),
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(order) => {
                info!(
                    order_id = %order.id,
                    %customer_id,
                    total_cents = order.total_cents,
                    item_count,
                    duration_ms,
                    "order created"
                );
                self.emit(OrderEvent::created(
                    order.id,
                    customer_id,
                    order.total_cents,
                    item_count,
                ));
                Ok(order)
            }
            Err(Aborted {
                error,
                rollback_error,
            }) => {
                let kind = error.kind();
                if error.is_business_rule() {
                    warn!(%customer_id, kind = kind.as_str(), duration_ms, error = %error, "order rejected");
                } else {
                    error!(%customer_id, kind = kind.as_str(), duration_ms, error = %error, "order failed");
                }

                let mut event = OrderEvent::failed(customer_id, item_count, kind.as_str());
                if let Some(rollback_error) = &rollback_error {
                    event = event.with_rollback_error(rollback_error.to_string());
                }
                self.emit(event);
                Err(error)
            }
        }
    }

    fn emit(&self, event: OrderEvent) {
        if let Some(signals) = &self.signals {
            signals.emit(event);
        }
    }

    /// Open the transaction, run the steps under the deadline, then commit
    /// or roll back
    async fn run_create(&self, request: &CreateOrderRequest) -> Result<Order, Aborted> {
        let tx = self
            .manager
            .begin()
            .await
            .map_err(|source| OrderError::TransactionBeginFailed { source })?;
        let repos = self.repositories.with_tx(&tx);

        let steps = self.persist_order(&repos, request);
        let outcome = match self.config.timeout_ms {
            Some(timeout_ms) => {
                match tokio::time::timeout(Duration::from_millis(timeout_ms), steps).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(OrderError::DeadlineExceeded { timeout_ms }),
                }
            }
            None => steps.await,
        };

        match outcome {
            Ok(order) => {
                tx.commit()
                    .await
                    .map_err(|source| OrderError::TransactionCommitFailed { source })?;
                Ok(order)
            }
            Err(error) => Err(Aborted {
                error,
                rollback_error: rollback(&tx).await,
            }),
        }
    }

    async fn persist_order(
        &self,
        repos: &Repositories<B>,
        request: &CreateOrderRequest,
    ) -> Result<Order, OrderError> {
        let customer_id = request.customer_id;
        match repos.customers.find_by_id(customer_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(OrderError::CustomerNotFound { customer_id }),
            Err(e) if e.is_not_found() => return Err(OrderError::CustomerNotFound { customer_id }),
            Err(source) => {
                return Err(OrderError::CustomerLookupFailed {
                    customer_id,
                    source,
                })
            }
        }
        crate::debug_log!(%customer_id, "customer verified");

        let mut lines = Vec::with_capacity(request.items.len());
        let mut total_cents: i64 = 0;
        for (item_index, line) in request.items.iter().enumerate() {
            let priced = self.reserve_line(repos, item_index, line).await?;
            total_cents = total_cents.checked_add(priced.sub_total_cents).ok_or_else(|| {
                OrderError::InvalidRequest(format!("order total overflows at item {}", item_index))
            })?;
            lines.push(priced);
        }

        let mut order = repos
            .orders
            .create(NewOrder {
                customer_id,
                total_cents,
                status: OrderStatus::Pending,
            })
            .await
            .map_err(|source| OrderError::OrderPersistenceFailed { source })?;
        crate::debug_log!(order_id = %order.id, total_cents, "order row written");

        for (item_index, line) in lines.iter().enumerate() {
            let item = repos
                .order_items
                .create(NewOrderItem {
                    order_id: order.id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    price_cents: line.price_cents,
                    sub_total_cents: line.sub_total_cents,
                })
                .await
                .map_err(|source| OrderError::OrderItemPersistenceFailed {
                    item_index,
                    product_id: line.product_id,
                    source,
                })?;
            order.items.push(item);
        }

        Ok(order)
    }

    /// Read the product, check stock, snapshot the price and persist the
    /// decremented stock, in that order
    async fn reserve_line(
        &self,
        repos: &Repositories<B>,
        item_index: usize,
        line: &OrderLine,
    ) -> Result<PricedLine, OrderError> {
        let product_id = line.product_id;
        let product = self.read_product(repos, product_id).await?;

        if product.stock < line.quantity {
            warn!(
                %product_id,
                item_index,
                quantity = line.quantity,
                available_stock = product.stock,
                "insufficient stock"
            );
            return Err(OrderError::InsufficientStock {
                product_id,
                requested: line.quantity,
                available: product.stock,
            });
        }

        let price_cents = product.price_cents;
        let sub_total_cents = price_cents
            .checked_mul(i64::from(line.quantity))
            .ok_or_else(|| {
                OrderError::InvalidRequest(format!("subtotal overflows at item {}", item_index))
            })?;

        let updated = product
            .with_stock(product.stock - line.quantity)
            .map_err(|source| OrderError::StockUpdateFailed { product_id, source })?;
        repos
            .products
            .update(&updated)
            .await
            .map_err(|source| OrderError::StockUpdateFailed { product_id, source })?;
        crate::trace_log!(
            %product_id,
            item_index,
            quantity = line.quantity,
            remaining_stock = updated.stock,
            "stock reserved"
        );

        Ok(PricedLine {
            product_id,
            quantity: line.quantity,
            price_cents,
            sub_total_cents,
        })
    }

    async fn read_product(
        &self,
        repos: &Repositories<B>,
        product_id: Uuid,
    ) -> Result<Product, OrderError> {
        let found = if self.config.lock_products {
            repos.products.find_by_id_for_update(product_id).await
        } else {
            repos.products.find_by_id(product_id).await
        };
        match found {
            Ok(Some(product)) => Ok(product),
            Ok(None) => Err(OrderError::ProductNotFound { product_id }),
            Err(e) if e.is_not_found() => Err(OrderError::ProductNotFound { product_id }),
            Err(source) => Err(OrderError::ProductLookupFailed { product_id, source }),
        }
    }
}

/// Roll back, logging a failure instead of returning it
pub(super) async fn rollback<H: TransactionHandle>(tx: &H) -> Option<StoreError> {
    match tx.rollback().await {
        Ok(()) => None,
        Err(e) => {
            error!(error = %e, "rollback failed");
            Some(e)
        }
    }
}
