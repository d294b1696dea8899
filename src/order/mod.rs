//! Order workflows
//!
//! [`OrderService`] owns a transaction manager and the pool-backed
//! repositories of one storage engine. Each operation opens its own
//! transaction and binds the repositories to it.

pub mod error;
pub mod queries;
pub mod request;
pub mod service;

pub use error::{OrderError, OrderErrorKind};
pub use request::{CreateOrderRequest, OrderLine};
pub use service::OrderService;
