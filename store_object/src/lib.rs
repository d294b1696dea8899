//! Store Object - persistence layer for Shopkeep
//!
//! This crate provides the domain rows, the repository and unit-of-work
//! traits, and two engines implementing them: PostgreSQL via sqlx and an
//! in-process engine used by tests and local tooling.

pub mod errors;
pub mod memory;
pub mod models;
pub mod pg_store;
pub mod prelude;
pub mod traits;

pub use errors::StoreError;
pub use memory::{FailurePoint, MemoryBackend, MemoryDatabase};
pub use models::*;
pub use pg_store::PgBackend;
pub use traits::*;

use sqlx::PgPool;

pub type DbPool = PgPool;
