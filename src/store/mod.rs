//! Record store adapter: the narrow interface the debt logic needs from a data store,
//! plus the PostgreSQL and fixture-backed implementations.

pub mod memory;
pub mod postgres;
pub mod query;
pub mod record;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use query::{Condition, FilterOp, Order, Query, Range, SortDirection, Update};
pub use record::Record;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Query error: {0}")]
    Query(#[from] crate::filter::FilterError),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("Unexpected row shape: {0}")]
    RowShape(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Filtered select, exact count, range-limited select and conditional bulk update over
/// named tables. Implementations must be shareable across request handlers.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Rows matching every condition, ordered and windowed as the query asks.
    async fn select(&self, query: &Query) -> Result<Vec<Record>, StoreError>;

    /// Exact number of rows matching the query's conditions; order and range are ignored.
    async fn count(&self, query: &Query) -> Result<i64, StoreError>;

    /// Patches matching rows in one statement and returns the `returning` columns of each.
    async fn update(&self, update: &Update) -> Result<Vec<Record>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Short label for health output, e.g. `postgres`.
    fn kind(&self) -> &'static str;
}
