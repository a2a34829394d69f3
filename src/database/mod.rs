//! Analytical column store access

pub mod clickhouse;

pub use clickhouse::ClickHouseClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ColumnBatch;

/// Sink for row-major inserts into a named table
#[async_trait]
pub trait ColumnStore: Send + Sync {
    /// Insert every row of `batch` into `table`
    async fn insert(&self, table: &str, batch: &ColumnBatch) -> Result<()>;
}

/// Accept plain or database-qualified identifiers only
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.ends_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
