use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use super::{is_valid_identifier, ColumnStore};
use crate::config::Config;
use crate::error::{Result, ScrapeGateError};
use crate::models::ColumnBatch;

/// ClickHouse client over the HTTP interface
#[derive(Clone)]
pub struct ClickHouseClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    database: String,
}

impl ClickHouseClient {
    /// Create a client for the configured server
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .no_proxy()
            .build()?;

        info!(
            host = %config.clickhouse.host,
            port = %config.clickhouse.port,
            database = %config.clickhouse.database,
            "Configured ClickHouse client"
        );

        Ok(Self {
            http,
            base_url: config.clickhouse_url(),
            username: config.clickhouse.username.clone(),
            password: config.clickhouse.password.clone(),
            database: config.clickhouse.database.clone(),
        })
    }

    /// Check that the server answers `SELECT 1`
    pub async fn health_check(&self) -> Result<()> {
        self.execute("SELECT 1", String::new()).await
    }

    async fn execute(&self, query: &str, body: String) -> Result<()> {
        let response = self
            .http
            .post(&self.base_url)
            .query(&[("query", query)])
            .header("X-ClickHouse-User", &self.username)
            .header("X-ClickHouse-Key", &self.password)
            .header("X-ClickHouse-Database", &self.database)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ScrapeGateError::ColumnStore(format!(
                "{}: {}",
                status,
                detail.trim()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl ColumnStore for ClickHouseClient {
    async fn insert(&self, table: &str, batch: &ColumnBatch) -> Result<()> {
        if batch.rows.is_empty() {
            debug!(table, "Skipping insert of empty batch");
            return Ok(());
        }

        let query = insert_query(table, &batch.columns)?;
        let body = encode_rows(&batch.rows)?;

        self.execute(&query, body).await?;

        info!(table, rows = batch.rows.len(), "Inserted rows");
        Ok(())
    }
}

fn insert_query(table: &str, columns: &[String]) -> Result<String> {
    if !is_valid_identifier(table) {
        return Err(ScrapeGateError::InvalidRequest(format!(
            "Invalid table name: {}",
            table
        )));
    }
    if let Some(bad) = columns.iter().find(|c| !is_valid_identifier(c)) {
        return Err(ScrapeGateError::InvalidRequest(format!(
            "Invalid column name: {}",
            bad
        )));
    }

    let columns = columns
        .iter()
        .map(|c| format!("`{}`", c))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "INSERT INTO {} ({}) FORMAT JSONCompactEachRow",
        table, columns
    ))
}

/// One JSON array per line
fn encode_rows(rows: &[Vec<serde_json::Value>]) -> Result<String> {
    let mut body = String::new();
    for row in rows {
        let line = serde_json::to_string(row)
            .map_err(|e| ScrapeGateError::Internal(format!("Failed to encode row: {}", e)))?;
        body.push_str(&line);
        body.push('\n');
    }
    Ok(body)
}
