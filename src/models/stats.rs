use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One spaced-repetition statistics row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatItem {
    pub language: i64,
    pub translation_language: i64,
    pub word_id: i64,
    pub external_id: i64,
    pub interval: i64,
    pub repetitions: i64,
    pub last_res: i64,
    pub timestamp_added: i64,
    pub timestamp_updated: i64,
    #[serde(rename = "nextStartTS")]
    pub next_start_ts: i64,
    #[serde(rename = "type")]
    pub kind: i64,
}

/// Body of `POST /stats`
#[derive(Debug, Clone, Deserialize)]
pub struct StatData {
    pub table: String,
    pub data: Vec<StatItem>,
}

/// Column names and row-major values ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBatch {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl StatData {
    pub fn to_batch(&self) -> ColumnBatch {
        let rows: Vec<Map<String, Value>> = self
            .data
            .iter()
            .filter_map(|item| match serde_json::to_value(item) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            })
            .collect();

        ColumnBatch::from_objects(&rows)
    }
}

impl ColumnBatch {
    /// Sorted union of keys; missing keys become `null`
    pub fn from_objects(objects: &[Map<String, Value>]) -> Self {
        let columns: Vec<String> = objects
            .iter()
            .flat_map(|row| row.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = objects
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|col| row.get(col).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }
}
