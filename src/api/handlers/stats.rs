//! Statistics ingestion handler

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::info;

use crate::api::server::AppState;
use crate::database::is_valid_identifier;
use crate::error::ScrapeGateError;
use crate::models::StatData;

/// Insert a batch of statistics rows into the named table
pub async fn create_stats(
    State(state): State<AppState>,
    Json(payload): Json<StatData>,
) -> Result<impl IntoResponse, ScrapeGateError> {
    if !is_valid_identifier(&payload.table) {
        return Err(ScrapeGateError::InvalidRequest(format!(
            "Invalid table name: {}",
            payload.table
        )));
    }

    let batch = payload.to_batch();
    state.column_store.insert(&payload.table, &batch).await?;

    info!(table = %payload.table, rows = batch.rows.len(), "Stored statistics");

    Ok((StatusCode::OK, Json(json!({ "status": "success" }))))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    fn item(word_id: i64) -> serde_json::Value {
        json!({
            "language": 1,
            "translationLanguage": 2,
            "wordId": word_id,
            "externalId": 4,
            "interval": 5,
            "repetitions": 6,
            "lastRes": 7,
            "timestampAdded": 8,
            "timestampUpdated": 9,
            "nextStartTS": 10,
            "type": 0
        })
    }

    async fn harness(store: MockColumnStore) -> Harness {
        Harness::with_store(
            test_config().await,
            RenderBehavior::Page(sample_page()),
            TranscriptBehavior::Found,
            store,
        )
    }

    #[tokio::test]
    async fn test_create_stats_inserts_sorted_columns() {
        let harness = harness(MockColumnStore::default()).await;

        let (status, body) = harness
            .call(post_json(
                "/stats",
                json!({"table": "word_stats", "data": [item(3), item(30)]}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "success"}));

        let inserts = harness.store.inserts.lock().unwrap();
        assert_eq!(inserts.len(), 1);
        let (table, batch) = &inserts[0];
        assert_eq!(table, "word_stats");
        assert_eq!(batch.columns.first().map(String::as_str), Some("externalId"));
        assert_eq!(batch.columns.last().map(String::as_str), Some("wordId"));
        assert_eq!(batch.rows[1].last(), Some(&json!(30)));
    }

    #[tokio::test]
    async fn test_create_stats_rejects_bad_table() {
        let harness = harness(MockColumnStore::default()).await;

        let (status, _) = harness
            .call(post_json(
                "/stats",
                json!({"table": "x; DROP TABLE y", "data": [item(1)]}),
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(harness.store.inserts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_stats_store_failure() {
        let harness = harness(MockColumnStore {
            fail: true,
            ..Default::default()
        })
        .await;

        let (status, body) = harness
            .call(post_json("/stats", json!({"table": "word_stats", "data": [item(1)]})))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_create_stats_rejects_missing_fields() {
        let harness = harness(MockColumnStore::default()).await;

        let (status, _) = harness
            .call(post_json(
                "/stats",
                json!({"table": "word_stats", "data": [{"language": 1}]}),
            ))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
