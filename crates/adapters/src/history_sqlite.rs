//! SQLite history store

use async_trait::async_trait;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;
use veggie_lens_domain::{HistoryError, HistoryRecord, HistoryStore};

/// SQLite-backed history store
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

type HistoryRow = (String, String, String, String, Option<String>, String);

impl SqliteHistoryStore {
    /// Open (creating if needed) the database at `url`
    ///
    /// Accepts either a `sqlite:` URL or a plain file path.
    pub async fn new(url: &str) -> Result<Self, HistoryError> {
        let db_url = if url.starts_with("sqlite:") {
            url.to_string()
        } else {
            let path = Path::new(url);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    HistoryError::Database(format!("Failed to create directory: {}", e))
                })?;
            }
            format!("sqlite:{}?mode=rwc", path.display())
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub async fn in_memory() -> Result<Self, HistoryError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), HistoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS history (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                image_filename TEXT NOT NULL,
                image_path TEXT NOT NULL,
                classification TEXT NOT NULL,
                recommendation TEXT,
                created_at TEXT NOT NULL,
                created_at_ns INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| HistoryError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_history_created
            ON history(created_at_ns DESC, seq DESC)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| HistoryError::Database(e.to_string()))?;

        Ok(())
    }

    /// Quick liveness probe
    pub async fn ping(&self) -> Result<(), HistoryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| HistoryError::Database(e.to_string()))?;
        Ok(())
    }
}

fn decode_row(row: HistoryRow) -> Result<HistoryRecord, HistoryError> {
    let (id, image_filename, image_path, classification, recommendation, created_at) = row;

    let id = Uuid::parse_str(&id).map_err(|e| HistoryError::Serialization(e.to_string()))?;
    let classification = serde_json::from_str(&classification)
        .map_err(|e| HistoryError::Serialization(e.to_string()))?;
    let recommendation = recommendation
        .map(|r| serde_json::from_str(&r))
        .transpose()
        .map_err(|e| HistoryError::Serialization(e.to_string()))?;
    let created_at = OffsetDateTime::parse(&created_at, &Rfc3339)
        .map_err(|e| HistoryError::Serialization(e.to_string()))?;

    Ok(HistoryRecord {
        id,
        image_filename,
        image_path,
        classification,
        recommendation,
        created_at,
    })
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn save(&self, record: &HistoryRecord) -> Result<HistoryRecord, HistoryError> {
        let classification = serde_json::to_string(&record.classification)
            .map_err(|e| HistoryError::Serialization(e.to_string()))?;
        let recommendation = record
            .recommendation
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| HistoryError::Serialization(e.to_string()))?;
        let created_at = record
            .created_at
            .format(&Rfc3339)
            .map_err(|e| HistoryError::Serialization(e.to_string()))?;
        let created_at_ns =
            i64::try_from(record.created_at.unix_timestamp_nanos()).unwrap_or(i64::MAX);

        sqlx::query(
            r#"
            INSERT INTO history
            (id, image_filename, image_path, classification, recommendation, created_at, created_at_ns)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.image_filename)
        .bind(&record.image_path)
        .bind(&classification)
        .bind(&recommendation)
        .bind(&created_at)
        .bind(created_at_ns)
        .execute(&self.pool)
        .await
        .map_err(|e| HistoryError::Database(e.to_string()))?;

        tracing::debug!(record_id = %record.id, "Saved history record");

        Ok(record.clone())
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<HistoryRecord>, HistoryError> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            r#"
            SELECT id, image_filename, image_path, classification, recommendation, created_at
            FROM history
            ORDER BY created_at_ns DESC, seq DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HistoryError::Database(e.to_string()))?;

        rows.into_iter().map(decode_row).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<HistoryRecord, HistoryError> {
        let row: Option<HistoryRow> = sqlx::query_as(
            r#"
            DELETE FROM history WHERE id = ?
            RETURNING id, image_filename, image_path, classification, recommendation, created_at
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| HistoryError::Database(e.to_string()))?;

        match row {
            Some(row) => decode_row(row),
            None => Err(HistoryError::NotFound(id)),
        }
    }

    fn is_durable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;
    use time::macros::datetime;
    use veggie_lens_domain::catalog;
    use veggie_lens_domain::{ClassificationResult, Locale, Prediction};

    fn record(label: &str, created_at: OffsetDateTime) -> HistoryRecord {
        HistoryRecord {
            id: Uuid::new_v4(),
            image_filename: format!("{}.jpg", Uuid::new_v4()),
            image_path: "uploads/x.jpg".to_string(),
            classification: ClassificationResult::new(
                label,
                0.9,
                [
                    Prediction::new(label, 0.9),
                    Prediction::new("Tomato", 0.06),
                    Prediction::new("Potato", 0.04),
                ],
            ),
            recommendation: Some(catalog::fallback_for(label, Locale::Indonesian)),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_save_and_list_round_trip() {
        let store = SqliteHistoryStore::in_memory().await.unwrap();
        let saved = store
            .save(&record("Carrot", datetime!(2024-05-01 10:00 UTC)))
            .await
            .unwrap();

        let listed = store.list(50, 0).await.unwrap();
        assert_eq!(listed, vec![saved]);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_paging() {
        let store = SqliteHistoryStore::in_memory().await.unwrap();
        let base = datetime!(2024-05-01 10:00 UTC);

        let older = store.save(&record("Carrot", base)).await.unwrap();
        let newer = store
            .save(&record("Tomato", base + Duration::milliseconds(500)))
            .await
            .unwrap();
        let newest = store
            .save(&record("Potato", base + Duration::seconds(1)))
            .await
            .unwrap();

        let all = store.list(50, 0).await.unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![newest.id, newer.id, older.id]);

        let page = store.list(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, newer.id);
    }

    #[tokio::test]
    async fn test_same_timestamp_uses_insertion_order() {
        let store = SqliteHistoryStore::in_memory().await.unwrap();
        let at = datetime!(2024-05-01 10:00 UTC);

        let first = store.save(&record("Carrot", at)).await.unwrap();
        let second = store.save(&record("Carrot", at)).await.unwrap();

        let listed = store.list(10, 0).await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_delete_returns_record_then_not_found() {
        let store = SqliteHistoryStore::in_memory().await.unwrap();
        let saved = store
            .save(&record("Broccoli", datetime!(2024-05-01 10:00 UTC)))
            .await
            .unwrap();

        let deleted = store.delete(saved.id).await.unwrap();
        assert_eq!(deleted.id, saved.id);
        assert!(store.list(10, 0).await.unwrap().is_empty());

        let again = store.delete(saved.id).await;
        assert!(matches!(again, Err(HistoryError::NotFound(id)) if id == saved.id));
    }

    #[tokio::test]
    async fn test_record_without_recommendation() {
        let store = SqliteHistoryStore::in_memory().await.unwrap();
        let mut r = record("Cabbage", datetime!(2024-05-01 10:00 UTC));
        r.recommendation = None;
        store.save(&r).await.unwrap();

        let listed = store.list(10, 0).await.unwrap();
        assert!(listed[0].recommendation.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = SqliteHistoryStore::in_memory().await.unwrap();
        let r = record("Carrot", datetime!(2024-05-01 10:00 UTC));
        store.save(&r).await.unwrap();

        assert!(matches!(
            store.save(&r).await,
            Err(HistoryError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("history.db");
        let path = path.to_str().unwrap();

        let saved = {
            let store = SqliteHistoryStore::new(path).await.unwrap();
            store
                .save(&record("Pumpkin", datetime!(2024-05-01 10:00 UTC)))
                .await
                .unwrap()
        };

        let reopened = SqliteHistoryStore::new(path).await.unwrap();
        reopened.ping().await.unwrap();
        let listed = reopened.list(10, 0).await.unwrap();
        assert_eq!(listed[0].id, saved.id);
    }
}
