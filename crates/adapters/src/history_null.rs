//! Ephemeral history store used when no database is configured

use async_trait::async_trait;
use uuid::Uuid;
use veggie_lens_domain::{HistoryError, HistoryRecord, HistoryStore};

/// Keeps nothing: saves echo the record, listings are empty
#[derive(Debug, Clone, Copy, Default)]
pub struct EphemeralHistoryStore;

impl EphemeralHistoryStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HistoryStore for EphemeralHistoryStore {
    async fn save(&self, record: &HistoryRecord) -> Result<HistoryRecord, HistoryError> {
        Ok(record.clone())
    }

    async fn list(&self, _limit: u32, _offset: u32) -> Result<Vec<HistoryRecord>, HistoryError> {
        Ok(Vec::new())
    }

    async fn delete(&self, id: Uuid) -> Result<HistoryRecord, HistoryError> {
        Err(HistoryError::NotFound(id))
    }

    fn is_durable(&self) -> bool {
        false
    }
}
