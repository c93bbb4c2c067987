//! History browsing and deletion

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    model::HistoryRecord,
    ports::{HistoryError, HistoryStore},
};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;

/// Pagination window, normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    /// Apply defaults and clamp the limit into `1..=MAX_PAGE_SIZE`
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

pub struct HistoryUseCase<H: HistoryStore + ?Sized> {
    store: Arc<H>,
}

impl<H: HistoryStore + ?Sized> HistoryUseCase<H> {
    pub fn new(store: Arc<H>) -> Self {
        Self { store }
    }

    pub fn is_durable(&self) -> bool {
        self.store.is_durable()
    }

    /// Records newest first
    pub async fn list(&self, page: Page) -> Result<Vec<HistoryRecord>, HistoryError> {
        let records = self.store.list(page.limit, page.offset).await?;
        tracing::debug!(
            limit = page.limit,
            offset = page.offset,
            returned = records.len(),
            "Listed history"
        );
        Ok(records)
    }

    pub async fn delete(&self, id: Uuid) -> Result<HistoryRecord, HistoryError> {
        let removed = self.store.delete(id).await?;
        tracing::info!(record_id = %id, "Deleted history record");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        assert_eq!(Page::default(), Page { limit: 50, offset: 0 });
    }

    #[test]
    fn test_page_clamps_limit() {
        assert_eq!(Page::new(Some(0), None).limit, 1);
        assert_eq!(Page::new(Some(10_000), Some(7)), Page { limit: 200, offset: 7 });
        assert_eq!(Page::new(Some(25), None).limit, 25);
    }
}
