//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::model::{ClassificationResult, HistoryRecord, ImageUpload, StoredImage};

/// Error type for the image classification backend
#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    #[error("Classification service unavailable: {0}")]
    Unavailable(String),
    #[error("Classification service timed out")]
    Timeout,
    #[error("Classification service rejected the image: {0}")]
    Rejected(String),
    #[error("Classification service error: {0}")]
    Backend(String),
}

/// Port for the image classification backend
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Classify one image; a single attempt, no retry
    async fn classify(&self, image: &ImageUpload) -> Result<ClassificationResult, ClassifierError>;
}

/// Error type for text generation backends
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Generation backend unavailable: {0}")]
    Unavailable(String),
    #[error("Generation timed out")]
    Timeout,
    #[error("Rate limited")]
    RateLimited,
    #[error("Generation API error: {0}")]
    Api(String),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

/// A prompt ready to send to a generation backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// System instruction
    pub system: String,
    /// User prompt
    pub prompt: String,
}

/// Port for LLM-based text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate raw text for the request
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Short provider name for logs and health output
    fn name(&self) -> &'static str;
}

/// Error type for history store operations
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Not found: {0}")]
    NotFound(Uuid),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for persisting prediction history
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist a record and return it as stored
    async fn save(&self, record: &HistoryRecord) -> Result<HistoryRecord, HistoryError>;

    /// List records newest first
    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<HistoryRecord>, HistoryError>;

    /// Delete a record, returning what was removed
    async fn delete(&self, id: Uuid) -> Result<HistoryRecord, HistoryError>;

    /// Whether records outlive the process
    fn is_durable(&self) -> bool;
}

/// Error type for image storage
#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port for keeping uploaded image bytes
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, image: &ImageUpload) -> Result<StoredImage, ImageStoreError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
