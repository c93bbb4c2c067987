//! veggie-lens adapters crate
//!
//! Infrastructure adapters implementing the domain ports:
//! - `classifier`: HTTP classification service client and stub
//! - `llm`: hosted (OpenAI-compatible) and local (Ollama) generation backends
//! - `history`: SQLite and ephemeral history stores
//! - `images`: filesystem image store

pub mod classifier;
mod history_null;
mod history_sqlite;
mod image_fs;
pub mod llm;

/// Re-exports for history adapters
pub mod history {
    pub use crate::history_null::EphemeralHistoryStore;
    pub use crate::history_sqlite::SqliteHistoryStore;
}

/// Re-exports for image storage adapters
pub mod images {
    pub use crate::image_fs::FsImageStore;
}
