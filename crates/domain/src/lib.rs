//! veggie-lens domain crate
//!
//! Core logic of the classification and recommendation pipeline:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Pipeline orchestration, recommendation, history
//! - `catalog`: Static curated recommendations and label translations
//! - `prompt` / `parser`: Generation request and response handling
//! - `policy`: Upload constraints

pub mod catalog;
pub mod model;
pub mod parser;
pub mod policy;
pub mod ports;
pub mod prompt;
pub mod usecases;

pub use model::*;
pub use ports::*;
