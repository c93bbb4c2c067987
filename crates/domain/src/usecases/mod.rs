//! Application use cases

pub mod history;
pub mod predict;
pub mod recommend;

pub use history::{HistoryUseCase, Page};
pub use predict::{PipelineStage, PredictConfig, PredictError, PredictUseCase};
pub use recommend::{RecommendConfig, RecommendUseCase};
