//! Text generation backends

pub mod ollama;
pub mod openai_compat;
pub mod stub;

pub use ollama::OllamaGenerator;
pub use openai_compat::OpenAiCompatGenerator;
pub use stub::StubGenerator;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use veggie_lens_domain::GenerationError;

/// Common generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// Temperature (0.0-1.0)
    pub temperature: f64,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.4,
            max_output_tokens: 800,
            timeout_secs: 30,
        }
    }
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Map a transport error from `send()`
pub(crate) fn send_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else if e.is_connect() {
        GenerationError::Unavailable(e.to_string())
    } else {
        GenerationError::Api(e.to_string())
    }
}

pub(crate) fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
