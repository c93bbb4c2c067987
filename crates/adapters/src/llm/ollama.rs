//! Ollama local generation backend

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use veggie_lens_domain::{GenerationError, GenerationRequest, TextGenerator};

use super::{LlmConfig, http_client, send_error, trim_base_url};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Generator backed by a local Ollama runtime
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    config: LlmConfig,
}

impl OllamaGenerator {
    pub fn new(config: LlmConfig) -> Result<Self, reqwest::Error> {
        Self::with_base_url(DEFAULT_BASE_URL, config)
    }

    pub fn with_base_url(base_url: &str, config: LlmConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            base_url: trim_base_url(base_url),
            config,
        })
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f64,
    num_predict: i32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = OllamaRequest {
            model: &self.config.model,
            prompt: &request.prompt,
            system: &request.system,
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: i32::try_from(self.config.max_output_tokens).unwrap_or(i32::MAX),
            },
        };

        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let api_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidFormat(e.to_string()))?;

        if api_response.response.trim().is_empty() {
            return Err(GenerationError::InvalidFormat("Empty response".to_string()));
        }

        Ok(api_response.response)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
