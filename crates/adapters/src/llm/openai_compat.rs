//! OpenAI-compatible chat completion backend (hosted provider)

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use veggie_lens_domain::{GenerationError, GenerationRequest, TextGenerator};

use super::{LlmConfig, http_client, send_error, trim_base_url};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Generator for any `/chat/completions` compatible API
pub struct OpenAiCompatGenerator {
    client: Client,
    api_key: SecretString,
    base_url: String,
    config: LlmConfig,
}

impl OpenAiCompatGenerator {
    pub fn new(
        api_key: SecretString,
        base_url: &str,
        config: LlmConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            api_key,
            base_url: trim_base_url(base_url),
            config,
        })
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for OpenAiCompatGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_output_tokens),
        };

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        if response.status() == 429 {
            return Err(GenerationError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidFormat(e.to_string()))?;

        let text = api_response
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(GenerationError::InvalidFormat("Empty response".to_string()));
        }

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "hosted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> GenerationRequest {
        GenerationRequest {
            system: "Jawab hanya dengan JSON.".to_string(),
            prompt: "Rekomendasi untuk Wortel".to_string(),
        }
    }

    fn generator(base_url: &str) -> OpenAiCompatGenerator {
        OpenAiCompatGenerator::new(
            SecretString::new("test-key".into()),
            base_url,
            LlmConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "Jawab hanya dengan JSON."},
                    {"role": "user", "content": "Rekomendasi untuk Wortel"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"recipes\": []}"}}]
            })))
            .mount(&mock_server)
            .await;

        let text = generator(&format!("{}/", mock_server.uri()))
            .generate(&request())
            .await
            .unwrap();

        assert_eq!(text, "{\"recipes\": []}");
    }

    #[tokio::test]
    async fn test_generate_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let result = generator(&mock_server.uri()).generate(&request()).await;

        assert!(matches!(result, Err(GenerationError::RateLimited)));
    }

    #[tokio::test]
    async fn test_generate_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = generator(&mock_server.uri()).generate(&request()).await;

        assert!(matches!(result, Err(GenerationError::Api(msg)) if msg.contains("Internal error")));
    }

    #[tokio::test]
    async fn test_generate_empty_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": null}}]
            })))
            .mount(&mock_server)
            .await;

        let result = generator(&mock_server.uri()).generate(&request()).await;

        assert!(matches!(result, Err(GenerationError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_generate_unreachable() {
        let result = generator("http://127.0.0.1:1").generate(&request()).await;

        assert!(matches!(result, Err(GenerationError::Unavailable(_))));
    }
}
