//! HTTP client for the image classification service

use async_trait::async_trait;
use reqwest::{Client, StatusCode, multipart};
use serde::Deserialize;
use std::time::Duration;
use veggie_lens_domain::{
    ClassificationResult, ClassifierError, ImageClassifier, ImageUpload,
    policy::normalize_content_type,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Classifier that posts the image to `{base_url}/predict`
pub struct HttpImageClassifier {
    client: Client,
    base_url: String,
}

impl HttpImageClassifier {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Error body returned by the service, e.g. `{"detail": "Model not available"}`
#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

fn error_detail(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.detail)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl ImageClassifier for HttpImageClassifier {
    async fn classify(&self, image: &ImageUpload) -> Result<ClassificationResult, ClassifierError> {
        let part = multipart::Part::bytes(image.bytes.clone())
            .file_name(image.filename.clone())
            .mime_str(&normalize_content_type(&image.content_type))
            .map_err(|e| ClassifierError::Rejected(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let url = format!("{}/predict", self.base_url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Timeout
                } else if e.is_connect() {
                    ClassifierError::Unavailable(e.to_string())
                } else {
                    ClassifierError::Backend(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(&body);
            return Err(match status {
                StatusCode::SERVICE_UNAVAILABLE => ClassifierError::Unavailable(detail),
                s if s.is_client_error() => ClassifierError::Rejected(detail),
                s => ClassifierError::Backend(format!("Service returned {}: {}", s, detail)),
            });
        }

        let result: ClassificationResult = response
            .json()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Timeout
                } else {
                    ClassifierError::Backend(format!("Malformed response: {}", e))
                }
            })?;

        tracing::debug!(
            label = %result.label,
            confidence = result.confidence,
            "Classification service responded"
        );

        Ok(result)
    }
}
