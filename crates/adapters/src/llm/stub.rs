//! Stub generator for testing and offline mode

use async_trait::async_trait;
use veggie_lens_domain::{GenerationError, GenerationRequest, TextGenerator};

/// Stub generator that returns a configured reply or error
pub struct StubGenerator {
    reply: Result<String, GenerationError>,
}

impl StubGenerator {
    /// A stub that is never reachable, so every recommendation comes from the catalog
    pub fn offline() -> Self {
        Self::with_error(GenerationError::Unavailable(
            "stub generator is offline".to_string(),
        ))
    }

    /// A stub that returns fixed raw text
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
        }
    }

    /// A stub that always returns an error
    pub fn with_error(error: GenerationError) -> Self {
        Self { reply: Err(error) }
    }
}

impl Default for StubGenerator {
    fn default() -> Self {
        Self::offline()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        self.reply.clone()
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
