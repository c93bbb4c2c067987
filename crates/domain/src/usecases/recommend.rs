//! Recommendation use case - one bounded generation attempt with catalog fallback

use std::sync::Arc;
use std::time::Duration;

use crate::{
    catalog::{self, Subject},
    model::{Locale, Recommendation, UNKNOWN_SUBJECT},
    parser::ResponseParser,
    ports::TextGenerator,
    prompt::PromptBuilder,
};

/// Configuration for the recommend use case
#[derive(Debug, Clone)]
pub struct RecommendConfig {
    /// Language of prompts and fallback text
    pub locale: Locale,
    /// Deadline for a single generation call
    pub timeout: Duration,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            locale: Locale::Indonesian,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Produces a recommendation for a classified subject
///
/// Never fails: every generation or parsing problem resolves to the catalog
/// entry for the subject, or to the degraded fallback.
pub struct RecommendUseCase<G: ?Sized> {
    generator: Arc<G>,
    prompt_builder: PromptBuilder,
    parser: ResponseParser,
    config: RecommendConfig,
}

impl<G: TextGenerator + ?Sized> RecommendUseCase<G> {
    pub fn new(generator: Arc<G>, config: RecommendConfig) -> Self {
        Self {
            generator,
            prompt_builder: PromptBuilder::new(config.locale),
            parser: ResponseParser::new(),
            config,
        }
    }

    /// Name of the generation backend in use
    pub fn provider(&self) -> &'static str {
        self.generator.name()
    }

    pub fn locale(&self) -> Locale {
        self.config.locale
    }

    /// Recommendation for a canonical label
    pub async fn recommend(&self, label: &str) -> Recommendation {
        if label == UNKNOWN_SUBJECT {
            return catalog::degraded_fallback(self.config.locale);
        }

        let subject = Subject::resolve(label, self.config.locale);
        let request = self.prompt_builder.build(&subject);

        tracing::debug!(
            label = %label,
            display_name = %subject.display_name,
            provider = self.generator.name(),
            "Requesting recommendation"
        );

        let generated =
            tokio::time::timeout(self.config.timeout, self.generator.generate(&request)).await;

        let raw = match generated {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::warn!(
                    label = %label,
                    provider = self.generator.name(),
                    error = %e,
                    "Generation failed, using catalog"
                );
                return self.fallback(label);
            }
            Err(_) => {
                tracing::warn!(
                    label = %label,
                    provider = self.generator.name(),
                    timeout_secs = self.config.timeout.as_secs(),
                    "Generation deadline exceeded, using catalog"
                );
                return self.fallback(label);
            }
        };

        match self.parser.parse(&raw, &subject) {
            Ok(recommendation) => {
                tracing::info!(
                    label = %label,
                    recipes = recommendation.recipes.len(),
                    "Generated recommendation accepted"
                );
                recommendation
            }
            Err(failure) => {
                tracing::warn!(
                    label = %label,
                    error = %failure,
                    "Generated recommendation rejected, using catalog"
                );
                self.fallback(label)
            }
        }
    }

    fn fallback(&self, label: &str) -> Recommendation {
        catalog::fallback_for(label, self.config.locale)
    }
}
