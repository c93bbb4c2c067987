//! Stub classifier for offline runs and tests

use async_trait::async_trait;
use veggie_lens_domain::{
    ClassificationResult, ClassifierError, ImageClassifier, ImageUpload, Prediction,
};

/// Returns a fixed classification or a fixed error
pub struct StubImageClassifier {
    result: Result<ClassificationResult, ClassifierError>,
}

impl StubImageClassifier {
    pub fn with_result(result: ClassificationResult) -> Self {
        Self { result: Ok(result) }
    }

    pub fn with_error(error: ClassifierError) -> Self {
        Self { result: Err(error) }
    }

    /// A confident single-label result
    pub fn labeled(label: &str, confidence: f64) -> Self {
        let rest = (1.0 - confidence).max(0.0) / 2.0;
        Self::with_result(ClassificationResult::new(
            label,
            confidence,
            [
                Prediction::new(label, confidence),
                Prediction::new("Tomato", rest),
                Prediction::new("Potato", rest),
            ],
        ))
    }
}

impl Default for StubImageClassifier {
    fn default() -> Self {
        Self::labeled("Carrot", 0.92)
    }
}

#[async_trait]
impl ImageClassifier for StubImageClassifier {
    async fn classify(&self, image: &ImageUpload) -> Result<ClassificationResult, ClassifierError> {
        tracing::debug!(filename = %image.filename, "Stub classification");
        self.result.clone()
    }
}
