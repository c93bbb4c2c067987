//! Predict use case - orchestrates validation, classification, recommendation and persistence

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::{
    catalog,
    model::{HistoryRecord, ImageUpload, StoredImage},
    policy::{UploadPolicy, UploadViolation},
    ports::{ClassifierError, Clock, HistoryStore, ImageClassifier, ImageStore, TextGenerator},
    usecases::recommend::RecommendUseCase,
};

/// Configuration for the predict pipeline
#[derive(Debug, Clone)]
pub struct PredictConfig {
    /// Upload constraints
    pub policy: UploadPolicy,
    /// When false, generation is never attempted
    pub recommendations_enabled: bool,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            policy: UploadPolicy::default(),
            recommendations_enabled: true,
        }
    }
}

/// Errors that abort a prediction
///
/// Generation and persistence problems never surface here.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Upload(#[from] UploadViolation),
    #[error(transparent)]
    Classification(#[from] ClassifierError),
}

/// Pipeline stages, used for structured logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Classifying,
    Recommending,
    SkippingRecommendation,
    Persisting,
    Responded,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::Received => "received",
            PipelineStage::Classifying => "classifying",
            PipelineStage::Recommending => "recommending",
            PipelineStage::SkippingRecommendation => "skipping_recommendation",
            PipelineStage::Persisting => "persisting",
            PipelineStage::Responded => "responded",
            PipelineStage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Predict pipeline orchestrator
pub struct PredictUseCase<C, G, H, I, Cl>
where
    C: ImageClassifier + ?Sized,
    G: TextGenerator + ?Sized,
    H: HistoryStore + ?Sized,
    I: ImageStore + ?Sized,
    Cl: Clock + ?Sized,
{
    classifier: Arc<C>,
    recommender: Arc<RecommendUseCase<G>>,
    history: Arc<H>,
    images: Arc<I>,
    clock: Arc<Cl>,
    config: PredictConfig,
}

impl<C, G, H, I, Cl> PredictUseCase<C, G, H, I, Cl>
where
    C: ImageClassifier + ?Sized,
    G: TextGenerator + ?Sized,
    H: HistoryStore + ?Sized,
    I: ImageStore + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(
        classifier: Arc<C>,
        recommender: Arc<RecommendUseCase<G>>,
        history: Arc<H>,
        images: Arc<I>,
        clock: Arc<Cl>,
        config: PredictConfig,
    ) -> Self {
        Self {
            classifier,
            recommender,
            history,
            images,
            clock,
            config,
        }
    }

    pub fn recommender(&self) -> &RecommendUseCase<G> {
        &self.recommender
    }

    pub fn recommendations_enabled(&self) -> bool {
        self.config.recommendations_enabled
    }

    pub fn history_is_durable(&self) -> bool {
        self.history.is_durable()
    }

    /// Run one upload through the pipeline
    ///
    /// Fails only on upload violations or classification errors. A successful
    /// return always carries a recommendation.
    pub async fn predict(&self, upload: ImageUpload) -> Result<HistoryRecord, PredictError> {
        let request_id = Uuid::new_v4();
        tracing::info!(
            request_id = %request_id,
            stage = %PipelineStage::Received,
            filename = %upload.filename,
            content_type = %upload.content_type,
            bytes = upload.bytes.len(),
            "Upload received"
        );

        if let Err(violation) = self.config.policy.validate(&upload) {
            tracing::info!(
                request_id = %request_id,
                stage = %PipelineStage::Failed,
                error = %violation,
                "Upload rejected"
            );
            return Err(violation.into());
        }

        tracing::debug!(request_id = %request_id, stage = %PipelineStage::Classifying);
        let classification = match self.classifier.classify(&upload).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    stage = %PipelineStage::Failed,
                    error = %e,
                    "Classification failed"
                );
                return Err(e.into());
            }
        };

        tracing::info!(
            request_id = %request_id,
            label = %classification.label,
            confidence = classification.confidence,
            "Image classified"
        );

        let locale = self.recommender.locale();
        let recommendation = if self.config.recommendations_enabled && !classification.is_unknown() {
            tracing::debug!(request_id = %request_id, stage = %PipelineStage::Recommending);
            self.recommender.recommend(&classification.label).await
        } else {
            tracing::debug!(
                request_id = %request_id,
                stage = %PipelineStage::SkippingRecommendation,
                unknown = classification.is_unknown()
            );
            catalog::degraded_fallback(locale)
        };

        tracing::debug!(request_id = %request_id, stage = %PipelineStage::Persisting);
        let stored = match self.images.store(&upload).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Failed to store image");
                StoredImage {
                    filename: upload.filename.clone(),
                    path: String::new(),
                }
            }
        };

        let record = HistoryRecord {
            id: Uuid::new_v4(),
            image_filename: stored.filename,
            image_path: stored.path,
            classification,
            recommendation: Some(recommendation),
            created_at: self.clock.now(),
        };

        let record = match self.history.save(&record).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    record_id = %record.id,
                    error = %e,
                    "Failed to persist history record"
                );
                record
            }
        };

        tracing::info!(
            request_id = %request_id,
            stage = %PipelineStage::Responded,
            record_id = %record.id,
            "Prediction complete"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassificationResult, Locale, Nutrition, Prediction, UNKNOWN_SUBJECT};
    use crate::ports::{GenerationError, GenerationRequest, HistoryError, ImageStoreError};
    use crate::usecases::recommend::RecommendConfig;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use time::OffsetDateTime;
    use time::macros::datetime;

    struct FakeClassifier {
        result: Result<ClassificationResult, ClassifierError>,
        calls: AtomicUsize,
    }

    impl FakeClassifier {
        fn returning(label: &str, confidence: f64) -> Arc<Self> {
            Arc::new(Self {
                result: Ok(ClassificationResult::new(
                    label,
                    confidence,
                    [
                        Prediction::new(label, confidence),
                        Prediction::new("Tomato", 0.05),
                        Prediction::new("Radish", 0.03),
                    ],
                )),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(error: ClassifierError) -> Arc<Self> {
            Arc::new(Self {
                result: Err(error),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ImageClassifier for FakeClassifier {
        async fn classify(
            &self,
            _image: &ImageUpload,
        ) -> Result<ClassificationResult, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    struct FakeGenerator {
        reply: Option<String>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FakeGenerator {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(CARROT_JSON.to_string()),
                delay,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.reply
                .clone()
                .ok_or_else(|| GenerationError::Unavailable("down".into()))
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    #[derive(Default)]
    struct MemoryHistory {
        records: Mutex<Vec<HistoryRecord>>,
        fail: bool,
    }

    #[async_trait]
    impl HistoryStore for MemoryHistory {
        async fn save(&self, record: &HistoryRecord) -> Result<HistoryRecord, HistoryError> {
            if self.fail {
                return Err(HistoryError::Database("disk full".into()));
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(record.clone())
        }

        async fn list(&self, limit: u32, offset: u32) -> Result<Vec<HistoryRecord>, HistoryError> {
            let records = self.records.lock().unwrap();
            Ok(records
                .iter()
                .rev()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn delete(&self, id: Uuid) -> Result<HistoryRecord, HistoryError> {
            let mut records = self.records.lock().unwrap();
            let pos = records
                .iter()
                .position(|r| r.id == id)
                .ok_or(HistoryError::NotFound(id))?;
            Ok(records.remove(pos))
        }

        fn is_durable(&self) -> bool {
            true
        }
    }

    struct FakeImages {
        fail: bool,
    }

    #[async_trait]
    impl ImageStore for FakeImages {
        async fn store(&self, image: &ImageUpload) -> Result<StoredImage, ImageStoreError> {
            if self.fail {
                return Err(ImageStoreError::Io(std::io::Error::other("read-only")));
            }
            let filename = format!("stored.{}", image.extension());
            Ok(StoredImage {
                path: format!("uploads/{}", filename),
                filename,
            })
        }
    }

    struct FixedClock(OffsetDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> OffsetDateTime {
            self.0
        }
    }

    const CARROT_JSON: &str = r#"{
        "recipes": ["Sup Wortel Kentang", "Tumis Wortel Buncis", "Perkedel Wortel"],
        "nutrition": {"calories": "41 kkal per 100 gram", "vitamins": ["Vitamin A", "Vitamin K"], "benefits": ["Menjaga kesehatan mata"]},
        "storageTips": "Simpan di lemari es dalam kantong plastik berlubang."
    }"#;

    struct Harness {
        classifier: Arc<FakeClassifier>,
        generator: Arc<FakeGenerator>,
        history: Arc<MemoryHistory>,
        config: PredictConfig,
        images_fail: bool,
    }

    impl Harness {
        fn new(classifier: Arc<FakeClassifier>, generator: Arc<FakeGenerator>) -> Self {
            Self {
                classifier,
                generator,
                history: Arc::new(MemoryHistory::default()),
                config: PredictConfig::default(),
                images_fail: false,
            }
        }

        fn build(
            &self,
        ) -> PredictUseCase<FakeClassifier, FakeGenerator, MemoryHistory, FakeImages, FixedClock>
        {
            let recommender = RecommendUseCase::new(
                self.generator.clone(),
                RecommendConfig {
                    locale: Locale::Indonesian,
                    timeout: Duration::from_secs(30),
                },
            );
            PredictUseCase::new(
                self.classifier.clone(),
                Arc::new(recommender),
                self.history.clone(),
                Arc::new(FakeImages {
                    fail: self.images_fail,
                }),
                Arc::new(FixedClock(datetime!(2024-05-01 10:00 UTC))),
                self.config.clone(),
            )
        }
    }

    fn jpeg(len: usize) -> ImageUpload {
        ImageUpload::new("carrot.jpg", "image/jpeg", vec![0xFF; len])
    }

    #[tokio::test]
    async fn test_confident_prediction_gets_generated_recommendation() {
        let harness = Harness::new(
            FakeClassifier::returning("Carrot", 0.92),
            FakeGenerator::replying(CARROT_JSON),
        );
        let record = harness.build().predict(jpeg(1024)).await.unwrap();

        assert_eq!(record.classification.label, "Carrot");
        assert_eq!(record.image_filename, "stored.jpg");
        assert_eq!(record.created_at, datetime!(2024-05-01 10:00 UTC));

        let rec = record.recommendation.as_ref().unwrap();
        assert_eq!(rec.recipes.len(), 3);
        assert!(rec.recipes.iter().all(|r| !r.contains("Carrot")));

        let saved = harness.history.records.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, record.id);
    }

    #[tokio::test]
    async fn test_unknown_subject_never_calls_generator() {
        let harness = Harness::new(
            FakeClassifier::returning("Carrot", 0.3),
            FakeGenerator::replying(CARROT_JSON),
        );
        let record = harness.build().predict(jpeg(512)).await.unwrap();

        assert_eq!(record.classification.label, UNKNOWN_SUBJECT);
        assert_eq!(harness.generator.calls.load(Ordering::SeqCst), 0);
        let rec = record.recommendation.unwrap();
        assert!(matches!(rec.nutrition, Nutrition::Summary { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_generation_falls_back_to_catalog() {
        let harness = Harness::new(
            FakeClassifier::returning("Potato", 0.88),
            FakeGenerator::slow(Duration::from_secs(45)),
        );
        let record = harness.build().predict(jpeg(512)).await.unwrap();

        assert_eq!(
            record.recommendation.unwrap(),
            catalog::lookup("Potato").unwrap().recommendation(Locale::Indonesian)
        );
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected_before_classification() {
        let harness = Harness::new(
            FakeClassifier::returning("Carrot", 0.92),
            FakeGenerator::replying(CARROT_JSON),
        );
        let upload = jpeg(crate::policy::DEFAULT_MAX_UPLOAD_BYTES + 1);
        let err = harness.build().predict(upload).await.unwrap_err();

        assert!(matches!(
            err,
            PredictError::Upload(UploadViolation::TooLarge { .. })
        ));
        assert_eq!(harness.classifier.calls.load(Ordering::SeqCst), 0);
        assert!(harness.history.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_classification_failure_is_surfaced() {
        let harness = Harness::new(
            FakeClassifier::failing(ClassifierError::Unavailable("model not loaded".into())),
            FakeGenerator::replying(CARROT_JSON),
        );
        let err = harness.build().predict(jpeg(512)).await.unwrap_err();

        assert!(matches!(
            err,
            PredictError::Classification(ClassifierError::Unavailable(_))
        ));
        assert_eq!(harness.generator.calls.load(Ordering::SeqCst), 0);
        assert!(harness.history.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_recommendations_skip_generation() {
        let mut harness = Harness::new(
            FakeClassifier::returning("Carrot", 0.92),
            FakeGenerator::replying(CARROT_JSON),
        );
        harness.config.recommendations_enabled = false;
        let record = harness.build().predict(jpeg(512)).await.unwrap();

        assert_eq!(harness.generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            record.recommendation.unwrap(),
            catalog::degraded_fallback(Locale::Indonesian)
        );
    }

    #[tokio::test]
    async fn test_storage_failures_still_return_record() {
        let mut harness = Harness::new(
            FakeClassifier::returning("Carrot", 0.92),
            FakeGenerator::replying(CARROT_JSON),
        );
        harness.history = Arc::new(MemoryHistory {
            fail: true,
            ..Default::default()
        });
        harness.images_fail = true;

        let record = harness.build().predict(jpeg(512)).await.unwrap();

        assert_eq!(record.image_filename, "carrot.jpg");
        assert!(record.image_path.is_empty());
        assert!(record.recommendation.is_some());
    }

    #[tokio::test]
    async fn test_each_prediction_gets_fresh_id() {
        let harness = Harness::new(
            FakeClassifier::returning("Carrot", 0.92),
            FakeGenerator::replying(CARROT_JSON),
        );
        let pipeline = harness.build();
        let first = pipeline.predict(jpeg(512)).await.unwrap();
        let second = pipeline.predict(jpeg(512)).await.unwrap();

        assert_ne!(first.id, second.id);
        let listed = harness.history.list(10, 0).await.unwrap();
        assert_eq!(listed[0].id, second.id);
    }
}
