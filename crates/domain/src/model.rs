//! Domain models and value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

/// Label reported for any image whose top confidence is below the threshold
pub const UNKNOWN_SUBJECT: &str = "Unknown vegetable";

/// Confidence below which a classification is reported as unknown
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// A single class/confidence pair from the classification backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Canonical subject label
    #[serde(rename = "class")]
    pub label: String,
    /// Confidence score 0.0-1.0
    pub confidence: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence: clamp_confidence(confidence),
        }
    }
}

/// Result of classifying one image
///
/// Always carries exactly three alternatives, ordered by descending
/// confidence. Construct through [`ClassificationResult::new`] so the
/// low-confidence sentinel is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ClassificationWire")]
pub struct ClassificationResult {
    /// Canonical label, or [`UNKNOWN_SUBJECT`]
    #[serde(rename = "predicted_class")]
    pub label: String,
    /// Confidence of the top prediction
    pub confidence: f64,
    /// Top three predictions
    #[serde(rename = "top_3")]
    pub alternatives: [Prediction; 3],
}

impl ClassificationResult {
    pub fn new(label: impl Into<String>, confidence: f64, mut alternatives: [Prediction; 3]) -> Self {
        alternatives.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let confidence = clamp_confidence(confidence);
        let label = if confidence < LOW_CONFIDENCE_THRESHOLD {
            UNKNOWN_SUBJECT.to_string()
        } else {
            label.into()
        };

        Self {
            label,
            confidence,
            alternatives,
        }
    }

    /// Whether the subject could not be identified
    pub fn is_unknown(&self) -> bool {
        self.label == UNKNOWN_SUBJECT
    }
}

#[derive(Deserialize)]
struct ClassificationWire {
    predicted_class: String,
    confidence: f64,
    top_3: [Prediction; 3],
}

impl From<ClassificationWire> for ClassificationResult {
    fn from(wire: ClassificationWire) -> Self {
        Self::new(wire.predicted_class, wire.confidence, wire.top_3)
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Nutrition section of a recommendation
///
/// Either the structured shape or the degraded single-field shape, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nutrition {
    /// Degraded shape used by fallback recommendations
    Summary { info: String },
    /// Structured shape produced by the catalog or the generation backend
    Detailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        calories: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        vitamins: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        benefits: Option<Vec<String>>,
    },
}

impl Nutrition {
    pub fn is_summary(&self) -> bool {
        matches!(self, Nutrition::Summary { .. })
    }
}

/// Recipe, nutrition and storage recommendation for a subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Recipe names, never empty
    pub recipes: Vec<String>,
    /// Nutrition facts
    pub nutrition: Nutrition,
    /// Storage advice sentence
    pub storage_tips: String,
}

impl Recommendation {
    /// Whether the recommendation satisfies the shape invariants
    pub fn is_well_formed(&self) -> bool {
        !self.recipes.is_empty()
            && self.recipes.iter().all(|r| !r.trim().is_empty())
            && !self.storage_tips.trim().is_empty()
    }
}

/// Language used for generated and fallback text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Locale {
    /// Bahasa Indonesia
    #[default]
    #[serde(rename = "id")]
    Indonesian,
    /// English
    #[serde(rename = "en")]
    English,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Indonesian => "id",
            Locale::English => "en",
        }
    }

    /// Language name as written in prompts
    pub fn language_name(&self) -> &'static str {
        match self {
            Locale::Indonesian => "Bahasa Indonesia",
            Locale::English => "English",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" | "id-id" | "indonesian" => Ok(Locale::Indonesian),
            "en" | "en-us" | "en-gb" | "english" => Ok(Locale::English),
            other => Err(format!("Unsupported locale: {}", other)),
        }
    }
}

/// An uploaded image handed to the prediction pipeline
#[derive(Clone)]
pub struct ImageUpload {
    /// Client-supplied filename
    pub filename: String,
    /// Declared MIME type
    pub content_type: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// File extension matching the declared content type
    pub fn extension(&self) -> &'static str {
        match crate::policy::normalize_content_type(&self.content_type).as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "jpg",
        }
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Location of a stored upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub filename: String,
    pub path: String,
}

/// A persisted prediction with its recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Unique record ID, assigned once at creation
    pub id: Uuid,
    /// Stored image filename
    pub image_filename: String,
    /// Stored image path
    pub image_path: String,
    /// Classification at time of upload
    pub classification: ClassificationResult,
    /// Recommendation; absent only for rows written without one
    pub recommendation: Option<Recommendation>,
    /// When the record was created
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
