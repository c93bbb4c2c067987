//! Upload constraints checked before any backend call

use crate::model::ImageUpload;

/// Default maximum upload size (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Content types accepted by the classification backend
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Upload policy configuration
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Maximum accepted payload size in bytes
    pub max_bytes: usize,
    /// Accepted MIME types
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_content_types: ALLOWED_CONTENT_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl UploadPolicy {
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            ..Default::default()
        }
    }

    /// Validate an upload
    ///
    /// The size check runs before the content-type check so oversized
    /// payloads always report 413.
    pub fn validate(&self, upload: &ImageUpload) -> Result<(), UploadViolation> {
        if upload.bytes.is_empty() {
            return Err(UploadViolation::NoFileProvided);
        }

        if upload.bytes.len() > self.max_bytes {
            return Err(UploadViolation::TooLarge {
                len: upload.bytes.len(),
                max: self.max_bytes,
            });
        }

        let content_type = normalize_content_type(&upload.content_type);
        if !self
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&content_type))
        {
            return Err(UploadViolation::UnsupportedType(upload.content_type.clone()));
        }

        Ok(())
    }
}

/// Strip parameters from a MIME type, e.g. `image/png; q=1` -> `image/png`
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Guess a content type from a file extension
pub fn content_type_for_path(path: &std::path::Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Upload policy violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadViolation {
    #[error("No file provided")]
    NoFileProvided,
    #[error("Unsupported image format '{0}'. Allowed: JPEG, PNG, WebP")]
    UnsupportedType(String),
    #[error("File size {len} exceeds the {max} byte limit")]
    TooLarge { len: usize, max: usize },
}
