//! HTTP-facing error type

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use veggie_lens_domain::{
    ClassifierError, HistoryError, policy::UploadViolation, usecases::PredictError,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadGateway(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<UploadViolation> for ApiError {
    fn from(v: UploadViolation) -> Self {
        match v {
            UploadViolation::TooLarge { .. } => ApiError::PayloadTooLarge(v.to_string()),
            UploadViolation::NoFileProvided | UploadViolation::UnsupportedType(_) => {
                ApiError::BadRequest(v.to_string())
            }
        }
    }
}

impl From<ClassifierError> for ApiError {
    fn from(e: ClassifierError) -> Self {
        match e {
            ClassifierError::Unavailable(_) | ClassifierError::Timeout => {
                ApiError::BadGateway(e.to_string())
            }
            ClassifierError::Rejected(_) => ApiError::BadRequest(e.to_string()),
            ClassifierError::Backend(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        match e {
            PredictError::Upload(v) => v.into(),
            PredictError::Classification(c) => c.into(),
        }
    }
}

impl From<HistoryError> for ApiError {
    fn from(e: HistoryError) -> Self {
        match e {
            HistoryError::NotFound(id) => ApiError::NotFound(format!("History record {} not found", id)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(e.body_text())
        } else {
            ApiError::BadRequest(format!("Invalid multipart body: {}", e.body_text()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_error_statuses() {
        let cases = [
            (ClassifierError::Unavailable("down".into()), StatusCode::BAD_GATEWAY),
            (ClassifierError::Timeout, StatusCode::BAD_GATEWAY),
            (ClassifierError::Rejected("bad".into()), StatusCode::BAD_REQUEST),
            (ClassifierError::Backend("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }

    #[test]
    fn test_upload_violation_statuses() {
        assert_eq!(
            ApiError::from(UploadViolation::TooLarge { len: 2, max: 1 }).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::from(UploadViolation::NoFileProvided).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
