use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Multipart, Path, Query, State, multipart::MultipartRejection, rejection::QueryRejection,
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::OffsetDateTime;
use uuid::Uuid;
use veggie_lens_domain::{
    ClassificationResult, HistoryRecord, ImageUpload, Recommendation,
    policy::{UploadViolation, content_type_for_path},
    usecases::Page,
};

use super::{AppState, error::ApiError};

/// Body of a successful `POST /predict`
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub id: Uuid,
    pub prediction: ClassificationResult,
    pub recommendation: Option<Recommendation>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<HistoryRecord> for PredictResponse {
    fn from(record: HistoryRecord) -> Self {
        Self {
            id: record.id,
            prediction: record.classification,
            recommendation: record.recommendation,
            created_at: record.created_at,
        }
    }
}

const FILE_FIELDS: &[&str] = &["file", "image"];

pub async fn predict(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let is_file_field = field.file_name().is_some()
            || field.name().is_some_and(|n| FILE_FIELDS.contains(&n));
        if upload.is_some() || !is_file_field {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .or_else(|| content_type_for_path(std::path::Path::new(&filename)).map(str::to_string))
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field.bytes().await?;

        upload = Some(ImageUpload::new(filename, content_type, bytes.to_vec()));
    }

    let upload = upload.ok_or(UploadViolation::NoFileProvided)?;
    let record = state.services.pipeline.predict(upload).await?;

    Ok(Json(record.into()))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    limit: Option<u32>,
    offset: Option<u32>,
}

pub async fn list_history(
    State(state): State<Arc<AppState>>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<Vec<HistoryRecord>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let page = Page::new(params.limit, params.offset);
    let records = state.services.history.list(page).await?;
    Ok(Json(records))
}

pub async fn delete_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid history id: {}", id)))?;

    let deleted = state.services.history.delete(id).await?;

    Ok(Json(json!({
        "success": true,
        "deleted": { "id": deleted.id }
    })))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub recommendation_provider: String,
    pub persistence: String,
    pub recommendations_enabled: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let pipeline = &state.services.pipeline;
    let persistence = if state.services.history.is_durable() {
        "sqlite"
    } else {
        "ephemeral"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        recommendation_provider: pipeline.recommender().provider().to_string(),
        persistence: persistence.to_string(),
        recommendations_enabled: pipeline.recommendations_enabled(),
    })
}
