//! Exam generation endpoint

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{ExamGeneratorError, Result};
use crate::input::UploadedDocument;
use crate::server::state::AppState;

/// Name of the multipart field carrying the document
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct ExamResponse {
    pub questions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ExamGeneratorError {
    fn into_response(self) -> Response {
        let status = match &self {
            ExamGeneratorError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ExamGeneratorError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ExamGeneratorError::UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if self.is_user_facing() {
            log::warn!("Rejected upload: {}", self);
        } else {
            log::error!("Exam generation failed: {}", self);
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// POST /generate_exam/ - Upload a document and receive questions
pub async fn generate_exam(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ExamResponse>> {
    let mut multipart = multipart.map_err(|rejection| {
        ExamGeneratorError::InvalidInput(format!("Expected a multipart upload: {}", rejection.body_text()))
    })?;
    let document = read_upload(&mut multipart).await?;
    log::info!(
        "Received file: {} ({} bytes)",
        document.filename(),
        document.size()
    );

    let pipeline = state.pipeline();
    let questions = tokio::task::spawn_blocking(move || {
        let mut rng = rand::thread_rng();
        pipeline.generate_exam_strings(&document, &mut rng)
    })
    .await
    .map_err(|e| ExamGeneratorError::Processing(format!("Generation task failed: {}", e)))??;

    log::info!("Returning {} questions", questions.len());
    Ok(Json(ExamResponse { questions }))
}

/// Pull the first `file` field out of the multipart body; other fields are ignored.
async fn read_upload(multipart: &mut Multipart) -> Result<UploadedDocument> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error("Failed to read multipart field", e))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "upload".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| upload_error("Failed to read file", e))?;

        return Ok(UploadedDocument::new(filename, data));
    }

    Err(ExamGeneratorError::InvalidInput(format!(
        "Missing multipart field '{}'",
        UPLOAD_FIELD
    )))
}

/// Body limit hits become 413, anything else is a malformed upload.
fn upload_error(context: &str, err: MultipartError) -> ExamGeneratorError {
    let message = format!("{}: {}", context, err.body_text());
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ExamGeneratorError::UploadTooLarge(message)
    } else {
        ExamGeneratorError::InvalidInput(message)
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}
