//! JSON ingestion endpoints
//!
//! Parse and preview never fail on bad input: the outcome is reported in the
//! `{parsed, data?, error?}` envelope so the client can show it inline. Upload
//! rejects the file itself (size, type, encoding) with an error status, but
//! reports unparseable content the same way.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{Datelike, Utc};
use impacts_core::models::{
    BatchCreateRequest, BatchImportReport, ParseRequest, ParseResponse, PreviewResponse,
    UploadResponse,
};
use impacts_core::AppError;
use impacts_ingest::{accept_upload, parse_json, ImportSession};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Multipart field carrying the uploaded document
pub const UPLOAD_FIELD: &str = "file";

/// Multipart form accepted by the upload endpoint
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// `.json` or `.txt` document
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Parse pasted JSON without mapping it
#[utoipa::path(
    post,
    path = "/api/organizations/parse",
    request_body = ParseRequest,
    responses(
        (status = 200, description = "Parse outcome", body = ParseResponse),
        (status = 400, description = "Request body is not a parse request", body = ErrorResponse)
    ),
    tag = "ingest"
)]
pub async fn parse_organization(
    ValidatedJson(request): ValidatedJson<ParseRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = match parse_json(&request.json_data) {
        Ok(value) => ParseResponse {
            parsed: true,
            data: Some(value),
            error: None,
        },
        Err(e) => {
            tracing::debug!(error = %e, "Pasted JSON rejected");
            ParseResponse {
                parsed: false,
                data: None,
                error: Some(e.to_string()),
            }
        }
    };
    Ok(Json(response))
}

/// Parse pasted JSON and map it onto the canonical organization shape
#[utoipa::path(
    post,
    path = "/api/organizations/preview",
    request_body = ParseRequest,
    responses(
        (status = 200, description = "Mapped candidate or the reason it could not be built", body = PreviewResponse),
        (status = 400, description = "Request body is not a parse request", body = ErrorResponse)
    ),
    tag = "ingest"
)]
pub async fn preview_organization(
    ValidatedJson(request): ValidatedJson<ParseRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut session = ImportSession::new(Utc::now().year());
    if let Err(e) = session.parse(&request.json_data) {
        return Ok(Json(PreviewResponse {
            parsed: false,
            data: None,
            error: Some(e.to_string()),
        }));
    }
    let response = match session.preview() {
        Ok(candidate) => PreviewResponse {
            parsed: true,
            data: Some(candidate.clone()),
            error: None,
        },
        Err(e) => PreviewResponse {
            parsed: true,
            data: None,
            error: Some(e.to_string()),
        },
    };
    Ok(Json(response))
}

/// Upload a `.json` or `.txt` file and parse its content
#[utoipa::path(
    post,
    path = "/api/organizations/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload accepted; parse outcome in the body", body = UploadResponse),
        (status = 400, description = "Missing file, unsupported type or not UTF-8", body = ErrorResponse),
        (status = 413, description = "File exceeds the upload limit", body = ErrorResponse)
    ),
    tag = "ingest"
)]
pub async fn upload_organization_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        let text = accept_upload(file_name.as_deref(), &bytes, &state.upload_limits)?;
        tracing::info!(
            file_name = file_name.as_deref().unwrap_or("<unnamed>"),
            size = bytes.len(),
            "Organization file uploaded"
        );

        let response = match parse_json(&text) {
            Ok(_) => UploadResponse {
                parsed: true,
                json_data: Some(text),
                error: None,
            },
            Err(e) => UploadResponse {
                parsed: false,
                json_data: None,
                error: Some(e.to_string()),
            },
        };
        return Ok(Json(response));
    }

    Err(AppError::BadRequest(format!("Missing '{}' field in upload", UPLOAD_FIELD)).into())
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> HttpAppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge(err.body_text()).into();
    }
    AppError::BadRequest(format!("Invalid multipart body: {}", err.body_text())).into()
}

/// Create every element of a batch independently
#[utoipa::path(
    post,
    path = "/api/organizations/batch",
    request_body = BatchCreateRequest,
    responses(
        (status = 200, description = "Per-item outcome", body = BatchImportReport),
        (status = 400, description = "Request body is not a batch", body = ErrorResponse),
        (status = 413, description = "Batch exceeds the configured size", body = ErrorResponse)
    ),
    tag = "ingest"
)]
pub async fn batch_create_organizations(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<BatchCreateRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let report = state
        .organizations
        .create_batch(request.organizations)
        .await?;
    Ok(Json(report))
}
