//! Export Handlers

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::DocumentSourcePort;
use crate::application::{CancelExport, GetAudiobook, GetExportStatus, SubmitExport};
use crate::infrastructure::adapters::{LayoutDocument, TextDocument};
use crate::infrastructure::http::dto::{
    ApiResponse, CancelExportResponseDto, DocumentDto, ExportJobResponse, JobIdRequest,
    SubmitExportRequest, SubmitExportResponseDto,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Submit Export
// ============================================================================

pub async fn submit_export(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitExportRequest>,
) -> Result<Json<ApiResponse<SubmitExportResponseDto>>, ApiError> {
    let document: Arc<dyn DocumentSourcePort> = match req.document {
        DocumentDto::Layout { pages } => Arc::new(
            LayoutDocument::validated(pages).map_err(|e| ApiError::BadRequest(e.to_string()))?,
        ),
        DocumentDto::Text { content } => Arc::new(TextDocument::new(&content)),
    };

    let result = state
        .submit_export_handler
        .handle(SubmitExport { document })?;

    Ok(Json(ApiResponse::success(SubmitExportResponseDto {
        job_id: result.job_id,
        state: result.state.as_str().to_string(),
        total_pages: result.total_pages,
    })))
}

// ============================================================================
// Export Status
// ============================================================================

pub async fn get_export_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JobIdRequest>,
) -> Result<Json<ApiResponse<ExportJobResponse>>, ApiError> {
    let job = state
        .get_export_status_handler
        .handle(GetExportStatus { job_id: req.job_id })?;

    Ok(Json(ApiResponse::success(job.into())))
}

// ============================================================================
// Cancel Export
// ============================================================================

pub async fn cancel_export(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JobIdRequest>,
) -> Result<Json<ApiResponse<CancelExportResponseDto>>, ApiError> {
    let result = state
        .cancel_export_handler
        .handle(CancelExport { job_id: req.job_id })?;

    Ok(Json(ApiResponse::success(CancelExportResponseDto {
        job_id: result.job_id,
        state: result.state.as_str().to_string(),
    })))
}

// ============================================================================
// Download
// ============================================================================

pub async fn download_audiobook(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let result = state
        .get_audiobook_handler
        .handle(GetAudiobook { job_id })
        .await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(header::CONTENT_LENGTH, result.audio_data.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", result.file_name),
        )
        .body(Body::from(result.audio_data))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
