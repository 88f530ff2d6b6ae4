//! Config Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{GetConfig, UpdateConfig, UpdateConfigKey};
use crate::infrastructure::http::dto::{
    ApiResponse, ConfigResponse, UpdateConfigKeyRequest, UpdateConfigKeyResponseDto,
    UpdateConfigRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Get Config
// ============================================================================

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ConfigResponse>> {
    let result = state.get_config_handler.handle(GetConfig);
    Json(ApiResponse::success(result.into()))
}

// ============================================================================
// Update Config Key
// ============================================================================

pub async fn update_config_key(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateConfigKeyRequest>,
) -> Result<Json<ApiResponse<UpdateConfigKeyResponseDto>>, ApiError> {
    let cmd = UpdateConfigKey {
        key: req.key,
        value: req.value,
    };

    let result = state.update_config_key_handler.handle(cmd).await?;
    let key = result.entry.key().as_str();
    state.event_publisher.publish_config_changed(key);

    Ok(Json(ApiResponse::success(UpdateConfigKeyResponseDto {
        key: key.to_string(),
        persisted: result.persisted,
    })))
}

// ============================================================================
// Update Config (credentials + view type)
// ============================================================================

pub async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateConfigRequest>,
) -> Result<Json<ApiResponse<ConfigResponse>>, ApiError> {
    let changed: Vec<&'static str> = [
        req.api_key.as_ref().map(|_| "apiKey"),
        req.base_url.as_ref().map(|_| "baseUrl"),
        req.view_type.as_ref().map(|_| "viewType"),
    ]
    .into_iter()
    .flatten()
    .collect();

    let cmd = UpdateConfig {
        api_key: req.api_key,
        base_url: req.base_url,
        view_type: req.view_type,
    };
    state.update_config_handler.handle(cmd).await?;

    for key in changed {
        state.event_publisher.publish_config_changed(key);
    }

    let result = state.get_config_handler.handle(GetConfig);
    Ok(Json(ApiResponse::success(result.into())))
}
