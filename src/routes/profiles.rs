use crate::{
    error::Result,
    models::profile::*,
    state::AppState,
    utils::extract::JsonBody,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_profiles).post(create_profile))
        .route("/:id", get(get_profile).put(update_profile).delete(delete_profile))
}

/// 获取用户档案列表
/// GET /profiles
async fn list_profiles(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let profiles = state.profile_service.list_profiles().await?;

    Ok(Json(json!({
        "success": true,
        "profiles": profiles
    })))
}

/// 创建用户档案
/// POST /profiles
async fn create_profile(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<CreateProfileRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let profile = state.profile_service.create_profile(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "profile": profile
        })),
    ))
}

/// GET /profiles/:id
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Getting profile: {}", id);

    let profile = state.profile_service.get_profile(&id).await?;

    Ok(Json(json!({
        "success": true,
        "profile": profile
    })))
}

/// PUT /profiles/:id
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateProfileRequest>,
) -> Result<Json<Value>> {
    let profile = state.profile_service.update_profile(&id, request).await?;

    Ok(Json(json!({
        "success": true,
        "profile": profile
    })))
}

/// DELETE /profiles/:id
async fn delete_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Deleting profile: {}", id);

    state.profile_service.delete_profile(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile deleted successfully"
    })))
}
