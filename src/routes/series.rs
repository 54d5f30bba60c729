use crate::{
    error::Result,
    models::series::*,
    routes::parse_index,
    state::AppState,
    utils::extract::{JsonBody, OptionalJsonBody},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_series_list).post(create_series))
        .route("/:id", get(get_series).put(update_series).delete(delete_series))
        .route("/:id/seasons", post(add_season))
        .route("/:id/seasons/:season_index", delete(remove_season))
        .route("/:id/seasons/:season_index/episodes", post(add_episode))
        .route(
            "/:id/seasons/:season_index/episodes/:episode_index",
            delete(remove_episode),
        )
        .route("/:id/music/:season_index/:episode_index", delete(delete_music))
        .route(
            "/:id/media/:season_index/:episode_index/:media_id",
            delete(delete_media),
        )
        .route("/:id/reorder/:season_index/:episode_index", put(reorder_media))
}

/// 获取系列列表
/// GET /series
async fn get_series_list(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let series = state.series_service.list_series().await?;

    Ok(Json(json!({
        "success": true,
        "series": series
    })))
}

/// 创建系列
/// POST /series
async fn create_series(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<CreateSeriesRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let series = state.series_service.create_series(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "series": series
        })),
    ))
}

/// 获取系列详情
/// GET /series/:id
async fn get_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Getting series: {}", id);

    let series = state.series_service.get_series(&id).await?;

    Ok(Json(json!({
        "success": true,
        "series": series
    })))
}

/// 更新系列
/// PUT /series/:id
async fn update_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateSeriesRequest>,
) -> Result<Json<Value>> {
    let series = state.series_service.update_series(&id, request).await?;

    Ok(Json(json!({
        "success": true,
        "series": series
    })))
}

/// 删除系列及其所有资源
/// DELETE /series/:id
async fn delete_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    state.series_service.delete_series(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Series deleted successfully"
    })))
}

/// 添加一季
/// POST /series/:id/seasons
async fn add_season(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    OptionalJsonBody(request): OptionalJsonBody<AddSeasonRequest>,
) -> Result<Json<Value>> {
    let episode_count = request.and_then(|request| request.episode_count());
    let (season_index, season) = state.series_service.add_season(&id, episode_count).await?;

    Ok(Json(json!({
        "success": true,
        "seasonIndex": season_index,
        "season": season
    })))
}

/// DELETE /series/:id/seasons/:season_index
async fn remove_season(
    State(state): State<Arc<AppState>>,
    Path((id, season_index)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let season_index = parse_index(&season_index, "season")?;
    let series = state.series_service.remove_season(&id, season_index).await?;

    Ok(Json(json!({
        "success": true,
        "series": series
    })))
}

/// POST /series/:id/seasons/:season_index/episodes
async fn add_episode(
    State(state): State<Arc<AppState>>,
    Path((id, season_index)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let season_index = parse_index(&season_index, "season")?;
    let (episode_index, episode) = state.series_service.add_episode(&id, season_index).await?;

    Ok(Json(json!({
        "success": true,
        "seasonIndex": season_index,
        "episodeIndex": episode_index,
        "episode": episode
    })))
}

/// DELETE /series/:id/seasons/:season_index/episodes/:episode_index
async fn remove_episode(
    State(state): State<Arc<AppState>>,
    Path((id, season_index, episode_index)): Path<(String, String, String)>,
) -> Result<Json<Value>> {
    let season_index = parse_index(&season_index, "season")?;
    let episode_index = parse_index(&episode_index, "episode")?;
    let series = state
        .series_service
        .remove_episode(&id, season_index, episode_index)
        .await?;

    Ok(Json(json!({
        "success": true,
        "series": series
    })))
}

/// 删除集的背景音乐
/// DELETE /series/:id/music/:season_index/:episode_index
async fn delete_music(
    State(state): State<Arc<AppState>>,
    Path((id, season_index, episode_index)): Path<(String, String, String)>,
) -> Result<Json<Value>> {
    let season_index = parse_index(&season_index, "season")?;
    let episode_index = parse_index(&episode_index, "episode")?;
    let episode = state
        .series_service
        .delete_music(&id, season_index, episode_index)
        .await?;

    Ok(Json(json!({
        "success": true,
        "episode": episode
    })))
}

/// DELETE /series/:id/media/:season_index/:episode_index/:media_id
async fn delete_media(
    State(state): State<Arc<AppState>>,
    Path((id, season_index, episode_index, media_id)): Path<(String, String, String, String)>,
) -> Result<Json<Value>> {
    let season_index = parse_index(&season_index, "season")?;
    let episode_index = parse_index(&episode_index, "episode")?;
    let episode = state
        .series_service
        .delete_media(&id, season_index, episode_index, &media_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "episode": episode
    })))
}

/// 调整媒体顺序
/// PUT /series/:id/reorder/:season_index/:episode_index
async fn reorder_media(
    State(state): State<Arc<AppState>>,
    Path((id, season_index, episode_index)): Path<(String, String, String)>,
    JsonBody(request): JsonBody<ReorderMediaRequest>,
) -> Result<Json<Value>> {
    let season_index = parse_index(&season_index, "season")?;
    let episode_index = parse_index(&episode_index, "episode")?;
    let episode = state
        .series_service
        .reorder_media(&id, season_index, episode_index, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "episode": episode
    })))
}
