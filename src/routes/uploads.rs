use crate::{
    error::{AppError, Result},
    routes::parse_index,
    state::AppState,
    utils::upload::{read_files, UploadPolicy, UploadedFile},
};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    response::Json,
    routing::post,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// 上传路由，单文件大小在读取multipart时校验
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:id/upload/thumbnail", post(upload_series_thumbnail))
        .route(
            "/:id/upload/thumbnail/:season_index/:episode_index",
            post(upload_episode_thumbnail),
        )
        .route(
            "/:id/upload/media/:season_index/:episode_index",
            post(upload_media),
        )
        .route(
            "/:id/upload/music/:season_index/:episode_index",
            post(upload_music),
        )
        .layer(DefaultBodyLimit::disable())
}

async fn read_single(multipart: &mut Multipart, policy: &UploadPolicy) -> Result<UploadedFile> {
    read_files(multipart, policy)
        .await?
        .pop()
        .ok_or_else(|| AppError::FileUpload("No file uploaded".to_string()))
}

fn parse_position(season_index: &str, episode_index: &str) -> Result<(usize, usize)> {
    Ok((
        parse_index(season_index, "season")?,
        parse_index(episode_index, "episode")?,
    ))
}

/// 上传系列缩略图
/// POST /series/:id/upload/thumbnail
async fn upload_series_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    debug!("Uploading thumbnail for series: {}", id);

    let file = read_single(&mut multipart, &UploadPolicy::thumbnail(&state.config)).await?;
    let thumbnail = state.series_service.upload_series_thumbnail(&id, file).await?;

    Ok(Json(json!({
        "success": true,
        "thumbnail": thumbnail
    })))
}

/// 上传集缩略图
/// POST /series/:id/upload/thumbnail/:season_index/:episode_index
async fn upload_episode_thumbnail(
    State(state): State<Arc<AppState>>,
    Path((id, season_index, episode_index)): Path<(String, String, String)>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let (season_index, episode_index) = parse_position(&season_index, &episode_index)?;
    debug!(
        "Uploading thumbnail for series {} ({}/{})",
        id, season_index, episode_index
    );

    let file = read_single(&mut multipart, &UploadPolicy::thumbnail(&state.config)).await?;
    let episode = state
        .series_service
        .upload_episode_thumbnail(&id, season_index, episode_index, file)
        .await?;

    Ok(Json(json!({
        "success": true,
        "episode": episode
    })))
}

/// 批量上传图片和视频
/// POST /series/:id/upload/media/:season_index/:episode_index
async fn upload_media(
    State(state): State<Arc<AppState>>,
    Path((id, season_index, episode_index)): Path<(String, String, String)>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let (season_index, episode_index) = parse_position(&season_index, &episode_index)?;

    let files = read_files(&mut multipart, &UploadPolicy::media(&state.config)).await?;
    debug!(
        "Uploading {} media files for series {} ({}/{})",
        files.len(),
        id,
        season_index,
        episode_index
    );

    let media = state
        .series_service
        .upload_media(&id, season_index, episode_index, files)
        .await?;

    Ok(Json(json!({
        "success": true,
        "media": media
    })))
}

/// 上传集的背景音乐
/// POST /series/:id/upload/music/:season_index/:episode_index
async fn upload_music(
    State(state): State<Arc<AppState>>,
    Path((id, season_index, episode_index)): Path<(String, String, String)>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let (season_index, episode_index) = parse_position(&season_index, &episode_index)?;

    let file = read_single(&mut multipart, &UploadPolicy::music(&state.config)).await?;
    let episode = state
        .series_service
        .upload_music(&id, season_index, episode_index, file)
        .await?;

    Ok(Json(json!({
        "success": true,
        "episode": episode
    })))
}
