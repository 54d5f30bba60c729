use crate::{
    error::{AppError, Result},
    models::series::*,
    services::{
        assets::AssetLifecycle,
        collection::{locate_episode, locate_episode_mut, CollectionManager},
        database::DocumentStore,
    },
    utils::upload::{storage_key, UploadedFile},
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

const TABLE: &str = "series";

#[derive(Clone)]
pub struct SeriesService {
    db: Arc<dyn DocumentStore>,
    assets: AssetLifecycle,
    collection: CollectionManager,
}

impl SeriesService {
    pub fn new(db: Arc<dyn DocumentStore>, assets: AssetLifecycle) -> Self {
        Self {
            db,
            collection: CollectionManager::new(assets.clone()),
            assets,
        }
    }

    async fn load(&self, series_id: &str) -> Result<Series> {
        let doc = self
            .db
            .get(TABLE, series_id)
            .await?
            .ok_or_else(|| AppError::not_found("Series"))?;
        Ok(serde_json::from_value(doc)?)
    }

    async fn save(&self, series: &mut Series) -> Result<()> {
        series.touch();
        self.db
            .put(TABLE, &series.id, serde_json::to_value(&*series)?)
            .await?;
        Ok(())
    }

    /// 获取全部系列，最新创建的在前
    pub async fn list_series(&self) -> Result<Vec<Series>> {
        let mut series = self
            .db
            .list(TABLE)
            .await?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Series>, _>>()?;
        series.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(series)
    }

    pub async fn get_series(&self, series_id: &str) -> Result<Series> {
        self.load(series_id).await
    }

    /// 创建系列
    pub async fn create_series(&self, request: CreateSeriesRequest) -> Result<Series> {
        debug!("Creating series: {}", request.title);

        request.validate()?;

        let mut series = Series::new(
            Uuid::new_v4().to_string(),
            request.title,
            request.description.unwrap_or_default(),
            request.season_count.unwrap_or(1),
            request.episodes_per_season.unwrap_or(1),
        );
        self.save(&mut series).await?;

        info!("Created series: {} ({})", series.title, series.id);
        Ok(series)
    }

    /// 更新系列及按位置更新季和集的文本字段
    pub async fn update_series(&self, series_id: &str, request: UpdateSeriesRequest) -> Result<Series> {
        debug!("Updating series: {}", series_id);

        request.validate()?;
        let mut series = self.load(series_id).await?;

        if let Some(patches) = &request.seasons {
            check_season_patches(&series, patches)?;
        }

        if let Some(title) = request.title {
            series.title = title;
        }
        if let Some(description) = request.description {
            series.description = description;
        }
        for (season, patch) in series.seasons.iter_mut().zip(request.seasons.unwrap_or_default()) {
            if let Some(title) = patch.title {
                season.title = title;
            }
            for (episode, patch) in season.episodes.iter_mut().zip(patch.episodes.unwrap_or_default()) {
                if let Some(title) = patch.title {
                    episode.title = title;
                }
                if let Some(description) = patch.description {
                    episode.description = description;
                }
            }
        }

        self.save(&mut series).await?;
        Ok(series)
    }

    /// 删除系列及其全部资源
    pub async fn delete_series(&self, series_id: &str) -> Result<()> {
        debug!("Deleting series: {}", series_id);

        let series = self.load(series_id).await?;
        self.assets.cascade_delete_series(&series).await;
        self.db.delete(TABLE, series_id).await?;

        info!("Deleted series: {}", series_id);
        Ok(())
    }

    pub async fn add_season(&self, series_id: &str, episode_count: Option<usize>) -> Result<(usize, Season)> {
        let mut series = self.load(series_id).await?;
        let season = CollectionManager::add_season(&mut series, episode_count.unwrap_or(1))?.clone();
        let index = series.seasons.len() - 1;
        self.save(&mut series).await?;

        info!("Added season {} to series {}", index, series_id);
        Ok((index, season))
    }

    pub async fn remove_season(&self, series_id: &str, season_index: usize) -> Result<Series> {
        let mut series = self.load(series_id).await?;
        self.collection.remove_season(&mut series, season_index).await?;
        self.save(&mut series).await?;

        info!("Removed season {} from series {}", season_index, series_id);
        Ok(series)
    }

    pub async fn add_episode(&self, series_id: &str, season_index: usize) -> Result<(usize, Episode)> {
        let mut series = self.load(series_id).await?;
        let episode = CollectionManager::add_episode(&mut series, season_index)?.clone();
        let index = series.seasons[season_index].episodes.len() - 1;
        self.save(&mut series).await?;

        info!("Added episode {} to season {} of series {}", index, season_index, series_id);
        Ok((index, episode))
    }

    pub async fn remove_episode(&self, series_id: &str, season_index: usize, episode_index: usize) -> Result<Series> {
        let mut series = self.load(series_id).await?;
        self.collection
            .remove_episode(&mut series, season_index, episode_index)
            .await?;
        self.save(&mut series).await?;

        info!(
            "Removed episode {} from season {} of series {}",
            episode_index, season_index, series_id
        );
        Ok(series)
    }

    /// 上传系列缩略图，替换旧的缩略图
    pub async fn upload_series_thumbnail(&self, series_id: &str, file: UploadedFile) -> Result<String> {
        let mut series = self.load(series_id).await?;

        let key = storage_key(&format!("series/{}/thumbnail", series_id), &file.original_name);
        let url = self.assets.store_asset(&key, file.data, &file.content_type).await?;
        self.assets.replace_asset(&mut series.thumbnail, url.clone()).await;
        self.save(&mut series).await?;

        info!("Updated thumbnail of series {}", series_id);
        Ok(url)
    }

    pub async fn upload_episode_thumbnail(
        &self,
        series_id: &str,
        season_index: usize,
        episode_index: usize,
        file: UploadedFile,
    ) -> Result<Episode> {
        let mut series = self.load(series_id).await?;
        let episode = locate_episode_mut(&mut series, season_index, episode_index)?;

        let key = storage_key(
            &episode_scope(series_id, season_index, episode_index, "thumbnail"),
            &file.original_name,
        );
        let url = self.assets.store_asset(&key, file.data, &file.content_type).await?;
        self.assets.replace_asset(&mut episode.thumbnail, url).await;
        let episode = episode.clone();
        self.save(&mut series).await?;

        Ok(episode)
    }

    /// 批量上传媒体，结果顺序与上传顺序一致
    pub async fn upload_media(
        &self,
        series_id: &str,
        season_index: usize,
        episode_index: usize,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<Media>> {
        let mut series = self.load(series_id).await?;
        locate_episode(&series, season_index, episode_index)?;

        let scope = episode_scope(series_id, season_index, episode_index, "media");
        let mut uploaded: Vec<Media> = Vec::with_capacity(files.len());
        for file in files {
            match self.store_media(&scope, file).await {
                Ok(media) => uploaded.push(media),
                Err(e) => {
                    for media in &uploaded {
                        self.assets.delete_asset(Some(media.url.as_str())).await;
                    }
                    return Err(e);
                }
            }
        }

        let episode = locate_episode_mut(&mut series, season_index, episode_index)?;
        episode.media.extend(uploaded.iter().cloned());
        self.save(&mut series).await?;

        info!(
            "Uploaded {} media files to series {} ({}/{})",
            uploaded.len(),
            series_id,
            season_index,
            episode_index
        );
        Ok(uploaded)
    }

    async fn store_media(&self, scope: &str, file: UploadedFile) -> Result<Media> {
        let kind = MediaKind::from_mime_type(&file.content_type).ok_or_else(|| {
            AppError::FileUpload(format!("Unsupported media type '{}'", file.content_type))
        })?;

        let key = storage_key(scope, &file.original_name);
        let url = self.assets.store_asset(&key, file.data, &file.content_type).await?;

        Ok(Media {
            id: Uuid::new_v4().to_string(),
            filename: key,
            original_name: file.original_name,
            kind,
            url,
        })
    }

    pub async fn upload_music(
        &self,
        series_id: &str,
        season_index: usize,
        episode_index: usize,
        file: UploadedFile,
    ) -> Result<Episode> {
        let mut series = self.load(series_id).await?;
        let episode = locate_episode_mut(&mut series, season_index, episode_index)?;

        let key = storage_key(
            &episode_scope(series_id, season_index, episode_index, "music"),
            &file.original_name,
        );
        let url = self.assets.store_asset(&key, file.data, &file.content_type).await?;
        self.assets.replace_asset(&mut episode.music, url).await;
        episode.music_original_name = Some(file.original_name);
        let episode = episode.clone();
        self.save(&mut series).await?;

        Ok(episode)
    }

    pub async fn delete_music(&self, series_id: &str, season_index: usize, episode_index: usize) -> Result<Episode> {
        let mut series = self.load(series_id).await?;
        let episode = locate_episode_mut(&mut series, season_index, episode_index)?;

        self.assets.clear_asset(&mut episode.music).await;
        episode.music_original_name = None;
        let episode = episode.clone();
        self.save(&mut series).await?;

        Ok(episode)
    }

    pub async fn delete_media(
        &self,
        series_id: &str,
        season_index: usize,
        episode_index: usize,
        media_id: &str,
    ) -> Result<Episode> {
        let mut series = self.load(series_id).await?;
        let episode = locate_episode_mut(&mut series, season_index, episode_index)?;

        self.collection.remove_media(episode, media_id).await?;
        let episode = episode.clone();
        self.save(&mut series).await?;

        info!("Deleted media {} from series {}", media_id, series_id);
        Ok(episode)
    }

    pub async fn reorder_media(
        &self,
        series_id: &str,
        season_index: usize,
        episode_index: usize,
        request: ReorderMediaRequest,
    ) -> Result<Episode> {
        let mut series = self.load(series_id).await?;
        let episode = locate_episode_mut(&mut series, season_index, episode_index)?;

        CollectionManager::reorder_media(episode, &request.media_ids);
        let episode = episode.clone();
        self.save(&mut series).await?;

        Ok(episode)
    }
}

fn episode_scope(series_id: &str, season_index: usize, episode_index: usize, slot: &str) -> String {
    format!(
        "series/{}/episodes/{}-{}/{}",
        series_id, season_index, episode_index, slot
    )
}

/// 按位置的补丁不能指向不存在的季或集
fn check_season_patches(series: &Series, patches: &[SeasonUpdate]) -> Result<()> {
    if patches.len() > series.seasons.len() {
        return Err(AppError::validation("Season update list is longer than the season list"));
    }

    for (season, patch) in series.seasons.iter().zip(patches) {
        if matches!(&patch.title, Some(t) if t.trim().is_empty()) {
            return Err(AppError::validation("Season title cannot be empty"));
        }

        let episodes = patch.episodes.as_deref().unwrap_or_default();
        if episodes.len() > season.episodes.len() {
            return Err(AppError::validation("Episode update list is longer than the episode list"));
        }
        if episodes
            .iter()
            .any(|e| matches!(&e.title, Some(t) if t.trim().is_empty()))
        {
            return Err(AppError::validation("Episode title cannot be empty"));
        }
    }

    Ok(())
}
