use crate::{
    error::Result,
    models::series::{Episode, Season, Series},
    services::storage::BlobStore,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 资源生命周期协调器
///
/// 负责上传资源的写入，以及在引用被覆盖或移除时删除对应的对象。
/// 删除是尽力而为的：失败只记录日志，不会影响文档本身的修改。
#[derive(Clone)]
pub struct AssetLifecycle {
    store: Arc<dyn BlobStore>,
}

/// 集内所有资源引用：缩略图、音乐、按顺序的媒体URL
pub fn collect_episode_assets(episode: &Episode) -> Vec<&str> {
    episode
        .thumbnail
        .iter()
        .chain(episode.music.iter())
        .map(String::as_str)
        .chain(episode.media.iter().map(|m| m.url.as_str()))
        .filter(|reference| !reference.is_empty())
        .collect()
}

impl AssetLifecycle {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// 写入对象并返回其公共URL
    pub async fn store_asset(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String> {
        self.store.put(key, data, content_type).await?;
        Ok(self.store.public_url(key))
    }

    pub async fn delete_asset(&self, reference: Option<&str>) {
        let reference = match reference {
            Some(r) if !r.is_empty() => r,
            _ => return,
        };

        let key = match self.store.key_from_url(reference) {
            Some(key) => key,
            None => {
                debug!("Skipping asset outside of blob store: {}", reference);
                return;
            }
        };

        match self.store.delete(&key).await {
            Ok(()) => info!("Deleted asset {}", key),
            Err(e) => warn!("Failed to delete asset {}: {}", key, e),
        }
    }

    /// 删除旧引用后写入新引用
    pub async fn replace_asset(&self, slot: &mut Option<String>, new_reference: String) {
        self.delete_asset(slot.as_deref()).await;
        *slot = Some(new_reference);
    }

    pub async fn clear_asset(&self, slot: &mut Option<String>) {
        self.delete_asset(slot.as_deref()).await;
        *slot = None;
    }

    pub async fn cascade_delete_episode(&self, episode: &Episode) {
        for reference in collect_episode_assets(episode) {
            self.delete_asset(Some(reference)).await;
        }
    }

    pub async fn cascade_delete_season(&self, season: &Season) {
        for episode in &season.episodes {
            self.cascade_delete_episode(episode).await;
        }
    }

    pub async fn cascade_delete_series(&self, series: &Series) {
        self.delete_asset(series.thumbnail.as_deref()).await;
        for season in &series.seasons {
            self.cascade_delete_season(season).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::series::{Media, MediaKind};
    use crate::services::storage::{key_from_prefix, MemoryBlobStore, MockBlobStore};
    use mockall::predicate::eq;

    const BASE: &str = "http://cdn.test";

    fn media(id: &str) -> Media {
        Media {
            id: id.to_string(),
            filename: format!("m/{}.png", id),
            original_name: format!("{}.png", id),
            kind: MediaKind::Image,
            url: format!("{}/m/{}.png", BASE, id),
        }
    }

    fn mock_store() -> MockBlobStore {
        let mut store = MockBlobStore::new();
        store
            .expect_key_from_url()
            .returning(|url| key_from_prefix(BASE, url));
        store
    }

    #[test]
    fn test_collect_episode_assets_order() {
        let mut episode = Episode::numbered(1);
        assert!(collect_episode_assets(&episode).is_empty());

        episode.media = vec![media("a"), media("b")];
        episode.music = Some(format!("{}/music.mp3", BASE));
        episode.thumbnail = Some(format!("{}/thumb.png", BASE));

        assert_eq!(
            collect_episode_assets(&episode),
            vec![
                "http://cdn.test/thumb.png",
                "http://cdn.test/music.mp3",
                "http://cdn.test/m/a.png",
                "http://cdn.test/m/b.png",
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_asset_skips_empty_and_foreign() {
        let mut store = mock_store();
        store.expect_delete().never();
        let assets = AssetLifecycle::new(Arc::new(store));

        assets.delete_asset(None).await;
        assets.delete_asset(Some("")).await;
        assets.delete_asset(Some("https://elsewhere.com/x.png")).await;
    }

    #[tokio::test]
    async fn test_delete_failure_is_swallowed() {
        let mut store = mock_store();
        store
            .expect_delete()
            .with(eq("thumb.png"))
            .times(1)
            .returning(|_| Err(AppError::storage("boom")));
        let assets = AssetLifecycle::new(Arc::new(store));

        let mut slot = Some(format!("{}/thumb.png", BASE));
        assets.clear_asset(&mut slot).await;
        assert!(slot.is_none());
    }

    #[tokio::test]
    async fn test_replace_deletes_old_key_once() {
        let mut store = mock_store();
        store
            .expect_delete()
            .with(eq("old.png"))
            .times(1)
            .returning(|_| Ok(()));
        let assets = AssetLifecycle::new(Arc::new(store));

        let mut slot = Some(format!("{}/old.png", BASE));
        assets
            .replace_asset(&mut slot, format!("{}/new.png", BASE))
            .await;
        assert_eq!(slot.as_deref(), Some("http://cdn.test/new.png"));

        let mut empty = None;
        assets
            .replace_asset(&mut empty, format!("{}/other.png", BASE))
            .await;
        assert!(empty.is_some());
    }

    #[tokio::test]
    async fn test_cascade_delete_series() {
        let store = Arc::new(MemoryBlobStore::new(BASE));
        let assets = AssetLifecycle::new(store.clone());

        let mut series = Series::new("s1".into(), "Trip".into(), String::new(), 2, 1);
        series.thumbnail = Some(format!("{}/cover.png", BASE));
        series.seasons[0].episodes[0].media = vec![media("a")];
        series.seasons[1].episodes[0].music = Some(format!("{}/song.mp3", BASE));

        for key in ["cover.png", "m/a.png", "song.mp3"] {
            store.put(key, vec![0], "application/octet-stream").await.unwrap();
        }

        assets.cascade_delete_series(&series).await;

        assert_eq!(store.deleted_keys(), vec!["cover.png", "m/a.png", "song.mp3"]);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_store_asset_returns_public_url() {
        let store = Arc::new(MemoryBlobStore::new(BASE));
        let assets = AssetLifecycle::new(store.clone());

        let url = assets.store_asset("x/y.png", vec![1], "image/png").await.unwrap();
        assert_eq!(url, "http://cdn.test/x/y.png");
        assert!(store.contains("x/y.png"));
    }
}
