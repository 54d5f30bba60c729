use crate::{
    error::CollectionError,
    models::series::{Episode, Media, Season, Series, MAX_EPISODES, MAX_SEASONS},
    services::assets::AssetLifecycle,
};
use std::collections::HashMap;

type Result<T> = std::result::Result<T, CollectionError>;

/// 把季的位置解析为可变更的下标
///
/// 季和集目前按位置寻址，解析集中在这里和 [`locate_episode`]。
pub fn resolve_season(series: &Series, season_index: usize) -> Result<usize> {
    if season_index < series.seasons.len() {
        Ok(season_index)
    } else {
        Err(CollectionError::OutOfRange(format!(
            "Invalid season index {}",
            season_index
        )))
    }
}

fn resolve_episode(series: &Series, season_index: usize, episode_index: usize) -> Result<(usize, usize)> {
    let si = resolve_season(series, season_index)?;
    if episode_index < series.seasons[si].episodes.len() {
        Ok((si, episode_index))
    } else {
        Err(CollectionError::OutOfRange(format!(
            "Invalid episode index {}",
            episode_index
        )))
    }
}

pub fn locate_episode(series: &Series, season_index: usize, episode_index: usize) -> Result<&Episode> {
    series
        .seasons
        .get(season_index)
        .and_then(|season| season.episodes.get(episode_index))
        .ok_or_else(|| CollectionError::NotFound("Episode not found".to_string()))
}

pub fn locate_episode_mut(
    series: &mut Series,
    season_index: usize,
    episode_index: usize,
) -> Result<&mut Episode> {
    series
        .seasons
        .get_mut(season_index)
        .and_then(|season| season.episodes.get_mut(episode_index))
        .ok_or_else(|| CollectionError::NotFound("Episode not found".to_string()))
}

/// 系列内嵌套集合的增删与排序
#[derive(Clone)]
pub struct CollectionManager {
    assets: AssetLifecycle,
}

impl CollectionManager {
    pub fn new(assets: AssetLifecycle) -> Self {
        Self { assets }
    }

    pub fn add_season(series: &mut Series, episode_count: usize) -> Result<&Season> {
        if series.seasons.len() >= MAX_SEASONS {
            return Err(CollectionError::CapacityExceeded(format!(
                "Maximum {} seasons allowed",
                MAX_SEASONS
            )));
        }

        let ordinal = series.seasons.len() + 1;
        series.seasons.push(Season::numbered(ordinal, episode_count));
        Ok(&series.seasons[ordinal - 1])
    }

    /// 删除一季，先清理其中所有集的资源
    pub async fn remove_season(&self, series: &mut Series, season_index: usize) -> Result<Season> {
        let si = resolve_season(series, season_index)?;
        if series.seasons.len() <= 1 {
            return Err(CollectionError::MinimumCardinality(
                "Cannot delete the last season".to_string(),
            ));
        }

        self.assets.cascade_delete_season(&series.seasons[si]).await;
        Ok(series.seasons.remove(si))
    }

    pub fn add_episode(series: &mut Series, season_index: usize) -> Result<&Episode> {
        let si = resolve_season(series, season_index)?;
        let episodes = &mut series.seasons[si].episodes;
        if episodes.len() >= MAX_EPISODES {
            return Err(CollectionError::CapacityExceeded(format!(
                "Maximum {} episodes per season allowed",
                MAX_EPISODES
            )));
        }

        let ordinal = episodes.len() + 1;
        episodes.push(Episode::numbered(ordinal));
        Ok(&episodes[ordinal - 1])
    }

    pub async fn remove_episode(
        &self,
        series: &mut Series,
        season_index: usize,
        episode_index: usize,
    ) -> Result<Episode> {
        let (si, ei) = resolve_episode(series, season_index, episode_index)?;
        let episodes = &mut series.seasons[si].episodes;
        if episodes.len() <= 1 {
            return Err(CollectionError::MinimumCardinality(
                "Cannot delete the last episode of a season".to_string(),
            ));
        }

        self.assets.cascade_delete_episode(&episodes[ei]).await;
        Ok(episodes.remove(ei))
    }

    /// 按给定ID顺序重建媒体序列
    ///
    /// 不在列表中的媒体会从序列中移除，但其对象不会被删除。
    pub fn reorder_media(episode: &mut Episode, ordered_ids: &[String]) {
        let mut pool: HashMap<String, Media> = episode
            .media
            .drain(..)
            .map(|media| (media.id.clone(), media))
            .collect();

        episode.media = ordered_ids
            .iter()
            .filter_map(|id| pool.remove(id))
            .collect();
    }

    pub async fn remove_media(&self, episode: &mut Episode, media_id: &str) -> Result<Media> {
        let position = episode
            .media
            .iter()
            .position(|media| media.id == media_id)
            .ok_or_else(|| CollectionError::NotFound("Media not found".to_string()))?;

        self.assets
            .delete_asset(Some(episode.media[position].url.as_str()))
            .await;
        Ok(episode.media.remove(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::series::MediaKind;
    use crate::services::storage::{BlobStore, MemoryBlobStore};
    use proptest::prelude::*;
    use std::sync::Arc;

    const BASE: &str = "http://cdn.test";

    fn manager() -> (CollectionManager, Arc<MemoryBlobStore>) {
        let store = Arc::new(MemoryBlobStore::new(BASE));
        (CollectionManager::new(AssetLifecycle::new(store.clone())), store)
    }

    fn series(seasons: usize, episodes: usize) -> Series {
        Series::new("s1".into(), "Trip".into(), String::new(), seasons, episodes)
    }

    fn media(id: &str) -> Media {
        Media {
            id: id.to_string(),
            filename: format!("m/{}.jpg", id),
            original_name: format!("{}.jpg", id),
            kind: MediaKind::Image,
            url: format!("{}/m/{}.jpg", BASE, id),
        }
    }

    fn ids(episode: &Episode) -> Vec<&str> {
        episode.media.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_locate_episode_bounds() {
        let series = series(2, 3);
        assert_eq!(locate_episode(&series, 1, 2).unwrap().title, "Episode 3");
        assert!(matches!(
            locate_episode(&series, 2, 0),
            Err(CollectionError::NotFound(_))
        ));
        assert!(matches!(
            locate_episode(&series, 0, 3),
            Err(CollectionError::NotFound(_))
        ));
    }

    #[test]
    fn test_add_season_numbering_and_capacity() {
        let mut series = series(1, 1);

        let season = CollectionManager::add_season(&mut series, 4).unwrap();
        assert_eq!(season.title, "Season 2");
        assert_eq!(season.episodes.len(), 4);

        let season = CollectionManager::add_season(&mut series, 0).unwrap();
        assert_eq!(season.episodes.len(), 1);

        while series.seasons.len() < MAX_SEASONS {
            CollectionManager::add_season(&mut series, 1).unwrap();
        }
        assert!(matches!(
            CollectionManager::add_season(&mut series, 1),
            Err(CollectionError::CapacityExceeded(_))
        ));
        assert_eq!(series.seasons.len(), MAX_SEASONS);
    }

    #[test]
    fn test_add_episode() {
        let mut series = series(1, 9);

        let episode = CollectionManager::add_episode(&mut series, 0).unwrap();
        assert_eq!(episode.title, "Episode 10");

        assert!(matches!(
            CollectionManager::add_episode(&mut series, 0),
            Err(CollectionError::CapacityExceeded(_))
        ));
        assert!(matches!(
            CollectionManager::add_episode(&mut series, 1),
            Err(CollectionError::OutOfRange(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_last_season_rejected() {
        let (manager, store) = manager();
        let mut series = series(1, 1);
        let before = series.clone();

        let err = manager.remove_season(&mut series, 0).await.unwrap_err();
        assert!(matches!(err, CollectionError::MinimumCardinality(_)));
        assert_eq!(series, before);
        assert!(store.deleted_keys().is_empty());

        let err = manager.remove_season(&mut series, 5).await.unwrap_err();
        assert!(matches!(err, CollectionError::OutOfRange(_)));
    }

    #[tokio::test]
    async fn test_remove_season_cleans_every_asset() {
        let (manager, store) = manager();
        let mut series = series(2, 2);
        {
            let season = &mut series.seasons[0];
            season.episodes[0].thumbnail = Some(format!("{}/t0.png", BASE));
            season.episodes[0].media = vec![media("a"), media("b")];
            season.episodes[1].music = Some(format!("{}/song.mp3", BASE));
        }
        series.seasons[1].title = "Finale".to_string();

        let removed = manager.remove_season(&mut series, 0).await.unwrap();
        assert_eq!(removed.title, "Season 1");
        assert_eq!(series.seasons.len(), 1);
        assert_eq!(series.seasons[0].title, "Finale");
        assert_eq!(
            store.deleted_keys(),
            vec!["t0.png", "m/a.jpg", "m/b.jpg", "song.mp3"]
        );
    }

    #[tokio::test]
    async fn test_remove_episode() {
        let (manager, store) = manager();
        let mut series = series(1, 3);
        series.seasons[0].episodes[1].thumbnail = Some(format!("{}/t.png", BASE));
        series.seasons[0].episodes[2].title = "Last".to_string();

        assert!(matches!(
            manager.remove_episode(&mut series, 0, 3).await,
            Err(CollectionError::OutOfRange(_))
        ));
        assert!(matches!(
            manager.remove_episode(&mut series, 1, 0).await,
            Err(CollectionError::OutOfRange(_))
        ));

        manager.remove_episode(&mut series, 0, 1).await.unwrap();
        assert_eq!(series.seasons[0].episodes[1].title, "Last");
        assert_eq!(store.deleted_keys(), vec!["t.png"]);

        manager.remove_episode(&mut series, 0, 0).await.unwrap();
        assert!(matches!(
            manager.remove_episode(&mut series, 0, 0).await,
            Err(CollectionError::MinimumCardinality(_))
        ));
        assert_eq!(series.seasons[0].episodes.len(), 1);
    }

    #[test]
    fn test_reorder_media_drops_unlisted() {
        let mut episode = Episode::numbered(1);
        episode.media = vec![media("a"), media("b"), media("c")];

        let order = vec!["c".to_string(), "x".to_string(), "a".to_string(), "c".to_string()];
        CollectionManager::reorder_media(&mut episode, &order);

        assert_eq!(ids(&episode), vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_remove_media() {
        let (manager, store) = manager();
        let mut episode = Episode::numbered(1);
        episode.media = vec![media("a"), media("b")];
        store.put("m/a.jpg", vec![1], "image/jpeg").await.unwrap();

        let removed = manager.remove_media(&mut episode, "a").await.unwrap();
        assert_eq!(removed.id, "a");
        assert_eq!(ids(&episode), vec!["b"]);
        assert_eq!(store.deleted_keys(), vec!["m/a.jpg"]);
        assert!(!store.contains("m/a.jpg"));

        assert!(matches!(
            manager.remove_media(&mut episode, "a").await,
            Err(CollectionError::NotFound(_))
        ));
    }

    #[derive(Debug, Clone)]
    enum Op {
        AddSeason(usize),
        RemoveSeason(usize),
        AddEpisode(usize),
        RemoveEpisode(usize, usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..15).prop_map(Op::AddSeason),
            (0usize..12).prop_map(Op::RemoveSeason),
            (0usize..12).prop_map(Op::AddEpisode),
            (0usize..12, 0usize..12).prop_map(|(s, e)| Op::RemoveEpisode(s, e)),
        ]
    }

    proptest! {
        #[test]
        fn prop_cardinality_stays_in_bounds(
            seasons in 1usize..=10,
            episodes in 1usize..=10,
            ops in proptest::collection::vec(op(), 0..60),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let (manager, _store) = manager();
            let mut series = series(seasons, episodes);

            for op in ops {
                let at_one_season = series.seasons.len() == 1;
                match op {
                    Op::AddSeason(n) => {
                        let _ = CollectionManager::add_season(&mut series, n);
                    }
                    Op::RemoveSeason(si) => {
                        let result = rt.block_on(manager.remove_season(&mut series, si));
                        if at_one_season {
                            prop_assert!(result.is_err());
                        }
                    }
                    Op::AddEpisode(si) => {
                        let _ = CollectionManager::add_episode(&mut series, si);
                    }
                    Op::RemoveEpisode(si, ei) => {
                        let _ = rt.block_on(manager.remove_episode(&mut series, si, ei));
                    }
                }

                prop_assert!((1..=MAX_SEASONS).contains(&series.seasons.len()));
                for season in &series.seasons {
                    prop_assert!((1..=MAX_EPISODES).contains(&season.episodes.len()));
                }
            }
        }

        #[test]
        fn prop_reorder_is_filtered_input(order in proptest::collection::vec(0usize..8, 0..10)) {
            let mut episode = Episode::numbered(1);
            episode.media = (0..5).map(|i| media(&i.to_string())).collect();

            let order: Vec<String> = order.iter().map(|i| i.to_string()).collect();
            CollectionManager::reorder_media(&mut episode, &order);

            let mut seen = std::collections::HashSet::new();
            let expected: Vec<&str> = order
                .iter()
                .map(String::as_str)
                .filter(|id| id.parse::<usize>().map(|i| i < 5).unwrap_or(false))
                .filter(|id| seen.insert(*id))
                .collect();
            prop_assert_eq!(ids(&episode), expected);
        }
    }
}
