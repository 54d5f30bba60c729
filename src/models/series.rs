use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use validator::Validate;

/// 每个系列最多的季数
pub const MAX_SEASONS: usize = 10;

/// 每季最多的集数
pub const MAX_EPISODES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub seasons: Vec<Season>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub title: String,
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub music: Option<String>,
    #[serde(default)]
    pub music_original_name: Option<String>,
    #[serde(default)]
    pub media: Vec<Media>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: String,
    pub filename: String,
    pub original_name: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl Series {
    /// 创建一个带占位标题的空系列
    pub fn new(
        id: String,
        title: String,
        description: String,
        season_count: usize,
        episodes_per_season: usize,
    ) -> Self {
        let now = Utc::now();
        let season_count = season_count.clamp(1, MAX_SEASONS);

        Self {
            id,
            title,
            description,
            thumbnail: None,
            seasons: (1..=season_count)
                .map(|ordinal| Season::numbered(ordinal, episodes_per_season))
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Season {
    /// `Season {ordinal}`，包含 `clamp(episode_count, 1, 10)` 个新集
    pub fn numbered(ordinal: usize, episode_count: usize) -> Self {
        let episode_count = episode_count.clamp(1, MAX_EPISODES);
        Self {
            title: format!("Season {}", ordinal),
            episodes: (1..=episode_count).map(Episode::numbered).collect(),
        }
    }
}

impl Episode {
    pub fn numbered(ordinal: usize) -> Self {
        Self {
            title: format!("Episode {}", ordinal),
            thumbnail: None,
            description: String::new(),
            music: None,
            music_original_name: None,
            media: Vec::new(),
        }
    }
}

impl MediaKind {
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        if mime_type.starts_with("image/") {
            Some(Self::Image)
        } else if mime_type.starts_with("video/") {
            Some(Self::Video)
        } else {
            None
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSeriesRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    pub season_count: Option<usize>,

    pub episodes_per_season: Option<usize>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSeriesRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    /// 按位置修改季与集的文本字段
    pub seasons: Option<Vec<SeasonUpdate>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonUpdate {
    pub title: Option<String>,
    pub episodes: Option<Vec<EpisodeUpdate>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSeasonRequest {
    pub episode_count: Option<i64>,
}

impl AddSeasonRequest {
    /// 负数按0处理，之后由 `Season::numbered` 限定到 1..=10
    pub fn episode_count(&self) -> Option<usize> {
        self.episode_count
            .map(|count| usize::try_from(count).unwrap_or(0))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderMediaRequest {
    pub media_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_series_layout() {
        let series = Series::new("s1".into(), "Trip".into(), String::new(), 3, 2);

        assert_eq!(series.seasons.len(), 3);
        for (i, season) in series.seasons.iter().enumerate() {
            assert_eq!(season.title, format!("Season {}", i + 1));
            assert_eq!(season.episodes.len(), 2);
            assert_eq!(season.episodes[0].title, "Episode 1");
            assert_eq!(season.episodes[1].title, "Episode 2");
            for episode in &season.episodes {
                assert!(episode.thumbnail.is_none());
                assert!(episode.music.is_none());
                assert!(episode.music_original_name.is_none());
                assert!(episode.media.is_empty());
            }
        }
        assert!(series.thumbnail.is_none());
    }

    #[test]
    fn test_counts_are_clamped() {
        let series = Series::new("s1".into(), "Big".into(), String::new(), 42, 0);
        assert_eq!(series.seasons.len(), MAX_SEASONS);
        assert!(series.seasons.iter().all(|s| s.episodes.len() == 1));

        let season = Season::numbered(1, 99);
        assert_eq!(season.episodes.len(), MAX_EPISODES);
    }

    #[test]
    fn test_json_field_names() {
        let media = Media {
            id: "m1".into(),
            filename: "series/s1/a.png".into(),
            original_name: "a.png".into(),
            kind: MediaKind::Image,
            url: "http://localhost/uploads/series/s1/a.png".into(),
        };
        let value = serde_json::to_value(&media).unwrap();
        assert_eq!(value["originalName"], json!("a.png"));
        assert_eq!(value["type"], json!("image"));

        let episode = Episode::numbered(1);
        let value = serde_json::to_value(&episode).unwrap();
        assert_eq!(value["musicOriginalName"], serde_json::Value::Null);
        assert_eq!(value["thumbnail"], serde_json::Value::Null);
    }

    #[test]
    fn test_media_kind_from_mime() {
        assert_eq!(MediaKind::from_mime_type("image/png"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_mime_type("video/mp4"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_mime_type("audio/mpeg"), None);
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateSeriesRequest {
            title: String::new(),
            description: None,
            season_count: Some(2),
            episodes_per_season: None,
        };
        assert!(request.validate().is_err());

        let request: CreateSeriesRequest =
            serde_json::from_value(json!({ "title": "Vacation", "seasonCount": 3 })).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.season_count, Some(3));
    }
}
