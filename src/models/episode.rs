use crate::entities::{commentaries, episode_history, episodes};

#[derive(Debug, Clone)]
pub struct Episode {
    pub id: i32,
    pub podcast_id: i32,
    pub title: String,
    pub description: String,
    pub season: i32,
    pub chapter: i32,
    pub audio_path: String,
    pub image_url: Option<String>,
    pub duration_secs: Option<i64>,
    pub views: i64,
    pub average_rating: f64,
    pub created_at: String,
}

impl From<episodes::Model> for Episode {
    fn from(model: episodes::Model) -> Self {
        Self {
            id: model.id,
            podcast_id: model.podcast_id,
            title: model.title,
            description: model.description,
            season: model.season,
            chapter: model.chapter,
            audio_path: model.audio_path,
            image_url: model.image_url,
            duration_secs: model.duration_secs,
            views: model.views,
            average_rating: model.average_rating,
            created_at: model.created_at,
        }
    }
}

/// Candidate episode for [`crate::services::EpisodeService::append_episode`].
/// Season and chapter are validated against the podcast's most recently
/// created episode before insertion.
#[derive(Debug, Clone)]
pub struct EpisodeDraft {
    pub title: String,
    pub description: String,
    pub season: i32,
    pub chapter: i32,
    pub audio_path: String,
    pub image_url: Option<String>,
    pub duration_secs: Option<i64>,
}

/// Partial episode update; blank fields are ignored.
#[derive(Debug, Clone, Default)]
pub struct EpisodeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl EpisodeUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let usable = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.trim().is_empty());
        !(usable(&self.title) || usable(&self.description) || usable(&self.image_url))
    }
}

#[derive(Debug, Clone)]
pub struct Commentary {
    pub id: i32,
    pub user_id: i32,
    pub episode_id: i32,
    pub content: String,
    pub created_at: String,
}

impl From<commentaries::Model> for Commentary {
    fn from(model: commentaries::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            episode_id: model.episode_id,
            content: model.content,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: i32,
    pub user_id: i32,
    pub episode_id: i32,
    pub listened_at: String,
    pub progress_secs: Option<i64>,
}

impl From<episode_history::Model> for HistoryEntry {
    fn from(model: episode_history::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            episode_id: model.episode_id,
            listened_at: model.listened_at,
            progress_secs: model.progress_secs,
        }
    }
}
