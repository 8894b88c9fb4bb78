use crate::entities::podcasts;

#[derive(Debug, Clone)]
pub struct Podcast {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub is_active: bool,
    pub owner_id: i32,
    pub categories: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Podcast {
    #[must_use]
    pub fn from_model(model: podcasts::Model, categories: Vec<String>) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            is_active: model.is_active,
            owner_id: model.user_id,
            categories,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PodcastDraft {
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
}

/// Partial podcast update; blank fields are ignored.
#[derive(Debug, Clone, Default)]
pub struct PodcastUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
}
