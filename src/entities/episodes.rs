use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "episodes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub podcast_id: i32,

    pub title: String,

    pub description: String,

    /// Season number, >= 1. Strictly ordered together with chapter by
    /// creation time within a podcast.
    pub season: i32,

    /// Chapter number, >= 1. Resets to 1 when the season advances.
    pub chapter: i32,

    pub audio_path: String,

    pub image_url: Option<String>,

    pub duration_secs: Option<i64>,

    pub views: i64,

    /// Derived: arithmetic mean of this episode's rating scores.
    /// Recomputed inside the same transaction as each rating write.
    pub average_rating: f64,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::podcasts::Entity",
        from = "Column::PodcastId",
        to = "super::podcasts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Podcasts,
    #[sea_orm(has_many = "super::commentaries::Entity")]
    Commentaries,
    #[sea_orm(has_many = "super::ratings::Entity")]
    Ratings,
    #[sea_orm(has_many = "super::episode_history::Entity")]
    EpisodeHistory,
}

impl Related<super::podcasts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Podcasts.def()
    }
}

impl Related<super::commentaries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Commentaries.def()
    }
}

impl Related<super::ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl Related<super::episode_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EpisodeHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
