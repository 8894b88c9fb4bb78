use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{episodes, prelude::*};
use crate::models::episode::{Episode, EpisodeDraft};

pub struct EpisodeRepository {
    conn: DatabaseConnection,
}

impl EpisodeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<Episode>> {
        let episode = Episodes::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query episode by id")?;
        Ok(episode.map(Episode::from))
    }

    pub async fn list_by_podcast(&self, podcast_id: i32) -> Result<Vec<Episode>> {
        let rows = Episodes::find()
            .filter(episodes::Column::PodcastId.eq(podcast_id))
            .order_by_asc(episodes::Column::Season)
            .order_by_asc(episodes::Column::Chapter)
            .all(&self.conn)
            .await
            .context("Failed to list episodes by podcast")?;
        Ok(rows.into_iter().map(Episode::from).collect())
    }

    /// Most recently created episode of a podcast; the sequencing anchor.
    /// Ties on `created_at` break by highest id so the result is
    /// deterministic even when two rows share a timestamp.
    pub async fn latest_of_podcast<C: ConnectionTrait>(
        conn: &C,
        podcast_id: i32,
    ) -> Result<Option<Episode>> {
        let episode = Episodes::find()
            .filter(episodes::Column::PodcastId.eq(podcast_id))
            .order_by_desc(episodes::Column::CreatedAt)
            .order_by_desc(episodes::Column::Id)
            .one(conn)
            .await
            .context("Failed to query latest episode")?;
        Ok(episode.map(Episode::from))
    }

    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        podcast_id: i32,
        draft: &EpisodeDraft,
    ) -> Result<i32> {
        let active = episodes::ActiveModel {
            podcast_id: Set(podcast_id),
            title: Set(draft.title.clone()),
            description: Set(draft.description.clone()),
            season: Set(draft.season),
            chapter: Set(draft.chapter),
            audio_path: Set(draft.audio_path.clone()),
            image_url: Set(draft.image_url.clone()),
            duration_secs: Set(draft.duration_secs),
            views: Set(0),
            average_rating: Set(0.0),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let inserted = active
            .insert(conn)
            .await
            .context("Failed to insert episode")?;
        Ok(inserted.id)
    }

    pub async fn update(
        &self,
        id: i32,
        title: Option<String>,
        description: Option<String>,
        image_url: Option<String>,
    ) -> Result<()> {
        let episode = Episodes::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query episode for update")?
            .ok_or_else(|| anyhow::anyhow!("Episode not found: {id}"))?;

        let mut active: episodes::ActiveModel = episode.into();
        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(description) = description {
            active.description = Set(description);
        }
        if let Some(image_url) = image_url {
            active.image_url = Set(Some(image_url));
        }
        active
            .update(&self.conn)
            .await
            .context("Failed to update episode")?;
        Ok(())
    }

    pub async fn ids_by_podcast_ids<C: ConnectionTrait>(
        conn: &C,
        podcast_ids: &[i32],
    ) -> Result<Vec<i32>> {
        if podcast_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = Episodes::find()
            .filter(episodes::Column::PodcastId.is_in(podcast_ids.iter().copied()))
            .all(conn)
            .await
            .context("Failed to query episode ids by podcasts")?;
        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    pub async fn increment_views<C: ConnectionTrait>(conn: &C, id: i32) -> Result<()> {
        use sea_orm::sea_query::Expr;

        Episodes::update_many()
            .col_expr(
                episodes::Column::Views,
                Expr::col(episodes::Column::Views).add(1),
            )
            .filter(episodes::Column::Id.eq(id))
            .exec(conn)
            .await
            .context("Failed to increment episode views")?;
        Ok(())
    }

    pub async fn set_average_rating<C: ConnectionTrait>(
        conn: &C,
        id: i32,
        average: f64,
    ) -> Result<()> {
        Episodes::update_many()
            .col_expr(
                episodes::Column::AverageRating,
                sea_orm::sea_query::Expr::value(average),
            )
            .filter(episodes::Column::Id.eq(id))
            .exec(conn)
            .await
            .context("Failed to persist episode average rating")?;
        Ok(())
    }

    pub async fn delete_by_podcast_ids<C: ConnectionTrait>(
        conn: &C,
        podcast_ids: &[i32],
    ) -> Result<u64> {
        if podcast_ids.is_empty() {
            return Ok(0);
        }
        let result = Episodes::delete_many()
            .filter(episodes::Column::PodcastId.is_in(podcast_ids.iter().copied()))
            .exec(conn)
            .await
            .context("Failed to delete episodes by podcasts")?;
        Ok(result.rows_affected)
    }

    pub async fn delete_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<u64> {
        let result = Episodes::delete_by_id(id)
            .exec(conn)
            .await
            .context("Failed to delete episode")?;
        Ok(result.rows_affected)
    }
}
