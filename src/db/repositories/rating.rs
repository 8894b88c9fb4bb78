use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};

use crate::entities::{prelude::*, ratings};

pub struct RatingRepository {
    conn: DatabaseConnection,
}

impl RatingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_user_and_episode<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        episode_id: i32,
    ) -> Result<Option<ratings::Model>> {
        Ratings::find()
            .filter(ratings::Column::UserId.eq(user_id))
            .filter(ratings::Column::EpisodeId.eq(episode_id))
            .one(conn)
            .await
            .context("Failed to query rating by (user, episode)")
    }

    /// Insert-or-update on the (user, episode) pair. A second rating by the
    /// same user overwrites the score and re-stamps `rated_at` rather than
    /// inserting a second row.
    pub async fn upsert<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        episode_id: i32,
        score: i32,
    ) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        if let Some(existing) = Self::find_by_user_and_episode(conn, user_id, episode_id).await? {
            let mut active: ratings::ActiveModel = existing.into();
            active.score = Set(score);
            active.rated_at = Set(now);
            active
                .update(conn)
                .await
                .context("Failed to update rating")?;
        } else {
            let active = ratings::ActiveModel {
                user_id: Set(user_id),
                episode_id: Set(episode_id),
                score: Set(score),
                rated_at: Set(now),
                ..Default::default()
            };
            Ratings::insert(active)
                .exec(conn)
                .await
                .context("Failed to insert rating")?;
        }

        Ok(())
    }

    pub async fn scores_for_episode<C: ConnectionTrait>(
        conn: &C,
        episode_id: i32,
    ) -> Result<Vec<i32>> {
        let rows = Ratings::find()
            .filter(ratings::Column::EpisodeId.eq(episode_id))
            .all(conn)
            .await
            .context("Failed to query ratings for episode")?;
        Ok(rows.into_iter().map(|row| row.score).collect())
    }

    /// Episode ids (among the given set) that carry at least one rating.
    pub async fn rated_episode_ids(&self, episode_ids: &[i32]) -> Result<Vec<i32>> {
        if episode_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = Ratings::find()
            .filter(ratings::Column::EpisodeId.is_in(episode_ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query rated episodes")?;

        let mut ids: Vec<i32> = rows.into_iter().map(|row| row.episode_id).collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    pub async fn delete_by_episode_ids<C: ConnectionTrait>(
        conn: &C,
        episode_ids: &[i32],
    ) -> Result<u64> {
        if episode_ids.is_empty() {
            return Ok(0);
        }
        let result = Ratings::delete_many()
            .filter(ratings::Column::EpisodeId.is_in(episode_ids.iter().copied()))
            .exec(conn)
            .await
            .context("Failed to delete ratings by episodes")?;
        Ok(result.rows_affected)
    }

    pub async fn delete_by_user<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<u64> {
        let result = Ratings::delete_many()
            .filter(ratings::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .context("Failed to delete ratings by user")?;
        Ok(result.rows_affected)
    }
}
