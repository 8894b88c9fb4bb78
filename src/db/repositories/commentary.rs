use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{commentaries, prelude::*};
use crate::models::episode::Commentary;

pub struct CommentaryRepository {
    conn: DatabaseConnection,
}

impl CommentaryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, user_id: i32, episode_id: i32, content: &str) -> Result<i32> {
        let active = commentaries::ActiveModel {
            user_id: Set(user_id),
            episode_id: Set(episode_id),
            content: Set(content.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        let result = Commentaries::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to insert commentary")?;
        Ok(result.last_insert_id)
    }

    pub async fn list_by_episode(&self, episode_id: i32) -> Result<Vec<Commentary>> {
        let rows = Commentaries::find()
            .filter(commentaries::Column::EpisodeId.eq(episode_id))
            .order_by_asc(commentaries::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list commentaries")?;
        Ok(rows.into_iter().map(Commentary::from).collect())
    }

    pub async fn delete_by_episode_ids<C: ConnectionTrait>(
        conn: &C,
        episode_ids: &[i32],
    ) -> Result<u64> {
        if episode_ids.is_empty() {
            return Ok(0);
        }
        let result = Commentaries::delete_many()
            .filter(commentaries::Column::EpisodeId.is_in(episode_ids.iter().copied()))
            .exec(conn)
            .await
            .context("Failed to delete commentaries by episodes")?;
        Ok(result.rows_affected)
    }

    pub async fn delete_by_user<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<u64> {
        let result = Commentaries::delete_many()
            .filter(commentaries::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .context("Failed to delete commentaries by user")?;
        Ok(result.rows_affected)
    }
}
