use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{episode_history, prelude::*};
use crate::models::episode::HistoryEntry;

pub struct HistoryRepository {
    conn: DatabaseConnection,
}

impl HistoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        episode_id: i32,
        progress_secs: Option<i64>,
    ) -> Result<i32> {
        let active = episode_history::ActiveModel {
            user_id: Set(user_id),
            episode_id: Set(episode_id),
            listened_at: Set(chrono::Utc::now().to_rfc3339()),
            progress_secs: Set(progress_secs),
            ..Default::default()
        };
        let result = EpisodeHistory::insert(active)
            .exec(conn)
            .await
            .context("Failed to insert history entry")?;
        Ok(result.last_insert_id)
    }

    /// Commentary gate: has this user ever played this episode.
    pub async fn has_played(&self, user_id: i32, episode_id: i32) -> Result<bool> {
        let count = EpisodeHistory::find()
            .filter(episode_history::Column::UserId.eq(user_id))
            .filter(episode_history::Column::EpisodeId.eq(episode_id))
            .count(&self.conn)
            .await
            .context("Failed to check play record")?;
        Ok(count > 0)
    }

    /// Full listening history for a user, most recent first. Repeated plays
    /// of the same episode are collapsed by the service layer.
    pub async fn list_by_user(&self, user_id: i32) -> Result<Vec<HistoryEntry>> {
        let rows = EpisodeHistory::find()
            .filter(episode_history::Column::UserId.eq(user_id))
            .order_by_desc(episode_history::Column::ListenedAt)
            .order_by_desc(episode_history::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list history by user")?;
        Ok(rows.into_iter().map(HistoryEntry::from).collect())
    }

    pub async fn delete_by_episode_ids<C: ConnectionTrait>(
        conn: &C,
        episode_ids: &[i32],
    ) -> Result<u64> {
        if episode_ids.is_empty() {
            return Ok(0);
        }
        let result = EpisodeHistory::delete_many()
            .filter(episode_history::Column::EpisodeId.is_in(episode_ids.iter().copied()))
            .exec(conn)
            .await
            .context("Failed to delete history by episodes")?;
        Ok(result.rows_affected)
    }

    pub async fn delete_by_user<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<u64> {
        let result = EpisodeHistory::delete_many()
            .filter(episode_history::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .context("Failed to delete history by user")?;
        Ok(result.rows_affected)
    }
}
