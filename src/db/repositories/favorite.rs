use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
};

use crate::entities::{favorites, prelude::*};

pub struct FavoriteRepository {
    conn: DatabaseConnection,
}

impl FavoriteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn exists(&self, user_id: i32, podcast_id: i32) -> Result<bool> {
        let count = Favorites::find_by_id((user_id, podcast_id))
            .count(&self.conn)
            .await
            .context("Failed to check favorite membership")?;
        Ok(count > 0)
    }

    pub async fn insert(&self, user_id: i32, podcast_id: i32) -> Result<()> {
        let active = favorites::ActiveModel {
            user_id: Set(user_id),
            podcast_id: Set(podcast_id),
        };
        Favorites::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to insert favorite")?;
        Ok(())
    }

    pub async fn remove(&self, user_id: i32, podcast_id: i32) -> Result<u64> {
        let result = Favorites::delete_by_id((user_id, podcast_id))
            .exec(&self.conn)
            .await
            .context("Failed to remove favorite")?;
        Ok(result.rows_affected)
    }

    pub async fn podcast_ids_by_user(&self, user_id: i32) -> Result<Vec<i32>> {
        let rows = Favorites::find()
            .filter(favorites::Column::UserId.eq(user_id))
            .all(&self.conn)
            .await
            .context("Failed to list favorites by user")?;
        Ok(rows.into_iter().map(|row| row.podcast_id).collect())
    }

    /// Removes every user's favorite rows pointing at the given podcasts.
    /// Crosses ownership boundaries on purpose: when an owner is deleted,
    /// other users' favorites of those podcasts must go too.
    pub async fn delete_by_podcast_ids<C: ConnectionTrait>(
        conn: &C,
        podcast_ids: &[i32],
    ) -> Result<u64> {
        if podcast_ids.is_empty() {
            return Ok(0);
        }
        let result = Favorites::delete_many()
            .filter(favorites::Column::PodcastId.is_in(podcast_ids.iter().copied()))
            .exec(conn)
            .await
            .context("Failed to delete favorites by podcasts")?;
        Ok(result.rows_affected)
    }

    pub async fn delete_by_user<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<u64> {
        let result = Favorites::delete_many()
            .filter(favorites::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .context("Failed to delete favorites by user")?;
        Ok(result.rows_affected)
    }
}
