use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{podcast_categories, podcasts, prelude::*};
use crate::models::podcast::{Podcast, PodcastDraft};

pub struct PodcastRepository {
    conn: DatabaseConnection,
}

impl PodcastRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn categories_of(&self, podcast_id: i32) -> Result<Vec<String>> {
        let rows = PodcastCategories::find()
            .filter(podcast_categories::Column::PodcastId.eq(podcast_id))
            .all(&self.conn)
            .await
            .context("Failed to query podcast categories")?;
        Ok(rows.into_iter().map(|row| row.category).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<Podcast>> {
        let Some(model) = Podcasts::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query podcast by id")?
        else {
            return Ok(None);
        };

        let categories = self.categories_of(model.id).await?;
        Ok(Some(Podcast::from_model(model, categories)))
    }

    pub async fn list_active(&self) -> Result<Vec<Podcast>> {
        let rows = Podcasts::find()
            .filter(podcasts::Column::IsActive.eq(true))
            .order_by_asc(podcasts::Column::Title)
            .all(&self.conn)
            .await
            .context("Failed to list active podcasts")?;

        let mut podcasts = Vec::with_capacity(rows.len());
        for model in rows {
            let categories = self.categories_of(model.id).await?;
            podcasts.push(Podcast::from_model(model, categories));
        }
        Ok(podcasts)
    }

    pub async fn list_by_owner(&self, user_id: i32) -> Result<Vec<Podcast>> {
        let rows = Podcasts::find()
            .filter(podcasts::Column::UserId.eq(user_id))
            .order_by_asc(podcasts::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list podcasts by owner")?;

        let mut podcasts = Vec::with_capacity(rows.len());
        for model in rows {
            let categories = self.categories_of(model.id).await?;
            podcasts.push(Podcast::from_model(model, categories));
        }
        Ok(podcasts)
    }

    pub async fn models_by_owner<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
    ) -> Result<Vec<podcasts::Model>> {
        Podcasts::find()
            .filter(podcasts::Column::UserId.eq(user_id))
            .all(conn)
            .await
            .context("Failed to query podcasts by owner")
    }

    /// Uniqueness is scoped to active podcasts: a soft-deleted podcast does
    /// not reserve its title.
    pub async fn active_title_taken(&self, title: &str) -> Result<bool> {
        let count = Podcasts::find()
            .filter(podcasts::Column::Title.eq(title))
            .filter(podcasts::Column::IsActive.eq(true))
            .count(&self.conn)
            .await
            .context("Failed to check podcast title uniqueness")?;
        Ok(count > 0)
    }

    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        owner_id: i32,
        draft: &PodcastDraft,
    ) -> Result<i32> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = podcasts::ActiveModel {
            title: Set(draft.title.clone()),
            description: Set(draft.description.clone()),
            is_active: Set(true),
            user_id: Set(owner_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = active
            .insert(conn)
            .await
            .context("Failed to insert podcast")?;

        for category in &draft.categories {
            let row = podcast_categories::ActiveModel {
                podcast_id: Set(inserted.id),
                category: Set(category.clone()),
            };
            PodcastCategories::insert(row)
                .exec(conn)
                .await
                .context("Failed to insert podcast category")?;
        }

        Ok(inserted.id)
    }

    /// Row update plus full category replacement. Callers run this on a
    /// transaction so a failed category re-insert rolls back the clear.
    pub async fn update<C: ConnectionTrait>(
        conn: &C,
        id: i32,
        title: Option<String>,
        description: Option<String>,
        categories: Option<Vec<String>>,
    ) -> Result<()> {
        let podcast = Podcasts::find_by_id(id)
            .one(conn)
            .await
            .context("Failed to query podcast for update")?
            .ok_or_else(|| anyhow::anyhow!("Podcast not found: {id}"))?;

        let mut active: podcasts::ActiveModel = podcast.into();
        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(description) = description {
            active.description = Set(description);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(conn)
            .await
            .context("Failed to update podcast")?;

        if let Some(categories) = categories {
            PodcastCategories::delete_many()
                .filter(podcast_categories::Column::PodcastId.eq(id))
                .exec(conn)
                .await
                .context("Failed to clear podcast categories")?;
            for category in categories {
                let row = podcast_categories::ActiveModel {
                    podcast_id: Set(id),
                    category: Set(category),
                };
                PodcastCategories::insert(row)
                    .exec(conn)
                    .await
                    .context("Failed to insert podcast category")?;
            }
        }

        Ok(())
    }

    /// Owner-initiated "delete": logical only.
    pub async fn set_active(&self, id: i32, is_active: bool) -> Result<()> {
        Podcasts::update_many()
            .col_expr(
                podcasts::Column::IsActive,
                sea_orm::sea_query::Expr::value(is_active),
            )
            .col_expr(
                podcasts::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(podcasts::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to toggle podcast active flag")?;
        Ok(())
    }

    // Cascade steps, composed into the deletion orchestrator's transaction.

    pub async fn delete_categories_by_podcast_ids<C: ConnectionTrait>(
        conn: &C,
        podcast_ids: &[i32],
    ) -> Result<u64> {
        if podcast_ids.is_empty() {
            return Ok(0);
        }
        let result = PodcastCategories::delete_many()
            .filter(podcast_categories::Column::PodcastId.is_in(podcast_ids.iter().copied()))
            .exec(conn)
            .await
            .context("Failed to delete category associations")?;
        Ok(result.rows_affected)
    }

    pub async fn delete_by_owner<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<u64> {
        let result = Podcasts::delete_many()
            .filter(podcasts::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .context("Failed to delete podcasts by owner")?;
        Ok(result.rows_affected)
    }
}
