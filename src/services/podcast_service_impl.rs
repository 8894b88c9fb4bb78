//! `SeaORM` implementation of the `PodcastService` trait.

use std::sync::Arc;

use sea_orm::TransactionTrait;
use tracing::info;

use crate::db::Store;
use crate::db::repositories::podcast::PodcastRepository;
use crate::db::repositories::user::UserRepository;
use crate::domain::{PodcastId, Role, UserId};
use crate::models::podcast::{Podcast, PodcastDraft, PodcastUpdate};
use crate::models::user::RoleSet;
use crate::services::authorization::can_mutate;
use crate::services::podcast_service::{PodcastError, PodcastService};

/// SeaORM-based implementation of [`PodcastService`].
#[derive(Clone)]
pub struct SeaOrmPodcastService {
    store: Arc<Store>,
}

impl SeaOrmPodcastService {
    #[must_use]
    pub const fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    async fn require_podcast(&self, podcast_id: PodcastId) -> Result<Podcast, PodcastError> {
        self.store
            .podcasts()
            .get(podcast_id.value())
            .await?
            .ok_or(PodcastError::NotFound(podcast_id))
    }
}

#[async_trait::async_trait]
impl PodcastService for SeaOrmPodcastService {
    async fn create_podcast(
        &self,
        owner: UserId,
        draft: PodcastDraft,
    ) -> Result<PodcastId, PodcastError> {
        if draft.title.trim().is_empty() {
            return Err(PodcastError::Validation("Title cannot be blank".to_string()));
        }

        if !self.store.users().exists(owner.value()).await? {
            return Err(PodcastError::OwnerNotFound(owner));
        }
        if self.store.podcasts().active_title_taken(&draft.title).await? {
            return Err(PodcastError::TitleTaken(draft.title));
        }

        // The podcast and the CREATOR grant commit together; a user is never
        // left owning content without the role that goes with it.
        let txn = self.store.conn.begin().await?;
        let podcast_id = PodcastRepository::insert(&txn, owner.value(), &draft).await?;
        let newly_creator = UserRepository::grant_role(&txn, owner.value(), Role::Creator).await?;
        txn.commit().await?;

        info!(
            podcast_id,
            owner = %owner,
            title = %draft.title,
            newly_creator,
            "Podcast created"
        );

        Ok(PodcastId::new(podcast_id))
    }

    async fn get_podcast(&self, podcast_id: PodcastId) -> Result<Podcast, PodcastError> {
        let podcast = self.require_podcast(podcast_id).await?;
        if !podcast.is_active {
            return Err(PodcastError::NotFound(podcast_id));
        }
        Ok(podcast)
    }

    async fn list_podcasts(&self) -> Result<Vec<Podcast>, PodcastError> {
        Ok(self.store.podcasts().list_active().await?)
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Podcast>, PodcastError> {
        if !self.store.users().exists(owner.value()).await? {
            return Err(PodcastError::OwnerNotFound(owner));
        }
        Ok(self.store.podcasts().list_by_owner(owner.value()).await?)
    }

    async fn update_podcast(
        &self,
        actor: UserId,
        actor_roles: &RoleSet,
        podcast_id: PodcastId,
        updates: PodcastUpdate,
    ) -> Result<(), PodcastError> {
        let usable = |field: &Option<String>| {
            field.as_deref().is_some_and(|v| !v.trim().is_empty())
        };
        if !usable(&updates.title) && !usable(&updates.description) && updates.categories.is_none()
        {
            return Err(PodcastError::Validation("No fields to update".to_string()));
        }

        let podcast = self.require_podcast(podcast_id).await?;
        if !can_mutate(actor, UserId::new(podcast.owner_id), actor_roles) {
            return Err(PodcastError::Unauthorized(format!(
                "User {actor} may not modify podcast {podcast_id}"
            )));
        }

        let title = updates.title.filter(|t| !t.trim().is_empty());
        if let Some(ref title) = title
            && *title != podcast.title
            && self.store.podcasts().active_title_taken(title).await?
        {
            return Err(PodcastError::TitleTaken(title.clone()));
        }

        // Field changes and category replacement commit together; a failed
        // category insert must not leave the podcast with its list cleared.
        let txn = self.store.conn.begin().await?;
        PodcastRepository::update(
            &txn,
            podcast_id.value(),
            title,
            updates.description.filter(|d| !d.trim().is_empty()),
            updates.categories,
        )
        .await?;
        txn.commit().await?;

        Ok(())
    }

    async fn deactivate_podcast(
        &self,
        actor: UserId,
        actor_roles: &RoleSet,
        podcast_id: PodcastId,
    ) -> Result<(), PodcastError> {
        let podcast = self.require_podcast(podcast_id).await?;
        if !can_mutate(actor, UserId::new(podcast.owner_id), actor_roles) {
            return Err(PodcastError::Unauthorized(format!(
                "User {actor} may not deactivate podcast {podcast_id}"
            )));
        }

        self.store
            .podcasts()
            .set_active(podcast_id.value(), false)
            .await?;

        info!(podcast_id = %podcast_id, actor = %actor, "Podcast deactivated");

        Ok(())
    }
}
