//! `SeaORM` implementation of the `EpisodeService` trait.
//!
//! Appends and play recording run inside transactions; sqlite's single
//! writer serializes them, so the sequencing check and the insert it
//! guards cannot interleave with a concurrent append.

use std::sync::Arc;

use sea_orm::TransactionTrait;
use tracing::{debug, info};

use crate::config::ContentConfig;
use crate::db::Store;
use crate::db::repositories::commentary::CommentaryRepository;
use crate::db::repositories::episode::EpisodeRepository;
use crate::db::repositories::history::HistoryRepository;
use crate::db::repositories::rating::RatingRepository;
use crate::domain::{EpisodeId, PodcastId, UserId};
use crate::models::episode::{Commentary, Episode, EpisodeDraft, EpisodeUpdate};
use crate::models::user::RoleSet;
use crate::services::authorization::can_mutate;
use crate::services::episode_service::{EpisodeError, EpisodeService};
use crate::services::sequencing::{SeasonChapter, validate_append};

/// SeaORM-based implementation of [`EpisodeService`].
#[derive(Clone)]
pub struct SeaOrmEpisodeService {
    store: Arc<Store>,
    content: ContentConfig,
}

impl SeaOrmEpisodeService {
    #[must_use]
    pub const fn new(store: Arc<Store>, content: ContentConfig) -> Self {
        Self { store, content }
    }

    /// The owning user of the episode's podcast, for mutation guards.
    async fn owner_of(&self, episode: &Episode) -> Result<UserId, EpisodeError> {
        let podcast = self
            .store
            .podcasts()
            .get(episode.podcast_id)
            .await?
            .ok_or_else(|| EpisodeError::PodcastNotFound(PodcastId::new(episode.podcast_id)))?;
        Ok(UserId::new(podcast.owner_id))
    }
}

#[async_trait::async_trait]
impl EpisodeService for SeaOrmEpisodeService {
    async fn append_episode(
        &self,
        podcast_id: PodcastId,
        draft: EpisodeDraft,
    ) -> Result<EpisodeId, EpisodeError> {
        let id = podcast_id.value();

        let _podcast = self
            .store
            .podcasts()
            .get(id)
            .await?
            .ok_or(EpisodeError::PodcastNotFound(podcast_id))?;

        // The "latest episode" lookup and the insert share one transaction;
        // two concurrent appends both claiming the next slot cannot both
        // validate against the same anchor.
        let txn = self.store.conn.begin().await?;

        let last = EpisodeRepository::latest_of_podcast(&txn, id)
            .await?
            .map(|episode| SeasonChapter::new(episode.season, episode.chapter));
        let candidate = SeasonChapter::new(draft.season, draft.chapter);
        validate_append(last, candidate)?;

        let episode_id = EpisodeRepository::insert(&txn, id, &draft).await?;

        txn.commit().await?;

        info!(
            podcast_id = id,
            episode_id,
            position = %candidate,
            "Episode appended"
        );

        Ok(EpisodeId::new(episode_id))
    }

    async fn get_episode(&self, episode_id: EpisodeId) -> Result<Episode, EpisodeError> {
        self.store
            .episodes()
            .get(episode_id.value())
            .await?
            .ok_or(EpisodeError::NotFound(episode_id))
    }

    async fn list_episodes(&self, podcast_id: PodcastId) -> Result<Vec<Episode>, EpisodeError> {
        let id = podcast_id.value();

        let _podcast = self
            .store
            .podcasts()
            .get(id)
            .await?
            .ok_or(EpisodeError::PodcastNotFound(podcast_id))?;

        Ok(self.store.episodes().list_by_podcast(id).await?)
    }

    async fn update_episode(
        &self,
        actor: UserId,
        actor_roles: &RoleSet,
        episode_id: EpisodeId,
        updates: EpisodeUpdate,
    ) -> Result<(), EpisodeError> {
        if updates.is_empty() {
            return Err(EpisodeError::Validation(
                "No fields to update".to_string(),
            ));
        }

        let episode = self.get_episode(episode_id).await?;
        let owner = self.owner_of(&episode).await?;
        if !can_mutate(actor, owner, actor_roles) {
            return Err(EpisodeError::Unauthorized(format!(
                "User {actor} may not modify episode {episode_id}"
            )));
        }

        let usable = |field: Option<String>| field.filter(|v| !v.trim().is_empty());
        self.store
            .episodes()
            .update(
                episode_id.value(),
                usable(updates.title),
                usable(updates.description),
                usable(updates.image_url),
            )
            .await?;

        Ok(())
    }

    async fn delete_episode(
        &self,
        actor: UserId,
        actor_roles: &RoleSet,
        episode_id: EpisodeId,
    ) -> Result<(), EpisodeError> {
        let episode = self.get_episode(episode_id).await?;
        let owner = self.owner_of(&episode).await?;
        if !can_mutate(actor, owner, actor_roles) {
            return Err(EpisodeError::Unauthorized(format!(
                "User {actor} may not delete episode {episode_id}"
            )));
        }

        let id = episode_id.value();
        let dependents = [id];

        let txn = self.store.conn.begin().await?;
        CommentaryRepository::delete_by_episode_ids(&txn, &dependents).await?;
        RatingRepository::delete_by_episode_ids(&txn, &dependents).await?;
        HistoryRepository::delete_by_episode_ids(&txn, &dependents).await?;
        EpisodeRepository::delete_by_id(&txn, id).await?;
        txn.commit().await?;

        info!(episode_id = id, podcast_id = episode.podcast_id, "Episode deleted");

        Ok(())
    }

    async fn record_play(
        &self,
        user_id: UserId,
        episode_id: EpisodeId,
        progress_secs: Option<i64>,
    ) -> Result<(), EpisodeError> {
        if !self.store.users().exists(user_id.value()).await? {
            return Err(EpisodeError::UserNotFound(user_id));
        }
        let _episode = self.get_episode(episode_id).await?;

        // History row and view counter move together.
        let txn = self.store.conn.begin().await?;
        HistoryRepository::insert(&txn, user_id.value(), episode_id.value(), progress_secs)
            .await?;
        EpisodeRepository::increment_views(&txn, episode_id.value()).await?;
        txn.commit().await?;

        debug!(user_id = %user_id, episode_id = %episode_id, "Play recorded");

        Ok(())
    }

    async fn comment_episode(
        &self,
        user_id: UserId,
        episode_id: EpisodeId,
        content: &str,
    ) -> Result<i32, EpisodeError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(EpisodeError::Validation(
                "Commentary cannot be blank".to_string(),
            ));
        }
        if trimmed.chars().count() > self.content.commentary_max_chars {
            return Err(EpisodeError::Validation(format!(
                "Commentary exceeds {} characters",
                self.content.commentary_max_chars
            )));
        }

        if !self.store.users().exists(user_id.value()).await? {
            return Err(EpisodeError::UserNotFound(user_id));
        }
        let _episode = self.get_episode(episode_id).await?;

        if !self
            .store
            .history()
            .has_played(user_id.value(), episode_id.value())
            .await?
        {
            return Err(EpisodeError::NotListened {
                user: user_id,
                episode: episode_id,
            });
        }

        let commentary_id = self
            .store
            .commentaries()
            .insert(user_id.value(), episode_id.value(), trimmed)
            .await?;

        Ok(commentary_id)
    }

    async fn get_comments(&self, episode_id: EpisodeId) -> Result<Vec<Commentary>, EpisodeError> {
        let _episode = self.get_episode(episode_id).await?;
        Ok(self
            .store
            .commentaries()
            .list_by_episode(episode_id.value())
            .await?)
    }
}
