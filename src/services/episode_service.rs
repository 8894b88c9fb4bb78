//! Domain service for episode content operations.
//!
//! This module provides the [`EpisodeService`] trait, covering episode
//! appends (with the sequencing invariant), play tracking, commentary,
//! and guarded mutation.

use crate::domain::{EpisodeId, PodcastId, UserId};
use crate::models::episode::{Commentary, Episode, EpisodeDraft, EpisodeUpdate};
use crate::models::user::RoleSet;
use crate::services::sequencing::SequenceViolation;
use thiserror::Error;

/// Domain errors for episode operations.
#[derive(Debug, Error)]
pub enum EpisodeError {
    #[error("Podcast {0} not found")]
    PodcastNotFound(PodcastId),

    #[error("Episode {0} not found")]
    NotFound(EpisodeId),

    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error(transparent)]
    InvalidSequence(#[from] SequenceViolation),

    #[error("User {user} has no play record for episode {episode}")]
    NotListened { user: UserId, episode: EpisodeId },

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for EpisodeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for EpisodeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Domain service trait for episode operations.
#[async_trait::async_trait]
pub trait EpisodeService: Send + Sync {
    /// Appends an episode to a podcast.
    ///
    /// The candidate's (season, chapter) is validated against the podcast's
    /// most recently created episode inside the insert transaction, so a
    /// concurrent append cannot slip past the sequencing invariant.
    ///
    /// # Errors
    ///
    /// - Returns [`EpisodeError::PodcastNotFound`] if the podcast does not exist
    /// - Returns [`EpisodeError::InvalidSequence`] if the position does not
    ///   strictly follow the latest episode
    /// - Returns [`EpisodeError::Database`] on connection failures
    async fn append_episode(
        &self,
        podcast_id: PodcastId,
        draft: EpisodeDraft,
    ) -> Result<EpisodeId, EpisodeError>;

    /// Gets a single episode.
    ///
    /// # Errors
    ///
    /// - Returns [`EpisodeError::NotFound`] if the episode does not exist
    /// - Returns [`EpisodeError::Database`] on connection failures
    async fn get_episode(&self, episode_id: EpisodeId) -> Result<Episode, EpisodeError>;

    /// Lists a podcast's episodes ordered by (season, chapter).
    ///
    /// # Errors
    ///
    /// - Returns [`EpisodeError::PodcastNotFound`] if the podcast does not exist
    /// - Returns [`EpisodeError::Database`] on connection failures
    async fn list_episodes(&self, podcast_id: PodcastId) -> Result<Vec<Episode>, EpisodeError>;

    /// Applies a partial update; creator-or-admin only.
    ///
    /// # Errors
    ///
    /// - Returns [`EpisodeError::NotFound`] if the episode does not exist
    /// - Returns [`EpisodeError::Unauthorized`] if the actor is neither the
    ///   podcast owner nor an admin
    /// - Returns [`EpisodeError::Validation`] if no usable field was provided
    /// - Returns [`EpisodeError::Database`] on connection failures
    async fn update_episode(
        &self,
        actor: UserId,
        actor_roles: &RoleSet,
        episode_id: EpisodeId,
        updates: EpisodeUpdate,
    ) -> Result<(), EpisodeError>;

    /// Hard-deletes an episode and its dependent commentaries, ratings, and
    /// history rows in one transaction; creator-or-admin only.
    ///
    /// # Errors
    ///
    /// - Returns [`EpisodeError::NotFound`] if the episode does not exist
    /// - Returns [`EpisodeError::Unauthorized`] if the actor is neither the
    ///   podcast owner nor an admin
    /// - Returns [`EpisodeError::Database`] on connection failures
    async fn delete_episode(
        &self,
        actor: UserId,
        actor_roles: &RoleSet,
        episode_id: EpisodeId,
    ) -> Result<(), EpisodeError>;

    /// Records a "listened" event and bumps the episode's view counter in
    /// one transaction.
    ///
    /// # Errors
    ///
    /// - Returns [`EpisodeError::UserNotFound`] / [`EpisodeError::NotFound`]
    ///   if either side of the pair is missing
    /// - Returns [`EpisodeError::Database`] on connection failures
    async fn record_play(
        &self,
        user_id: UserId,
        episode_id: EpisodeId,
        progress_secs: Option<i64>,
    ) -> Result<(), EpisodeError>;

    /// Adds a commentary. Gated: the user must have a play record for the
    /// episode.
    ///
    /// # Errors
    ///
    /// - Returns [`EpisodeError::NotListened`] if the user never played the episode
    /// - Returns [`EpisodeError::Validation`] if the text is blank or over the
    ///   configured length bound
    /// - Returns [`EpisodeError::Database`] on connection failures
    async fn comment_episode(
        &self,
        user_id: UserId,
        episode_id: EpisodeId,
        content: &str,
    ) -> Result<i32, EpisodeError>;

    /// Lists an episode's commentaries, oldest first.
    ///
    /// # Errors
    ///
    /// - Returns [`EpisodeError::NotFound`] if the episode does not exist
    /// - Returns [`EpisodeError::Database`] on connection failures
    async fn get_comments(&self, episode_id: EpisodeId) -> Result<Vec<Commentary>, EpisodeError>;
}
