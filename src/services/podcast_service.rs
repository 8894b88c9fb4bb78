//! Domain service for podcast lifecycle operations.

use crate::domain::{PodcastId, UserId};
use crate::models::podcast::{Podcast, PodcastDraft, PodcastUpdate};
use crate::models::user::RoleSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PodcastError {
    #[error("Podcast {0} not found")]
    NotFound(PodcastId),

    #[error("User {0} not found")]
    OwnerNotFound(UserId),

    #[error("An active podcast titled '{0}' already exists")]
    TitleTaken(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for PodcastError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PodcastError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Podcast lifecycle. Deletion here is logical only; the physical cascade
/// belongs to account deletion on [`crate::services::UserService`].
#[async_trait::async_trait]
pub trait PodcastService: Send + Sync {
    /// Creates a podcast owned by `owner`. On success the owner is granted
    /// the CREATOR role; granting it again on later podcasts is a no-op.
    ///
    /// # Errors
    ///
    /// - Returns [`PodcastError::OwnerNotFound`] if the owner does not exist
    /// - Returns [`PodcastError::TitleTaken`] if an active podcast already
    ///   uses the title
    /// - Returns [`PodcastError::Validation`] if the title is blank
    /// - Returns [`PodcastError::Database`] on connection failures
    async fn create_podcast(
        &self,
        owner: UserId,
        draft: PodcastDraft,
    ) -> Result<PodcastId, PodcastError>;

    /// Gets an active podcast. Deactivated podcasts read as absent here;
    /// owners see theirs through [`Self::list_by_owner`].
    ///
    /// # Errors
    ///
    /// - Returns [`PodcastError::NotFound`] if the podcast does not exist
    ///   or is inactive
    /// - Returns [`PodcastError::Database`] on connection failures
    async fn get_podcast(&self, podcast_id: PodcastId) -> Result<Podcast, PodcastError>;

    /// Lists all active podcasts, ordered by title.
    ///
    /// # Errors
    ///
    /// - Returns [`PodcastError::Database`] on connection failures
    async fn list_podcasts(&self) -> Result<Vec<Podcast>, PodcastError>;

    /// Lists a user's podcasts, active and inactive.
    ///
    /// # Errors
    ///
    /// - Returns [`PodcastError::OwnerNotFound`] if the user does not exist
    /// - Returns [`PodcastError::Database`] on connection failures
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Podcast>, PodcastError>;

    /// Applies a partial update; owner-or-admin only.
    ///
    /// # Errors
    ///
    /// - Returns [`PodcastError::NotFound`] if the podcast does not exist
    /// - Returns [`PodcastError::Unauthorized`] if the actor is neither
    ///   owner nor admin
    /// - Returns [`PodcastError::TitleTaken`] if renaming onto an existing
    ///   active title
    /// - Returns [`PodcastError::Validation`] if no usable field was provided
    /// - Returns [`PodcastError::Database`] on connection failures
    async fn update_podcast(
        &self,
        actor: UserId,
        actor_roles: &RoleSet,
        podcast_id: PodcastId,
        updates: PodcastUpdate,
    ) -> Result<(), PodcastError>;

    /// Soft-deletes a podcast by clearing its active flag. Episodes,
    /// ratings, and commentaries stay in place; the title becomes free for
    /// reuse. Owner-or-admin only. Idempotent on an already inactive podcast.
    ///
    /// # Errors
    ///
    /// - Returns [`PodcastError::NotFound`] if the podcast does not exist
    /// - Returns [`PodcastError::Unauthorized`] if the actor is neither
    ///   owner nor admin
    /// - Returns [`PodcastError::Database`] on connection failures
    async fn deactivate_podcast(
        &self,
        actor: UserId,
        actor_roles: &RoleSet,
        podcast_id: PodcastId,
    ) -> Result<(), PodcastError>;
}
