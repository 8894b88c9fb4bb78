//! Domain service for episode ratings and derived averages.

use crate::domain::{EpisodeId, PodcastId, UserId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RatingError {
    #[error("Score {score} out of range [{min}, {max}]")]
    InvalidScore { score: i32, min: i32, max: i32 },

    #[error("Episode {0} not found")]
    EpisodeNotFound(EpisodeId),

    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("Podcast {0} not found")]
    PodcastNotFound(PodcastId),

    #[error("No ratings found for episode {0}")]
    NoRatings(EpisodeId),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for RatingError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RatingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Rating aggregation. Writes keep the derived episode average consistent
/// within the same transaction as the rating row itself.
#[async_trait::async_trait]
pub trait RatingService: Send + Sync {
    /// Rates an episode on behalf of a user.
    ///
    /// At most one rating exists per (user, episode): a repeat call
    /// overwrites the previous score and re-stamps the rating time. After
    /// the write, the episode's stored average is recomputed from all of its
    /// ratings inside the same transaction.
    ///
    /// # Errors
    ///
    /// - Returns [`RatingError::InvalidScore`] before any write if the score
    ///   is outside the configured range
    /// - Returns [`RatingError::UserNotFound`] / [`RatingError::EpisodeNotFound`]
    ///   if either side of the pair is missing
    /// - Returns [`RatingError::Database`] on connection failures
    async fn rate(
        &self,
        episode_id: EpisodeId,
        user_id: UserId,
        score: i32,
    ) -> Result<(), RatingError>;

    /// The stored average for an episode.
    ///
    /// # Errors
    ///
    /// - Returns [`RatingError::NoRatings`] if nobody rated the episode yet
    /// - Returns [`RatingError::EpisodeNotFound`] if the episode does not exist
    /// - Returns [`RatingError::Database`] on connection failures
    async fn episode_average(&self, episode_id: EpisodeId) -> Result<f64, RatingError>;

    /// Podcast-level average, computed on read as the mean of its episodes'
    /// averages. Episodes without any rating are excluded from both the
    /// numerator and the denominator; `None` when no episode is rated.
    ///
    /// # Errors
    ///
    /// - Returns [`RatingError::PodcastNotFound`] if the podcast does not exist
    /// - Returns [`RatingError::Database`] on connection failures
    async fn podcast_average(&self, podcast_id: PodcastId) -> Result<Option<f64>, RatingError>;
}
