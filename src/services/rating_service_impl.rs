//! `SeaORM` implementation of the `RatingService` trait.
//!
//! The rating row and the episode's stored average are written in the same
//! transaction, so readers never observe an average that disagrees with the
//! rating rows behind it.

use std::sync::Arc;

use sea_orm::TransactionTrait;
use tracing::debug;

use crate::config::ContentConfig;
use crate::db::Store;
use crate::db::repositories::episode::EpisodeRepository;
use crate::db::repositories::rating::RatingRepository;
use crate::domain::{EpisodeId, PodcastId, UserId};
use crate::services::rating_service::{RatingError, RatingService};

/// SeaORM-based implementation of [`RatingService`].
#[derive(Clone)]
pub struct SeaOrmRatingService {
    store: Arc<Store>,
    content: ContentConfig,
}

impl SeaOrmRatingService {
    #[must_use]
    pub const fn new(store: Arc<Store>, content: ContentConfig) -> Self {
        Self { store, content }
    }
}

fn mean(values: &[i32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    #[allow(clippy::cast_precision_loss)]
    {
        sum as f64 / values.len() as f64
    }
}

#[async_trait::async_trait]
impl RatingService for SeaOrmRatingService {
    async fn rate(
        &self,
        episode_id: EpisodeId,
        user_id: UserId,
        score: i32,
    ) -> Result<(), RatingError> {
        // Range check runs before any row is touched.
        if score < self.content.min_score || score > self.content.max_score {
            return Err(RatingError::InvalidScore {
                score,
                min: self.content.min_score,
                max: self.content.max_score,
            });
        }

        if !self.store.users().exists(user_id.value()).await? {
            return Err(RatingError::UserNotFound(user_id));
        }
        let _episode = self
            .store
            .episodes()
            .get(episode_id.value())
            .await?
            .ok_or(RatingError::EpisodeNotFound(episode_id))?;

        let txn = self.store.conn.begin().await?;

        RatingRepository::upsert(&txn, user_id.value(), episode_id.value(), score).await?;

        let scores = RatingRepository::scores_for_episode(&txn, episode_id.value()).await?;
        let average = mean(&scores);
        EpisodeRepository::set_average_rating(&txn, episode_id.value(), average).await?;

        txn.commit().await?;

        debug!(
            user_id = %user_id,
            episode_id = %episode_id,
            score,
            average,
            "Rating recorded"
        );

        Ok(())
    }

    async fn episode_average(&self, episode_id: EpisodeId) -> Result<f64, RatingError> {
        let episode = self
            .store
            .episodes()
            .get(episode_id.value())
            .await?
            .ok_or(RatingError::EpisodeNotFound(episode_id))?;

        let scores =
            RatingRepository::scores_for_episode(&self.store.conn, episode_id.value()).await?;
        if scores.is_empty() {
            return Err(RatingError::NoRatings(episode_id));
        }

        Ok(episode.average_rating)
    }

    async fn podcast_average(&self, podcast_id: PodcastId) -> Result<Option<f64>, RatingError> {
        let _podcast = self
            .store
            .podcasts()
            .get(podcast_id.value())
            .await?
            .ok_or(RatingError::PodcastNotFound(podcast_id))?;

        let episodes = self
            .store
            .episodes()
            .list_by_podcast(podcast_id.value())
            .await?;
        if episodes.is_empty() {
            return Ok(None);
        }

        // Unrated episodes are excluded entirely; averaging in their 0.0
        // placeholder would drag the podcast score down.
        let episode_ids: Vec<i32> = episodes.iter().map(|e| e.id).collect();
        let rated = self.store.ratings().rated_episode_ids(&episode_ids).await?;
        if rated.is_empty() {
            return Ok(None);
        }

        let rated_averages: Vec<f64> = episodes
            .iter()
            .filter(|e| rated.binary_search(&e.id).is_ok())
            .map(|e| e.average_rating)
            .collect();

        let sum: f64 = rated_averages.iter().sum();
        #[allow(clippy::cast_precision_loss)]
        Ok(Some(sum / rated_averages.len() as f64))
    }
}
