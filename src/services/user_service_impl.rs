//! `SeaORM` implementation of the `UserService` trait.
//!
//! Password hashing and verification run under `spawn_blocking`; Argon2 at
//! the configured cost would otherwise stall the async runtime. Account
//! deletion is a single transaction over the whole reference closure, so a
//! failure at any step leaves the catalog untouched.

use std::collections::HashSet;
use std::sync::Arc;

use sea_orm::TransactionTrait;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::repositories::commentary::CommentaryRepository;
use crate::db::repositories::episode::EpisodeRepository;
use crate::db::repositories::favorite::FavoriteRepository;
use crate::db::repositories::history::HistoryRepository;
use crate::db::repositories::podcast::PodcastRepository;
use crate::db::repositories::rating::RatingRepository;
use crate::db::repositories::user::UserRepository;
use crate::db::{Store, hash_password};
use crate::domain::{PodcastId, UserId};
use crate::models::episode::HistoryEntry;
use crate::models::podcast::Podcast;
use crate::models::user::{RegisterUser, RoleSet, User, UserProfileUpdate};
use crate::services::user_service::{UserError, UserService};

/// SeaORM-based implementation of [`UserService`].
#[derive(Clone)]
pub struct SeaOrmUserService {
    store: Arc<Store>,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Arc<Store>, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn hash_blocking(&self, password: String) -> Result<String, UserError> {
        let security = self.security.clone();
        tokio::task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .map_err(|e| UserError::Database(format!("Hashing task failed: {e}")))?
            .map_err(UserError::from)
    }

    async fn require_user(&self, user_id: UserId) -> Result<User, UserError> {
        self.store
            .users()
            .get(user_id.value())
            .await?
            .ok_or(UserError::NotFound(user_id))
    }
}

#[async_trait::async_trait]
impl UserService for SeaOrmUserService {
    async fn register(&self, draft: RegisterUser) -> Result<UserId, UserError> {
        for (field, value) in [
            ("name", &draft.name),
            ("nickname", &draft.nickname),
            ("email", &draft.email),
            ("username", &draft.username),
            ("password", &draft.password),
        ] {
            if value.trim().is_empty() {
                return Err(UserError::Validation(format!("{field} cannot be blank")));
            }
        }

        if self
            .store
            .users()
            .credential_taken(&draft.username, &draft.email)
            .await?
        {
            return Err(UserError::CredentialTaken);
        }
        if self.store.users().nickname_taken(&draft.nickname).await? {
            return Err(UserError::NicknameTaken(draft.nickname));
        }

        let password_hash = self.hash_blocking(draft.password.clone()).await?;

        // User row and default USER role land together.
        let txn = self.store.conn.begin().await?;
        let user_id = UserRepository::insert(&txn, &draft, password_hash).await?;
        txn.commit().await?;

        info!(user_id, username = %draft.username, "User registered");

        Ok(UserId::new(user_id))
    }

    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, UserError> {
        let Some(stored_hash) = self.store.users().password_hash(username).await? else {
            return Err(UserError::InvalidCredentials);
        };

        let candidate = password.to_string();
        let matches = tokio::task::spawn_blocking(move || {
            UserRepository::verify_password_hash(&candidate, &stored_hash)
        })
        .await
        .map_err(|e| UserError::Database(format!("Verification task failed: {e}")))??;

        if !matches {
            warn!(username, "Failed login attempt");
            return Err(UserError::InvalidCredentials);
        }

        self.store
            .users()
            .get_by_username(username)
            .await?
            .ok_or(UserError::InvalidCredentials)
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, UserError> {
        self.require_user(user_id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, UserError> {
        self.store
            .users()
            .get_by_username(username)
            .await?
            .ok_or_else(|| UserError::UsernameNotFound(username.to_string()))
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        updates: UserProfileUpdate,
    ) -> Result<(), UserError> {
        if updates.is_empty() {
            return Err(UserError::Validation("No fields to update".to_string()));
        }

        let current = self.require_user(user_id).await?;

        let usable = |field: Option<String>| field.filter(|v| !v.trim().is_empty());

        let nickname = usable(updates.nickname);
        if let Some(ref nickname) = nickname
            && *nickname != current.nickname
            && self.store.users().nickname_taken(nickname).await?
        {
            return Err(UserError::NicknameTaken(nickname.clone()));
        }

        let password_hash = match usable(updates.password) {
            Some(password) => Some(self.hash_blocking(password).await?),
            None => None,
        };

        self.store
            .users()
            .update_profile(
                user_id.value(),
                nickname,
                usable(updates.profile_picture),
                usable(updates.bio),
                usable(updates.email),
                password_hash,
            )
            .await?;

        Ok(())
    }

    async fn roles(&self, user_id: UserId) -> Result<RoleSet, UserError> {
        let _user = self.require_user(user_id).await?;
        let roles = self.store.users().roles(user_id.value()).await?;
        Ok(RoleSet::new(roles))
    }

    async fn add_favorite(
        &self,
        user_id: UserId,
        podcast_id: PodcastId,
    ) -> Result<(), UserError> {
        let _user = self.require_user(user_id).await?;

        let podcast = self
            .store
            .podcasts()
            .get(podcast_id.value())
            .await?
            .filter(|p| p.is_active)
            .ok_or(UserError::PodcastNotFound(podcast_id))?;

        if self
            .store
            .favorites()
            .exists(user_id.value(), podcast_id.value())
            .await?
        {
            return Err(UserError::AlreadyFavorite {
                user: user_id,
                podcast: podcast_id,
            });
        }

        self.store
            .favorites()
            .insert(user_id.value(), podcast_id.value())
            .await?;

        info!(user_id = %user_id, podcast_id = %podcast_id, title = %podcast.title, "Favorite added");

        Ok(())
    }

    async fn remove_favorite(
        &self,
        user_id: UserId,
        podcast_id: PodcastId,
    ) -> Result<(), UserError> {
        let _user = self.require_user(user_id).await?;

        // No active filter here: a favorite on a since-deactivated podcast
        // must still be removable.
        let _podcast = self
            .store
            .podcasts()
            .get(podcast_id.value())
            .await?
            .ok_or(UserError::PodcastNotFound(podcast_id))?;

        let removed = self
            .store
            .favorites()
            .remove(user_id.value(), podcast_id.value())
            .await?;

        if removed == 0 {
            return Err(UserError::NotFavorite {
                user: user_id,
                podcast: podcast_id,
            });
        }

        Ok(())
    }

    async fn favorites(&self, user_id: UserId) -> Result<Vec<Podcast>, UserError> {
        let _user = self.require_user(user_id).await?;

        let ids = self
            .store
            .favorites()
            .podcast_ids_by_user(user_id.value())
            .await?;

        let mut podcasts = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(podcast) = self.store.podcasts().get(id).await? {
                podcasts.push(podcast);
            }
        }
        Ok(podcasts)
    }

    async fn listening_history(&self, user_id: UserId) -> Result<Vec<HistoryEntry>, UserError> {
        let _user = self.require_user(user_id).await?;

        let entries = self.store.history().list_by_user(user_id.value()).await?;

        // Rows come back newest first; keep only the latest play per episode.
        let mut seen = HashSet::new();
        Ok(entries
            .into_iter()
            .filter(|entry| seen.insert(entry.episode_id))
            .collect())
    }

    async fn delete_user(&self, user_id: UserId) -> Result<(), UserError> {
        let id = user_id.value();

        let txn = self.store.conn.begin().await?;

        let Some(_user) = UserRepository::find_on(&txn, id).await? else {
            return Err(UserError::NotFound(user_id));
        };

        // Fail closed: an active podcast blocks the whole deletion. Applies
        // to admin accounts as well.
        let owned = PodcastRepository::models_by_owner(&txn, id).await?;
        if owned.iter().any(|podcast| podcast.is_active) {
            return Err(UserError::OwnsActivePodcasts(user_id));
        }

        let podcast_ids: Vec<i32> = owned.iter().map(|podcast| podcast.id).collect();
        let episode_ids = EpisodeRepository::ids_by_podcast_ids(&txn, &podcast_ids).await?;

        // Dependents of the user's podcasts first, crossing ownership
        // boundaries: other users' favorites, commentaries, ratings, and
        // history rows on this content go too.
        PodcastRepository::delete_categories_by_podcast_ids(&txn, &podcast_ids).await?;
        FavoriteRepository::delete_by_podcast_ids(&txn, &podcast_ids).await?;
        CommentaryRepository::delete_by_episode_ids(&txn, &episode_ids).await?;
        RatingRepository::delete_by_episode_ids(&txn, &episode_ids).await?;
        HistoryRepository::delete_by_episode_ids(&txn, &episode_ids).await?;
        EpisodeRepository::delete_by_podcast_ids(&txn, &podcast_ids).await?;
        PodcastRepository::delete_by_owner(&txn, id).await?;

        // Then the user's own activity on everyone else's content.
        HistoryRepository::delete_by_user(&txn, id).await?;
        CommentaryRepository::delete_by_user(&txn, id).await?;
        RatingRepository::delete_by_user(&txn, id).await?;
        FavoriteRepository::delete_by_user(&txn, id).await?;

        UserRepository::delete_roles_by_user(&txn, id).await?;
        UserRepository::delete_row(&txn, id).await?;

        txn.commit().await?;

        info!(
            user_id = id,
            podcasts = podcast_ids.len(),
            episodes = episode_ids.len(),
            "User deleted with full cascade"
        );

        Ok(())
    }
}
