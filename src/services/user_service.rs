//! Domain service for accounts, roles, favorites, and account deletion.

use crate::domain::{PodcastId, UserId};
use crate::models::episode::HistoryEntry;
use crate::models::podcast::Podcast;
use crate::models::user::{RegisterUser, RoleSet, User, UserProfileUpdate};
use thiserror::Error;

/// Domain errors for account operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User {0} not found")]
    NotFound(UserId),

    #[error("No user with username '{0}'")]
    UsernameNotFound(String),

    #[error("Username or email already registered")]
    CredentialTaken,

    #[error("Nickname '{0}' is already taken")]
    NicknameTaken(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User {0} still owns active podcasts; deactivate or transfer them first")]
    OwnsActivePodcasts(UserId),

    #[error("Podcast {0} not found")]
    PodcastNotFound(PodcastId),

    #[error("Podcast {podcast} is already a favorite of user {user}")]
    AlreadyFavorite { user: UserId, podcast: PodcastId },

    #[error("Podcast {podcast} is not a favorite of user {user}")]
    NotFavorite { user: UserId, podcast: PodcastId },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Domain service trait for account operations.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Registers a new account. The password is hashed off the async
    /// runtime; the new user starts with the USER role.
    ///
    /// # Errors
    ///
    /// - Returns [`UserError::Validation`] if a required field is blank
    /// - Returns [`UserError::CredentialTaken`] / [`UserError::NicknameTaken`]
    ///   on uniqueness conflicts
    /// - Returns [`UserError::Database`] on connection failures
    async fn register(&self, draft: RegisterUser) -> Result<UserId, UserError>;

    /// Checks a username/password pair and returns the account on success.
    ///
    /// # Errors
    ///
    /// - Returns [`UserError::InvalidCredentials`] for an unknown username
    ///   or a wrong password; the two cases are indistinguishable on purpose
    /// - Returns [`UserError::Database`] on connection failures
    async fn verify_credentials(&self, username: &str, password: &str)
    -> Result<User, UserError>;

    /// Gets an account by id.
    ///
    /// # Errors
    ///
    /// - Returns [`UserError::NotFound`] if the user does not exist
    /// - Returns [`UserError::Database`] on connection failures
    async fn get_user(&self, user_id: UserId) -> Result<User, UserError>;

    /// Gets an account by username.
    ///
    /// # Errors
    ///
    /// - Returns [`UserError::UsernameNotFound`] if no such username exists
    /// - Returns [`UserError::Database`] on connection failures
    async fn get_user_by_username(&self, username: &str) -> Result<User, UserError>;

    /// Applies a partial profile update. Blank fields are ignored; a new
    /// password is re-hashed before storage.
    ///
    /// # Errors
    ///
    /// - Returns [`UserError::NotFound`] if the user does not exist
    /// - Returns [`UserError::Validation`] if no usable field was provided
    /// - Returns [`UserError::NicknameTaken`] if the new nickname collides
    /// - Returns [`UserError::Database`] on connection failures
    async fn update_profile(
        &self,
        user_id: UserId,
        updates: UserProfileUpdate,
    ) -> Result<(), UserError>;

    /// The user's role memberships.
    ///
    /// # Errors
    ///
    /// - Returns [`UserError::NotFound`] if the user does not exist
    /// - Returns [`UserError::Database`] on connection failures
    async fn roles(&self, user_id: UserId) -> Result<RoleSet, UserError>;

    /// Adds a podcast to the user's favorites.
    ///
    /// # Errors
    ///
    /// - Returns [`UserError::AlreadyFavorite`] on a duplicate
    /// - Returns [`UserError::PodcastNotFound`] if the podcast does not
    ///   exist or is inactive
    /// - Returns [`UserError::Database`] on connection failures
    async fn add_favorite(&self, user_id: UserId, podcast_id: PodcastId)
    -> Result<(), UserError>;

    /// Removes a podcast from the user's favorites.
    ///
    /// # Errors
    ///
    /// - Returns [`UserError::NotFavorite`] if the pair was absent
    /// - Returns [`UserError::Database`] on connection failures
    async fn remove_favorite(
        &self,
        user_id: UserId,
        podcast_id: PodcastId,
    ) -> Result<(), UserError>;

    /// The user's favorite podcasts.
    ///
    /// # Errors
    ///
    /// - Returns [`UserError::NotFound`] if the user does not exist
    /// - Returns [`UserError::Database`] on connection failures
    async fn favorites(&self, user_id: UserId) -> Result<Vec<Podcast>, UserError>;

    /// The user's listening history, most recent first, one entry per
    /// episode (repeat plays collapse into the latest).
    ///
    /// # Errors
    ///
    /// - Returns [`UserError::NotFound`] if the user does not exist
    /// - Returns [`UserError::Database`] on connection failures
    async fn listening_history(&self, user_id: UserId) -> Result<Vec<HistoryEntry>, UserError>;

    /// Deletes an account and everything that references it, in one
    /// transaction.
    ///
    /// Fails closed: if the user still owns any active podcast nothing is
    /// deleted. Otherwise the cascade removes, in dependency order, the
    /// category links, favorites, commentaries, ratings, and history rows of
    /// the user's podcasts (other users' rows included), then the episodes
    /// and podcasts themselves, then the user's own favorites, history,
    /// commentaries, ratings, role memberships, and finally the user row.
    ///
    /// # Errors
    ///
    /// - Returns [`UserError::NotFound`] if the user does not exist
    /// - Returns [`UserError::OwnsActivePodcasts`] if the guard trips; this
    ///   applies to admins too
    /// - Returns [`UserError::Database`] on connection failures; the
    ///   transaction rolls back and no partial deletion survives
    async fn delete_user(&self, user_id: UserId) -> Result<(), UserError>;
}
