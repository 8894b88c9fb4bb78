use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};

use crate::config::SecurityConfig;
use crate::domain::Role;
use crate::entities::{prelude::*, user_roles, users};
use crate::models::user::{RegisterUser, User};

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by id")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Lookup usable inside a caller-owned transaction.
    pub async fn find_on<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<users::Model>> {
        Users::find_by_id(id)
            .one(conn)
            .await
            .context("Failed to query user by id")
    }

    pub async fn exists(&self, id: i32) -> Result<bool> {
        let count = Users::find_by_id(id)
            .count(&self.conn)
            .await
            .context("Failed to check user existence")?;
        Ok(count > 0)
    }

    pub async fn nickname_taken(&self, nickname: &str) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::Nickname.eq(nickname))
            .count(&self.conn)
            .await
            .context("Failed to check nickname uniqueness")?;
        Ok(count > 0)
    }

    /// True if the username or email already backs another credential.
    pub async fn credential_taken(&self, username: &str, email: &str) -> Result<bool> {
        let count = Users::find()
            .filter(
                users::Column::Username
                    .eq(username)
                    .or(users::Column::Email.eq(email)),
            )
            .count(&self.conn)
            .await
            .context("Failed to check credential uniqueness")?;
        Ok(count > 0)
    }

    /// Inserts a new user row. `password_hash` must already be hashed; the
    /// default USER role row is written in the same transaction.
    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        draft: &RegisterUser,
        password_hash: String,
    ) -> Result<i32> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            name: Set(draft.name.clone()),
            nickname: Set(draft.nickname.clone()),
            profile_picture: Set(draft.profile_picture.clone()),
            bio: Set(draft.bio.clone()),
            email: Set(draft.email.clone()),
            username: Set(draft.username.clone()),
            password_hash: Set(password_hash),
            reset_token: Set(None),
            created_at: Set(now),
            ..Default::default()
        };

        let inserted = active.insert(conn).await.context("Failed to insert user")?;

        Self::grant_role(conn, inserted.id, Role::User).await?;

        Ok(inserted.id)
    }

    pub async fn roles(&self, user_id: i32) -> Result<Vec<Role>> {
        let rows = UserRoles::find()
            .filter(user_roles::Column::UserId.eq(user_id))
            .all(&self.conn)
            .await
            .context("Failed to query user roles")?;

        Ok(rows
            .into_iter()
            .filter_map(|row| Role::parse(&row.role))
            .collect())
    }

    /// Adds a role membership if absent. Set semantics: granting an already
    /// held role is a no-op, not an error.
    pub async fn grant_role<C: ConnectionTrait>(conn: &C, user_id: i32, role: Role) -> Result<bool> {
        let existing = UserRoles::find_by_id((user_id, role.as_str().to_string()))
            .one(conn)
            .await
            .context("Failed to query role membership")?;

        if existing.is_some() {
            return Ok(false);
        }

        let active = user_roles::ActiveModel {
            user_id: Set(user_id),
            role: Set(role.as_str().to_string()),
        };
        UserRoles::insert(active)
            .exec(conn)
            .await
            .context("Failed to insert role membership")?;

        Ok(true)
    }

    pub async fn update_profile(
        &self,
        user_id: i32,
        nickname: Option<String>,
        profile_picture: Option<String>,
        bio: Option<String>,
        email: Option<String>,
        password_hash: Option<String>,
    ) -> Result<()> {
        let user = Users::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for profile update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {user_id}"))?;

        let mut active: users::ActiveModel = user.into();
        if let Some(nickname) = nickname {
            active.nickname = Set(nickname);
        }
        if let Some(picture) = profile_picture {
            active.profile_picture = Set(Some(picture));
        }
        if let Some(bio) = bio {
            active.bio = Set(Some(bio));
        }
        if let Some(email) = email {
            active.email = Set(email);
        }
        if let Some(hash) = password_hash {
            active.password_hash = Set(hash);
        }
        active
            .update(&self.conn)
            .await
            .context("Failed to update user profile")?;

        Ok(())
    }

    /// Verify a password against the stored hash.
    /// Runs under `spawn_blocking` in the service layer; this is the
    /// synchronous verification primitive.
    pub fn verify_password_hash(password: &str, stored_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(stored_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub async fn password_hash(&self, username: &str) -> Result<Option<String>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        Ok(user.map(|u| u.password_hash))
    }

    // Cascade steps. These take the caller's transaction so the whole
    // deletion plan commits or rolls back as one unit.

    pub async fn delete_roles_by_user<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<u64> {
        let result = UserRoles::delete_many()
            .filter(user_roles::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .context("Failed to delete role memberships")?;
        Ok(result.rows_affected)
    }

    pub async fn delete_row<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<u64> {
        let result = Users::delete_by_id(user_id)
            .exec(conn)
            .await
            .context("Failed to delete user row")?;
        Ok(result.rows_affected)
    }
}

/// Hash a password using Argon2id with params from [`SecurityConfig`].
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
