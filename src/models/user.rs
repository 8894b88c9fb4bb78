use crate::domain::Role;
use crate::entities::users;

/// User data returned from the repository (without the password hash).
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub nickname: String,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub email: String,
    pub username: String,
    pub created_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            nickname: model.nickname,
            profile_picture: model.profile_picture,
            bio: model.bio,
            email: model.email,
            username: model.username,
            created_at: model.created_at,
        }
    }
}

/// Registration input. The password arrives raw and is hashed by the
/// user service before it reaches the repository.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub name: String,
    pub nickname: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
}

/// Partial profile update. `None` and blank fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserProfileUpdate {
    pub nickname: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserProfileUpdate {
    /// True when no field carries a usable value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let usable = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.trim().is_empty());
        !(usable(&self.nickname)
            || usable(&self.profile_picture)
            || usable(&self.bio)
            || usable(&self.email)
            || usable(&self.password))
    }
}

/// A user's role memberships, loaded from `user_roles`.
#[derive(Debug, Clone, Default)]
pub struct RoleSet(Vec<Role>);

impl RoleSet {
    #[must_use]
    pub fn new(roles: Vec<Role>) -> Self {
        Self(roles)
    }

    #[must_use]
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.contains(Role::Admin)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Role] {
        &self.0
    }
}

impl From<Vec<Role>> for RoleSet {
    fn from(roles: Vec<Role>) -> Self {
        Self::new(roles)
    }
}
