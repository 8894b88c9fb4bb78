use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Hash the bootstrap password using Argon2id
fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let password = b"change-me";
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password, &salt)
        .expect("Failed to hash default password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = chrono::Utc::now().to_rfc3339();
        let password_hash = hash_default_password();

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Users)
            .columns([
                crate::entities::users::Column::Name,
                crate::entities::users::Column::Nickname,
                crate::entities::users::Column::Email,
                crate::entities::users::Column::Username,
                crate::entities::users::Column::PasswordHash,
                crate::entities::users::Column::CreatedAt,
            ])
            .values_panic([
                "Administrator".into(),
                "admin".into(),
                "admin@localhost".into(),
                "admin".into(),
                password_hash.into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        for role in ["ADMIN", "USER"] {
            let insert_role = sea_orm_migration::sea_query::Query::insert()
                .into_table(UserRoles)
                .columns([
                    crate::entities::user_roles::Column::UserId,
                    crate::entities::user_roles::Column::Role,
                ])
                .values_panic([1.into(), role.into()])
                .to_owned();
            manager.exec_stmt(insert_role).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete_roles = sea_orm_migration::sea_query::Query::delete()
            .from_table(UserRoles)
            .and_where(
                Expr::col(crate::entities::user_roles::Column::UserId).eq(1),
            )
            .to_owned();
        manager.exec_stmt(delete_roles).await?;

        let delete_user = sea_orm_migration::sea_query::Query::delete()
            .from_table(Users)
            .and_where(Expr::col(crate::entities::users::Column::Username).eq("admin"))
            .to_owned();
        manager.exec_stmt(delete_user).await?;

        Ok(())
    }
}
