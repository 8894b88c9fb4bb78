use sea_orm::entity::prelude::*;

/// Many-to-many join of users and podcasts. The composite key gives the
/// at-most-once invariant for each (user, podcast) pair.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "favorites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub podcast_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::podcasts::Entity",
        from = "Column::PodcastId",
        to = "super::podcasts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Podcasts,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::podcasts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Podcasts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
