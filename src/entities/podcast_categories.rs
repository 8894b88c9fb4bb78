use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "podcast_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub podcast_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub category: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::podcasts::Entity",
        from = "Column::PodcastId",
        to = "super::podcasts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Podcasts,
}

impl Related<super::podcasts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Podcasts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
