//! 公告实体，class_id 为空表示全校公告

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "announcements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: Option<i64>,
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub priority: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_announcement(self) -> crate::models::announcements::Announcement {
        use crate::models::announcements::{Announcement, AnnouncementPriority};

        Announcement {
            id: self.id,
            class_id: self.class_id,
            author_id: self.author_id,
            title: self.title,
            content: self.content,
            priority: self.priority.parse().unwrap_or(AnnouncementPriority::Normal),
            created_at: super::to_datetime(self.created_at),
        }
    }
}
