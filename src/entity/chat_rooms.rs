//! 聊天房间实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "chat_rooms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: Option<String>,
    pub room_type: String,
    pub class_id: Option<i64>,
    pub created_by: i64,
    pub last_message_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::chat_room_members::Entity")]
    Members,
    #[sea_orm(has_many = "super::chat_messages::Entity")]
    Messages,
}

impl Related<super::chat_room_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::chat_messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_room(self) -> crate::models::chat::ChatRoom {
        use crate::models::chat::{ChatRoom, RoomType};

        ChatRoom {
            id: self.id,
            name: self.name,
            room_type: self.room_type.parse().unwrap_or(RoomType::Group),
            class_id: self.class_id,
            created_by: self.created_by,
            last_message_at: super::to_opt_datetime(self.last_message_at),
            created_at: super::to_datetime(self.created_at),
        }
    }
}
