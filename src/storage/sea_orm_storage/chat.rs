//! 聊天存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::chat_messages::{
    ActiveModel as MessageActiveModel, Column as MessageColumn, Entity as ChatMessages,
    Model as MessageModel,
};
use crate::entity::chat_room_members::{
    ActiveModel as MemberActiveModel, Column as MemberColumn, Entity as ChatRoomMembers,
};
use crate::entity::chat_rooms::{ActiveModel, Column, Entity as ChatRooms, Model};
use crate::errors::Result;
use crate::models::{
    PaginatedResponse, PaginationQuery,
    chat::{ChatMessage, ChatRoom, NewChatRoom, RoomType},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use std::collections::BTreeSet;

impl SeaOrmStorage {
    /// 创建聊天室并写入成员，创建者自动成为成员
    pub async fn create_chat_room_impl(&self, room: NewChatRoom) -> Result<ChatRoom> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let inserted = ActiveModel {
            name: Set(room.name),
            room_type: Set(room.room_type.to_string()),
            class_id: Set(room.class_id),
            created_by: Set(room.created_by),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("创建聊天室失败"))?;

        let members: BTreeSet<i64> = room
            .member_ids
            .into_iter()
            .chain(std::iter::once(room.created_by))
            .collect();

        let member_models = members.into_iter().map(|user_id| MemberActiveModel {
            room_id: Set(inserted.id),
            user_id: Set(user_id),
            joined_at: Set(now),
            ..Default::default()
        });

        ChatRoomMembers::insert_many(member_models)
            .exec(&txn)
            .await
            .map_err(db_err("写入聊天室成员失败"))?;

        txn.commit().await.map_err(db_err("提交事务失败"))?;

        Ok(inserted.into_room())
    }

    pub async fn get_chat_room_impl(&self, id: i64) -> Result<Option<ChatRoom>> {
        let result = ChatRooms::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询聊天室失败"))?;

        Ok(result.map(Model::into_room))
    }

    async fn member_room_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        ChatRoomMembers::find()
            .select_only()
            .column(MemberColumn::RoomId)
            .filter(MemberColumn::UserId.eq(user_id))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_err("查询聊天室成员失败"))
    }

    /// 两个用户之间已有的私聊
    pub async fn find_direct_room_impl(&self, user_a: i64, user_b: i64) -> Result<Option<ChatRoom>> {
        let rooms_a: BTreeSet<i64> = self.member_room_ids(user_a).await?.into_iter().collect();
        let shared: Vec<i64> = self
            .member_room_ids(user_b)
            .await?
            .into_iter()
            .filter(|id| rooms_a.contains(id))
            .collect();

        if shared.is_empty() {
            return Ok(None);
        }

        let result = ChatRooms::find()
            .filter(Column::Id.is_in(shared))
            .filter(Column::RoomType.eq(RoomType::Direct.as_str()))
            .order_by_asc(Column::Id)
            .one(&self.db)
            .await
            .map_err(db_err("查询私聊失败"))?;

        Ok(result.map(Model::into_room))
    }

    pub async fn find_class_room_impl(&self, class_id: i64) -> Result<Option<ChatRoom>> {
        let result = ChatRooms::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::RoomType.eq(RoomType::Class.as_str()))
            .one(&self.db)
            .await
            .map_err(db_err("查询班级聊天室失败"))?;

        Ok(result.map(Model::into_room))
    }

    /// 用户所在的聊天室，最近有消息的在前
    pub async fn list_user_rooms_impl(&self, user_id: i64) -> Result<Vec<ChatRoom>> {
        let room_ids = self.member_room_ids(user_id).await?;
        if room_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut rooms = ChatRooms::find()
            .filter(Column::Id.is_in(room_ids))
            .all(&self.db)
            .await
            .map_err(db_err("查询聊天室失败"))?;

        rooms.sort_by_key(|r| std::cmp::Reverse((r.last_message_at.unwrap_or(r.created_at), r.id)));

        Ok(rooms.into_iter().map(Model::into_room).collect())
    }

    pub async fn list_room_member_ids_impl(&self, room_id: i64) -> Result<Vec<i64>> {
        ChatRoomMembers::find()
            .select_only()
            .column(MemberColumn::UserId)
            .filter(MemberColumn::RoomId.eq(room_id))
            .order_by_asc(MemberColumn::UserId)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_err("查询聊天室成员失败"))
    }

    pub async fn is_room_member_impl(&self, room_id: i64, user_id: i64) -> Result<bool> {
        let count = ChatRoomMembers::find()
            .filter(MemberColumn::RoomId.eq(room_id))
            .filter(MemberColumn::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_err("查询聊天室成员失败"))?;

        Ok(count > 0)
    }

    /// 写入消息并刷新聊天室最后活跃时间
    pub async fn create_chat_message_impl(
        &self,
        room_id: i64,
        sender_id: i64,
        content: String,
    ) -> Result<ChatMessage> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let inserted = MessageActiveModel {
            room_id: Set(room_id),
            sender_id: Set(sender_id),
            content: Set(content),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("发送消息失败"))?;

        ChatRooms::update_many()
            .col_expr(Column::LastMessageAt, Expr::value(now))
            .filter(Column::Id.eq(room_id))
            .exec(&txn)
            .await
            .map_err(db_err("更新聊天室失败"))?;

        txn.commit().await.map_err(db_err("提交事务失败"))?;

        Ok(inserted.into_message())
    }

    /// 消息分页，最新的在前
    pub async fn list_room_messages_impl(
        &self,
        room_id: i64,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<ChatMessage>> {
        let select = ChatMessages::find()
            .filter(MessageColumn::RoomId.eq(room_id))
            .order_by_desc(MessageColumn::CreatedAt)
            .order_by_desc(MessageColumn::Id);

        self.fetch_page(select, pagination, "查询消息失败", MessageModel::into_message)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_storage, seed_user};
    use super::*;
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_direct_room_lookup_and_messages() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice01", UserRole::Student).await;
        let bob = seed_user(&storage, "bobby01", UserRole::Teacher).await;
        let carol = seed_user(&storage, "carol01", UserRole::Student).await;

        let room = storage
            .create_chat_room_impl(NewChatRoom {
                name: None,
                room_type: RoomType::Direct,
                class_id: None,
                created_by: alice.id,
                member_ids: vec![bob.id],
            })
            .await
            .unwrap();

        let found = storage.find_direct_room_impl(bob.id, alice.id).await.unwrap();
        assert_eq!(found.map(|r| r.id), Some(room.id));
        assert!(storage.find_direct_room_impl(alice.id, carol.id).await.unwrap().is_none());

        assert_eq!(
            storage.list_room_member_ids_impl(room.id).await.unwrap(),
            vec![alice.id, bob.id]
        );
        assert!(!storage.is_room_member_impl(room.id, carol.id).await.unwrap());

        storage
            .create_chat_message_impl(room.id, alice.id, "hi".to_string())
            .await
            .unwrap();
        storage
            .create_chat_message_impl(room.id, bob.id, "hello".to_string())
            .await
            .unwrap();

        let page = storage
            .list_room_messages_impl(room.id, PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].content, "hello");

        let rooms = storage.list_user_rooms_impl(bob.id).await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert!(rooms[0].last_message_at.is_some());
    }
}
