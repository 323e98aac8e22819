//! 通知存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::notifications::{ActiveModel, Column, Entity as Notifications, Model};
use crate::errors::Result;
use crate::models::{
    PaginatedResponse, PaginationQuery,
    notifications::{NewNotification, Notification},
};
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, sea_query::Expr,
};

impl SeaOrmStorage {
    /// 批量创建通知，返回写入条数
    pub async fn create_notifications_impl(
        &self,
        notifications: Vec<NewNotification>,
    ) -> Result<u64> {
        if notifications.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now().timestamp();
        let count = notifications.len() as u64;

        let models = notifications.into_iter().map(|n| ActiveModel {
            user_id: Set(n.user_id),
            kind: Set(n.kind.to_string()),
            title: Set(n.title),
            content: Set(n.content),
            reference_type: Set(n.reference_type),
            reference_id: Set(n.reference_id),
            is_read: Set(false),
            created_at: Set(now),
            ..Default::default()
        });

        Notifications::insert_many(models)
            .exec(&self.db)
            .await
            .map_err(db_err("批量创建通知失败"))?;

        Ok(count)
    }

    pub async fn list_user_notifications_impl(
        &self,
        user_id: i64,
        unread_only: bool,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Notification>> {
        let mut select = Notifications::find().filter(Column::UserId.eq(user_id));

        if unread_only {
            select = select.filter(Column::IsRead.eq(false));
        }

        select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        self.fetch_page(select, pagination, "查询通知列表失败", Model::into_notification)
            .await
    }

    pub async fn count_unread_notifications_impl(&self, user_id: i64) -> Result<u64> {
        Notifications::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(db_err("统计未读通知失败"))
    }

    /// 标记已读，只能操作自己的通知
    pub async fn mark_notification_read_impl(&self, id: i64, user_id: i64) -> Result<bool> {
        let exists = Notifications::find()
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_err("查询通知失败"))?;

        if exists == 0 {
            return Ok(false);
        }

        Notifications::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err("标记通知已读失败"))?;

        Ok(true)
    }

    pub async fn mark_all_notifications_read_impl(&self, user_id: i64) -> Result<u64> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(db_err("标记全部已读失败"))?;

        Ok(result.rows_affected)
    }

    pub async fn delete_notification_impl(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = Notifications::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err("删除通知失败"))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_storage, seed_user};
    use super::*;
    use crate::models::notifications::NotificationKind;
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_notifications_are_scoped_to_owner() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice01", UserRole::Student).await;
        let bob = seed_user(&storage, "bobby01", UserRole::Student).await;

        let written = storage
            .create_notifications_impl(vec![
                NewNotification::new(alice.id, NotificationKind::System, "Welcome"),
                NewNotification::new(alice.id, NotificationKind::Grade, "Graded")
                    .reference("submission", 7),
                NewNotification::new(bob.id, NotificationKind::System, "Welcome"),
            ])
            .await
            .unwrap();
        assert_eq!(written, 3);
        assert_eq!(storage.count_unread_notifications_impl(alice.id).await.unwrap(), 2);

        let page = storage
            .list_user_notifications_impl(alice.id, true, PaginationQuery::default())
            .await
            .unwrap();
        let first_id = page.items[0].id;

        // 其他用户无法操作
        assert!(!storage.mark_notification_read_impl(first_id, bob.id).await.unwrap());
        assert!(!storage.delete_notification_impl(first_id, bob.id).await.unwrap());

        assert!(storage.mark_notification_read_impl(first_id, alice.id).await.unwrap());
        assert_eq!(storage.count_unread_notifications_impl(alice.id).await.unwrap(), 1);

        assert_eq!(storage.mark_all_notifications_read_impl(alice.id).await.unwrap(), 1);
        assert_eq!(storage.count_unread_notifications_impl(alice.id).await.unwrap(), 0);
        assert_eq!(storage.count_unread_notifications_impl(bob.id).await.unwrap(), 1);
    }
}
