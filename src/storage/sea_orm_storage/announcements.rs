//! 公告存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::announcements::{ActiveModel, Column, Entity as Announcements, Model};
use crate::errors::Result;
use crate::models::{
    PaginatedResponse, PaginationQuery,
    announcements::{Announcement, AnnouncementScope, NewAnnouncement},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    pub async fn create_announcement_impl(
        &self,
        announcement: NewAnnouncement,
    ) -> Result<Announcement> {
        let model = ActiveModel {
            class_id: Set(announcement.class_id),
            author_id: Set(announcement.author_id),
            title: Set(announcement.title),
            content: Set(announcement.content),
            priority: Set(announcement.priority.to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(db_err("创建公告失败"))?;

        Ok(result.into_announcement())
    }

    pub async fn get_announcement_by_id_impl(&self, id: i64) -> Result<Option<Announcement>> {
        let result = Announcements::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询公告失败"))?;

        Ok(result.map(Model::into_announcement))
    }

    /// 按可见范围列出公告，最新的在前
    pub async fn list_announcements_impl(
        &self,
        scope: AnnouncementScope,
        class_id: Option<i64>,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Announcement>> {
        let mut select = Announcements::find();

        if let AnnouncementScope::Classes(ids) = scope {
            select = select.filter(
                Condition::any()
                    .add(Column::ClassId.is_null())
                    .add(Column::ClassId.is_in(ids)),
            );
        }

        if let Some(class_id) = class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }

        select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        self.fetch_page(select, pagination, "查询公告列表失败", Model::into_announcement)
            .await
    }

    pub async fn delete_announcement_impl(&self, id: i64) -> Result<bool> {
        let result = Announcements::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除公告失败"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_announcements_impl(&self) -> Result<u64> {
        Announcements::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计公告失败"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_storage, seed_user};
    use super::*;
    use crate::models::announcements::AnnouncementPriority;
    use crate::models::classes::requests::NewClass;
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_scope_includes_global_and_own_classes() {
        let storage = memory_storage().await;
        let teacher = seed_user(&storage, "teacher1", UserRole::Teacher).await;
        let mut class_ids = Vec::new();
        for code in ["MUSI2345", "DRAM2345"] {
            let class = storage
                .create_class_impl(NewClass {
                    teacher_id: teacher.id,
                    name: code.to_string(),
                    subject: None,
                    description: None,
                    room: None,
                    schedule: None,
                    capacity: None,
                    class_code: code.to_string(),
                })
                .await
                .unwrap();
            class_ids.push(class.id);
        }

        for class_id in [None, Some(class_ids[0]), Some(class_ids[1])] {
            storage
                .create_announcement_impl(NewAnnouncement {
                    class_id,
                    author_id: teacher.id,
                    title: "Notice".to_string(),
                    content: "Body".to_string(),
                    priority: AnnouncementPriority::Normal,
                })
                .await
                .unwrap();
        }

        let visible = storage
            .list_announcements_impl(
                AnnouncementScope::Classes(vec![class_ids[0]]),
                None,
                PaginationQuery::default(),
            )
            .await
            .unwrap();
        assert_eq!(visible.pagination.total, 2);
        assert!(
            visible
                .items
                .iter()
                .all(|a| a.class_id.is_none() || a.class_id == Some(class_ids[0]))
        );

        let all = storage
            .list_announcements_impl(AnnouncementScope::All, None, PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(all.pagination.total, 3);
    }
}
