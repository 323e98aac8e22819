//! 班级存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::classes::{ActiveModel, Column, Entity as Classes, Model};
use crate::errors::Result;
use crate::models::{
    PaginatedResponse,
    classes::{
        entities::Class,
        requests::{ClassListQuery, NewClass, UpdateClassRequest},
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建班级，班级码由服务层生成
    pub async fn create_class_impl(&self, class: NewClass) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            teacher_id: Set(class.teacher_id),
            name: Set(class.name),
            subject: Set(class.subject),
            description: Set(class.description),
            room: Set(class.room),
            schedule: Set(class.schedule),
            capacity: Set(class.capacity),
            class_code: Set(class.class_code),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(db_err("创建班级失败"))?;

        Ok(result.into_class())
    }

    pub async fn get_class_by_id_impl(&self, class_id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询班级失败"))?;

        Ok(result.map(Model::into_class))
    }

    /// 通过班级码获取班级
    pub async fn get_class_by_code_impl(&self, class_code: &str) -> Result<Option<Class>> {
        let result = Classes::find()
            .filter(Column::ClassCode.eq(class_code))
            .one(&self.db)
            .await
            .map_err(db_err("查询班级失败"))?;

        Ok(result.map(Model::into_class))
    }

    pub async fn get_classes_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<Class>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Classes::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err("批量查询班级失败"))?;

        Ok(result.into_iter().map(Model::into_class).collect())
    }

    /// 分页列出班级
    pub async fn list_classes_with_pagination_impl(
        &self,
        query: ClassListQuery,
    ) -> Result<PaginatedResponse<Class>> {
        let mut select = Classes::find();

        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        // 学生只看到已批准加入的班级
        if let Some(student_id) = query.student_id {
            let class_ids = self.list_approved_class_ids_impl(student_id).await?;
            select = select.filter(Column::Id.is_in(class_ids));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Name.contains(&escaped))
                    .add(Column::Subject.contains(&escaped)),
            );
        }

        select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        self.fetch_page(select, query.pagination, "查询班级列表失败", Model::into_class)
            .await
    }

    pub async fn list_teacher_class_ids_impl(&self, teacher_id: i64) -> Result<Vec<i64>> {
        Classes::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::TeacherId.eq(teacher_id))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_err("查询教师班级失败"))
    }

    /// 更新班级信息
    pub async fn update_class_impl(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        let Some(existing) = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询班级失败"))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();

        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(subject) = update.subject {
            model.subject = Set(Some(subject));
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(room) = update.room {
            model.room = Set(Some(room));
        }
        if let Some(schedule) = update.schedule {
            model.schedule = Set(Some(schedule));
        }
        if let Some(capacity) = update.capacity {
            model.capacity = Set(Some(capacity));
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model.update(&self.db).await.map_err(db_err("更新班级失败"))?;

        Ok(Some(updated.into_class()))
    }

    /// 删除班级，关联数据由外键级联删除
    pub async fn delete_class_impl(&self, class_id: i64) -> Result<bool> {
        let result = Classes::delete_by_id(class_id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除班级失败"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_classes_impl(&self) -> Result<u64> {
        Classes::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计班级失败"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_storage, seed_user};
    use super::*;
    use crate::errors::EduConnectError;
    use crate::models::users::entities::UserRole;

    fn new_class(teacher_id: i64, name: &str, code: &str) -> NewClass {
        NewClass {
            teacher_id,
            name: name.to_string(),
            subject: Some("Math".to_string()),
            description: None,
            room: None,
            schedule: None,
            capacity: Some(30),
            class_code: code.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_class_and_find_by_code() {
        let storage = memory_storage().await;
        let teacher = seed_user(&storage, "teacher1", UserRole::Teacher).await;

        let class = storage
            .create_class_impl(new_class(teacher.id, "Algebra", "ABCD2345"))
            .await
            .unwrap();

        let found = storage.get_class_by_code_impl("ABCD2345").await.unwrap();
        assert_eq!(found.map(|c| c.id), Some(class.id));
        assert_eq!(
            storage.list_teacher_class_ids_impl(teacher.id).await.unwrap(),
            vec![class.id]
        );
    }

    #[tokio::test]
    async fn test_duplicate_class_code_conflicts() {
        let storage = memory_storage().await;
        let teacher = seed_user(&storage, "teacher1", UserRole::Teacher).await;

        storage
            .create_class_impl(new_class(teacher.id, "A", "SAMECODE"))
            .await
            .unwrap();
        let err = storage
            .create_class_impl(new_class(teacher.id, "B", "SAMECODE"))
            .await
            .unwrap_err();

        assert!(matches!(err, EduConnectError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_classes_by_teacher_and_search() {
        let storage = memory_storage().await;
        let t1 = seed_user(&storage, "teacher1", UserRole::Teacher).await;
        let t2 = seed_user(&storage, "teacher2", UserRole::Teacher).await;
        storage
            .create_class_impl(new_class(t1.id, "Physics 101", "PHYS0001"))
            .await
            .unwrap();
        storage
            .create_class_impl(new_class(t2.id, "History", "HIST0001"))
            .await
            .unwrap();

        let mine = storage
            .list_classes_with_pagination_impl(ClassListQuery {
                teacher_id: Some(t1.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.items.len(), 1);

        let searched = storage
            .list_classes_with_pagination_impl(ClassListQuery {
                search: Some("hist".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(searched.items.len(), 1);
        assert_eq!(searched.items[0].name, "History");
    }
}
