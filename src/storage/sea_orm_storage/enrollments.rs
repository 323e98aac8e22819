//! 选课存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::class_enrollments::{ActiveModel, Column, Entity as Enrollments, Model};
use crate::errors::Result;
use crate::models::{
    PaginatedResponse, PaginationQuery,
    enrollments::{Enrollment, EnrollmentStatus},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::Expr,
};

impl SeaOrmStorage {
    pub async fn get_enrollment_by_id_impl(&self, id: i64) -> Result<Option<Enrollment>> {
        let result = Enrollments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询选课记录失败"))?;

        Ok(result.map(Model::into_enrollment))
    }

    pub async fn get_enrollment_impl(
        &self,
        class_id: i64,
        student_id: i64,
    ) -> Result<Option<Enrollment>> {
        let result = Enrollments::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(db_err("查询选课记录失败"))?;

        Ok(result.map(Model::into_enrollment))
    }

    /// 提交加入申请
    ///
    /// 已存在记录时重置为 pending，调用方负责排除 pending/approved 状态。
    pub async fn request_enrollment_impl(
        &self,
        class_id: i64,
        student_id: i64,
        message: Option<String>,
    ) -> Result<Enrollment> {
        let now = chrono::Utc::now().timestamp();

        let existing = Enrollments::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(db_err("查询选课记录失败"))?;

        let saved = match existing {
            Some(model) => {
                let mut active: ActiveModel = model.into();
                active.status = Set(EnrollmentStatus::Pending.to_string());
                active.message = Set(message);
                active.decided_by = Set(None);
                active.decided_at = Set(None);
                active.requested_at = Set(now);
                active.update(&self.db).await.map_err(db_err("更新选课申请失败"))?
            }
            None => ActiveModel {
                class_id: Set(class_id),
                student_id: Set(student_id),
                status: Set(EnrollmentStatus::Pending.to_string()),
                message: Set(message),
                requested_at: Set(now),
                ..Default::default()
            }
            .insert(&self.db)
            .await
            .map_err(db_err("创建选课申请失败"))?,
        };

        Ok(saved.into_enrollment())
    }

    pub async fn list_class_enrollments_impl(
        &self,
        class_id: i64,
        status: Option<EnrollmentStatus>,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Enrollment>> {
        let mut select = Enrollments::find().filter(Column::ClassId.eq(class_id));

        if let Some(status) = status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        select = select.order_by_desc(Column::RequestedAt).order_by_desc(Column::Id);

        self.fetch_page(select, pagination, "查询选课列表失败", Model::into_enrollment)
            .await
    }

    pub async fn list_student_enrollments_impl(
        &self,
        student_id: i64,
        status: Option<EnrollmentStatus>,
    ) -> Result<Vec<Enrollment>> {
        let mut select = Enrollments::find().filter(Column::StudentId.eq(student_id));

        if let Some(status) = status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        let result = select
            .order_by_desc(Column::RequestedAt)
            .all(&self.db)
            .await
            .map_err(db_err("查询选课列表失败"))?;

        Ok(result.into_iter().map(Model::into_enrollment).collect())
    }

    /// 审批申请，只有 pending 状态会被更新
    pub async fn decide_enrollment_impl(
        &self,
        id: i64,
        status: EnrollmentStatus,
        decided_by: i64,
    ) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Enrollments::update_many()
            .col_expr(Column::Status, Expr::value(status.as_str()))
            .col_expr(Column::DecidedBy, Expr::value(decided_by))
            .col_expr(Column::DecidedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(EnrollmentStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err("审批选课申请失败"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_enrollment_impl(&self, id: i64) -> Result<bool> {
        let result = Enrollments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除选课记录失败"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_approved_student_ids_impl(&self, class_id: i64) -> Result<Vec<i64>> {
        Enrollments::find()
            .select_only()
            .column(Column::StudentId)
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::Status.eq(EnrollmentStatus::Approved.as_str()))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_err("查询班级学生失败"))
    }

    pub async fn list_approved_class_ids_impl(&self, student_id: i64) -> Result<Vec<i64>> {
        Enrollments::find()
            .select_only()
            .column(Column::ClassId)
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::Status.eq(EnrollmentStatus::Approved.as_str()))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_err("查询学生班级失败"))
    }

    pub async fn count_enrollments_by_status_impl(
        &self,
        class_ids: Option<&[i64]>,
        status: EnrollmentStatus,
    ) -> Result<u64> {
        let mut select = Enrollments::find().filter(Column::Status.eq(status.as_str()));

        if let Some(ids) = class_ids {
            if ids.is_empty() {
                return Ok(0);
            }
            select = select.filter(Column::ClassId.is_in(ids.iter().copied()));
        }

        select.count(&self.db).await.map_err(db_err("统计选课记录失败"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_storage, seed_user};
    use super::*;
    use crate::models::classes::requests::NewClass;
    use crate::models::users::entities::UserRole;

    async fn setup() -> (SeaOrmStorage, i64, i64, i64) {
        let storage = memory_storage().await;
        let teacher = seed_user(&storage, "teacher1", UserRole::Teacher).await;
        let student = seed_user(&storage, "student1", UserRole::Student).await;
        let class = storage
            .create_class_impl(NewClass {
                teacher_id: teacher.id,
                name: "Biology".to_string(),
                subject: None,
                description: None,
                room: None,
                schedule: None,
                capacity: None,
                class_code: "BIOL2345".to_string(),
            })
            .await
            .unwrap();
        (storage, teacher.id, student.id, class.id)
    }

    #[tokio::test]
    async fn test_decide_only_applies_to_pending() {
        let (storage, teacher_id, student_id, class_id) = setup().await;
        let enrollment = storage
            .request_enrollment_impl(class_id, student_id, None)
            .await
            .unwrap();
        assert_eq!(enrollment.status, EnrollmentStatus::Pending);

        assert!(
            storage
                .decide_enrollment_impl(enrollment.id, EnrollmentStatus::Approved, teacher_id)
                .await
                .unwrap()
        );
        // 第二次审批不再生效
        assert!(
            !storage
                .decide_enrollment_impl(enrollment.id, EnrollmentStatus::Rejected, teacher_id)
                .await
                .unwrap()
        );

        let ids = storage.list_approved_class_ids_impl(student_id).await.unwrap();
        assert_eq!(ids, vec![class_id]);
        assert_eq!(
            storage
                .count_enrollments_by_status_impl(Some(&[class_id]), EnrollmentStatus::Approved)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_rejected_request_can_be_reopened() {
        let (storage, teacher_id, student_id, class_id) = setup().await;
        let first = storage
            .request_enrollment_impl(class_id, student_id, None)
            .await
            .unwrap();
        storage
            .decide_enrollment_impl(first.id, EnrollmentStatus::Rejected, teacher_id)
            .await
            .unwrap();

        let again = storage
            .request_enrollment_impl(class_id, student_id, Some("please".to_string()))
            .await
            .unwrap();

        assert_eq!(again.id, first.id);
        assert_eq!(again.status, EnrollmentStatus::Pending);
        assert!(again.decided_by.is_none());
        assert!(storage.list_approved_class_ids_impl(student_id).await.unwrap().is_empty());
    }
}
