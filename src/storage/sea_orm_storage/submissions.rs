//! 作业提交存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::assignments::{Column as AssignmentColumn, Entity as Assignments};
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions, Model};
use crate::errors::Result;
use crate::models::{
    PaginatedResponse, PaginationQuery,
    submissions::{Submission, SubmissionStatus},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::Expr,
};

impl SeaOrmStorage {
    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询提交失败"))?;

        Ok(result.map(Model::into_submission))
    }

    pub async fn get_submission_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        let result = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(db_err("查询提交失败"))?;

        Ok(result.map(Model::into_submission))
    }

    /// 新建或覆盖学生的提交
    ///
    /// 已批改的提交保持不变并返回 `None`。
    pub async fn upsert_submission_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
        content: String,
        attachment_url: Option<String>,
        status: SubmissionStatus,
    ) -> Result<Option<Submission>> {
        let now = chrono::Utc::now().timestamp();

        let existing = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(db_err("查询提交失败"))?;

        if let Some(model) = existing {
            // 带状态条件更新，已批改的提交不会被并发的重新提交覆盖
            let result = Submissions::update_many()
                .col_expr(Column::Content, Expr::value(content))
                .col_expr(Column::AttachmentUrl, Expr::value(attachment_url))
                .col_expr(Column::Status, Expr::value(status.as_str()))
                .col_expr(Column::SubmittedAt, Expr::value(now))
                .filter(Column::Id.eq(model.id))
                .filter(Column::Status.ne(SubmissionStatus::Graded.as_str()))
                .exec(&self.db)
                .await
                .map_err(db_err("更新提交失败"))?;
            if result.rows_affected == 0 {
                return Ok(None);
            }
            return self.get_submission_by_id_impl(model.id).await;
        }

        let saved = ActiveModel {
            assignment_id: Set(assignment_id),
            student_id: Set(student_id),
            content: Set(content),
            attachment_url: Set(attachment_url),
            status: Set(status.to_string()),
            submitted_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err("创建提交失败"))?;

        Ok(Some(saved.into_submission()))
    }

    pub async fn list_assignment_submissions_impl(
        &self,
        assignment_id: i64,
        status: Option<SubmissionStatus>,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Submission>> {
        let mut select = Submissions::find().filter(Column::AssignmentId.eq(assignment_id));

        if let Some(status) = status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        select = select.order_by_desc(Column::SubmittedAt).order_by_desc(Column::Id);

        self.fetch_page(select, pagination, "查询提交列表失败", Model::into_submission)
            .await
    }

    pub async fn list_student_submissions_impl(
        &self,
        student_id: i64,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>> {
        if assignment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Submissions::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::AssignmentId.is_in(assignment_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_err("查询提交列表失败"))?;

        Ok(result.into_iter().map(Model::into_submission).collect())
    }

    /// 批改提交，重复批改覆盖分数和评语
    pub async fn grade_submission_impl(
        &self,
        id: i64,
        score: f64,
        feedback: Option<String>,
        graded_by: i64,
    ) -> Result<Option<Submission>> {
        let Some(existing) = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询提交失败"))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.score = Set(Some(score));
        model.feedback = Set(feedback);
        model.status = Set(SubmissionStatus::Graded.to_string());
        model.graded_by = Set(Some(graded_by));
        model.graded_at = Set(Some(chrono::Utc::now().timestamp()));

        let updated = model.update(&self.db).await.map_err(db_err("批改提交失败"))?;

        Ok(Some(updated.into_submission()))
    }

    /// 指定班级中尚未批改的提交数
    pub async fn count_ungraded_submissions_impl(&self, class_ids: &[i64]) -> Result<u64> {
        if class_ids.is_empty() {
            return Ok(0);
        }

        let assignment_ids: Vec<i64> = Assignments::find()
            .select_only()
            .column(AssignmentColumn::Id)
            .filter(AssignmentColumn::ClassId.is_in(class_ids.iter().copied()))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_err("查询作业失败"))?;

        if assignment_ids.is_empty() {
            return Ok(0);
        }

        Submissions::find()
            .filter(Column::AssignmentId.is_in(assignment_ids))
            .filter(Column::Status.ne(SubmissionStatus::Graded.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err("统计提交失败"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_storage, seed_user};
    use super::*;
    use crate::models::assignments::NewAssignment;
    use crate::models::classes::requests::NewClass;
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_graded_submission_is_not_overwritten() {
        let storage = memory_storage().await;
        let teacher = seed_user(&storage, "teacher1", UserRole::Teacher).await;
        let student = seed_user(&storage, "student1", UserRole::Student).await;
        let class = storage
            .create_class_impl(NewClass {
                teacher_id: teacher.id,
                name: "Chemistry".to_string(),
                subject: None,
                description: None,
                room: None,
                schedule: None,
                capacity: None,
                class_code: "CHEM2345".to_string(),
            })
            .await
            .unwrap();
        let assignment = storage
            .create_assignment_impl(NewAssignment {
                class_id: class.id,
                created_by: teacher.id,
                title: "Lab report".to_string(),
                description: None,
                due_date: None,
                max_points: 100.0,
                allow_late: false,
            })
            .await
            .unwrap();

        let first = storage
            .upsert_submission_impl(
                assignment.id,
                student.id,
                "draft".to_string(),
                None,
                SubmissionStatus::Submitted,
            )
            .await
            .unwrap()
            .unwrap();

        // 批改前可以覆盖
        let second = storage
            .upsert_submission_impl(
                assignment.id,
                student.id,
                "final".to_string(),
                None,
                SubmissionStatus::Submitted,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.content, "final");
        assert_eq!(
            storage.count_ungraded_submissions_impl(&[class.id]).await.unwrap(),
            1
        );

        let graded = storage
            .grade_submission_impl(second.id, 88.0, Some("good".to_string()), teacher.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(graded.status, SubmissionStatus::Graded);
        assert_eq!(graded.score, Some(88.0));

        let blocked = storage
            .upsert_submission_impl(
                assignment.id,
                student.id,
                "too late".to_string(),
                None,
                SubmissionStatus::Submitted,
            )
            .await
            .unwrap();
        assert!(blocked.is_none());
        let kept = storage
            .get_submission_by_id_impl(graded.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.status, SubmissionStatus::Graded);
        assert_eq!(kept.content, "final");
        assert_eq!(
            storage.count_ungraded_submissions_impl(&[class.id]).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_duplicate_first_submission_is_conflict() {
        let storage = memory_storage().await;
        let teacher = seed_user(&storage, "teacher2", UserRole::Teacher).await;
        let student = seed_user(&storage, "student2", UserRole::Student).await;
        let class = storage
            .create_class_impl(NewClass {
                teacher_id: teacher.id,
                name: "History".to_string(),
                subject: None,
                description: None,
                room: None,
                schedule: None,
                capacity: None,
                class_code: "HIST2345".to_string(),
            })
            .await
            .unwrap();
        let assignment = storage
            .create_assignment_impl(NewAssignment {
                class_id: class.id,
                created_by: teacher.id,
                title: "Essay".to_string(),
                description: None,
                due_date: None,
                max_points: 10.0,
                allow_late: false,
            })
            .await
            .unwrap();

        storage
            .upsert_submission_impl(
                assignment.id,
                student.id,
                "first".to_string(),
                None,
                SubmissionStatus::Submitted,
            )
            .await
            .unwrap();

        // 另一个请求在查询之后插入同一行
        let err = ActiveModel {
            assignment_id: Set(assignment.id),
            student_id: Set(student.id),
            content: Set("second".to_string()),
            attachment_url: Set(None),
            status: Set(SubmissionStatus::Submitted.to_string()),
            submitted_at: Set(0),
            ..Default::default()
        }
        .insert(&storage.db)
        .await
        .map_err(db_err("创建提交失败"))
        .unwrap_err();
        assert!(matches!(err, crate::errors::EduConnectError::Conflict(_)));
    }
}
