//! 作业存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments, Model};
use crate::errors::Result;
use crate::models::{
    PaginatedResponse, PaginationQuery,
    assignments::{Assignment, NewAssignment, UpdateAssignmentRequest},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn create_assignment_impl(&self, assignment: NewAssignment) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            class_id: Set(assignment.class_id),
            created_by: Set(assignment.created_by),
            title: Set(assignment.title),
            description: Set(assignment.description),
            due_date: Set(assignment.due_date.map(|d| d.timestamp())),
            max_points: Set(assignment.max_points),
            allow_late: Set(assignment.allow_late),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(db_err("创建作业失败"))?;

        Ok(result.into_assignment())
    }

    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询作业失败"))?;

        Ok(result.map(Model::into_assignment))
    }

    pub async fn list_class_assignments_impl(
        &self,
        class_id: i64,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Assignment>> {
        let select = Assignments::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        self.fetch_page(select, pagination, "查询作业列表失败", Model::into_assignment)
            .await
    }

    /// 多个班级的全部作业，按截止时间升序
    pub async fn list_assignments_for_classes_impl(
        &self,
        class_ids: &[i64],
    ) -> Result<Vec<Assignment>> {
        if class_ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Assignments::find()
            .filter(Column::ClassId.is_in(class_ids.iter().copied()))
            .order_by_asc(Column::DueDate)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("查询作业列表失败"))?;

        Ok(result.into_iter().map(Model::into_assignment).collect())
    }

    pub async fn update_assignment_impl(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        let Some(existing) = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询作业失败"))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();

        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(due_date) = update.due_date {
            model.due_date = Set(Some(due_date.timestamp()));
        }
        if let Some(max_points) = update.max_points {
            model.max_points = Set(max_points);
        }
        if let Some(allow_late) = update.allow_late {
            model.allow_late = Set(allow_late);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model.update(&self.db).await.map_err(db_err("更新作业失败"))?;

        Ok(Some(updated.into_assignment()))
    }

    pub async fn delete_assignment_impl(&self, id: i64) -> Result<bool> {
        let result = Assignments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除作业失败"))?;

        Ok(result.rows_affected > 0)
    }
}
