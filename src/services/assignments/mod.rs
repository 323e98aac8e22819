pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;
use std::sync::Arc;

use super::declare_service;
use super::responses::{finish, internal};
use crate::models::assignments::{
    Assignment, AssignmentListParams, CreateAssignmentRequest, MyAssignmentParams,
    StudentAssignment, UpdateAssignmentRequest,
};
use crate::storage::Storage;

declare_service!(AssignmentService);

impl AssignmentService {
    // 班级作业列表
    pub async fn list_class_assignments(
        &self,
        request: &HttpRequest,
        query: AssignmentListParams,
    ) -> ActixResult<HttpResponse> {
        finish(list::list_class_assignments(self, request, query).await)
    }

    // 学生所有班级的作业
    pub async fn list_my_assignments(
        &self,
        request: &HttpRequest,
        query: MyAssignmentParams,
    ) -> ActixResult<HttpResponse> {
        finish(list::list_my_assignments(self, request, query).await)
    }

    pub async fn create_assignment(
        &self,
        request: &HttpRequest,
        assignment_data: CreateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        finish(create::create_assignment(self, request, assignment_data).await)
    }

    pub async fn get_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(get::get_assignment(self, request, assignment_id).await)
    }

    pub async fn update_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        update_data: UpdateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        finish(update::update_assignment(self, request, assignment_id, update_data).await)
    }

    pub async fn delete_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(delete::delete_assignment(self, request, assignment_id).await)
    }
}

/// 满分必须为正且有上限
pub(crate) fn validate_max_points(max_points: f64) -> Result<(), &'static str> {
    if max_points.is_finite() && max_points > 0.0 && max_points <= 1000.0 {
        Ok(())
    } else {
        Err("Max points must be greater than 0 and at most 1000")
    }
}

/// 给作业附上学生自己的提交状态
pub(crate) async fn with_student_status(
    storage: &Arc<dyn Storage>,
    student_id: i64,
    assignments: Vec<Assignment>,
    class_names: &HashMap<i64, String>,
) -> Result<Vec<StudentAssignment>, HttpResponse> {
    let ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();
    let submissions: HashMap<i64, _> = storage
        .list_student_submissions(student_id, &ids)
        .await
        .map_err(internal("Failed to load submissions"))?
        .into_iter()
        .map(|s| (s.assignment_id, s))
        .collect();

    Ok(assignments
        .into_iter()
        .map(|assignment| {
            let submission = submissions.get(&assignment.id);
            StudentAssignment {
                class_name: class_names.get(&assignment.class_id).cloned(),
                submission_status: submission.map(|s| s.status),
                score: submission.and_then(|s| s.score),
                assignment,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_max_points() {
        assert!(validate_max_points(100.0).is_ok());
        assert!(validate_max_points(0.0).is_err());
        assert!(validate_max_points(-5.0).is_err());
        assert!(validate_max_points(f64::NAN).is_err());
    }
}
