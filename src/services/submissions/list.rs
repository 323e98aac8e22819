use actix_web::HttpRequest;

use super::SubmissionService;
use crate::models::ErrorCode;
use crate::models::submissions::{SubmissionListParams, SubmissionWithStudent};
use crate::services::access::{current_user, manager_context, user_summaries};
use crate::services::responses::{ServiceResult, internal, not_found, ok};

pub async fn list_submissions(
    service: &SubmissionService,
    request: &HttpRequest,
    assignment_id: i64,
    query: SubmissionListParams,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await
        .map_err(internal("Failed to load assignment"))?
        .ok_or_else(|| not_found(ErrorCode::AssignmentNotFound, "Assignment not found"))?;
    manager_context(&storage, &user, assignment.class_id).await?;

    let page = storage
        .list_assignment_submissions(assignment.id, query.status, query.pagination)
        .await
        .map_err(internal("Failed to list submissions"))?;

    let students = user_summaries(&storage, page.items.iter().map(|s| s.student_id)).await?;
    let page = page.map(|submission| SubmissionWithStudent {
        student: students.get(&submission.student_id).cloned(),
        submission,
    });

    ok(page, "Submissions retrieved successfully")
}
