use actix_web::HttpRequest;

use super::SubmissionService;
use crate::models::ErrorCode;
use crate::services::access::{current_user, manager_context, require_student};
use crate::services::assignments::get::load_assignment;
use crate::services::responses::{ServiceResult, internal, not_found, ok};

pub async fn get_my_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ServiceResult {
    let student = current_user(request)?;
    require_student(&student)?;
    let storage = service.get_storage(request)?;

    let (assignment, _) = load_assignment(&storage, &student, assignment_id).await?;

    match storage
        .get_submission(assignment.id, student.id)
        .await
        .map_err(internal("Failed to load submission"))?
    {
        Some(submission) => ok(submission, "Submission retrieved successfully"),
        None => Err(not_found(
            ErrorCode::SubmissionNotFound,
            "You have not submitted this assignment",
        )),
    }
}

pub async fn get_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let submission = storage
        .get_submission_by_id(submission_id)
        .await
        .map_err(internal("Failed to load submission"))?
        .ok_or_else(|| not_found(ErrorCode::SubmissionNotFound, "Submission not found"))?;

    // 学生本人或班级管理者可以查看
    if submission.student_id != user.id {
        let assignment = storage
            .get_assignment_by_id(submission.assignment_id)
            .await
            .map_err(internal("Failed to load assignment"))?
            .ok_or_else(|| not_found(ErrorCode::AssignmentNotFound, "Assignment not found"))?;
        manager_context(&storage, &user, assignment.class_id).await?;
    }

    ok(submission, "Submission retrieved successfully")
}
