use actix_web::HttpRequest;
use tracing::info;

use super::SubmissionService;
use crate::middlewares::require_class_access::ClassRole;
use crate::models::ErrorCode;
use crate::models::submissions::{SubmissionStatus, SubmitAssignmentRequest};
use crate::services::access::{current_user, require_student};
use crate::services::assignments::get::load_assignment;
use crate::services::responses::{
    ServiceResult, bad_request, conflict, conflict_or_internal, forbidden, ok,
};
use crate::utils::validate::{validate_text, validate_url};

pub async fn submit_assignment(
    service: &SubmissionService,
    request: &HttpRequest,
    assignment_id: i64,
    submission_data: SubmitAssignmentRequest,
) -> ServiceResult {
    let student = current_user(request)?;
    require_student(&student)?;
    let storage = service.get_storage(request)?;

    // 只有已批准加入班级的学生能提交
    let (assignment, ctx) = load_assignment(&storage, &student, assignment_id).await?;
    if ctx.role != ClassRole::Student {
        return Err(forbidden(
            ErrorCode::ClassPermissionDenied,
            "You are not enrolled in this class",
        ));
    }

    validate_text("Content", &submission_data.content, 1, 10_000)
        .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    if let Some(url) = &submission_data.attachment_url {
        validate_url(url).map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }

    let status = if assignment.is_past_due(chrono::Utc::now()) {
        if !assignment.allow_late {
            return Err(bad_request(
                ErrorCode::AssignmentPastDue,
                "The due date has passed and late submissions are not allowed",
            ));
        }
        SubmissionStatus::Late
    } else {
        SubmissionStatus::Submitted
    };

    let submission = storage
        .upsert_submission(
            assignment.id,
            student.id,
            submission_data.content,
            submission_data.attachment_url,
            status,
        )
        .await
        // 并发的首次提交撞上唯一索引
        .map_err(conflict_or_internal(
            ErrorCode::SubmissionAlreadyExists,
            "Submission is being saved by another request, please retry",
            "Failed to save submission",
        ))?
        .ok_or_else(|| {
            conflict(
                ErrorCode::SubmissionAlreadyGraded,
                "Submission has already been graded",
            )
        })?;

    info!(
        "Student {} submitted assignment {} ({})",
        student.username, assignment.id, submission.status
    );
    ok(submission, "Assignment submitted successfully")
}
