use actix_web::HttpRequest;
use tracing::info;

use super::SubmissionService;
use crate::models::ErrorCode;
use crate::models::audit::actions;
use crate::models::notifications::{NewNotification, NotificationKind};
use crate::models::submissions::GradeSubmissionRequest;
use crate::services::access::{current_user, manager_context};
use crate::services::audit::{AuditEntry, record};
use crate::services::notifications::dispatch;
use crate::services::responses::{ServiceResult, bad_request, internal, not_found, ok};
use crate::utils::validate::validate_text;

pub async fn grade_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
    grade_data: GradeSubmissionRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let submission = storage
        .get_submission_by_id(submission_id)
        .await
        .map_err(internal("Failed to load submission"))?
        .ok_or_else(|| not_found(ErrorCode::SubmissionNotFound, "Submission not found"))?;
    let assignment = storage
        .get_assignment_by_id(submission.assignment_id)
        .await
        .map_err(internal("Failed to load assignment"))?
        .ok_or_else(|| not_found(ErrorCode::AssignmentNotFound, "Assignment not found"))?;
    manager_context(&storage, &user, assignment.class_id).await?;

    if !grade_data.score.is_finite()
        || grade_data.score < 0.0
        || grade_data.score > assignment.max_points
    {
        return Err(bad_request(
            ErrorCode::ScoreOutOfRange,
            format!("Score must be between 0 and {}", assignment.max_points),
        ));
    }
    if let Some(feedback) = &grade_data.feedback {
        validate_text("Feedback", feedback, 0, 5000)
            .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }

    let graded = storage
        .grade_submission(submission.id, grade_data.score, grade_data.feedback, user.id)
        .await
        .map_err(internal("Failed to grade submission"))?
        .ok_or_else(|| not_found(ErrorCode::SubmissionNotFound, "Submission not found"))?;

    dispatch(
        &storage,
        vec![
            NewNotification::new(
                graded.student_id,
                NotificationKind::Grade,
                format!("Your submission for {} has been graded", assignment.title),
            )
            .content(format!("Score: {} / {}", grade_data.score, assignment.max_points))
            .reference("submission", graded.id),
        ],
    )
    .await;

    record(
        &storage,
        request,
        user.id,
        AuditEntry {
            action: actions::SUBMISSION_GRADE,
            entity_type: "submission",
            entity_id: graded.id,
            details: Some(format!("score={}", grade_data.score)),
        },
    )
    .await;

    info!("Submission {} graded by {}", graded.id, user.username);
    ok(graded, "Submission graded successfully")
}
