use actix_web::HttpRequest;
use tracing::info;

use super::{AssignmentService, validate_max_points};
use crate::models::ErrorCode;
use crate::models::assignments::{CreateAssignmentRequest, NewAssignment};
use crate::models::notifications::{NewNotification, NotificationKind};
use crate::services::access::{current_user, route_class_context};
use crate::services::notifications::dispatch;
use crate::services::responses::{ServiceResult, bad_request, created, internal};
use crate::utils::validate::validate_text;

pub async fn create_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_data: CreateAssignmentRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let ctx = route_class_context(request)?;
    let storage = service.get_storage(request)?;

    validate_text("Title", &assignment_data.title, 1, 200)
        .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    validate_max_points(assignment_data.max_points)
        .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    if assignment_data
        .due_date
        .is_some_and(|due| due <= chrono::Utc::now())
    {
        return Err(bad_request(
            ErrorCode::BadRequest,
            "Due date must be in the future",
        ));
    }

    let assignment = storage
        .create_assignment(NewAssignment {
            class_id: ctx.class.id,
            created_by: user.id,
            title: assignment_data.title.trim().to_string(),
            description: assignment_data.description,
            due_date: assignment_data.due_date,
            max_points: assignment_data.max_points,
            allow_late: assignment_data.allow_late,
        })
        .await
        .map_err(internal("Failed to create assignment"))?;

    // 通知所有已批准的学生
    let students = storage
        .list_approved_student_ids(ctx.class.id)
        .await
        .map_err(internal("Failed to load students"))?;
    let notifications = students
        .into_iter()
        .map(|student_id| {
            NewNotification::new(
                student_id,
                NotificationKind::Assignment,
                format!("New assignment in {}: {}", ctx.class.name, assignment.title),
            )
            .reference("assignment", assignment.id)
        })
        .collect();
    dispatch(&storage, notifications).await;

    info!(
        "Assignment {} created in class {} by {}",
        assignment.id, ctx.class.id, user.username
    );
    created(assignment, "Assignment created successfully")
}
