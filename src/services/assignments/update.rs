use actix_web::HttpRequest;
use tracing::info;

use super::{AssignmentService, validate_max_points};
use crate::models::ErrorCode;
use crate::models::assignments::UpdateAssignmentRequest;
use crate::services::access::{current_user, manager_context};
use crate::services::responses::{ServiceResult, bad_request, internal, not_found, ok};
use crate::utils::validate::validate_text;

pub async fn update_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
    mut update_data: UpdateAssignmentRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await
        .map_err(internal("Failed to load assignment"))?
        .ok_or_else(|| not_found(ErrorCode::AssignmentNotFound, "Assignment not found"))?;
    manager_context(&storage, &user, assignment.class_id).await?;

    if let Some(title) = &update_data.title {
        validate_text("Title", title, 1, 200)
            .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
        update_data.title = Some(title.trim().to_string());
    }
    if let Some(max_points) = update_data.max_points {
        validate_max_points(max_points).map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }

    let assignment = storage
        .update_assignment(assignment.id, update_data)
        .await
        .map_err(internal("Failed to update assignment"))?
        .ok_or_else(|| not_found(ErrorCode::AssignmentNotFound, "Assignment not found"))?;

    info!("Assignment {} updated by {}", assignment.id, user.username);
    ok(assignment, "Assignment updated successfully")
}
