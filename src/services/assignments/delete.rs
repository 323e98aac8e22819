use actix_web::HttpRequest;
use tracing::info;

use super::AssignmentService;
use crate::models::ErrorCode;
use crate::services::access::{current_user, manager_context};
use crate::services::responses::{ServiceResult, internal, not_found, ok_message};

pub async fn delete_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await
        .map_err(internal("Failed to load assignment"))?
        .ok_or_else(|| not_found(ErrorCode::AssignmentNotFound, "Assignment not found"))?;
    manager_context(&storage, &user, assignment.class_id).await?;

    storage
        .delete_assignment(assignment.id)
        .await
        .map_err(internal("Failed to delete assignment"))?;

    info!("Assignment {} deleted by {}", assignment.id, user.username);
    ok_message("Assignment deleted successfully")
}
