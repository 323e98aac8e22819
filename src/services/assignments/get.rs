use actix_web::{HttpRequest, HttpResponse};
use std::collections::HashMap;
use std::sync::Arc;

use super::{AssignmentService, with_student_status};
use crate::middlewares::ClassContext;
use crate::middlewares::require_class_access::ClassRole;
use crate::models::ErrorCode;
use crate::models::assignments::Assignment;
use crate::models::users::entities::User;
use crate::services::access::{class_context, current_user};
use crate::services::responses::{ServiceResult, internal, not_found, ok};
use crate::storage::Storage;

pub async fn get_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let (assignment, ctx) = load_assignment(&storage, &user, assignment_id).await?;

    if ctx.role == ClassRole::Student {
        let class_names = HashMap::from([(ctx.class.id, ctx.class.name)]);
        let mut items = with_student_status(&storage, user.id, vec![assignment], &class_names).await?;
        if let Some(item) = items.pop() {
            return ok(item, "Assignment retrieved successfully");
        }
        return Err(not_found(ErrorCode::AssignmentNotFound, "Assignment not found"));
    }

    ok(assignment, "Assignment retrieved successfully")
}

/// 读取作业并校验班级成员身份
pub(crate) async fn load_assignment(
    storage: &Arc<dyn Storage>,
    user: &User,
    assignment_id: i64,
) -> Result<(Assignment, ClassContext), HttpResponse> {
    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await
        .map_err(internal("Failed to load assignment"))?
        .ok_or_else(|| not_found(ErrorCode::AssignmentNotFound, "Assignment not found"))?;

    let ctx = class_context(storage, user, assignment.class_id).await?;
    Ok((assignment, ctx))
}
