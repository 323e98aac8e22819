use actix_web::HttpRequest;
use std::collections::HashMap;

use super::{AssignmentService, with_student_status};
use crate::middlewares::require_class_access::ClassRole;
use crate::models::PaginatedResponse;
use crate::models::assignments::{AssignmentListParams, MyAssignmentParams};
use crate::services::access::{current_user, require_student, route_class_context};
use crate::services::responses::{ServiceResult, internal, ok};

pub async fn list_class_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
    query: AssignmentListParams,
) -> ServiceResult {
    let user = current_user(request)?;
    let ctx = route_class_context(request)?;
    let storage = service.get_storage(request)?;

    let page = storage
        .list_class_assignments(ctx.class.id, query.pagination)
        .await
        .map_err(internal("Failed to list assignments"))?;

    if ctx.role != ClassRole::Student {
        return ok(page, "Assignments retrieved successfully");
    }

    // 学生看到自己的提交状态
    let class_names = HashMap::from([(ctx.class.id, ctx.class.name.clone())]);
    let pagination = page.pagination;
    let items = with_student_status(&storage, user.id, page.items, &class_names).await?;
    ok(
        PaginatedResponse { items, pagination },
        "Assignments retrieved successfully",
    )
}

pub async fn list_my_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
    query: MyAssignmentParams,
) -> ServiceResult {
    let student = current_user(request)?;
    require_student(&student)?;
    let storage = service.get_storage(request)?;

    let class_ids = storage
        .list_approved_class_ids(student.id)
        .await
        .map_err(internal("Failed to load classes"))?;
    let class_names: HashMap<i64, String> = storage
        .get_classes_by_ids(&class_ids)
        .await
        .map_err(internal("Failed to load classes"))?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let assignments = storage
        .list_assignments_for_classes(&class_ids)
        .await
        .map_err(internal("Failed to list assignments"))?;

    let mut items = with_student_status(&storage, student.id, assignments, &class_names).await?;
    if query.pending_only.unwrap_or(false) {
        items.retain(|a| a.submission_status.is_none());
    }

    ok(items, "Assignments retrieved successfully")
}
