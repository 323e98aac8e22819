use actix_web::HttpRequest;
use tracing::info;

use super::ClassService;
use crate::models::ErrorCode;
use crate::models::audit::actions;
use crate::services::access::{current_user, route_class_context};
use crate::services::audit::{AuditEntry, record};
use crate::services::responses::{ServiceResult, internal, not_found, ok_message};

pub async fn delete_class(service: &ClassService, request: &HttpRequest) -> ServiceResult {
    let user = current_user(request)?;
    let ctx = route_class_context(request)?;
    let storage = service.get_storage(request)?;

    // 选课、作业、考试等数据随班级级联删除
    let deleted = storage
        .delete_class(ctx.class.id)
        .await
        .map_err(internal("Failed to delete class"))?;
    if !deleted {
        return Err(not_found(ErrorCode::ClassNotFound, "Class not found"));
    }

    record(
        &storage,
        request,
        user.id,
        AuditEntry {
            action: actions::CLASS_DELETE,
            entity_type: "class",
            entity_id: ctx.class.id,
            details: Some(ctx.class.name.clone()),
        },
    )
    .await;

    info!("Class {} deleted by {}", ctx.class.id, user.username);
    ok_message("Class deleted successfully")
}
