use actix_web::HttpRequest;
use tracing::info;

use super::{ClassService, validate_capacity};
use crate::models::ErrorCode;
use crate::models::classes::requests::UpdateClassRequest;
use crate::services::access::route_class_context;
use crate::services::responses::{ServiceResult, bad_request, internal, not_found, ok};
use crate::utils::validate::validate_text;

pub async fn update_class(
    service: &ClassService,
    request: &HttpRequest,
    mut update_data: UpdateClassRequest,
) -> ServiceResult {
    let ctx = route_class_context(request)?;
    let storage = service.get_storage(request)?;

    if let Some(name) = &update_data.name {
        validate_text("Class name", name, 1, 100)
            .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
        update_data.name = Some(name.trim().to_string());
    }
    validate_capacity(update_data.capacity).map_err(|e| bad_request(ErrorCode::BadRequest, e))?;

    // 容量不能低于已批准人数
    if let Some(capacity) = update_data.capacity {
        let approved = storage
            .count_approved_students(ctx.class.id)
            .await
            .map_err(internal("Failed to count students"))?;
        if u64::try_from(capacity).unwrap_or(0) < approved {
            return Err(bad_request(
                ErrorCode::BadRequest,
                format!("Capacity cannot be lower than the {approved} enrolled students"),
            ));
        }
    }

    let class = storage
        .update_class(ctx.class.id, update_data)
        .await
        .map_err(internal("Failed to update class"))?
        .ok_or_else(|| not_found(ErrorCode::ClassNotFound, "Class not found"))?;

    info!("Class {} updated", class.id);
    ok(class, "Class updated successfully")
}
