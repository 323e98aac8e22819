use actix_web::HttpRequest;

use super::NotificationService;
use crate::models::ErrorCode;
use crate::models::notifications::MarkAllReadResponse;
use crate::services::access::current_user;
use crate::services::responses::{ServiceResult, internal, not_found, ok, ok_message};

pub async fn mark_read(
    service: &NotificationService,
    request: &HttpRequest,
    notification_id: i64,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    // 只能操作自己的通知，他人的视为不存在
    let updated = storage
        .mark_notification_read(notification_id, user.id)
        .await
        .map_err(internal("Failed to update notification"))?;

    if !updated {
        return Err(not_found(
            ErrorCode::NotificationNotFound,
            "Notification not found",
        ));
    }
    ok_message("Notification marked as read")
}

pub async fn mark_all_read(service: &NotificationService, request: &HttpRequest) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let updated = storage
        .mark_all_notifications_read(user.id)
        .await
        .map_err(internal("Failed to update notifications"))?;

    ok(
        MarkAllReadResponse {
            updated: updated as i64,
        },
        "All notifications marked as read",
    )
}
