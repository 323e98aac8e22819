use actix_web::HttpRequest;

use super::NotificationService;
use crate::models::ErrorCode;
use crate::services::access::current_user;
use crate::services::responses::{ServiceResult, internal, not_found, ok_message};

pub async fn delete_notification(
    service: &NotificationService,
    request: &HttpRequest,
    notification_id: i64,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let deleted = storage
        .delete_notification(notification_id, user.id)
        .await
        .map_err(internal("Failed to delete notification"))?;

    if !deleted {
        return Err(not_found(
            ErrorCode::NotificationNotFound,
            "Notification not found",
        ));
    }
    ok_message("Notification deleted successfully")
}
