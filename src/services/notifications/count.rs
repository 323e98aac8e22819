use actix_web::HttpRequest;

use super::NotificationService;
use crate::models::notifications::UnreadCountResponse;
use crate::services::access::current_user;
use crate::services::responses::{ServiceResult, internal, ok};

pub async fn unread_count(service: &NotificationService, request: &HttpRequest) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let unread = storage
        .count_unread_notifications(user.id)
        .await
        .map_err(internal("Failed to count notifications"))?;

    ok(
        UnreadCountResponse {
            unread_count: unread as i64,
        },
        "Unread count retrieved successfully",
    )
}
