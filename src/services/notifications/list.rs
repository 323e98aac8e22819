use actix_web::HttpRequest;

use super::NotificationService;
use crate::models::notifications::NotificationListParams;
use crate::services::access::current_user;
use crate::services::responses::{ServiceResult, internal, ok};

pub async fn list_notifications(
    service: &NotificationService,
    request: &HttpRequest,
    query: NotificationListParams,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let page = storage
        .list_user_notifications(
            user.id,
            query.unread_only.unwrap_or(false),
            query.pagination,
        )
        .await
        .map_err(internal("Failed to list notifications"))?;

    ok(page, "Notifications retrieved successfully")
}
