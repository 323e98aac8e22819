use actix_web::HttpRequest;
use tracing::info;

use super::UserService;
use crate::models::ErrorCode;
use crate::models::audit::actions;
use crate::services::access::current_user;
use crate::services::audit::{AuditEntry, record};
use crate::services::responses::{
    ServiceResult, bad_request, internal, not_found, ok_message,
};

pub async fn delete_user(
    service: &UserService,
    request: &HttpRequest,
    user_id: i64,
) -> ServiceResult {
    let admin = current_user(request)?;

    if admin.id == user_id {
        return Err(bad_request(
            ErrorCode::CanNotDeleteCurrentUser,
            "You cannot delete your own account",
        ));
    }

    let storage = service.get_storage(request)?;

    let deleted = storage
        .delete_user(user_id)
        .await
        .map_err(internal("Failed to delete user"))?;
    if !deleted {
        return Err(not_found(ErrorCode::UserNotFound, "User not found"));
    }

    record(
        &storage,
        request,
        admin.id,
        AuditEntry {
            action: actions::USER_DELETE,
            entity_type: "user",
            entity_id: user_id,
            details: None,
        },
    )
    .await;

    info!("Admin {} deleted user {}", admin.username, user_id);
    ok_message("User deleted successfully")
}
