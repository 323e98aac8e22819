use actix_web::HttpRequest;

use super::UserService;
use crate::models::ErrorCode;
use crate::services::responses::{ServiceResult, internal, not_found, ok};

pub async fn get_user(service: &UserService, request: &HttpRequest, user_id: i64) -> ServiceResult {
    let storage = service.get_storage(request)?;

    match storage
        .get_user_by_id(user_id)
        .await
        .map_err(internal("Failed to load user"))?
    {
        Some(user) => ok(user, "User retrieved successfully"),
        None => Err(not_found(ErrorCode::UserNotFound, "User not found")),
    }
}
