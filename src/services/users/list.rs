use actix_web::HttpRequest;

use super::UserService;
use crate::models::users::requests::UserListParams;
use crate::services::responses::{ServiceResult, internal, ok};

pub async fn list_users(
    service: &UserService,
    request: &HttpRequest,
    mut query: UserListParams,
) -> ServiceResult {
    let storage = service.get_storage(request)?;

    query.search = query
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let page = storage
        .list_users_with_pagination(query)
        .await
        .map_err(internal("Failed to list users"))?;

    ok(page, "Users retrieved successfully")
}
