use actix_web::HttpRequest;
use tracing::info;

use super::{AuthService, evict_session};
use crate::models::ErrorCode;
use crate::models::auth::requests::UpdateProfileRequest;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::UserChanges;
use crate::services::access::current_user;
use crate::services::responses::{ServiceResult, bad_request, internal, not_found, ok};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validate::{validate_password, validate_text, validate_url};

pub async fn handle_get_me(request: &HttpRequest) -> ServiceResult {
    let user = current_user(request)?;
    ok(user, "User information retrieved successfully")
}

pub async fn handle_update_profile(
    service: &AuthService,
    update_request: UpdateProfileRequest,
    request: &HttpRequest,
) -> ServiceResult {
    let current = current_user(request)?;
    let storage = service.get_storage(request)?;

    if let Some(name) = &update_request.display_name {
        validate_text("Display name", name, 0, 50)
            .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }
    if let Some(url) = &update_request.avatar_url {
        validate_url(url).map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }
    if update_request.grade_level.is_some() && current.role != UserRole::Student {
        return Err(bad_request(
            ErrorCode::BadRequest,
            "Only students have a grade level",
        ));
    }
    if update_request.department.is_some() && current.role != UserRole::Teacher {
        return Err(bad_request(
            ErrorCode::BadRequest,
            "Only teachers have a department",
        ));
    }

    let mut changes = UserChanges {
        display_name: update_request.display_name,
        avatar_url: update_request.avatar_url,
        grade_level: update_request.grade_level,
        department: update_request.department,
        ..Default::default()
    };

    // 修改密码需要校验当前密码，缓存中的用户不含哈希，从存储重新读取
    if let Some(new_password) = update_request.new_password {
        let Some(current_password) = update_request.current_password else {
            return Err(bad_request(
                ErrorCode::UserPasswordInvalid,
                "Current password is required to change password",
            ));
        };
        let stored = storage
            .get_user_by_id(current.id)
            .await
            .map_err(internal("Failed to load user"))?
            .ok_or_else(|| not_found(ErrorCode::UserNotFound, "User not found"))?;
        if !verify_password(&current_password, &stored.password_hash) {
            return Err(bad_request(
                ErrorCode::UserPasswordInvalid,
                "Current password is incorrect",
            ));
        }
        validate_password(&new_password)
            .map_err(|e| bad_request(ErrorCode::UserPasswordInvalid, e))?;
        changes.password_hash =
            Some(hash_password(&new_password).map_err(internal("Failed to hash password"))?);
    }

    if changes.is_empty() {
        return Err(bad_request(ErrorCode::BadRequest, "No fields to update"));
    }

    let user = storage
        .update_user(current.id, changes)
        .await
        .map_err(internal("Failed to update profile"))?
        .ok_or_else(|| not_found(ErrorCode::UserNotFound, "User not found"))?;

    evict_session(request).await;
    info!("User {} updated profile", user.username);
    ok(user, "Profile updated successfully")
}
