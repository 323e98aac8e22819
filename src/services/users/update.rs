use actix_web::HttpRequest;
use tracing::info;

use super::UserService;
use crate::models::ErrorCode;
use crate::models::audit::actions;
use crate::models::users::requests::{UpdateUserRequest, UserChanges};
use crate::services::access::current_user;
use crate::services::audit::{AuditEntry, record};
use crate::services::responses::{
    ServiceResult, bad_request, conflict, conflict_or_internal, internal, not_found, ok,
};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password, validate_text, validate_url};

pub async fn update_user(
    service: &UserService,
    request: &HttpRequest,
    user_id: i64,
    update_data: UpdateUserRequest,
) -> ServiceResult {
    let admin = current_user(request)?;
    let storage = service.get_storage(request)?;

    let email = update_data.email.map(|e| e.trim().to_lowercase());
    if let Some(email) = &email {
        validate_email(email).map_err(|e| bad_request(ErrorCode::UserEmailInvalid, e))?;
        // 邮箱被其他用户占用
        if let Some(other) = storage
            .get_user_by_email(email)
            .await
            .map_err(internal("Failed to check email"))?
            && other.id != user_id
        {
            return Err(conflict(
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            ));
        }
    }
    if let Some(name) = &update_data.display_name {
        validate_text("Display name", name, 0, 50)
            .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }
    if let Some(url) = &update_data.avatar_url {
        validate_url(url).map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }

    // 管理员不能降级或停用自己
    if user_id == admin.id
        && (update_data.role.is_some_and(|r| r != admin.role)
            || update_data.status.is_some_and(|s| s != admin.status))
    {
        return Err(bad_request(
            ErrorCode::BadRequest,
            "You cannot change your own role or status",
        ));
    }

    let password_hash = match update_data.password {
        Some(password) => {
            validate_password(&password)
                .map_err(|e| bad_request(ErrorCode::UserPasswordInvalid, e))?;
            Some(hash_password(&password).map_err(internal("Failed to hash password"))?)
        }
        None => None,
    };

    let changes = UserChanges {
        email,
        password_hash,
        role: update_data.role,
        status: update_data.status,
        display_name: update_data.display_name,
        avatar_url: update_data.avatar_url,
        grade_level: update_data.grade_level,
        department: update_data.department,
    };
    if changes.is_empty() {
        return Err(bad_request(ErrorCode::BadRequest, "No fields to update"));
    }

    let changed_fields = describe_changes(&changes);
    let user = storage
        .update_user(user_id, changes)
        .await
        .map_err(conflict_or_internal(
            ErrorCode::UserEmailAlreadyExists,
            "Email already exists",
            "Failed to update user",
        ))?
        .ok_or_else(|| not_found(ErrorCode::UserNotFound, "User not found"))?;

    record(
        &storage,
        request,
        admin.id,
        AuditEntry {
            action: actions::USER_UPDATE,
            entity_type: "user",
            entity_id: user.id,
            details: Some(changed_fields),
        },
    )
    .await;

    info!("Admin {} updated user {}", admin.username, user.username);
    ok(user, "User updated successfully")
}

/// 审计详情只记录字段名，不记录密码等取值
fn describe_changes(changes: &UserChanges) -> String {
    [
        ("email", changes.email.is_some()),
        ("password", changes.password_hash.is_some()),
        ("role", changes.role.is_some()),
        ("status", changes.status.is_some()),
        ("display_name", changes.display_name.is_some()),
        ("avatar_url", changes.avatar_url.is_some()),
        ("grade_level", changes.grade_level.is_some()),
        ("department", changes.department.is_some()),
    ]
    .iter()
    .filter(|(_, changed)| *changed)
    .map(|(name, _)| *name)
    .collect::<Vec<_>>()
    .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;

    #[test]
    fn test_describe_changes_hides_values() {
        let changes = UserChanges {
            password_hash: Some("$argon2id$secret".into()),
            role: Some(UserRole::Teacher),
            ..Default::default()
        };
        assert_eq!(describe_changes(&changes), "password,role");
    }
}
