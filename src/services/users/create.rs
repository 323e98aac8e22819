use actix_web::HttpRequest;
use tracing::info;

use super::UserService;
use crate::models::ErrorCode;
use crate::models::audit::actions;
use crate::models::users::entities::{UserRole, UserStatus};
use crate::models::users::requests::{CreateUserRequest, NewUser};
use crate::services::access::current_user;
use crate::services::audit::{AuditEntry, record};
use crate::services::responses::{
    ServiceResult, bad_request, conflict, conflict_or_internal, created, internal,
};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password, validate_text, validate_username};

pub async fn create_user(
    service: &UserService,
    request: &HttpRequest,
    user_data: CreateUserRequest,
) -> ServiceResult {
    let admin = current_user(request)?;
    let storage = service.get_storage(request)?;

    let username = user_data.username.trim().to_string();
    let email = user_data.email.trim().to_lowercase();

    validate_username(&username).map_err(|e| bad_request(ErrorCode::UserNameInvalid, e))?;
    validate_email(&email).map_err(|e| bad_request(ErrorCode::UserEmailInvalid, e))?;
    validate_password(&user_data.password)
        .map_err(|e| bad_request(ErrorCode::UserPasswordInvalid, e))?;
    if let Some(name) = &user_data.display_name {
        validate_text("Display name", name, 0, 50)
            .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }

    if storage
        .get_user_by_username(&username)
        .await
        .map_err(internal("Failed to check username"))?
        .is_some()
    {
        return Err(conflict(
            ErrorCode::UserNameAlreadyExists,
            "Username already exists",
        ));
    }
    if storage
        .get_user_by_email(&email)
        .await
        .map_err(internal("Failed to check email"))?
        .is_some()
    {
        return Err(conflict(
            ErrorCode::UserEmailAlreadyExists,
            "Email already exists",
        ));
    }

    let password_hash =
        hash_password(&user_data.password).map_err(internal("Failed to hash password"))?;
    let role = user_data.role;

    let user = storage
        .create_user(NewUser {
            username,
            email,
            password_hash,
            role,
            status: user_data.status.unwrap_or(UserStatus::Active),
            display_name: user_data.display_name,
            grade_level: user_data.grade_level.filter(|_| role == UserRole::Student),
            department: user_data.department.filter(|_| role == UserRole::Teacher),
        })
        .await
        .map_err(conflict_or_internal(
            ErrorCode::UserCreationFailed,
            "Username or email already exists",
            "Failed to create user",
        ))?;

    record(
        &storage,
        request,
        admin.id,
        AuditEntry {
            action: actions::USER_CREATE,
            entity_type: "user",
            entity_id: user.id,
            details: Some(format!("{} ({})", user.username, user.role)),
        },
    )
    .await;

    info!("Admin {} created user {}", admin.username, user.username);
    created(user, "User created successfully")
}
