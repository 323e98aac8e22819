use actix_web::HttpRequest;
use tracing::info;

use super::AuthService;
use crate::models::ErrorCode;
use crate::models::auth::requests::RegisterRequest;
use crate::models::users::entities::{UserRole, UserStatus};
use crate::models::users::requests::NewUser;
use crate::services::responses::{
    ServiceResult, bad_request, conflict, conflict_or_internal, created, internal,
};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password, validate_text, validate_username};

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ServiceResult {
    let storage = service.get_storage(request)?;

    let username = register_request.username.trim().to_string();
    let email = register_request.email.trim().to_lowercase();

    validate_username(&username).map_err(|e| bad_request(ErrorCode::UserNameInvalid, e))?;
    validate_email(&email).map_err(|e| bad_request(ErrorCode::UserEmailInvalid, e))?;
    validate_password(&register_request.password)
        .map_err(|e| bad_request(ErrorCode::UserPasswordInvalid, e))?;

    // 自助注册只能是学生或教师
    let role = register_request.role.unwrap_or(UserRole::Student);
    if role == UserRole::Admin {
        return Err(bad_request(
            ErrorCode::RegisterFailed,
            "Admin accounts cannot be self-registered",
        ));
    }
    if let Some(name) = &register_request.display_name {
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
        hash_password(&register_request.password).map_err(internal("Failed to hash password"))?;

    let user = storage
        .create_user(NewUser {
            username,
            email,
            password_hash,
            role,
            status: UserStatus::Active,
            display_name: register_request.display_name,
            grade_level: register_request
                .grade_level
                .filter(|_| role == UserRole::Student),
            department: register_request
                .department
                .filter(|_| role == UserRole::Teacher),
        })
        .await
        .map_err(conflict_or_internal(
            ErrorCode::UserNameAlreadyExists,
            "Username or email already exists",
            "Failed to create user",
        ))?;

    info!("User {} registered as {}", user.username, user.role);
    created(user, "Registration successful")
}
