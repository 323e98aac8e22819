use actix_web::{HttpRequest, HttpResponse, http::StatusCode};
use tracing::{error, info, warn};

use super::AuthService;
use crate::models::auth::{requests::LoginRequest, responses::LoginResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::responses::{ServiceResult, error, internal};
use crate::utils::jwt::JwtUtils;
use crate::utils::password::verify_password;

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ServiceResult {
    let storage = service.get_storage(request)?;
    let identifier = login_request.username.trim();

    // 1. 根据用户名或邮箱获取用户信息
    let user = storage
        .get_user_by_username_or_email(identifier)
        .await
        .map_err(internal("Login failed"))?;

    // 2. 验证密码，用户不存在和密码错误返回同样的信息
    let Some(user) = user.filter(|u| verify_password(&login_request.password, &u.password_hash))
    else {
        info!("Login failed for {}", identifier);
        return Err(auth_failed("Username or password is incorrect"));
    };

    if !user.is_active() {
        info!("Inactive user {} tried to log in", user.username);
        return Err(auth_failed("Account is not active"));
    }

    // 3. 更新最后登录时间
    if let Err(e) = storage.update_last_login(user.id).await {
        warn!("Failed to update last login for {}: {}", user.id, e);
    }

    // 4. 生成令牌对
    let pair = JwtUtils::generate_token_pair(user.id, user.role.as_str(), login_request.remember_me)
        .map_err(|e| {
            error!("Failed to generate JWT token: {}", e);
            error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Login failed, unable to generate token",
            )
        })?;

    info!("User {} logged in successfully", user.username);

    let refresh_cookie = JwtUtils::refresh_cookie(&pair.refresh_token, login_request.remember_me);
    let response = LoginResponse {
        access_token: pair.access_token,
        token_type: "Bearer".to_string(),
        expires_at: chrono::DateTime::from_timestamp(pair.access_expires_at, 0)
            .unwrap_or_else(chrono::Utc::now),
        user,
    };

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie)
        .json(ApiResponse::success(response, "Login successful")))
}

fn auth_failed(message: &str) -> HttpResponse {
    error(StatusCode::UNAUTHORIZED, ErrorCode::AuthFailed, message)
}
