use actix_web::{HttpRequest, HttpResponse};
use tracing::info;

use super::AuthService;
use crate::models::auth::responses::RefreshTokenResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::responses::{ServiceResult, internal, ok};
use crate::utils::jwt::JwtUtils;

pub async fn handle_refresh_token(service: &AuthService, request: &HttpRequest) -> ServiceResult {
    let Some(refresh_token) = JwtUtils::refresh_token_from_cookie(request) else {
        return Err(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };

    let user_id = match JwtUtils::verify_refresh_token(&refresh_token)
        .and_then(|claims| claims.user_id())
    {
        Ok(id) => id,
        Err(e) => {
            info!("Refresh token rejected: {}", e);
            return Err(session_expired());
        }
    };

    // 角色以数据库为准，禁用的账号不能续期
    let storage = service.get_storage(request)?;
    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(internal("Failed to refresh token"))?;
    let Some(user) = user.filter(|u| u.is_active()) else {
        return Err(session_expired());
    };

    let (access_token, expires_at) = JwtUtils::generate_access_token(user.id, user.role.as_str())
        .map_err(|e| {
            tracing::error!("Failed to generate access token: {}", e);
            session_expired()
        })?;

    ok(
        RefreshTokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_at: chrono::DateTime::from_timestamp(expires_at, 0)
                .unwrap_or_else(chrono::Utc::now),
        },
        "Token refreshed successfully",
    )
}

// 清除无效的 refresh token cookie
fn session_expired() -> HttpResponse {
    HttpResponse::Unauthorized()
        .cookie(JwtUtils::expired_refresh_cookie())
        .json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Login expired or invalid, please login again",
        ))
}
