use actix_web::{HttpRequest, HttpResponse};

use super::evict_session;
use crate::models::ApiResponse;
use crate::services::responses::ServiceResult;
use crate::utils::jwt::JwtUtils;

/// 处理用户登出
///
/// 清除 refresh token cookie，并让当前 access token 的会话缓存失效。
pub async fn handle_logout(request: &HttpRequest) -> ServiceResult {
    evict_session(request).await;

    Ok(HttpResponse::Ok()
        .cookie(JwtUtils::expired_refresh_cookie())
        .json(ApiResponse::success_empty("Logout successful")))
}
