pub mod login;
pub mod logout;
pub mod profile;
pub mod register;
pub mod token;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use super::declare_service;
use super::responses::finish;
use crate::cache::ObjectCache;
use crate::middlewares::{RequireJWT, require_jwt::session_cache_key};
use crate::models::auth::requests::{LoginRequest, RegisterRequest, UpdateProfileRequest};

declare_service!(AuthService);

impl AuthService {
    // 登录验证
    pub async fn login(
        &self,
        login_request: LoginRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        finish(login::handle_login(self, login_request, request).await)
    }

    // 用户注册
    pub async fn register(
        &self,
        register_request: RegisterRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        finish(register::handle_register(self, register_request, request).await)
    }

    // 刷新令牌
    pub async fn refresh_token(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        finish(token::handle_refresh_token(self, request).await)
    }

    pub async fn logout(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        finish(logout::handle_logout(request).await)
    }

    // 获取当前用户
    pub async fn get_me(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        finish(profile::handle_get_me(request).await)
    }

    // 更新用户资料
    pub async fn update_me(
        &self,
        update_request: UpdateProfileRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        finish(profile::handle_update_profile(self, update_request, request).await)
    }
}

/// 清除当前 access token 对应的会话缓存
pub(crate) async fn evict_session(request: &HttpRequest) {
    let Some(token) = RequireJWT::extract_token(request) else {
        return;
    };
    if let Some(cache) = request.app_data::<web::Data<Arc<dyn ObjectCache>>>() {
        cache.remove(&session_cache_key(&token)).await;
    }
}
