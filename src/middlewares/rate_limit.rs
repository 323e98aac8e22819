/*!
 * 速率限制中间件
 *
 * 固定窗口计数：窗口按 `window_secs` 对齐，到边界时清零。
 * 已登录请求按用户计数，否则按客户端 IP 计数。
 *
 * ```rust,ignore
 * web::resource("/login").route(web::post().to(login).wrap(RateLimit::login()))
 * ```
 *
 * 超过限制返回 429，并带上 `Retry-After` 和 `X-RateLimit-Remaining: 0`。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::{HeaderName, HeaderValue},
};
use dashmap::DashMap;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use once_cell::sync::Lazy;
use std::rc::Rc;
use tracing::warn;

use super::create_error_response;
use crate::config::AppConfig;
use crate::models::{ErrorCode, users::entities::User};

const REMAINING_HEADER: &str = "x-ratelimit-remaining";
// 超过此数量时顺带清理过期窗口
const PURGE_THRESHOLD: usize = 10_000;

static RATE_LIMITER: Lazy<RateLimiter> = Lazy::new(RateLimiter::new);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// 距离窗口结束的秒数
    pub retry_after: u64,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: u64,
    expires_at: u64,
    count: u32,
}

/// 固定窗口计数器
#[derive(Default)]
pub struct RateLimiter {
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记一次请求并返回是否放行，`now` 为秒级时间戳
    pub fn hit(&self, key: &str, max_requests: u32, window_secs: u64, now: u64) -> RateDecision {
        let window_secs = window_secs.max(1);
        let started_at = now - now % window_secs;
        let expires_at = started_at + window_secs;
        let retry_after = expires_at - now;

        if self.windows.len() > PURGE_THRESHOLD {
            self.purge_expired(now);
        }

        let mut window = self.windows.entry(key.to_string()).or_insert(Window {
            started_at,
            expires_at,
            count: 0,
        });

        if window.started_at != started_at {
            *window = Window {
                started_at,
                expires_at,
                count: 0,
            };
        }

        if window.count >= max_requests {
            return RateDecision {
                allowed: false,
                remaining: 0,
                retry_after,
            };
        }

        window.count += 1;
        RateDecision {
            allowed: true,
            remaining: max_requests - window.count,
            retry_after,
        }
    }

    pub fn purge_expired(&self, now: u64) {
        self.windows.retain(|_, window| window.expires_at > now);
    }
}

/// 速率限制配置
#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window_secs: u64,
    action: &'static str,
}

impl RateLimit {
    pub fn new(action: &'static str, max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
            action,
        }
    }

    /// 登录：5 次/分钟
    pub fn login() -> Self {
        Self::new("login", 5, 60)
    }

    /// 注册：3 次/分钟
    pub fn register() -> Self {
        Self::new("register", 3, 60)
    }

    pub fn refresh_token() -> Self {
        Self::new("refresh", 10, 60)
    }

    /// 班级码查询，防止枚举
    pub fn class_code() -> Self {
        Self::new("class_code", 10, 60)
    }

    pub fn ai_chat() -> Self {
        Self::new("ai_chat", 20, 60)
    }
}

/// 从请求中提取客户端 IP
///
/// 部署在反向代理后面时由代理设置 X-Forwarded-For / X-Real-IP。
fn extract_client_ip(req: &ServiceRequest) -> String {
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    if let Some(ref ip) = connection_ip
        && is_valid_ip(ip)
    {
        return ip.clone();
    }

    if let Some(real_ip) = req.headers().get("X-Real-IP")
        && let Ok(ip) = real_ip.to_str()
        && is_valid_ip(ip.trim())
    {
        return ip.trim().to_string();
    }

    connection_ip.unwrap_or_else(|| "unknown".to_string())
}

fn is_valid_ip(ip: &str) -> bool {
    ip.parse::<std::net::IpAddr>().is_ok()
}

fn limit_key(action: &str, req: &ServiceRequest) -> String {
    let user_id = req.extensions().get::<User>().map(|user| user.id);
    match user_id {
        Some(id) => format!("{action}:user:{id}"),
        None => format!("{action}:ip:{}", extract_client_ip(req)),
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let limit = self.limit.clone();

        Box::pin(async move {
            if !AppConfig::get().rate_limit.enabled {
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            let key = limit_key(limit.action, &req);
            let now = chrono::Utc::now().timestamp().max(0) as u64;
            let decision = RATE_LIMITER.hit(&key, limit.max_requests, limit.window_secs, now);

            if !decision.allowed {
                warn!(
                    "Rate limit exceeded for key: {} (limit {}/{}s)",
                    key, limit.max_requests, limit.window_secs
                );
                let mut response = create_error_response(
                    StatusCode::TOO_MANY_REQUESTS,
                    ErrorCode::RateLimitExceeded,
                    "Too many requests, please try again later",
                );
                let headers = response.headers_mut();
                headers.insert(
                    actix_web::http::header::RETRY_AFTER,
                    HeaderValue::from(decision.retry_after),
                );
                headers.insert(
                    HeaderName::from_static(REMAINING_HEADER),
                    HeaderValue::from_static("0"),
                );
                return Ok(req.into_response(response.map_into_right_body()));
            }

            let mut res = srv.call(req).await?;
            res.headers_mut().insert(
                HeaderName::from_static(REMAINING_HEADER),
                HeaderValue::from(decision.remaining),
            );
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let login = RateLimit::login();
        assert_eq!((login.max_requests, login.window_secs), (5, 60));
        assert_eq!(RateLimit::register().max_requests, 3);
        assert_eq!(RateLimit::class_code().max_requests, 10);
        assert_eq!(RateLimit::ai_chat().max_requests, 20);
    }

    #[test]
    fn test_fixed_window_blocks_after_limit() {
        let limiter = RateLimiter::new();
        let now = 1_000_020; // 窗口 [1_000_020, 1_000_080)

        for expected_remaining in [2, 1, 0] {
            let d = limiter.hit("login:ip:1.2.3.4", 3, 60, now);
            assert!(d.allowed);
            assert_eq!(d.remaining, expected_remaining);
        }

        let blocked = limiter.hit("login:ip:1.2.3.4", 3, 60, now + 10);
        assert!(!blocked.allowed);
        assert_eq!(blocked.retry_after, 50);

        // 其他键互不影响
        assert!(limiter.hit("login:ip:5.6.7.8", 3, 60, now).allowed);
    }

    #[test]
    fn test_window_resets_at_boundary() {
        let limiter = RateLimiter::new();
        let now = 1_000_020;
        assert!(limiter.hit("k", 1, 60, now).allowed);
        assert!(!limiter.hit("k", 1, 60, now + 59).allowed);
        let next = limiter.hit("k", 1, 60, now + 60);
        assert!(next.allowed);
        assert_eq!(next.retry_after, 60);
    }

    #[test]
    fn test_purge_expired() {
        let limiter = RateLimiter::new();
        limiter.hit("a", 1, 60, 1_000_020);
        limiter.purge_expired(1_000_100);
        assert!(limiter.windows.is_empty());
    }
}
