use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use tracing::warn;

use super::SystemService;
use crate::config::AppConfig;
use crate::models::system::HealthResponse;
use crate::models::{ApiResponse, AppStartTime};
use crate::services::responses::ServiceResult;

/// 数据库不可达时返回 503，响应体结构不变
pub async fn health(service: &SystemService, request: &HttpRequest) -> ServiceResult {
    let storage = service.get_storage(request)?;

    let database = match storage.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check database ping failed: {}", e);
            false
        }
    };

    let uptime_seconds = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|start| {
            Utc::now()
                .signed_duration_since(start.start_datetime)
                .num_seconds()
        })
        .unwrap_or(0);

    let config = AppConfig::get();
    let body = HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        system_name: config.app.system_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        database,
    };

    if database {
        Ok(HttpResponse::Ok().json(ApiResponse::success(body, "Service is healthy")))
    } else {
        Err(HttpResponse::ServiceUnavailable()
            .json(ApiResponse::success(body, "Database is unreachable")))
    }
}
