pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::warn;

use super::declare_service;
use super::responses::finish;
use crate::models::audit::{AuditListParams, NewAuditLog};
use crate::storage::Storage;

declare_service!(AuditService);

impl AuditService {
    // 审计日志列表（管理员）
    pub async fn list_audit_logs(
        &self,
        request: &HttpRequest,
        query: AuditListParams,
    ) -> ActixResult<HttpResponse> {
        finish(list::list_audit_logs(self, request, query).await)
    }
}

/// 一条待写入的审计记录
pub struct AuditEntry<'a> {
    pub action: &'a str,
    pub entity_type: &'a str,
    pub entity_id: i64,
    pub details: Option<String>,
}

/// 写入审计日志，失败只记录告警，不影响业务请求
pub async fn record(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    actor_id: i64,
    entry: AuditEntry<'_>,
) {
    let ip_address = request
        .connection_info()
        .realip_remote_addr()
        .map(str::to_string);

    let log = NewAuditLog {
        user_id: Some(actor_id),
        action: entry.action.to_string(),
        entity_type: entry.entity_type.to_string(),
        entity_id: Some(entry.entity_id),
        details: entry.details,
        ip_address,
    };

    if let Err(e) = storage.create_audit_log(log).await {
        warn!(
            "Failed to record audit log {} for {} {}: {}",
            entry.action, entry.entity_type, entry.entity_id, e
        );
    }
}
