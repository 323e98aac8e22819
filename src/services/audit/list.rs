use actix_web::HttpRequest;

use super::AuditService;
use crate::models::audit::AuditListParams;
use crate::services::responses::{ServiceResult, internal, ok};

pub async fn list_audit_logs(
    service: &AuditService,
    request: &HttpRequest,
    query: AuditListParams,
) -> ServiceResult {
    let storage = service.get_storage(request)?;

    let page = storage
        .list_audit_logs(query)
        .await
        .map_err(internal("Failed to list audit logs"))?;

    ok(page, "Audit logs retrieved successfully")
}
