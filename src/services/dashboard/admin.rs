use actix_web::HttpResponse;
use std::sync::Arc;

use super::RECENT_LIMIT;
use crate::models::dashboard::AdminDashboard;
use crate::models::enrollments::EnrollmentStatus;
use crate::models::users::entities::UserRole;
use crate::services::responses::internal;
use crate::storage::Storage;

pub async fn admin_dashboard(storage: &Arc<dyn Storage>) -> Result<AdminDashboard, HttpResponse> {
    let count_role = |role: UserRole| async move {
        storage
            .count_users_by_role(role)
            .await
            .map_err(internal("Failed to count users"))
    };
    let students = count_role(UserRole::Student).await?;
    let teachers = count_role(UserRole::Teacher).await?;
    let admins = count_role(UserRole::Admin).await?;

    let class_count = storage
        .count_classes()
        .await
        .map_err(internal("Failed to count classes"))?;
    let pending_enrollments = storage
        .count_enrollments_by_status(None, EnrollmentStatus::Pending)
        .await
        .map_err(internal("Failed to count enrollments"))?;
    let announcement_count = storage
        .count_announcements()
        .await
        .map_err(internal("Failed to count announcements"))?;
    let recent_audit_logs = storage
        .list_recent_audit_logs(RECENT_LIMIT * 2)
        .await
        .map_err(internal("Failed to load audit logs"))?;

    Ok(AdminDashboard {
        students: students as i64,
        teachers: teachers as i64,
        admins: admins as i64,
        class_count: class_count as i64,
        pending_enrollments: pending_enrollments as i64,
        announcement_count: announcement_count as i64,
        recent_audit_logs,
    })
}
