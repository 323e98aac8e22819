use actix_web::HttpRequest;
use tracing::info;

use super::EnrollmentService;
use crate::models::ErrorCode;
use crate::models::enrollments::EnrollmentStatus;
use crate::services::access::{current_user, manager_context};
use crate::services::responses::{ServiceResult, conflict, internal, not_found, ok_message};

pub async fn delete_enrollment(
    service: &EnrollmentService,
    request: &HttpRequest,
    enrollment_id: i64,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let enrollment = storage
        .get_enrollment_by_id(enrollment_id)
        .await
        .map_err(internal("Failed to load enrollment"))?
        .ok_or_else(|| not_found(ErrorCode::EnrollmentNotFound, "Enrollment not found"))?;

    if enrollment.student_id == user.id {
        // 学生撤回自己的申请或退出班级
        if enrollment.status == EnrollmentStatus::Rejected {
            return Err(conflict(
                ErrorCode::EnrollmentNotPending,
                "A rejected request cannot be withdrawn",
            ));
        }
    } else {
        manager_context(&storage, &user, enrollment.class_id).await?;
    }

    let deleted = storage
        .delete_enrollment(enrollment.id)
        .await
        .map_err(internal("Failed to delete enrollment"))?;
    if !deleted {
        return Err(not_found(ErrorCode::EnrollmentNotFound, "Enrollment not found"));
    }

    info!(
        "Enrollment {} of class {} removed by {}",
        enrollment.id, enrollment.class_id, user.username
    );
    ok_message("Enrollment removed successfully")
}
