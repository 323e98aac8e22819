use actix_web::HttpRequest;
use tracing::info;

use super::EnrollmentService;
use crate::models::ErrorCode;
use crate::models::audit::actions;
use crate::models::enrollments::{DecideEnrollmentRequest, EnrollmentStatus};
use crate::models::notifications::{NewNotification, NotificationKind};
use crate::services::access::{current_user, manager_context};
use crate::services::audit::{AuditEntry, record};
use crate::services::notifications::dispatch;
use crate::services::responses::{
    ServiceResult, bad_request, conflict, internal, not_found, ok,
};

pub async fn decide_enrollment(
    service: &EnrollmentService,
    request: &HttpRequest,
    enrollment_id: i64,
    decision: DecideEnrollmentRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    if decision.status == EnrollmentStatus::Pending {
        return Err(bad_request(
            ErrorCode::BadRequest,
            "Decision must be approved or rejected",
        ));
    }

    let enrollment = storage
        .get_enrollment_by_id(enrollment_id)
        .await
        .map_err(internal("Failed to load enrollment"))?
        .ok_or_else(|| not_found(ErrorCode::EnrollmentNotFound, "Enrollment not found"))?;

    let ctx = manager_context(&storage, &user, enrollment.class_id).await?;

    if enrollment.status != EnrollmentStatus::Pending {
        return Err(conflict(
            ErrorCode::EnrollmentNotPending,
            "Enrollment has already been decided",
        ));
    }

    if decision.status == EnrollmentStatus::Approved {
        let approved = storage
            .count_approved_students(ctx.class.id)
            .await
            .map_err(internal("Failed to count students"))?;
        if ctx.class.is_full(approved) {
            return Err(conflict(ErrorCode::ClassFull, "Class is full"));
        }
    }

    // 并发审批时只有一个请求能把 pending 改掉
    let updated = storage
        .decide_enrollment(enrollment.id, decision.status, user.id)
        .await
        .map_err(internal("Failed to decide enrollment"))?;
    if !updated {
        return Err(conflict(
            ErrorCode::EnrollmentNotPending,
            "Enrollment has already been decided",
        ));
    }

    let title = match decision.status {
        EnrollmentStatus::Approved => format!("You have joined {}", ctx.class.name),
        _ => format!("Your request to join {} was declined", ctx.class.name),
    };
    dispatch(
        &storage,
        vec![
            NewNotification::new(enrollment.student_id, NotificationKind::Enrollment, title)
                .reference("class", ctx.class.id),
        ],
    )
    .await;

    record(
        &storage,
        request,
        user.id,
        AuditEntry {
            action: actions::ENROLLMENT_DECIDE,
            entity_type: "enrollment",
            entity_id: enrollment.id,
            details: Some(decision.status.to_string()),
        },
    )
    .await;

    let enrollment = storage
        .get_enrollment_by_id(enrollment.id)
        .await
        .map_err(internal("Failed to load enrollment"))?
        .ok_or_else(|| not_found(ErrorCode::EnrollmentNotFound, "Enrollment not found"))?;

    info!(
        "Enrollment {} {} by {}",
        enrollment.id, enrollment.status, user.username
    );
    ok(enrollment, "Enrollment decided successfully")
}
