use actix_web::HttpRequest;
use tracing::info;

use super::EnrollmentService;
use crate::models::ErrorCode;
use crate::models::enrollments::{EnrollmentStatus, JoinClassRequest};
use crate::models::notifications::{NewNotification, NotificationKind};
use crate::services::access::{current_user, require_student};
use crate::services::notifications::dispatch;
use crate::services::responses::{
    ServiceResult, bad_request, conflict, conflict_or_internal, created, internal, not_found,
};
use crate::utils::random_code::normalize_class_code;
use crate::utils::validate::validate_text;

pub async fn join_class(
    service: &EnrollmentService,
    request: &HttpRequest,
    join_data: JoinClassRequest,
) -> ServiceResult {
    let student = current_user(request)?;
    require_student(&student)?;
    let storage = service.get_storage(request)?;

    let Some(code) = normalize_class_code(&join_data.class_code) else {
        return Err(bad_request(
            ErrorCode::ClassCodeInvalid,
            "Class code must be 8 letters or digits",
        ));
    };
    if let Some(message) = &join_data.message {
        validate_text("Message", message, 0, 500)
            .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }

    let class = storage
        .get_class_by_code(&code)
        .await
        .map_err(internal("Failed to load class"))?
        .ok_or_else(|| not_found(ErrorCode::ClassNotFound, "Class not found"))?;

    // 被拒绝后可以重新申请
    if let Some(existing) = storage
        .get_enrollment(class.id, student.id)
        .await
        .map_err(internal("Failed to load enrollment"))?
    {
        match existing.status {
            EnrollmentStatus::Pending => {
                return Err(conflict(
                    ErrorCode::EnrollmentAlreadyExists,
                    "Your request to join this class is pending",
                ));
            }
            EnrollmentStatus::Approved => {
                return Err(conflict(
                    ErrorCode::EnrollmentAlreadyExists,
                    "You are already enrolled in this class",
                ));
            }
            EnrollmentStatus::Rejected => {}
        }
    }

    let approved = storage
        .count_approved_students(class.id)
        .await
        .map_err(internal("Failed to count students"))?;
    if class.is_full(approved) {
        return Err(conflict(ErrorCode::ClassFull, "Class is full"));
    }

    let enrollment = storage
        .request_enrollment(class.id, student.id, join_data.message)
        .await
        .map_err(conflict_or_internal(
            ErrorCode::EnrollmentAlreadyExists,
            "Enrollment already exists",
            "Failed to request enrollment",
        ))?;

    dispatch(
        &storage,
        vec![
            NewNotification::new(
                class.teacher_id,
                NotificationKind::Enrollment,
                format!("New request to join {}", class.name),
            )
            .content(format!("{} asked to join the class", student.name()))
            .reference("enrollment", enrollment.id),
        ],
    )
    .await;

    info!(
        "Student {} requested to join class {}",
        student.username, class.id
    );
    created(enrollment, "Enrollment request submitted")
}
