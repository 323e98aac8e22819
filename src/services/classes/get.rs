use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;

use super::ClassService;
use crate::models::ErrorCode;
use crate::models::classes::entities::{Class, ClassDetail, ClassPublicInfo};
use crate::services::access::route_class_context;
use crate::services::responses::{ServiceResult, bad_request, internal, not_found, ok};
use crate::storage::Storage;
use crate::utils::random_code::normalize_class_code;

pub async fn get_class(service: &ClassService, request: &HttpRequest) -> ServiceResult {
    let ctx = route_class_context(request)?;
    let storage = service.get_storage(request)?;

    let detail = class_detail(&storage, ctx.class).await?;
    ok(detail, "Class retrieved successfully")
}

pub async fn get_class_by_code(
    service: &ClassService,
    request: &HttpRequest,
    code: String,
) -> ServiceResult {
    let Some(code) = normalize_class_code(&code) else {
        return Err(bad_request(
            ErrorCode::ClassCodeInvalid,
            "Class code must be 8 letters or digits",
        ));
    };
    let storage = service.get_storage(request)?;

    let class = storage
        .get_class_by_code(&code)
        .await
        .map_err(internal("Failed to load class"))?
        .ok_or_else(|| not_found(ErrorCode::ClassNotFound, "Class not found"))?;

    let detail = class_detail(&storage, class).await?;
    ok(
        ClassPublicInfo {
            id: detail.class.id,
            name: detail.class.name,
            subject: detail.class.subject,
            teacher_name: detail.teacher.map(|t| t.display_name.unwrap_or(t.username)),
            capacity: detail.class.capacity,
            student_count: detail.student_count,
        },
        "Class retrieved successfully",
    )
}

/// 补充班级教师和已批准学生人数
pub(crate) async fn class_detail(
    storage: &Arc<dyn Storage>,
    class: Class,
) -> Result<ClassDetail, HttpResponse> {
    let teacher = storage
        .get_user_by_id(class.teacher_id)
        .await
        .map_err(internal("Failed to load teacher"))?;
    let student_count = storage
        .count_approved_students(class.id)
        .await
        .map_err(internal("Failed to count students"))?;

    Ok(ClassDetail {
        class,
        teacher: teacher.map(|t| t.summary()),
        student_count: student_count as i64,
    })
}
