use actix_web::HttpRequest;
use std::collections::HashMap;

use super::EnrollmentService;
use crate::models::enrollments::{EnrollmentListParams, EnrollmentWithStudent, MyEnrollment};
use crate::services::access::{current_user, route_class_context, user_summaries};
use crate::services::responses::{ServiceResult, internal, ok};

pub async fn list_my_enrollments(
    service: &EnrollmentService,
    request: &HttpRequest,
    query: EnrollmentListParams,
) -> ServiceResult {
    let student = current_user(request)?;
    let storage = service.get_storage(request)?;

    let enrollments = storage
        .list_student_enrollments(student.id, query.status)
        .await
        .map_err(internal("Failed to list enrollments"))?;

    let class_ids: Vec<i64> = enrollments.iter().map(|e| e.class_id).collect();
    let classes: HashMap<i64, _> = storage
        .get_classes_by_ids(&class_ids)
        .await
        .map_err(internal("Failed to load classes"))?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let items: Vec<MyEnrollment> = enrollments
        .into_iter()
        .filter_map(|enrollment| {
            let class = classes.get(&enrollment.class_id)?;
            Some(MyEnrollment {
                class_name: class.name.clone(),
                subject: class.subject.clone(),
                enrollment,
            })
        })
        .collect();

    ok(items, "Enrollments retrieved successfully")
}

pub async fn list_class_enrollments(
    service: &EnrollmentService,
    request: &HttpRequest,
    query: EnrollmentListParams,
) -> ServiceResult {
    let ctx = route_class_context(request)?;
    let storage = service.get_storage(request)?;

    let page = storage
        .list_class_enrollments(ctx.class.id, query.status, query.pagination)
        .await
        .map_err(internal("Failed to list enrollments"))?;

    let students = user_summaries(&storage, page.items.iter().map(|e| e.student_id)).await?;
    let page = page.map(|enrollment| EnrollmentWithStudent {
        student: students.get(&enrollment.student_id).cloned(),
        enrollment,
    });

    ok(page, "Enrollments retrieved successfully")
}
