use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::enrollments::{DecideEnrollmentRequest, EnrollmentListParams, JoinClassRequest};
use crate::models::users::entities::UserRole;
use crate::services::EnrollmentService;
use crate::utils::SafeEnrollmentIdI64;

static ENROLLMENT_SERVICE: Lazy<EnrollmentService> = Lazy::new(EnrollmentService::new_lazy);

pub async fn join_class(
    req: HttpRequest,
    join_data: web::Json<JoinClassRequest>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .join_class(&req, join_data.into_inner())
        .await
}

pub async fn list_my_enrollments(
    req: HttpRequest,
    query: web::Query<EnrollmentListParams>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .list_my_enrollments(&req, query.into_inner())
        .await
}

// 挂在 /classes/{class_id}/enrollments 下
pub async fn list_class_enrollments(
    req: HttpRequest,
    query: web::Query<EnrollmentListParams>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .list_class_enrollments(&req, query.into_inner())
        .await
}

pub async fn decide_enrollment(
    req: HttpRequest,
    enrollment_id: SafeEnrollmentIdI64,
    decision: web::Json<DecideEnrollmentRequest>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .decide_enrollment(&req, enrollment_id.0, decision.into_inner())
        .await
}

pub async fn delete_enrollment(
    req: HttpRequest,
    enrollment_id: SafeEnrollmentIdI64,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .delete_enrollment(&req, enrollment_id.0)
        .await
}

pub fn configure_enrollment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/enrollments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(
                    web::post()
                        .to(join_class)
                        .wrap(middlewares::RequireRole::new(UserRole::Student)),
                ),
            )
            .service(
                web::resource("/mine").route(
                    web::get()
                        .to(list_my_enrollments)
                        .wrap(middlewares::RequireRole::new(UserRole::Student)),
                ),
            )
            // 学生撤回自己的申请，或教师移除学生
            .route("/{enrollment_id}", web::delete().to(delete_enrollment))
            .route(
                "/{enrollment_id}/decision",
                web::put()
                    .to(decide_enrollment)
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
            ),
    );
}
