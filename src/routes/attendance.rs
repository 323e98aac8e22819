use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::PaginationQuery;
use crate::models::attendance::{CreateSessionRequest, MarkAttendanceRequest};
use crate::models::users::entities::UserRole;
use crate::services::AttendanceService;
use crate::utils::SafeSessionIdI64;

static ATTENDANCE_SERVICE: Lazy<AttendanceService> = Lazy::new(AttendanceService::new_lazy);

pub async fn list_sessions(
    req: HttpRequest,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .list_sessions(&req, query.into_inner())
        .await
}

pub async fn create_session(
    req: HttpRequest,
    session_data: web::Json<CreateSessionRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .create_session(&req, session_data.into_inner())
        .await
}

pub async fn get_session(
    req: HttpRequest,
    session_id: SafeSessionIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.get_session(&req, session_id.0).await
}

pub async fn mark_records(
    req: HttpRequest,
    session_id: SafeSessionIdI64,
    records: web::Json<MarkAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .mark_records(&req, session_id.0, records.into_inner())
        .await
}

pub async fn my_summary(req: HttpRequest) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.my_summary(&req).await
}

pub fn configure_attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/attendance")
            .wrap(middlewares::RequireJWT)
            .route(
                "/mine",
                web::get()
                    .to(my_summary)
                    .wrap(middlewares::RequireRole::new(UserRole::Student)),
            )
            .service(
                web::scope("/sessions")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route("/{session_id}", web::get().to(get_session))
                    .route("/{session_id}/records", web::put().to(mark_records)),
            ),
    );
}
