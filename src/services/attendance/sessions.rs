use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::info;

use super::AttendanceService;
use super::records::{session_detail, validate_records, write_records};
use crate::models::attendance::{AttendanceSession, CreateSessionRequest};
use crate::models::users::entities::User;
use crate::models::{ErrorCode, PaginationQuery};
use crate::services::access::{current_user, manager_context, route_class_context};
use crate::services::responses::{
    ServiceResult, bad_request, conflict_or_internal, created, internal, not_found, ok,
};
use crate::storage::Storage;
use crate::utils::validate::{parse_date, validate_text};

pub async fn create_session(
    service: &AttendanceService,
    request: &HttpRequest,
    session_data: CreateSessionRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let ctx = route_class_context(request)?;
    let storage = service.get_storage(request)?;

    let date = parse_date(session_data.session_date.trim())
        .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    if let Some(topic) = &session_data.topic {
        validate_text("Topic", topic, 0, 200)
            .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }
    validate_records(&storage, ctx.class.id, &session_data.records).await?;

    // 统一保存为 YYYY-MM-DD
    let session = storage
        .create_attendance_session(
            ctx.class.id,
            &date.format("%Y-%m-%d").to_string(),
            session_data.topic,
            user.id,
        )
        .await
        .map_err(conflict_or_internal(
            ErrorCode::AttendanceSessionExists,
            "Attendance has already been taken for this date",
            "Failed to create attendance session",
        ))?;

    if !session_data.records.is_empty() {
        write_records(&storage, session.id, &session_data.records).await?;
    }

    info!(
        "Attendance session {} ({}) created for class {}",
        session.id, session.session_date, ctx.class.id
    );
    let detail = session_detail(&storage, session).await?;
    created(detail, "Attendance session created successfully")
}

pub async fn list_sessions(
    service: &AttendanceService,
    request: &HttpRequest,
    query: PaginationQuery,
) -> ServiceResult {
    let ctx = route_class_context(request)?;
    let storage = service.get_storage(request)?;

    let page = storage
        .list_class_sessions(ctx.class.id, query)
        .await
        .map_err(internal("Failed to list attendance sessions"))?;

    ok(page, "Attendance sessions retrieved successfully")
}

pub async fn get_session(
    service: &AttendanceService,
    request: &HttpRequest,
    session_id: i64,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let session = managed_session(&storage, &user, session_id).await?;
    let detail = session_detail(&storage, session).await?;
    ok(detail, "Attendance session retrieved successfully")
}

/// 读取考勤并要求当前用户管理该班级
pub(super) async fn managed_session(
    storage: &Arc<dyn Storage>,
    user: &User,
    session_id: i64,
) -> Result<AttendanceSession, HttpResponse> {
    let session = storage
        .get_attendance_session(session_id)
        .await
        .map_err(internal("Failed to load attendance session"))?
        .ok_or_else(|| {
            not_found(
                ErrorCode::AttendanceSessionNotFound,
                "Attendance session not found",
            )
        })?;
    manager_context(storage, user, session.class_id).await?;
    Ok(session)
}
