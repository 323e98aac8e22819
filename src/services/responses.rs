//! 统一的业务响应构造
//!
//! 业务函数返回 `ServiceResult`，错误分支同样是一个完整的 HTTP 响应，
//! 这样校验步骤可以直接用 `?` 提前返回。

use actix_web::{HttpResponse, Result as ActixResult, http::StatusCode};
use serde::Serialize;
use tracing::error;

use crate::errors::EduConnectError;
use crate::models::{ApiResponse, ErrorCode};

pub type ServiceResult = Result<HttpResponse, HttpResponse>;

pub fn finish(result: ServiceResult) -> ActixResult<HttpResponse> {
    Ok(result.unwrap_or_else(|response| response))
}

pub fn ok<T: Serialize>(data: T, message: &str) -> ServiceResult {
    Ok(HttpResponse::Ok().json(ApiResponse::success(data, message)))
}

pub fn created<T: Serialize>(data: T, message: &str) -> ServiceResult {
    Ok(HttpResponse::Created().json(ApiResponse::success(data, message)))
}

pub fn ok_message(message: &str) -> ServiceResult {
    Ok(HttpResponse::Ok().json(ApiResponse::success_empty(message)))
}

pub fn error(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::error_empty(code, message))
}

pub fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    error(StatusCode::BAD_REQUEST, code, message)
}

pub fn unauthorized(message: impl Into<String>) -> HttpResponse {
    error(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, message)
}

pub fn forbidden(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    error(StatusCode::FORBIDDEN, code, message)
}

pub fn not_found(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    error(StatusCode::NOT_FOUND, code, message)
}

pub fn conflict(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    error(StatusCode::CONFLICT, code, message)
}

/// 记录存储错误并返回 500，响应中不带内部细节
pub fn internal(context: &'static str) -> impl FnOnce(EduConnectError) -> HttpResponse {
    move |e| {
        error!("{}: {}", context, e);
        error(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            context,
        )
    }
}

/// 唯一约束冲突返回 409，其它错误同 `internal`
pub fn conflict_or_internal(
    code: ErrorCode,
    message: &'static str,
    context: &'static str,
) -> impl FnOnce(EduConnectError) -> HttpResponse {
    move |e| match e {
        EduConnectError::Conflict(_) => conflict(code, message),
        other => internal(context)(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_mapping() {
        let resp = conflict_or_internal(ErrorCode::ClassAlreadyExists, "dup", "failed")(
            EduConnectError::conflict("UNIQUE"),
        );
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = conflict_or_internal(ErrorCode::ClassAlreadyExists, "dup", "failed")(
            EduConnectError::database_operation("disk"),
        );
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_finish_unwraps_error_branch() {
        let resp = finish(Err(not_found(ErrorCode::ExamNotFound, "Exam not found"))).unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
