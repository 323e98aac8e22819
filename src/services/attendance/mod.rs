pub mod records;
pub mod sessions;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::declare_service;
use super::responses::finish;
use crate::models::PaginationQuery;
use crate::models::attendance::{CreateSessionRequest, MarkAttendanceRequest};

declare_service!(AttendanceService);

impl AttendanceService {
    // 每个班级每天只能有一次考勤
    pub async fn create_session(
        &self,
        request: &HttpRequest,
        session_data: CreateSessionRequest,
    ) -> ActixResult<HttpResponse> {
        finish(sessions::create_session(self, request, session_data).await)
    }

    pub async fn list_sessions(
        &self,
        request: &HttpRequest,
        query: PaginationQuery,
    ) -> ActixResult<HttpResponse> {
        finish(sessions::list_sessions(self, request, query).await)
    }

    pub async fn get_session(
        &self,
        request: &HttpRequest,
        session_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(sessions::get_session(self, request, session_id).await)
    }

    pub async fn mark_records(
        &self,
        request: &HttpRequest,
        session_id: i64,
        records: MarkAttendanceRequest,
    ) -> ActixResult<HttpResponse> {
        finish(records::mark_records(self, request, session_id, records).await)
    }

    pub async fn my_summary(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        finish(records::my_summary(self, request).await)
    }
}
