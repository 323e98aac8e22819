pub mod decide;
pub mod delete;
pub mod join;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::declare_service;
use super::responses::finish;
use crate::models::enrollments::{DecideEnrollmentRequest, EnrollmentListParams, JoinClassRequest};

declare_service!(EnrollmentService);

impl EnrollmentService {
    // 学生通过班级码申请加入
    pub async fn join_class(
        &self,
        request: &HttpRequest,
        join_data: JoinClassRequest,
    ) -> ActixResult<HttpResponse> {
        finish(join::join_class(self, request, join_data).await)
    }

    pub async fn list_my_enrollments(
        &self,
        request: &HttpRequest,
        query: EnrollmentListParams,
    ) -> ActixResult<HttpResponse> {
        finish(list::list_my_enrollments(self, request, query).await)
    }

    // 班级的选课列表，路由上已校验管理权限
    pub async fn list_class_enrollments(
        &self,
        request: &HttpRequest,
        query: EnrollmentListParams,
    ) -> ActixResult<HttpResponse> {
        finish(list::list_class_enrollments(self, request, query).await)
    }

    pub async fn decide_enrollment(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
        decision: DecideEnrollmentRequest,
    ) -> ActixResult<HttpResponse> {
        finish(decide::decide_enrollment(self, request, enrollment_id, decision).await)
    }

    // 学生撤回，或教师移除
    pub async fn delete_enrollment(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(delete::delete_enrollment(self, request, enrollment_id).await)
    }
}
