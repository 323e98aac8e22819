pub mod get;
pub mod grade;
pub mod list;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::declare_service;
use super::responses::finish;
use crate::models::submissions::{
    GradeSubmissionRequest, SubmissionListParams, SubmitAssignmentRequest,
};

declare_service!(SubmissionService);

impl SubmissionService {
    // 学生提交作业，未批改前可重复提交
    pub async fn submit_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        submission_data: SubmitAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        finish(submit::submit_assignment(self, request, assignment_id, submission_data).await)
    }

    pub async fn list_submissions(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        query: SubmissionListParams,
    ) -> ActixResult<HttpResponse> {
        finish(list::list_submissions(self, request, assignment_id, query).await)
    }

    pub async fn get_my_submission(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(get::get_my_submission(self, request, assignment_id).await)
    }

    pub async fn get_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(get::get_submission(self, request, submission_id).await)
    }

    pub async fn grade_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
        grade_data: GradeSubmissionRequest,
    ) -> ActixResult<HttpResponse> {
        finish(grade::grade_submission(self, request, submission_id, grade_data).await)
    }
}
