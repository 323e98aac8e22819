pub mod attempts;
pub mod grading;
pub mod manage;
pub mod questions;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::declare_service;
use super::responses::{finish, internal, not_found};
use crate::middlewares::ClassContext;
use crate::models::ErrorCode;
use crate::models::exams::{
    CreateExamRequest, CreateQuestionRequest, Exam, ExamListParams, GradeAttemptRequest,
    SaveAnswersRequest, UpdateExamRequest, UpdateQuestionRequest,
};
use crate::models::users::entities::User;
use crate::services::access::class_context;
use crate::storage::Storage;

declare_service!(ExamService);

impl ExamService {
    pub async fn list_class_exams(
        &self,
        request: &HttpRequest,
        query: ExamListParams,
    ) -> ActixResult<HttpResponse> {
        finish(manage::list_class_exams(self, request, query).await)
    }

    pub async fn create_exam(
        &self,
        request: &HttpRequest,
        exam_data: CreateExamRequest,
    ) -> ActixResult<HttpResponse> {
        finish(manage::create_exam(self, request, exam_data).await)
    }

    pub async fn get_exam(&self, request: &HttpRequest, exam_id: i64) -> ActixResult<HttpResponse> {
        finish(manage::get_exam(self, request, exam_id).await)
    }

    // 发布时通知班级学生
    pub async fn update_exam(
        &self,
        request: &HttpRequest,
        exam_id: i64,
        update_data: UpdateExamRequest,
    ) -> ActixResult<HttpResponse> {
        finish(manage::update_exam(self, request, exam_id, update_data).await)
    }

    pub async fn delete_exam(
        &self,
        request: &HttpRequest,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(manage::delete_exam(self, request, exam_id).await)
    }

    pub async fn add_question(
        &self,
        request: &HttpRequest,
        exam_id: i64,
        question_data: CreateQuestionRequest,
    ) -> ActixResult<HttpResponse> {
        finish(questions::add_question(self, request, exam_id, question_data).await)
    }

    pub async fn update_question(
        &self,
        request: &HttpRequest,
        question_id: i64,
        update_data: UpdateQuestionRequest,
    ) -> ActixResult<HttpResponse> {
        finish(questions::update_question(self, request, question_id, update_data).await)
    }

    pub async fn delete_question(
        &self,
        request: &HttpRequest,
        question_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(questions::delete_question(self, request, question_id).await)
    }

    pub async fn start_attempt(
        &self,
        request: &HttpRequest,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(attempts::start_attempt(self, request, exam_id).await)
    }

    pub async fn save_answers(
        &self,
        request: &HttpRequest,
        attempt_id: i64,
        answers: SaveAnswersRequest,
    ) -> ActixResult<HttpResponse> {
        finish(attempts::save_answers(self, request, attempt_id, answers).await)
    }

    pub async fn submit_attempt(
        &self,
        request: &HttpRequest,
        attempt_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(attempts::submit_attempt(self, request, attempt_id).await)
    }

    pub async fn grade_attempt(
        &self,
        request: &HttpRequest,
        attempt_id: i64,
        grade_data: GradeAttemptRequest,
    ) -> ActixResult<HttpResponse> {
        finish(attempts::grade_attempt(self, request, attempt_id, grade_data).await)
    }

    pub async fn list_attempts(
        &self,
        request: &HttpRequest,
        exam_id: i64,
        query: ExamListParams,
    ) -> ActixResult<HttpResponse> {
        finish(attempts::list_attempts(self, request, exam_id, query).await)
    }

    pub async fn get_my_attempt(
        &self,
        request: &HttpRequest,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(attempts::get_my_attempt(self, request, exam_id).await)
    }

    pub async fn get_attempt(
        &self,
        request: &HttpRequest,
        attempt_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(attempts::get_attempt(self, request, attempt_id).await)
    }
}

/// 读取考试并校验班级成员身份，学生看不到未发布的考试
pub(crate) async fn load_exam(
    storage: &Arc<dyn Storage>,
    user: &User,
    exam_id: i64,
) -> Result<(Exam, ClassContext), HttpResponse> {
    let exam = storage
        .get_exam_by_id(exam_id)
        .await
        .map_err(internal("Failed to load exam"))?
        .ok_or_else(|| not_found(ErrorCode::ExamNotFound, "Exam not found"))?;

    let ctx = class_context(storage, user, exam.class_id).await?;
    if !ctx.role.is_manager() && !exam.is_published {
        return Err(not_found(ErrorCode::ExamNotFound, "Exam not found"));
    }
    Ok((exam, ctx))
}
