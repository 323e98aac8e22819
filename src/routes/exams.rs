use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::exams::{
    CreateExamRequest, CreateQuestionRequest, ExamListParams, GradeAttemptRequest,
    SaveAnswersRequest, UpdateExamRequest, UpdateQuestionRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::ExamService;
use crate::utils::{SafeAttemptIdI64, SafeExamIdI64, SafeQuestionIdI64};

static EXAM_SERVICE: Lazy<ExamService> = Lazy::new(ExamService::new_lazy);

pub async fn list_class_exams(
    req: HttpRequest,
    query: web::Query<ExamListParams>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.list_class_exams(&req, query.into_inner()).await
}

pub async fn create_exam(
    req: HttpRequest,
    exam_data: web::Json<CreateExamRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.create_exam(&req, exam_data.into_inner()).await
}

pub async fn get_exam(req: HttpRequest, exam_id: SafeExamIdI64) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.get_exam(&req, exam_id.0).await
}

pub async fn update_exam(
    req: HttpRequest,
    exam_id: SafeExamIdI64,
    update_data: web::Json<UpdateExamRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .update_exam(&req, exam_id.0, update_data.into_inner())
        .await
}

pub async fn delete_exam(req: HttpRequest, exam_id: SafeExamIdI64) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.delete_exam(&req, exam_id.0).await
}

pub async fn add_question(
    req: HttpRequest,
    exam_id: SafeExamIdI64,
    question_data: web::Json<CreateQuestionRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .add_question(&req, exam_id.0, question_data.into_inner())
        .await
}

pub async fn update_question(
    req: HttpRequest,
    question_id: SafeQuestionIdI64,
    update_data: web::Json<UpdateQuestionRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .update_question(&req, question_id.0, update_data.into_inner())
        .await
}

pub async fn delete_question(
    req: HttpRequest,
    question_id: SafeQuestionIdI64,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.delete_question(&req, question_id.0).await
}

pub async fn start_attempt(req: HttpRequest, exam_id: SafeExamIdI64) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.start_attempt(&req, exam_id.0).await
}

pub async fn list_attempts(
    req: HttpRequest,
    exam_id: SafeExamIdI64,
    query: web::Query<ExamListParams>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .list_attempts(&req, exam_id.0, query.into_inner())
        .await
}

pub async fn get_my_attempt(req: HttpRequest, exam_id: SafeExamIdI64) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.get_my_attempt(&req, exam_id.0).await
}

pub async fn get_attempt(
    req: HttpRequest,
    attempt_id: SafeAttemptIdI64,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.get_attempt(&req, attempt_id.0).await
}

pub async fn save_answers(
    req: HttpRequest,
    attempt_id: SafeAttemptIdI64,
    answers: web::Json<SaveAnswersRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .save_answers(&req, attempt_id.0, answers.into_inner())
        .await
}

pub async fn submit_attempt(
    req: HttpRequest,
    attempt_id: SafeAttemptIdI64,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.submit_attempt(&req, attempt_id.0).await
}

pub async fn grade_attempt(
    req: HttpRequest,
    attempt_id: SafeAttemptIdI64,
    grade_data: web::Json<GradeAttemptRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .grade_attempt(&req, attempt_id.0, grade_data.into_inner())
        .await
}

pub fn configure_exam_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/exams")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{exam_id}")
                    .route(web::get().to(get_exam))
                    .route(
                        web::put()
                            .to(update_exam)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_exam)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            .route(
                "/{exam_id}/questions",
                web::post()
                    .to(add_question)
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
            )
            .route(
                "/{exam_id}/attempts/mine",
                web::get()
                    .to(get_my_attempt)
                    .wrap(middlewares::RequireRole::new(UserRole::Student)),
            )
            .service(
                web::resource("/{exam_id}/attempts")
                    .route(
                        web::get()
                            .to(list_attempts)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    )
                    .route(
                        web::post()
                            .to(start_attempt)
                            .wrap(middlewares::RequireRole::new(UserRole::Student)),
                    ),
            ),
    )
    .service(
        web::scope("/api/v1/questions")
            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{question_id}")
                    .route(web::put().to(update_question))
                    .route(web::delete().to(delete_question)),
            ),
    )
    .service(
        web::scope("/api/v1/attempts")
            .wrap(middlewares::RequireJWT)
            .route("/{attempt_id}", web::get().to(get_attempt))
            .route(
                "/{attempt_id}/answers",
                web::put()
                    .to(save_answers)
                    .wrap(middlewares::RequireRole::new(UserRole::Student)),
            )
            .route(
                "/{attempt_id}/submit",
                web::post()
                    .to(submit_attempt)
                    .wrap(middlewares::RequireRole::new(UserRole::Student)),
            )
            .route(
                "/{attempt_id}/grade",
                web::put()
                    .to(grade_attempt)
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
            ),
    );
}
