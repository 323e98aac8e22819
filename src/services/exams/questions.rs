use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::info;

use super::ExamService;
use super::grading::validate_question;
use crate::models::{ErrorCode, PaginationQuery};
use crate::models::exams::{
    CreateQuestionRequest, Exam, NewQuestion, Question, QuestionType, UpdateQuestionRequest,
};
use crate::models::users::entities::User;
use crate::services::access::{current_user, manager_context};
use crate::services::responses::{
    ServiceResult, bad_request, conflict, created, internal, not_found, ok, ok_message,
};
use crate::storage::Storage;

async fn managed_exam(
    storage: &Arc<dyn Storage>,
    user: &User,
    exam_id: i64,
) -> Result<Exam, HttpResponse> {
    let exam = storage
        .get_exam_by_id(exam_id)
        .await
        .map_err(internal("Failed to load exam"))?
        .ok_or_else(|| not_found(ErrorCode::ExamNotFound, "Exam not found"))?;
    manager_context(storage, user, exam.class_id).await?;
    Ok(exam)
}

// 已有作答的考试不能再改题
async fn ensure_no_attempts(
    storage: &Arc<dyn Storage>,
    exam_id: i64,
) -> Result<(), HttpResponse> {
    let attempts = storage
        .list_exam_attempts(exam_id, PaginationQuery::new(1, 1))
        .await
        .map_err(internal("Failed to load attempts"))?;
    if attempts.pagination.total > 0 {
        return Err(conflict(
            ErrorCode::ExamHasAttempts,
            "Questions cannot be changed after students have started the exam",
        ));
    }
    Ok(())
}

async fn managed_question(
    storage: &Arc<dyn Storage>,
    user: &User,
    question_id: i64,
) -> Result<Question, HttpResponse> {
    let question = storage
        .get_question_by_id(question_id)
        .await
        .map_err(internal("Failed to load question"))?
        .ok_or_else(|| not_found(ErrorCode::QuestionNotFound, "Question not found"))?;
    managed_exam(storage, user, question.exam_id).await?;
    Ok(question)
}

pub async fn add_question(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
    question_data: CreateQuestionRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let exam = managed_exam(&storage, &user, exam_id).await?;
    ensure_no_attempts(&storage, exam.id).await?;

    let options: Vec<String> = if question_data.question_type == QuestionType::MultipleChoice {
        question_data.options.iter().map(|o| o.trim().to_string()).collect()
    } else {
        Vec::new()
    };
    let correct_answer = validate_question(
        question_data.question_type,
        &question_data.prompt,
        &options,
        question_data.correct_answer.as_deref(),
        question_data.marks,
    )
    .map_err(|e| bad_request(ErrorCode::QuestionInvalid, e))?;

    let position = match question_data.position {
        Some(position) => position,
        None => {
            let existing = storage
                .list_exam_questions(exam.id)
                .await
                .map_err(internal("Failed to load questions"))?;
            existing.iter().map(|q| q.position).max().unwrap_or(0) + 1
        }
    };

    let question = storage
        .create_question(NewQuestion {
            exam_id: exam.id,
            question_type: question_data.question_type,
            prompt: question_data.prompt.trim().to_string(),
            options,
            correct_answer,
            marks: question_data.marks,
            position,
        })
        .await
        .map_err(internal("Failed to create question"))?;

    info!("Question {} added to exam {}", question.id, exam.id);
    created(question, "Question added successfully")
}

pub async fn update_question(
    service: &ExamService,
    request: &HttpRequest,
    question_id: i64,
    update_data: UpdateQuestionRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let existing = managed_question(&storage, &user, question_id).await?;
    ensure_no_attempts(&storage, existing.exam_id).await?;

    // 合并后整体校验，修改题型时选项和答案必须一起满足
    let question_type = update_data.question_type.unwrap_or(existing.question_type);
    let prompt = update_data
        .prompt
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.prompt)
        .to_string();
    let options: Vec<String> = match question_type {
        QuestionType::MultipleChoice => update_data
            .options
            .as_ref()
            .unwrap_or(&existing.options)
            .iter()
            .map(|o| o.trim().to_string())
            .collect(),
        _ => Vec::new(),
    };
    let marks = update_data.marks.unwrap_or(existing.marks);
    let answer = update_data
        .correct_answer
        .as_deref()
        .or(existing.correct_answer.as_deref());

    let correct_answer = validate_question(question_type, &prompt, &options, answer, marks)
        .map_err(|e| bad_request(ErrorCode::QuestionInvalid, e))?;

    let updated = storage
        .update_question(
            existing.id,
            UpdateQuestionRequest {
                question_type: Some(question_type),
                prompt: Some(prompt),
                options: Some(options),
                correct_answer,
                marks: Some(marks),
                position: update_data.position,
            },
        )
        .await
        .map_err(internal("Failed to update question"))?
        .ok_or_else(|| not_found(ErrorCode::QuestionNotFound, "Question not found"))?;

    ok(updated, "Question updated successfully")
}

pub async fn delete_question(
    service: &ExamService,
    request: &HttpRequest,
    question_id: i64,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let question = managed_question(&storage, &user, question_id).await?;
    ensure_no_attempts(&storage, question.exam_id).await?;

    let deleted = storage
        .delete_question(question.id)
        .await
        .map_err(internal("Failed to delete question"))?;
    if !deleted {
        return Err(not_found(ErrorCode::QuestionNotFound, "Question not found"));
    }

    info!("Question {} deleted from exam {}", question.id, question.exam_id);
    ok_message("Question deleted successfully")
}
