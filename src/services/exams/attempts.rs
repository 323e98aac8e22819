use actix_web::{HttpRequest, HttpResponse};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

use super::grading::{
    GradeError, apply_manual_grades, auto_grade, order_questions, question_order,
};
use super::{ExamService, load_exam};
use crate::errors::EduConnectError;
use crate::middlewares::require_class_access::ClassRole;
use crate::models::audit::actions;
use crate::models::exams::{
    AttemptDetail, AttemptStatus, AttemptWithStudent, Exam, ExamAttempt, ExamListParams,
    GradeAttemptRequest, Question, QuestionAnswer, SaveAnswersRequest,
};
use crate::models::notifications::{NewNotification, NotificationKind};
use crate::models::users::entities::User;
use crate::models::{ErrorCode, PaginatedResponse};
use crate::services::access::{
    current_user, manager_context, require_student, user_summaries,
};
use crate::services::audit::{AuditEntry, record};
use crate::services::notifications::dispatch;
use crate::services::responses::{
    ServiceResult, bad_request, conflict, created, internal, not_found, ok,
};
use crate::storage::Storage;

const MAX_ANSWER_CHARS: usize = 10_000;

/// 组装作答详情
///
/// 未批改完成时学生只能看到自己的答案，标准答案和得分都隐藏。
async fn attempt_detail(
    storage: &Arc<dyn Storage>,
    exam: &Exam,
    attempt: ExamAttempt,
    reveal: bool,
) -> Result<AttemptDetail, HttpResponse> {
    let questions = storage
        .list_exam_questions(exam.id)
        .await
        .map_err(internal("Failed to load questions"))?;
    let mut questions = order_questions(questions, &attempt.question_order);

    let mut answers = storage
        .list_attempt_answers(attempt.id)
        .await
        .map_err(internal("Failed to load answers"))?;

    if !reveal {
        questions = questions.into_iter().map(Question::without_answer).collect();
        answers = answers
            .into_iter()
            .map(|a| QuestionAnswer {
                is_correct: None,
                marks_awarded: None,
                ..a
            })
            .collect();
    }

    let mut attempt = attempt;
    if !reveal && attempt.status != AttemptStatus::Graded {
        attempt.score = None;
    }

    Ok(AttemptDetail {
        deadline: attempt.deadline(exam),
        attempt,
        questions,
        answers,
    })
}

/// 读取作答记录并确认属于当前学生
async fn own_attempt(
    storage: &Arc<dyn Storage>,
    user: &User,
    attempt_id: i64,
) -> Result<(ExamAttempt, Exam), HttpResponse> {
    let attempt = storage
        .get_attempt_by_id(attempt_id)
        .await
        .map_err(internal("Failed to load attempt"))?
        .filter(|a| a.student_id == user.id)
        .ok_or_else(|| not_found(ErrorCode::AttemptNotFound, "Attempt not found"))?;
    let exam = storage
        .get_exam_by_id(attempt.exam_id)
        .await
        .map_err(internal("Failed to load exam"))?
        .ok_or_else(|| not_found(ErrorCode::ExamNotFound, "Exam not found"))?;
    Ok((attempt, exam))
}

pub async fn start_attempt(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
) -> ServiceResult {
    let student = current_user(request)?;
    require_student(&student)?;
    let storage = service.get_storage(request)?;

    let (exam, ctx) = load_exam(&storage, &student, exam_id).await?;
    if ctx.role != ClassRole::Student {
        return Err(not_found(ErrorCode::ExamNotFound, "Exam not found"));
    }

    // 已有作答时继续原来的作答
    if let Some(existing) = storage
        .get_attempt(exam.id, student.id)
        .await
        .map_err(internal("Failed to load attempt"))?
    {
        if existing.status != AttemptStatus::InProgress {
            return Err(conflict(
                ErrorCode::AttemptAlreadySubmitted,
                "You have already submitted this exam",
            ));
        }
        let detail = attempt_detail(&storage, &exam, existing, false).await?;
        return ok(detail, "Attempt resumed");
    }

    if !exam.is_open_at(Utc::now()) {
        return Err(bad_request(
            ErrorCode::ExamNotAvailable,
            "Exam is not open for attempts",
        ));
    }

    let questions = storage
        .list_exam_questions(exam.id)
        .await
        .map_err(internal("Failed to load questions"))?;
    if questions.is_empty() {
        return Err(bad_request(
            ErrorCode::ExamNotAvailable,
            "Exam has no questions",
        ));
    }

    let order = question_order(&questions, exam.shuffle_questions, &mut rand::rng());
    let attempt = match storage.create_attempt(exam.id, student.id, order).await {
        Ok(attempt) => attempt,
        // 并发开始时以先写入的为准
        Err(EduConnectError::Conflict(_)) => storage
            .get_attempt(exam.id, student.id)
            .await
            .map_err(internal("Failed to load attempt"))?
            .ok_or_else(|| not_found(ErrorCode::AttemptNotFound, "Attempt not found"))?,
        Err(e) => return Err(internal("Failed to start attempt")(e)),
    };

    info!(
        "Student {} started exam {} (attempt {})",
        student.username, exam.id, attempt.id
    );
    let detail = attempt_detail(&storage, &exam, attempt, false).await?;
    created(detail, "Attempt started")
}

pub async fn save_answers(
    service: &ExamService,
    request: &HttpRequest,
    attempt_id: i64,
    answers: SaveAnswersRequest,
) -> ServiceResult {
    let student = current_user(request)?;
    let storage = service.get_storage(request)?;

    let (attempt, exam) = own_attempt(&storage, &student, attempt_id).await?;
    if attempt.status != AttemptStatus::InProgress {
        return Err(conflict(
            ErrorCode::AttemptNotInProgress,
            "Attempt is no longer in progress",
        ));
    }
    if attempt.deadline(&exam).is_some_and(|d| Utc::now() > d) {
        return Err(conflict(
            ErrorCode::AttemptTimeExpired,
            "Time is up for this attempt",
        ));
    }

    let question_ids: HashSet<i64> = storage
        .list_exam_questions(exam.id)
        .await
        .map_err(internal("Failed to load questions"))?
        .into_iter()
        .map(|q| q.id)
        .collect();
    for answer in &answers.answers {
        if !question_ids.contains(&answer.question_id) {
            return Err(bad_request(
                ErrorCode::QuestionInvalid,
                format!("Question {} does not belong to this exam", answer.question_id),
            ));
        }
        if answer.answer.chars().count() > MAX_ANSWER_CHARS {
            return Err(bad_request(
                ErrorCode::BadRequest,
                format!("Answers must be at most {MAX_ANSWER_CHARS} characters"),
            ));
        }
    }

    let saved = storage
        .save_answers(attempt.id, &answers.answers)
        .await
        .map_err(internal("Failed to save answers"))?;

    ok(saved, "Answers saved")
}

pub async fn submit_attempt(
    service: &ExamService,
    request: &HttpRequest,
    attempt_id: i64,
) -> ServiceResult {
    let student = current_user(request)?;
    let storage = service.get_storage(request)?;

    let (attempt, exam) = own_attempt(&storage, &student, attempt_id).await?;
    if attempt.status != AttemptStatus::InProgress {
        return Err(conflict(
            ErrorCode::AttemptAlreadySubmitted,
            "Attempt has already been submitted",
        ));
    }

    let questions = storage
        .list_exam_questions(exam.id)
        .await
        .map_err(internal("Failed to load questions"))?;
    let answers: HashMap<i64, String> = storage
        .list_attempt_answers(attempt.id)
        .await
        .map_err(internal("Failed to load answers"))?
        .into_iter()
        .map(|a| (a.question_id, a.answer))
        .collect();

    let result = auto_grade(&questions, &answers);
    let next = if result.fully_graded {
        AttemptStatus::Graded
    } else {
        AttemptStatus::Submitted
    };

    let finalized = storage
        .finalize_attempt(
            attempt.id,
            AttemptStatus::InProgress,
            next,
            result.marks,
            Some(result.score),
            None,
        )
        .await
        .map_err(internal("Failed to submit attempt"))?
        .ok_or_else(|| {
            conflict(
                ErrorCode::AttemptAlreadySubmitted,
                "Attempt has already been submitted",
            )
        })?;

    if finalized.status == AttemptStatus::Graded {
        dispatch(
            &storage,
            vec![
                NewNotification::new(
                    student.id,
                    NotificationKind::Grade,
                    format!("Your exam {} has been graded", exam.title),
                )
                .content(format!("Score: {} / {}", result.score, exam.total_marks))
                .reference("exam_attempt", finalized.id),
            ],
        )
        .await;
    }

    info!(
        "Student {} submitted attempt {} ({})",
        student.username, finalized.id, finalized.status
    );
    let reveal = finalized.status == AttemptStatus::Graded;
    let detail = attempt_detail(&storage, &exam, finalized, reveal).await?;
    ok(detail, "Attempt submitted successfully")
}

pub async fn grade_attempt(
    service: &ExamService,
    request: &HttpRequest,
    attempt_id: i64,
    grade_data: GradeAttemptRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let attempt = storage
        .get_attempt_by_id(attempt_id)
        .await
        .map_err(internal("Failed to load attempt"))?
        .ok_or_else(|| not_found(ErrorCode::AttemptNotFound, "Attempt not found"))?;
    let exam = storage
        .get_exam_by_id(attempt.exam_id)
        .await
        .map_err(internal("Failed to load exam"))?
        .ok_or_else(|| not_found(ErrorCode::ExamNotFound, "Exam not found"))?;
    manager_context(&storage, &user, exam.class_id).await?;

    if attempt.status != AttemptStatus::Submitted {
        return Err(conflict(
            ErrorCode::AttemptNotSubmitted,
            "Attempt is not waiting for grading",
        ));
    }

    let questions = storage
        .list_exam_questions(exam.id)
        .await
        .map_err(internal("Failed to load questions"))?;
    let answers = storage
        .list_attempt_answers(attempt.id)
        .await
        .map_err(internal("Failed to load answers"))?;

    let result = apply_manual_grades(&questions, &answers, &grade_data.grades)
        .map_err(|e| {
            let code = match e {
                GradeError::OutOfRange { .. } => ErrorCode::ScoreOutOfRange,
                _ => ErrorCode::QuestionInvalid,
            };
            bad_request(code, e.to_string())
        })?;
    let next = if result.complete {
        AttemptStatus::Graded
    } else {
        AttemptStatus::Submitted
    };

    let graded = storage
        .finalize_attempt(
            attempt.id,
            AttemptStatus::Submitted,
            next,
            result.marks,
            Some(result.score),
            Some(user.id),
        )
        .await
        .map_err(internal("Failed to grade attempt"))?
        .ok_or_else(|| {
            conflict(
                ErrorCode::AttemptNotSubmitted,
                "Attempt is not waiting for grading",
            )
        })?;

    if graded.status == AttemptStatus::Graded {
        dispatch(
            &storage,
            vec![
                NewNotification::new(
                    graded.student_id,
                    NotificationKind::Grade,
                    format!("Your exam {} has been graded", exam.title),
                )
                .content(format!("Score: {} / {}", result.score, exam.total_marks))
                .reference("exam_attempt", graded.id),
            ],
        )
        .await;
    } else {
        info!("Attempt {} partially graded by {}", graded.id, user.username);
    }

    record(
        &storage,
        request,
        user.id,
        AuditEntry {
            action: actions::ATTEMPT_GRADE,
            entity_type: "exam_attempt",
            entity_id: graded.id,
            details: Some(format!("score={} status={}", result.score, graded.status)),
        },
    )
    .await;

    let detail = attempt_detail(&storage, &exam, graded, true).await?;
    ok(detail, "Attempt graded successfully")
}

pub async fn list_attempts(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
    query: ExamListParams,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let exam = storage
        .get_exam_by_id(exam_id)
        .await
        .map_err(internal("Failed to load exam"))?
        .ok_or_else(|| not_found(ErrorCode::ExamNotFound, "Exam not found"))?;
    manager_context(&storage, &user, exam.class_id).await?;

    let page = storage
        .list_exam_attempts(exam.id, query.pagination)
        .await
        .map_err(internal("Failed to list attempts"))?;
    let students = user_summaries(&storage, page.items.iter().map(|a| a.student_id)).await?;

    let page: PaginatedResponse<AttemptWithStudent> = page.map(|attempt| AttemptWithStudent {
        student: students.get(&attempt.student_id).cloned(),
        attempt,
    });
    ok(page, "Attempts retrieved successfully")
}

pub async fn get_my_attempt(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
) -> ServiceResult {
    let student = current_user(request)?;
    require_student(&student)?;
    let storage = service.get_storage(request)?;

    let (exam, _) = load_exam(&storage, &student, exam_id).await?;
    let attempt = storage
        .get_attempt(exam.id, student.id)
        .await
        .map_err(internal("Failed to load attempt"))?
        .ok_or_else(|| not_found(ErrorCode::AttemptNotFound, "Attempt not found"))?;

    let reveal = attempt.status == AttemptStatus::Graded;
    let detail = attempt_detail(&storage, &exam, attempt, reveal).await?;
    ok(detail, "Attempt retrieved successfully")
}

pub async fn get_attempt(
    service: &ExamService,
    request: &HttpRequest,
    attempt_id: i64,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let attempt = storage
        .get_attempt_by_id(attempt_id)
        .await
        .map_err(internal("Failed to load attempt"))?
        .ok_or_else(|| not_found(ErrorCode::AttemptNotFound, "Attempt not found"))?;
    let exam = storage
        .get_exam_by_id(attempt.exam_id)
        .await
        .map_err(internal("Failed to load exam"))?
        .ok_or_else(|| not_found(ErrorCode::ExamNotFound, "Exam not found"))?;

    let reveal = if attempt.student_id == user.id {
        attempt.status == AttemptStatus::Graded
    } else {
        manager_context(&storage, &user, exam.class_id).await?;
        true
    };

    let detail = attempt_detail(&storage, &exam, attempt, reveal).await?;
    ok(detail, "Attempt retrieved successfully")
}
