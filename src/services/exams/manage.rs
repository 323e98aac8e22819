use actix_web::{HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use tracing::info;

use super::{ExamService, load_exam};
use crate::middlewares::require_class_access::ClassRole;
use crate::models::ErrorCode;
use crate::models::exams::{
    CreateExamRequest, ExamDetail, ExamListParams, NewExam, Question, UpdateExamRequest,
};
use crate::models::notifications::{NewNotification, NotificationKind};
use crate::services::access::{current_user, manager_context, route_class_context};
use crate::services::notifications::dispatch;
use crate::services::responses::{
    ServiceResult, bad_request, created, internal, not_found, ok, ok_message,
};
use crate::utils::validate::validate_text;

fn validate_schedule(
    duration_minutes: Option<i32>,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
) -> Result<(), HttpResponse> {
    if duration_minutes.is_some_and(|m| !(1..=600).contains(&m)) {
        return Err(bad_request(
            ErrorCode::BadRequest,
            "Duration must be between 1 and 600 minutes",
        ));
    }
    if let (Some(start), Some(end)) = (starts_at, ends_at)
        && end <= start
    {
        return Err(bad_request(
            ErrorCode::BadRequest,
            "Exam end time must be after start time",
        ));
    }
    Ok(())
}

pub async fn list_class_exams(
    service: &ExamService,
    request: &HttpRequest,
    query: ExamListParams,
) -> ServiceResult {
    let ctx = route_class_context(request)?;
    let storage = service.get_storage(request)?;

    let published_only = ctx.role == ClassRole::Student;
    let page = storage
        .list_class_exams(ctx.class.id, published_only, query.pagination)
        .await
        .map_err(internal("Failed to list exams"))?;

    ok(page, "Exams retrieved successfully")
}

pub async fn create_exam(
    service: &ExamService,
    request: &HttpRequest,
    exam_data: CreateExamRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let ctx = route_class_context(request)?;
    let storage = service.get_storage(request)?;

    validate_text("Title", &exam_data.title, 1, 200)
        .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    if let Some(description) = &exam_data.description {
        validate_text("Description", description, 0, 5000)
            .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }
    validate_schedule(
        exam_data.duration_minutes,
        exam_data.starts_at,
        exam_data.ends_at,
    )?;

    // 新建考试默认未发布，添加题目后再发布
    let exam = storage
        .create_exam(NewExam {
            class_id: ctx.class.id,
            created_by: user.id,
            title: exam_data.title.trim().to_string(),
            description: exam_data.description,
            duration_minutes: exam_data.duration_minutes,
            starts_at: exam_data.starts_at,
            ends_at: exam_data.ends_at,
            shuffle_questions: exam_data.shuffle_questions,
        })
        .await
        .map_err(internal("Failed to create exam"))?;

    info!(
        "Exam {} created in class {} by {}",
        exam.id, ctx.class.id, user.username
    );
    created(exam, "Exam created successfully")
}

pub async fn get_exam(service: &ExamService, request: &HttpRequest, exam_id: i64) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let (exam, ctx) = load_exam(&storage, &user, exam_id).await?;

    let mut questions = storage
        .list_exam_questions(exam.id)
        .await
        .map_err(internal("Failed to load questions"))?;
    if !ctx.role.is_manager() {
        questions = questions.into_iter().map(Question::without_answer).collect();
    }

    ok(ExamDetail { exam, questions }, "Exam retrieved successfully")
}

pub async fn update_exam(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
    update_data: UpdateExamRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let exam = storage
        .get_exam_by_id(exam_id)
        .await
        .map_err(internal("Failed to load exam"))?
        .ok_or_else(|| not_found(ErrorCode::ExamNotFound, "Exam not found"))?;
    let ctx = manager_context(&storage, &user, exam.class_id).await?;

    if let Some(title) = &update_data.title {
        validate_text("Title", title, 1, 200)
            .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }
    if let Some(description) = &update_data.description {
        validate_text("Description", description, 0, 5000)
            .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }
    validate_schedule(
        update_data.duration_minutes.or(exam.duration_minutes),
        update_data.starts_at.or(exam.starts_at),
        update_data.ends_at.or(exam.ends_at),
    )?;

    let publishing = update_data.is_published == Some(true) && !exam.is_published;
    if publishing {
        let questions = storage
            .list_exam_questions(exam.id)
            .await
            .map_err(internal("Failed to load questions"))?;
        if questions.is_empty() {
            return Err(bad_request(
                ErrorCode::QuestionInvalid,
                "Cannot publish an exam without questions",
            ));
        }
    }

    let update_data = UpdateExamRequest {
        title: update_data.title.map(|t| t.trim().to_string()),
        ..update_data
    };
    let updated = storage
        .update_exam(exam.id, update_data)
        .await
        .map_err(internal("Failed to update exam"))?
        .ok_or_else(|| not_found(ErrorCode::ExamNotFound, "Exam not found"))?;

    if publishing {
        let students = storage
            .list_approved_student_ids(ctx.class.id)
            .await
            .map_err(internal("Failed to load students"))?;
        let notifications = students
            .into_iter()
            .map(|student_id| {
                NewNotification::new(
                    student_id,
                    NotificationKind::Exam,
                    format!("New exam in {}: {}", ctx.class.name, updated.title),
                )
                .reference("exam", updated.id)
            })
            .collect();
        dispatch(&storage, notifications).await;
        info!("Exam {} published by {}", updated.id, user.username);
    }

    ok(updated, "Exam updated successfully")
}

pub async fn delete_exam(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let exam = storage
        .get_exam_by_id(exam_id)
        .await
        .map_err(internal("Failed to load exam"))?
        .ok_or_else(|| not_found(ErrorCode::ExamNotFound, "Exam not found"))?;
    manager_context(&storage, &user, exam.class_id).await?;

    let deleted = storage
        .delete_exam(exam.id)
        .await
        .map_err(internal("Failed to delete exam"))?;
    if !deleted {
        return Err(not_found(ErrorCode::ExamNotFound, "Exam not found"));
    }

    info!("Exam {} deleted by {}", exam.id, user.username);
    ok_message("Exam deleted successfully")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_schedule() {
        let now = Utc::now();
        assert!(validate_schedule(Some(60), Some(now), Some(now + Duration::hours(1))).is_ok());
        assert!(validate_schedule(None, None, None).is_ok());
        assert!(validate_schedule(Some(0), None, None).is_err());
        assert!(validate_schedule(Some(601), None, None).is_err());
        assert!(validate_schedule(None, Some(now), Some(now)).is_err());
    }
}
