pub mod responder;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::debug;

use super::declare_service;
use super::responses::{ServiceResult, bad_request, finish, internal, ok};
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::ai_chat::{AiChatRequest, MAX_AI_MESSAGE_CHARS};
use crate::models::events::EventQuery;
use crate::models::exams::AttemptStatus;
use crate::models::users::entities::{User, UserRole};
use crate::services::access::{current_user, visible_class_ids};
use crate::services::dashboard::student_snapshot;
use crate::storage::Storage;
use responder::{ReplyContext, compose_reply, detect_intent};

declare_service!(AiChatService);

impl AiChatService {
    pub async fn chat(
        &self,
        request: &HttpRequest,
        chat_request: AiChatRequest,
    ) -> ActixResult<HttpResponse> {
        finish(self.reply(request, chat_request).await)
    }

    async fn reply(&self, request: &HttpRequest, chat_request: AiChatRequest) -> ServiceResult {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;

        let message = chat_request.message.trim();
        let length = message.chars().count();
        if length == 0 || length > MAX_AI_MESSAGE_CHARS {
            return Err(bad_request(
                ErrorCode::BadRequest,
                format!("Message must be between 1 and {MAX_AI_MESSAGE_CHARS} characters"),
            ));
        }

        let intent = detect_intent(message);
        let ctx = reply_context(&storage, &user).await?;
        debug!("AI chat intent for user {}: {}", user.id, intent);

        let config = AppConfig::get();
        ok(
            compose_reply(&config.ai_chat.assistant_name, intent, &ctx),
            "Reply generated",
        )
    }
}

async fn reply_context(
    storage: &Arc<dyn Storage>,
    user: &User,
) -> Result<ReplyContext, HttpResponse> {
    let mut ctx = ReplyContext {
        name: user.name().to_string(),
        role: Some(user.role),
        ..Default::default()
    };

    match user.role {
        UserRole::Student => {
            let snapshot = student_snapshot(storage, user).await?;
            ctx.pending_assignments = snapshot.pending_assignments;
            ctx.upcoming_exams = snapshot.upcoming_exams.into_iter().map(|e| e.title).collect();
            ctx.unread_notifications = snapshot.unread_notifications;
            ctx.attendance_rate = snapshot.attendance_rate;
            ctx.graded_count = snapshot.graded_count;
            ctx.average_percent = snapshot.average_percent;
        }
        UserRole::Teacher | UserRole::Admin => {
            let class_ids = match visible_class_ids(storage, user).await? {
                Some(ids) => ids,
                None => storage
                    .list_teacher_class_ids(user.id)
                    .await
                    .map_err(internal("Failed to load classes"))?,
            };
            ctx.submissions_to_grade = storage
                .count_ungraded_submissions(&class_ids)
                .await
                .map_err(internal("Failed to count submissions"))?;
            ctx.attempts_to_grade = storage
                .count_attempts_by_status(&class_ids, AttemptStatus::Submitted)
                .await
                .map_err(internal("Failed to count attempts"))?;
            ctx.unread_notifications = storage
                .count_unread_notifications(user.id)
                .await
                .map_err(internal("Failed to count notifications"))?;
        }
    }

    let now = Utc::now();
    let events = storage
        .list_events(EventQuery {
            from: Some(now),
            to: Some(now + Duration::days(7)),
            class_ids: visible_class_ids(storage, user).await?,
        })
        .await
        .map_err(internal("Failed to load events"))?;
    ctx.upcoming_events = events
        .into_iter()
        .map(|e| format!("{} ({})", e.title, e.starts_at.format("%a %d %b")))
        .collect();

    Ok(ctx)
}
