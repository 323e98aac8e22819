use actix_web::HttpRequest;
use tracing::info;

use super::AnnouncementService;
use crate::models::ErrorCode;
use crate::models::announcements::{
    AnnouncementListParams, AnnouncementPriority, AnnouncementScope, CreateAnnouncementRequest,
    NewAnnouncement,
};
use crate::models::notifications::{NewNotification, NotificationKind};
use crate::models::users::entities::UserRole;
use crate::services::access::{class_context, current_user, manager_context, visible_class_ids};
use crate::services::notifications::dispatch;
use crate::services::responses::{
    ServiceResult, bad_request, created, forbidden, internal, not_found, ok, ok_message,
};
use crate::utils::validate::validate_text;

pub async fn list_announcements(
    service: &AnnouncementService,
    request: &HttpRequest,
    query: AnnouncementListParams,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    if let Some(class_id) = query.class_id {
        class_context(&storage, &user, class_id).await?;
    }

    let scope = match visible_class_ids(&storage, &user).await? {
        None => AnnouncementScope::All,
        Some(ids) => AnnouncementScope::Classes(ids),
    };

    let page = storage
        .list_announcements(scope, query.class_id, query.pagination)
        .await
        .map_err(internal("Failed to list announcements"))?;

    ok(page, "Announcements retrieved successfully")
}

pub async fn create_announcement(
    service: &AnnouncementService,
    request: &HttpRequest,
    announcement_data: CreateAnnouncementRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    validate_text("Title", &announcement_data.title, 1, 200)
        .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    validate_text("Content", &announcement_data.content, 1, 10_000)
        .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;

    // 确定通知对象
    let (recipients, audience) = match announcement_data.class_id {
        Some(class_id) => {
            let ctx = manager_context(&storage, &user, class_id).await?;
            let students = storage
                .list_approved_student_ids(class_id)
                .await
                .map_err(internal("Failed to load students"))?;
            (students, ctx.class.name)
        }
        None => {
            if user.role != UserRole::Admin {
                return Err(forbidden(
                    ErrorCode::Forbidden,
                    "Only admins can post school-wide announcements",
                ));
            }
            let users = storage
                .list_active_user_ids()
                .await
                .map_err(internal("Failed to load users"))?;
            (users, "School".to_string())
        }
    };

    let announcement = storage
        .create_announcement(NewAnnouncement {
            class_id: announcement_data.class_id,
            author_id: user.id,
            title: announcement_data.title.trim().to_string(),
            content: announcement_data.content,
            priority: announcement_data
                .priority
                .unwrap_or(AnnouncementPriority::Normal),
        })
        .await
        .map_err(internal("Failed to create announcement"))?;

    let notifications = recipients
        .into_iter()
        .filter(|id| *id != user.id)
        .map(|recipient| {
            NewNotification::new(
                recipient,
                NotificationKind::Announcement,
                format!("{}: {}", audience, announcement.title),
            )
            .reference("announcement", announcement.id)
        })
        .collect();
    dispatch(&storage, notifications).await;

    info!(
        "Announcement {} posted by {} (class: {:?})",
        announcement.id, user.username, announcement.class_id
    );
    created(announcement, "Announcement created successfully")
}

pub async fn delete_announcement(
    service: &AnnouncementService,
    request: &HttpRequest,
    announcement_id: i64,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let announcement = storage
        .get_announcement_by_id(announcement_id)
        .await
        .map_err(internal("Failed to load announcement"))?
        .ok_or_else(|| not_found(ErrorCode::AnnouncementNotFound, "Announcement not found"))?;

    if announcement.author_id != user.id && user.role != UserRole::Admin {
        return Err(forbidden(
            ErrorCode::Forbidden,
            "Only the author or an admin can delete this announcement",
        ));
    }

    let deleted = storage
        .delete_announcement(announcement.id)
        .await
        .map_err(internal("Failed to delete announcement"))?;
    if !deleted {
        return Err(not_found(ErrorCode::AnnouncementNotFound, "Announcement not found"));
    }

    info!("Announcement {} deleted by {}", announcement.id, user.username);
    ok_message("Announcement deleted successfully")
}
