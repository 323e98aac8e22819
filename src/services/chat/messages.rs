use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;

use super::ChatService;
use crate::models::ErrorCode;
use crate::models::chat::{
    ChatRoom, MAX_MESSAGE_CHARS, MessageListParams, RoomType, SendMessageRequest,
};
use crate::models::notifications::{NewNotification, NotificationKind};
use crate::models::users::entities::User;
use crate::services::access::current_user;
use crate::services::notifications::dispatch;
use crate::services::responses::{
    ServiceResult, bad_request, created, forbidden, internal, not_found, ok,
};
use crate::storage::Storage;

/// 只有房间成员可以读写消息
async fn member_room(
    storage: &Arc<dyn Storage>,
    user: &User,
    room_id: i64,
) -> Result<ChatRoom, HttpResponse> {
    let room = storage
        .get_chat_room(room_id)
        .await
        .map_err(internal("Failed to load chat room"))?
        .ok_or_else(|| not_found(ErrorCode::ChatRoomNotFound, "Chat room not found"))?;

    let member = storage
        .is_room_member(room.id, user.id)
        .await
        .map_err(internal("Failed to check room membership"))?;
    if !member {
        return Err(forbidden(
            ErrorCode::Forbidden,
            "You are not a member of this room",
        ));
    }
    Ok(room)
}

pub fn validate_message(content: &str) -> Result<String, String> {
    let content = content.trim();
    if content.is_empty() {
        return Err("Message cannot be empty".to_string());
    }
    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(format!(
            "Message must be at most {MAX_MESSAGE_CHARS} characters"
        ));
    }
    Ok(content.to_string())
}

pub async fn list_messages(
    service: &ChatService,
    request: &HttpRequest,
    room_id: i64,
    query: MessageListParams,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let room = member_room(&storage, &user, room_id).await?;
    let page = storage
        .list_room_messages(room.id, query.pagination)
        .await
        .map_err(internal("Failed to list messages"))?;

    ok(page, "Messages retrieved successfully")
}

pub async fn send_message(
    service: &ChatService,
    request: &HttpRequest,
    room_id: i64,
    message: SendMessageRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let content =
        validate_message(&message.content).map_err(|e| bad_request(ErrorCode::MessageInvalid, e))?;
    let room = member_room(&storage, &user, room_id).await?;

    let sent = storage
        .create_chat_message(room.id, user.id, content)
        .await
        .map_err(internal("Failed to send message"))?;

    // 私聊通知对方
    if room.room_type == RoomType::Direct {
        let members = storage
            .list_room_member_ids(room.id)
            .await
            .map_err(internal("Failed to load room members"))?;
        let preview: String = sent.content.chars().take(100).collect();
        let notifications = members
            .into_iter()
            .filter(|id| *id != user.id)
            .map(|recipient| {
                NewNotification::new(
                    recipient,
                    NotificationKind::Message,
                    format!("New message from {}", user.name()),
                )
                .content(preview.clone())
                .reference("chat_room", room.id)
            })
            .collect();
        dispatch(&storage, notifications).await;
    }

    created(sent, "Message sent successfully")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_message() {
        assert_eq!(validate_message("  hi  "), Ok("hi".to_string()));
        assert!(validate_message("   ").is_err());
        assert!(validate_message(&"x".repeat(MAX_MESSAGE_CHARS)).is_ok());
        assert!(validate_message(&"x".repeat(MAX_MESSAGE_CHARS + 1)).is_err());
    }
}
