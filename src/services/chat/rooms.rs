use actix_web::{HttpRequest, HttpResponse};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

use super::ChatService;
use crate::models::ErrorCode;
use crate::models::chat::{ChatRoom, ChatRoomDetail, CreateRoomRequest, NewChatRoom, RoomType};
use crate::models::users::entities::{User, UserStatus};
use crate::services::access::{current_user, manager_context};
use crate::services::responses::{ServiceResult, bad_request, created, internal, ok};
use crate::storage::Storage;
use crate::utils::validate::validate_text;

async fn room_detail(
    storage: &Arc<dyn Storage>,
    room: ChatRoom,
) -> Result<ChatRoomDetail, HttpResponse> {
    let member_ids = storage
        .list_room_member_ids(room.id)
        .await
        .map_err(internal("Failed to load room members"))?;
    Ok(ChatRoomDetail { room, member_ids })
}

/// 成员必须是存在且启用的其他用户
async fn validate_members(
    storage: &Arc<dyn Storage>,
    user: &User,
    member_ids: &[i64],
) -> Result<Vec<i64>, HttpResponse> {
    let ids: BTreeSet<i64> = member_ids
        .iter()
        .copied()
        .filter(|id| *id != user.id)
        .collect();
    if ids.is_empty() {
        return Err(bad_request(
            ErrorCode::ChatRoomMemberInvalid,
            "At least one other member is required",
        ));
    }

    let ids: Vec<i64> = ids.into_iter().collect();
    let users = storage
        .get_users_by_ids(&ids)
        .await
        .map_err(internal("Failed to load users"))?;
    let active = users
        .iter()
        .filter(|u| u.status == UserStatus::Active)
        .count();
    if active != ids.len() {
        return Err(bad_request(
            ErrorCode::ChatRoomMemberInvalid,
            "Some members do not exist or are inactive",
        ));
    }
    Ok(ids)
}

pub async fn list_rooms(service: &ChatService, request: &HttpRequest) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let rooms = storage
        .list_user_rooms(user.id)
        .await
        .map_err(internal("Failed to list chat rooms"))?;

    let mut details = Vec::with_capacity(rooms.len());
    for room in rooms {
        details.push(room_detail(&storage, room).await?);
    }

    ok(details, "Chat rooms retrieved successfully")
}

pub async fn create_room(
    service: &ChatService,
    request: &HttpRequest,
    room_data: CreateRoomRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let new_room = match room_data.room_type {
        RoomType::Direct => {
            let members = validate_members(&storage, &user, &room_data.member_ids).await?;
            let &[other] = members.as_slice() else {
                return Err(bad_request(
                    ErrorCode::ChatRoomMemberInvalid,
                    "Direct rooms have exactly one other member",
                ));
            };
            if let Some(existing) = storage
                .find_direct_room(user.id, other)
                .await
                .map_err(internal("Failed to look up chat room"))?
            {
                let detail = room_detail(&storage, existing).await?;
                return ok(detail, "Chat room already exists");
            }
            NewChatRoom {
                name: None,
                room_type: RoomType::Direct,
                class_id: None,
                created_by: user.id,
                member_ids: vec![other],
            }
        }
        RoomType::Group => {
            let name = room_data.name.as_deref().unwrap_or("").trim().to_string();
            validate_text("Room name", &name, 1, 100)
                .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
            let members = validate_members(&storage, &user, &room_data.member_ids).await?;
            NewChatRoom {
                name: Some(name),
                room_type: RoomType::Group,
                class_id: None,
                created_by: user.id,
                member_ids: members,
            }
        }
        RoomType::Class => {
            let Some(class_id) = room_data.class_id else {
                return Err(bad_request(
                    ErrorCode::BadRequest,
                    "class_id is required for class rooms",
                ));
            };
            let ctx = manager_context(&storage, &user, class_id).await?;
            if let Some(existing) = storage
                .find_class_room(class_id)
                .await
                .map_err(internal("Failed to look up chat room"))?
            {
                let detail = room_detail(&storage, existing).await?;
                return ok(detail, "Chat room already exists");
            }
            let mut members = storage
                .list_approved_student_ids(class_id)
                .await
                .map_err(internal("Failed to load students"))?;
            members.push(ctx.class.teacher_id);
            NewChatRoom {
                name: Some(ctx.class.name.clone()),
                room_type: RoomType::Class,
                class_id: Some(class_id),
                created_by: user.id,
                member_ids: members,
            }
        }
    };

    let room = storage
        .create_chat_room(new_room)
        .await
        .map_err(internal("Failed to create chat room"))?;

    info!(
        "Chat room {} ({}) created by {}",
        room.id, room.room_type, user.username
    );
    let detail = room_detail(&storage, room).await?;
    created(detail, "Chat room created successfully")
}
