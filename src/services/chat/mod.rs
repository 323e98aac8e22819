pub mod messages;
pub mod rooms;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::declare_service;
use super::responses::finish;
use crate::models::chat::{CreateRoomRequest, MessageListParams, SendMessageRequest};

declare_service!(ChatService);

impl ChatService {
    pub async fn list_rooms(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        finish(rooms::list_rooms(self, request).await)
    }

    // 私聊和班级群已存在时直接返回原房间
    pub async fn create_room(
        &self,
        request: &HttpRequest,
        room_data: CreateRoomRequest,
    ) -> ActixResult<HttpResponse> {
        finish(rooms::create_room(self, request, room_data).await)
    }

    pub async fn list_messages(
        &self,
        request: &HttpRequest,
        room_id: i64,
        query: MessageListParams,
    ) -> ActixResult<HttpResponse> {
        finish(messages::list_messages(self, request, room_id, query).await)
    }

    pub async fn send_message(
        &self,
        request: &HttpRequest,
        room_id: i64,
        message: SendMessageRequest,
    ) -> ActixResult<HttpResponse> {
        finish(messages::send_message(self, request, room_id, message).await)
    }
}
