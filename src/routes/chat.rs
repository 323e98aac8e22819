use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::chat::{CreateRoomRequest, MessageListParams, SendMessageRequest};
use crate::services::ChatService;
use crate::utils::SafeRoomIdI64;

static CHAT_SERVICE: Lazy<ChatService> = Lazy::new(ChatService::new_lazy);

pub async fn list_rooms(req: HttpRequest) -> ActixResult<HttpResponse> {
    CHAT_SERVICE.list_rooms(&req).await
}

pub async fn create_room(
    req: HttpRequest,
    room_data: web::Json<CreateRoomRequest>,
) -> ActixResult<HttpResponse> {
    CHAT_SERVICE.create_room(&req, room_data.into_inner()).await
}

pub async fn list_messages(
    req: HttpRequest,
    room_id: SafeRoomIdI64,
    query: web::Query<MessageListParams>,
) -> ActixResult<HttpResponse> {
    CHAT_SERVICE
        .list_messages(&req, room_id.0, query.into_inner())
        .await
}

pub async fn send_message(
    req: HttpRequest,
    room_id: SafeRoomIdI64,
    message: web::Json<SendMessageRequest>,
) -> ActixResult<HttpResponse> {
    CHAT_SERVICE
        .send_message(&req, room_id.0, message.into_inner())
        .await
}

pub fn configure_chat_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/chat/rooms")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_rooms))
                    .route(web::post().to(create_room)),
            )
            .service(
                web::resource("/{room_id}/messages")
                    .route(web::get().to(list_messages))
                    .route(web::post().to(send_message)),
            ),
    );
}
