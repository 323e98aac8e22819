use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::ai_chat::AiChatRequest;
use crate::services::AiChatService;

static AI_CHAT_SERVICE: Lazy<AiChatService> = Lazy::new(AiChatService::new_lazy);

pub async fn chat(
    req: HttpRequest,
    chat_request: web::Json<AiChatRequest>,
) -> ActixResult<HttpResponse> {
    AI_CHAT_SERVICE.chat(&req, chat_request.into_inner()).await
}

// 限流在认证之后执行，按用户计数
pub fn configure_ai_chat_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/ai")
            .wrap(middlewares::RequireJWT)
            .route(
                "/chat",
                web::post()
                    .to(chat)
                    .wrap(middlewares::RateLimit::ai_chat()),
            ),
    );
}
