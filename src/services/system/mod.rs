pub mod health;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::declare_service;
use super::responses::finish;

declare_service!(SystemService);

impl SystemService {
    pub async fn health(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        finish(health::health(self, request).await)
    }
}
