pub mod manage;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::declare_service;
use super::responses::finish;
use crate::models::events::{CreateEventRequest, EventListParams, UpdateEventRequest};

declare_service!(EventService);

impl EventService {
    pub async fn list_events(
        &self,
        request: &HttpRequest,
        query: EventListParams,
    ) -> ActixResult<HttpResponse> {
        finish(manage::list_events(self, request, query).await)
    }

    pub async fn create_event(
        &self,
        request: &HttpRequest,
        event_data: CreateEventRequest,
    ) -> ActixResult<HttpResponse> {
        finish(manage::create_event(self, request, event_data).await)
    }

    pub async fn update_event(
        &self,
        request: &HttpRequest,
        event_id: i64,
        update_data: UpdateEventRequest,
    ) -> ActixResult<HttpResponse> {
        finish(manage::update_event(self, request, event_id, update_data).await)
    }

    pub async fn delete_event(
        &self,
        request: &HttpRequest,
        event_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(manage::delete_event(self, request, event_id).await)
    }
}
