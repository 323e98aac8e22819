pub mod manage;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::declare_service;
use super::responses::finish;
use crate::models::announcements::{AnnouncementListParams, CreateAnnouncementRequest};

declare_service!(AnnouncementService);

impl AnnouncementService {
    pub async fn list_announcements(
        &self,
        request: &HttpRequest,
        query: AnnouncementListParams,
    ) -> ActixResult<HttpResponse> {
        finish(manage::list_announcements(self, request, query).await)
    }

    // 全校公告仅管理员可发布
    pub async fn create_announcement(
        &self,
        request: &HttpRequest,
        announcement_data: CreateAnnouncementRequest,
    ) -> ActixResult<HttpResponse> {
        finish(manage::create_announcement(self, request, announcement_data).await)
    }

    pub async fn delete_announcement(
        &self,
        request: &HttpRequest,
        announcement_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(manage::delete_announcement(self, request, announcement_id).await)
    }
}
