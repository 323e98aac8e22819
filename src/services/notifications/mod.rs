pub mod count;
pub mod delete;
pub mod list;
pub mod read;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::{debug, warn};

use super::declare_service;
use super::responses::finish;
use crate::models::notifications::{NewNotification, NotificationListParams};
use crate::storage::Storage;

declare_service!(NotificationService);

impl NotificationService {
    pub async fn list_notifications(
        &self,
        request: &HttpRequest,
        query: NotificationListParams,
    ) -> ActixResult<HttpResponse> {
        finish(list::list_notifications(self, request, query).await)
    }

    // 未读数量
    pub async fn unread_count(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        finish(count::unread_count(self, request).await)
    }

    pub async fn mark_read(
        &self,
        request: &HttpRequest,
        notification_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(read::mark_read(self, request, notification_id).await)
    }

    pub async fn mark_all_read(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        finish(read::mark_all_read(self, request).await)
    }

    pub async fn delete_notification(
        &self,
        request: &HttpRequest,
        notification_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(delete::delete_notification(self, request, notification_id).await)
    }
}

/// 批量发送通知，失败只记录告警
pub async fn dispatch(storage: &Arc<dyn Storage>, notifications: Vec<NewNotification>) {
    if notifications.is_empty() {
        return;
    }
    let total = notifications.len();
    match storage.create_notifications(notifications).await {
        Ok(created) => debug!("Dispatched {} notifications", created),
        Err(e) => warn!("Failed to dispatch {} notifications: {}", total, e),
    }
}
