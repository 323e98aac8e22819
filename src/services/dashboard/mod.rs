//! 按角色汇总的首页数据

pub mod admin;
pub mod student;
pub mod teacher;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::declare_service;
use super::responses::{ServiceResult, finish, ok};
use crate::models::dashboard::DashboardResponse;
use crate::models::users::entities::UserRole;
use crate::services::access::current_user;

pub(crate) use student::student_snapshot;

/// 首页展示的最近公告和审计条数
pub const RECENT_LIMIT: u64 = 5;

declare_service!(DashboardService);

impl DashboardService {
    pub async fn get_dashboard(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        finish(self.build(request).await)
    }

    async fn build(&self, request: &HttpRequest) -> ServiceResult {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;

        let dashboard = match user.role {
            UserRole::Student => {
                DashboardResponse::Student(student::student_dashboard(&storage, &user).await?)
            }
            UserRole::Teacher => {
                DashboardResponse::Teacher(teacher::teacher_dashboard(&storage, &user).await?)
            }
            UserRole::Admin => DashboardResponse::Admin(admin::admin_dashboard(&storage).await?),
        };

        ok(dashboard, "Dashboard retrieved successfully")
    }
}
