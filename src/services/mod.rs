pub mod access;
pub mod ai_chat;
pub mod announcements;
pub mod assignments;
pub mod attendance;
pub mod audit;
pub mod auth;
pub mod chat;
pub mod classes;
pub mod dashboard;
pub mod enrollments;
pub mod events;
pub mod exams;
pub mod materials;
pub mod notifications;
pub mod responses;
pub mod submissions;
pub mod system;
pub mod users;

pub use ai_chat::AiChatService;
pub use announcements::AnnouncementService;
pub use assignments::AssignmentService;
pub use attendance::AttendanceService;
pub use audit::AuditService;
pub use auth::AuthService;
pub use chat::ChatService;
pub use classes::ClassService;
pub use dashboard::DashboardService;
pub use enrollments::EnrollmentService;
pub use events::EventService;
pub use exams::ExamService;
pub use materials::MaterialService;
pub use notifications::NotificationService;
pub use submissions::SubmissionService;
pub use system::SystemService;
pub use users::UserService;

/// 声明业务服务，存储在处理请求时从 app data 中取出
macro_rules! declare_service {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name;

        impl $name {
            pub fn new_lazy() -> Self {
                Self
            }

            pub(crate) fn get_storage(
                &self,
                request: &actix_web::HttpRequest,
            ) -> Result<std::sync::Arc<dyn $crate::storage::Storage>, actix_web::HttpResponse> {
                request
                    .app_data::<actix_web::web::Data<std::sync::Arc<dyn $crate::storage::Storage>>>()
                    .map(|data| data.get_ref().clone())
                    .ok_or_else(|| {
                        tracing::error!("Storage not found in app data");
                        $crate::services::responses::error(
                            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                            $crate::models::ErrorCode::InternalServerError,
                            "Storage unavailable",
                        )
                    })
            }
        }
    };
}

pub(crate) use declare_service;
