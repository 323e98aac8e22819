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
pub mod submissions;
pub mod system;
pub mod users;

pub use ai_chat::configure_ai_chat_routes;
pub use announcements::configure_announcement_routes;
pub use assignments::configure_assignment_routes;
pub use attendance::configure_attendance_routes;
pub use audit::configure_audit_routes;
pub use auth::configure_auth_routes;
pub use chat::configure_chat_routes;
pub use classes::configure_classes_routes;
pub use dashboard::configure_dashboard_routes;
pub use enrollments::configure_enrollment_routes;
pub use events::configure_event_routes;
pub use exams::configure_exam_routes;
pub use materials::configure_material_routes;
pub use notifications::configure_notification_routes;
pub use submissions::configure_submission_routes;
pub use system::configure_system_routes;
pub use users::configure_user_routes;

use actix_web::web;

/// 注册全部 API 路由
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_system_routes)
        .configure(configure_auth_routes)
        .configure(configure_user_routes)
        .configure(configure_classes_routes)
        .configure(configure_enrollment_routes)
        .configure(configure_assignment_routes)
        .configure(configure_submission_routes)
        .configure(configure_exam_routes)
        .configure(configure_attendance_routes)
        .configure(configure_material_routes)
        .configure(configure_announcement_routes)
        .configure(configure_notification_routes)
        .configure(configure_chat_routes)
        .configure(configure_event_routes)
        .configure(configure_audit_routes)
        .configure(configure_ai_chat_routes)
        .configure(configure_dashboard_routes);
}
