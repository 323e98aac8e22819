use serde::Serialize;
use ts_rs::TS;

use crate::models::announcements::Announcement;
use crate::models::audit::AuditLog;
use crate::models::exams::Exam;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct StudentDashboard {
    pub class_count: i64,
    pub pending_assignments: i64,
    pub upcoming_exams: Vec<Exam>,
    pub unread_notifications: i64,
    pub attendance_rate: Option<f64>,
    pub recent_announcements: Vec<Announcement>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct TeacherDashboard {
    pub class_count: i64,
    pub student_count: i64,
    pub pending_enrollments: i64,
    pub submissions_to_grade: i64,
    pub attempts_to_grade: i64,
    pub recent_announcements: Vec<Announcement>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct AdminDashboard {
    pub students: i64,
    pub teachers: i64,
    pub admins: i64,
    pub class_count: i64,
    pub pending_enrollments: i64,
    pub announcement_count: i64,
    pub recent_audit_logs: Vec<AuditLog>,
}

/// 按角色返回不同摘要，`role` 字段区分
#[derive(Debug, Serialize, TS)]
#[serde(tag = "role", rename_all = "snake_case")]
#[ts(export, export_to = "dashboard.ts")]
pub enum DashboardResponse {
    Student(StudentDashboard),
    Teacher(TeacherDashboard),
    Admin(AdminDashboard),
}
