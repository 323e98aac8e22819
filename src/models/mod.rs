//! API 数据模型
//!
//! 每个业务模块按 entities / requests / responses 拆分，
//! 这里只放跨模块共用的错误码和启动时间。

pub mod ai_chat;
pub mod announcements;
pub mod assignments;
pub mod attendance;
pub mod audit;
pub mod auth;
pub mod chat;
pub mod classes;
pub mod common;
pub mod dashboard;
pub mod enrollments;
pub mod events;
pub mod exams;
pub mod materials;
pub mod notifications;
pub mod submissions;
pub mod system;
pub mod users;

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery};

/// 业务错误码，随响应体中的 `code` 字段返回
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证与用户
    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserNotFound = 2004,
    UserNameInvalid = 2010,
    UserEmailInvalid = 2011,
    UserPasswordInvalid = 2012,
    UserNameAlreadyExists = 2020,
    UserEmailAlreadyExists = 2021,
    UserCreationFailed = 2030,
    CanNotDeleteCurrentUser = 2040,

    // 班级与选课
    ClassNotFound = 3004,
    ClassAlreadyExists = 3009,
    ClassPermissionDenied = 3003,
    ClassCodeInvalid = 3010,
    ClassFull = 3011,
    EnrollmentNotFound = 3104,
    EnrollmentAlreadyExists = 3109,
    EnrollmentNotPending = 3110,

    // 作业与提交
    AssignmentNotFound = 4004,
    AssignmentPastDue = 4010,
    SubmissionNotFound = 4104,
    SubmissionAlreadyExists = 4108,
    SubmissionAlreadyGraded = 4109,
    ScoreOutOfRange = 4110,

    // 考试
    ExamNotFound = 5004,
    ExamHasAttempts = 5009,
    ExamNotAvailable = 5010,
    QuestionNotFound = 5104,
    QuestionInvalid = 5110,
    AttemptNotFound = 5204,
    AttemptAlreadySubmitted = 5209,
    AttemptNotInProgress = 5210,
    AttemptTimeExpired = 5211,
    AttemptNotSubmitted = 5212,

    // 校园事务
    AttendanceSessionNotFound = 6004,
    AttendanceSessionExists = 6009,
    MaterialNotFound = 6104,
    AnnouncementNotFound = 6204,
    NotificationNotFound = 6304,
    ChatRoomNotFound = 6404,
    ChatRoomMemberInvalid = 6410,
    MessageInvalid = 6411,
    EventNotFound = 6504,
    EventInvalid = 6510,
}

/// 应用启动时间，用于健康检查计算运行时长
#[derive(Debug, Clone, Copy)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}
