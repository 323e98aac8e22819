//! SeaORM 实体定义
//!
//! 与 models 中的业务实体分离，存储层查询后通过 `into_*` 转换。
//! 时间统一保存为 Unix 秒。

pub mod prelude;

pub mod announcements;
pub mod assignments;
pub mod attendance_records;
pub mod attendance_sessions;
pub mod audit_logs;
pub mod chat_messages;
pub mod chat_room_members;
pub mod chat_rooms;
pub mod class_enrollments;
pub mod classes;
pub mod events;
pub mod exam_attempts;
pub mod exam_questions;
pub mod exams;
pub mod materials;
pub mod notifications;
pub mod question_answers;
pub mod submissions;
pub mod users;

use chrono::{DateTime, Utc};

pub(crate) fn to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}

pub(crate) fn to_opt_datetime(ts: Option<i64>) -> Option<DateTime<Utc>> {
    ts.map(to_datetime)
}
