//! 预导入模块，方便使用

pub use super::announcements::{
    ActiveModel as AnnouncementActiveModel, Entity as Announcements, Model as AnnouncementModel,
};
pub use super::assignments::{
    ActiveModel as AssignmentActiveModel, Entity as Assignments, Model as AssignmentModel,
};
pub use super::attendance_records::{
    ActiveModel as AttendanceRecordActiveModel, Entity as AttendanceRecords,
    Model as AttendanceRecordModel,
};
pub use super::attendance_sessions::{
    ActiveModel as AttendanceSessionActiveModel, Entity as AttendanceSessions,
    Model as AttendanceSessionModel,
};
pub use super::audit_logs::{
    ActiveModel as AuditLogActiveModel, Entity as AuditLogs, Model as AuditLogModel,
};
pub use super::chat_messages::{
    ActiveModel as ChatMessageActiveModel, Entity as ChatMessages, Model as ChatMessageModel,
};
pub use super::chat_room_members::{
    ActiveModel as ChatRoomMemberActiveModel, Entity as ChatRoomMembers,
    Model as ChatRoomMemberModel,
};
pub use super::chat_rooms::{
    ActiveModel as ChatRoomActiveModel, Entity as ChatRooms, Model as ChatRoomModel,
};
pub use super::class_enrollments::{
    ActiveModel as EnrollmentActiveModel, Entity as ClassEnrollments, Model as EnrollmentModel,
};
pub use super::classes::{ActiveModel as ClassActiveModel, Entity as Classes, Model as ClassModel};
pub use super::events::{ActiveModel as EventActiveModel, Entity as Events, Model as EventModel};
pub use super::exam_attempts::{
    ActiveModel as AttemptActiveModel, Entity as ExamAttempts, Model as AttemptModel,
};
pub use super::exam_questions::{
    ActiveModel as QuestionActiveModel, Entity as ExamQuestions, Model as QuestionModel,
};
pub use super::exams::{ActiveModel as ExamActiveModel, Entity as Exams, Model as ExamModel};
pub use super::materials::{
    ActiveModel as MaterialActiveModel, Entity as Materials, Model as MaterialModel,
};
pub use super::notifications::{
    ActiveModel as NotificationActiveModel, Entity as Notifications, Model as NotificationModel,
};
pub use super::question_answers::{
    ActiveModel as AnswerActiveModel, Entity as QuestionAnswers, Model as AnswerModel,
};
pub use super::submissions::{
    ActiveModel as SubmissionActiveModel, Entity as Submissions, Model as SubmissionModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
