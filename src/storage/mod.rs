use std::sync::Arc;

use crate::errors::Result;
use crate::models::{
    PaginatedResponse, PaginationQuery,
    announcements::{Announcement, AnnouncementScope, NewAnnouncement},
    assignments::{Assignment, NewAssignment, UpdateAssignmentRequest},
    attendance::{AttendanceRecord, AttendanceSession, AttendanceStatus, RecordInput},
    audit::{AuditListParams, AuditLog, NewAuditLog},
    chat::{ChatMessage, ChatRoom, NewChatRoom},
    classes::{
        entities::Class,
        requests::{ClassListQuery, NewClass, UpdateClassRequest},
    },
    enrollments::{Enrollment, EnrollmentStatus},
    events::{Event, EventQuery, NewEvent, UpdateEventRequest},
    exams::{
        AnswerInput, AnswerMark, AttemptStatus, Exam, ExamAttempt, NewExam, NewQuestion, Question,
        QuestionAnswer, UpdateExamRequest, UpdateQuestionRequest,
    },
    materials::{Material, NewMaterial, UpdateMaterialRequest},
    notifications::{NewNotification, Notification},
    submissions::{Submission, SubmissionStatus},
    users::{
        entities::{User, UserRole},
        requests::{NewUser, UserChanges, UserListParams},
    },
};

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    async fn list_users_with_pagination(
        &self,
        query: UserListParams,
    ) -> Result<PaginatedResponse<User>>;
    async fn list_active_user_ids(&self) -> Result<Vec<i64>>;
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>>;
    async fn delete_user(&self, id: i64) -> Result<bool>;
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    async fn count_users(&self) -> Result<u64>;
    async fn count_users_by_role(&self, role: UserRole) -> Result<u64>;

    /// 班级管理
    async fn create_class(&self, class: NewClass) -> Result<Class>;
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    async fn get_class_by_code(&self, class_code: &str) -> Result<Option<Class>>;
    async fn get_classes_by_ids(&self, ids: &[i64]) -> Result<Vec<Class>>;
    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<PaginatedResponse<Class>>;
    async fn list_teacher_class_ids(&self, teacher_id: i64) -> Result<Vec<i64>>;
    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>>;
    async fn delete_class(&self, class_id: i64) -> Result<bool>;
    async fn count_classes(&self) -> Result<u64>;

    /// 选课管理
    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>>;
    async fn get_enrollment(&self, class_id: i64, student_id: i64) -> Result<Option<Enrollment>>;
    // 新建待审核记录，已被拒绝的记录重置为待审核
    async fn request_enrollment(
        &self,
        class_id: i64,
        student_id: i64,
        message: Option<String>,
    ) -> Result<Enrollment>;
    async fn list_class_enrollments(
        &self,
        class_id: i64,
        status: Option<EnrollmentStatus>,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Enrollment>>;
    async fn list_student_enrollments(
        &self,
        student_id: i64,
        status: Option<EnrollmentStatus>,
    ) -> Result<Vec<Enrollment>>;
    // 仅当记录仍为 pending 时生效，返回是否更新
    async fn decide_enrollment(
        &self,
        id: i64,
        status: EnrollmentStatus,
        decided_by: i64,
    ) -> Result<bool>;
    async fn delete_enrollment(&self, id: i64) -> Result<bool>;
    async fn count_approved_students(&self, class_id: i64) -> Result<u64>;
    async fn list_approved_student_ids(&self, class_id: i64) -> Result<Vec<i64>>;
    async fn list_approved_class_ids(&self, student_id: i64) -> Result<Vec<i64>>;
    // class_ids 为 None 时统计全部班级
    async fn count_enrollments_by_status(
        &self,
        class_ids: Option<&[i64]>,
        status: EnrollmentStatus,
    ) -> Result<u64>;

    /// 作业管理
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    async fn list_class_assignments(
        &self,
        class_id: i64,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Assignment>>;
    async fn list_assignments_for_classes(&self, class_ids: &[i64]) -> Result<Vec<Assignment>>;
    async fn update_assignment(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>>;
    async fn delete_assignment(&self, id: i64) -> Result<bool>;

    /// 作业提交
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    async fn get_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>>;
    // 已批改的提交不会被覆盖，返回 None
    async fn upsert_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
        content: String,
        attachment_url: Option<String>,
        status: SubmissionStatus,
    ) -> Result<Option<Submission>>;
    async fn list_assignment_submissions(
        &self,
        assignment_id: i64,
        status: Option<SubmissionStatus>,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Submission>>;
    async fn list_student_submissions(
        &self,
        student_id: i64,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>>;
    async fn grade_submission(
        &self,
        id: i64,
        score: f64,
        feedback: Option<String>,
        graded_by: i64,
    ) -> Result<Option<Submission>>;
    async fn count_ungraded_submissions(&self, class_ids: &[i64]) -> Result<u64>;

    /// 考试与题目
    async fn create_exam(&self, exam: NewExam) -> Result<Exam>;
    async fn get_exam_by_id(&self, id: i64) -> Result<Option<Exam>>;
    async fn list_class_exams(
        &self,
        class_id: i64,
        published_only: bool,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Exam>>;
    async fn list_exams_for_classes(
        &self,
        class_ids: &[i64],
        published_only: bool,
    ) -> Result<Vec<Exam>>;
    async fn update_exam(&self, id: i64, update: UpdateExamRequest) -> Result<Option<Exam>>;
    async fn delete_exam(&self, id: i64) -> Result<bool>;
    // 题目增删改后同步更新考试总分
    async fn create_question(&self, question: NewQuestion) -> Result<Question>;
    async fn get_question_by_id(&self, id: i64) -> Result<Option<Question>>;
    async fn list_exam_questions(&self, exam_id: i64) -> Result<Vec<Question>>;
    async fn update_question(
        &self,
        id: i64,
        update: UpdateQuestionRequest,
    ) -> Result<Option<Question>>;
    async fn delete_question(&self, id: i64) -> Result<bool>;

    /// 考试作答
    async fn create_attempt(
        &self,
        exam_id: i64,
        student_id: i64,
        question_order: Vec<i64>,
    ) -> Result<ExamAttempt>;
    async fn get_attempt_by_id(&self, id: i64) -> Result<Option<ExamAttempt>>;
    async fn get_attempt(&self, exam_id: i64, student_id: i64) -> Result<Option<ExamAttempt>>;
    async fn list_exam_attempts(
        &self,
        exam_id: i64,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<ExamAttempt>>;
    async fn list_student_attempts(
        &self,
        student_id: i64,
        exam_ids: &[i64],
    ) -> Result<Vec<ExamAttempt>>;
    async fn save_answers(
        &self,
        attempt_id: i64,
        answers: &[AnswerInput],
    ) -> Result<Vec<QuestionAnswer>>;
    async fn list_attempt_answers(&self, attempt_id: i64) -> Result<Vec<QuestionAnswer>>;
    // 在事务中写入判分并切换状态，状态不是 expected 时返回 None
    async fn finalize_attempt(
        &self,
        attempt_id: i64,
        expected: AttemptStatus,
        next: AttemptStatus,
        marks: Vec<AnswerMark>,
        score: Option<f64>,
        graded_by: Option<i64>,
    ) -> Result<Option<ExamAttempt>>;
    async fn count_attempts_by_status(
        &self,
        class_ids: &[i64],
        status: AttemptStatus,
    ) -> Result<u64>;

    /// 考勤
    async fn create_attendance_session(
        &self,
        class_id: i64,
        session_date: &str,
        topic: Option<String>,
        created_by: i64,
    ) -> Result<AttendanceSession>;
    async fn get_attendance_session(&self, id: i64) -> Result<Option<AttendanceSession>>;
    async fn list_class_sessions(
        &self,
        class_id: i64,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<AttendanceSession>>;
    async fn upsert_attendance_records(
        &self,
        session_id: i64,
        records: &[RecordInput],
    ) -> Result<Vec<AttendanceRecord>>;
    async fn list_session_records(&self, session_id: i64) -> Result<Vec<AttendanceRecord>>;
    // 返回 (class_id, status)
    async fn list_student_attendance(
        &self,
        student_id: i64,
    ) -> Result<Vec<(i64, AttendanceStatus)>>;

    /// 学习资料
    async fn create_material(&self, material: NewMaterial) -> Result<Material>;
    async fn get_material_by_id(&self, id: i64) -> Result<Option<Material>>;
    async fn list_class_materials(
        &self,
        class_id: i64,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Material>>;
    async fn update_material(
        &self,
        id: i64,
        update: UpdateMaterialRequest,
    ) -> Result<Option<Material>>;
    async fn delete_material(&self, id: i64) -> Result<bool>;

    /// 公告
    async fn create_announcement(&self, announcement: NewAnnouncement) -> Result<Announcement>;
    async fn get_announcement_by_id(&self, id: i64) -> Result<Option<Announcement>>;
    async fn list_announcements(
        &self,
        scope: AnnouncementScope,
        class_id: Option<i64>,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Announcement>>;
    async fn delete_announcement(&self, id: i64) -> Result<bool>;
    async fn count_announcements(&self) -> Result<u64>;

    /// 通知
    async fn create_notifications(&self, notifications: Vec<NewNotification>) -> Result<u64>;
    async fn list_user_notifications(
        &self,
        user_id: i64,
        unread_only: bool,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Notification>>;
    async fn count_unread_notifications(&self, user_id: i64) -> Result<u64>;
    async fn mark_notification_read(&self, id: i64, user_id: i64) -> Result<bool>;
    async fn mark_all_notifications_read(&self, user_id: i64) -> Result<u64>;
    async fn delete_notification(&self, id: i64, user_id: i64) -> Result<bool>;

    /// 聊天
    async fn create_chat_room(&self, room: NewChatRoom) -> Result<ChatRoom>;
    async fn get_chat_room(&self, id: i64) -> Result<Option<ChatRoom>>;
    async fn find_direct_room(&self, user_a: i64, user_b: i64) -> Result<Option<ChatRoom>>;
    async fn find_class_room(&self, class_id: i64) -> Result<Option<ChatRoom>>;
    async fn list_user_rooms(&self, user_id: i64) -> Result<Vec<ChatRoom>>;
    async fn list_room_member_ids(&self, room_id: i64) -> Result<Vec<i64>>;
    async fn is_room_member(&self, room_id: i64, user_id: i64) -> Result<bool>;
    async fn create_chat_message(
        &self,
        room_id: i64,
        sender_id: i64,
        content: String,
    ) -> Result<ChatMessage>;
    async fn list_room_messages(
        &self,
        room_id: i64,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<ChatMessage>>;

    /// 日程
    async fn create_event(&self, event: NewEvent) -> Result<Event>;
    async fn get_event_by_id(&self, id: i64) -> Result<Option<Event>>;
    async fn list_events(&self, query: EventQuery) -> Result<Vec<Event>>;
    async fn update_event(&self, id: i64, update: UpdateEventRequest) -> Result<Option<Event>>;
    async fn delete_event(&self, id: i64) -> Result<bool>;

    /// 审计
    async fn create_audit_log(&self, log: NewAuditLog) -> Result<AuditLog>;
    async fn list_audit_logs(&self, query: AuditListParams) -> Result<PaginatedResponse<AuditLog>>;
    async fn list_recent_audit_logs(&self, limit: u64) -> Result<Vec<AuditLog>>;

    /// 数据库连通性检查
    async fn ping(&self) -> Result<()>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
