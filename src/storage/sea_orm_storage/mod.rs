//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod announcements;
mod assignments;
mod attendance;
mod audit;
mod chat;
mod classes;
mod enrollments;
mod events;
mod exams;
mod materials;
mod notifications;
mod submissions;
mod users;

use crate::config::AppConfig;
use crate::errors::{EduConnectError, Result};
use crate::models::{PaginatedResponse, PaginationQuery};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Select,
};
use std::time::Duration;
use tracing::info;

/// 包装数据库错误，唯一约束冲突保留为 Conflict
pub(crate) fn db_err(context: &'static str) -> impl Fn(DbErr) -> EduConnectError {
    move |e| match EduConnectError::from(e) {
        EduConnectError::Conflict(msg) => EduConnectError::conflict(format!("{context}: {msg}")),
        other => EduConnectError::database_operation(format!("{context}: {}", other.message())),
    }
}

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::from_url(
            &config.database.url,
            config.database.pool_size,
            config.database.timeout,
        )
        .await
    }

    /// 按指定 URL 创建存储实例并执行迁移
    pub async fn from_url(url: &str, pool_size: u32, timeout: u64) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, pool_size, timeout).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout).await?
        };

        Migrator::up(&db, None)
            .await
            .map_err(|e| EduConnectError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接
    ///
    /// 文件库启用 WAL，内存库只保留一个常驻连接。
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| EduConnectError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        if !in_memory {
            opt = opt
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("temp_store", "memory")
                .pragma("wal_autocheckpoint", "1000");
        }

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(pool_size.max(1))
                .min_connections(1)
                .test_before_acquire(true)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(timeout))
            .connect_with(opt)
            .await
            .map_err(|e| EduConnectError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(pool_size.min(5))
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| EduConnectError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(EduConnectError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 通用分页查询
    pub(crate) async fn fetch_page<E, T>(
        &self,
        select: Select<E>,
        pagination: PaginationQuery,
        context: &'static str,
        convert: fn(E::Model) -> T,
    ) -> Result<PaginatedResponse<T>>
    where
        E: EntityTrait,
        E::Model: Send + Sync,
    {
        let (page, size) = pagination.normalized();
        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(db_err(context))?;
        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err(context))?;

        Ok(PaginatedResponse::new(
            models.into_iter().map(convert).collect(),
            page,
            size,
            total,
        ))
    }

    async fn ping_impl(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| EduConnectError::database_connection(format!("数据库不可用: {e}")))?;
        Ok(())
    }
}

// Storage trait 实现
use crate::models::{
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn list_users_with_pagination(
        &self,
        query: UserListParams,
    ) -> Result<PaginatedResponse<User>> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn list_active_user_ids(&self) -> Result<Vec<i64>> {
        self.list_active_user_ids_impl().await
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>> {
        self.update_user_impl(id, changes).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl(None).await
    }

    async fn count_users_by_role(&self, role: UserRole) -> Result<u64> {
        self.count_users_impl(Some(role)).await
    }

    // 班级模块
    async fn create_class(&self, class: NewClass) -> Result<Class> {
        self.create_class_impl(class).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn get_class_by_code(&self, class_code: &str) -> Result<Option<Class>> {
        self.get_class_by_code_impl(class_code).await
    }

    async fn get_classes_by_ids(&self, ids: &[i64]) -> Result<Vec<Class>> {
        self.get_classes_by_ids_impl(ids).await
    }

    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<PaginatedResponse<Class>> {
        self.list_classes_with_pagination_impl(query).await
    }

    async fn list_teacher_class_ids(&self, teacher_id: i64) -> Result<Vec<i64>> {
        self.list_teacher_class_ids_impl(teacher_id).await
    }

    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        self.update_class_impl(class_id, update).await
    }

    async fn delete_class(&self, class_id: i64) -> Result<bool> {
        self.delete_class_impl(class_id).await
    }

    async fn count_classes(&self) -> Result<u64> {
        self.count_classes_impl().await
    }

    // 选课模块
    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>> {
        self.get_enrollment_by_id_impl(id).await
    }

    async fn get_enrollment(&self, class_id: i64, student_id: i64) -> Result<Option<Enrollment>> {
        self.get_enrollment_impl(class_id, student_id).await
    }

    async fn request_enrollment(
        &self,
        class_id: i64,
        student_id: i64,
        message: Option<String>,
    ) -> Result<Enrollment> {
        self.request_enrollment_impl(class_id, student_id, message)
            .await
    }

    async fn list_class_enrollments(
        &self,
        class_id: i64,
        status: Option<EnrollmentStatus>,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Enrollment>> {
        self.list_class_enrollments_impl(class_id, status, pagination)
            .await
    }

    async fn list_student_enrollments(
        &self,
        student_id: i64,
        status: Option<EnrollmentStatus>,
    ) -> Result<Vec<Enrollment>> {
        self.list_student_enrollments_impl(student_id, status).await
    }

    async fn decide_enrollment(
        &self,
        id: i64,
        status: EnrollmentStatus,
        decided_by: i64,
    ) -> Result<bool> {
        self.decide_enrollment_impl(id, status, decided_by).await
    }

    async fn delete_enrollment(&self, id: i64) -> Result<bool> {
        self.delete_enrollment_impl(id).await
    }

    async fn count_approved_students(&self, class_id: i64) -> Result<u64> {
        self.count_enrollments_by_status_impl(Some(&[class_id]), EnrollmentStatus::Approved)
            .await
    }

    async fn list_approved_student_ids(&self, class_id: i64) -> Result<Vec<i64>> {
        self.list_approved_student_ids_impl(class_id).await
    }

    async fn list_approved_class_ids(&self, student_id: i64) -> Result<Vec<i64>> {
        self.list_approved_class_ids_impl(student_id).await
    }

    async fn count_enrollments_by_status(
        &self,
        class_ids: Option<&[i64]>,
        status: EnrollmentStatus,
    ) -> Result<u64> {
        self.count_enrollments_by_status_impl(class_ids, status)
            .await
    }

    // 作业模块
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        self.create_assignment_impl(assignment).await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn list_class_assignments(
        &self,
        class_id: i64,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Assignment>> {
        self.list_class_assignments_impl(class_id, pagination).await
    }

    async fn list_assignments_for_classes(&self, class_ids: &[i64]) -> Result<Vec<Assignment>> {
        self.list_assignments_for_classes_impl(class_ids).await
    }

    async fn update_assignment(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        self.update_assignment_impl(id, update).await
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool> {
        self.delete_assignment_impl(id).await
    }

    // 提交模块
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn get_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        self.get_submission_impl(assignment_id, student_id).await
    }

    async fn upsert_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
        content: String,
        attachment_url: Option<String>,
        status: SubmissionStatus,
    ) -> Result<Option<Submission>> {
        self.upsert_submission_impl(assignment_id, student_id, content, attachment_url, status)
            .await
    }

    async fn list_assignment_submissions(
        &self,
        assignment_id: i64,
        status: Option<SubmissionStatus>,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Submission>> {
        self.list_assignment_submissions_impl(assignment_id, status, pagination)
            .await
    }

    async fn list_student_submissions(
        &self,
        student_id: i64,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>> {
        self.list_student_submissions_impl(student_id, assignment_ids)
            .await
    }

    async fn grade_submission(
        &self,
        id: i64,
        score: f64,
        feedback: Option<String>,
        graded_by: i64,
    ) -> Result<Option<Submission>> {
        self.grade_submission_impl(id, score, feedback, graded_by)
            .await
    }

    async fn count_ungraded_submissions(&self, class_ids: &[i64]) -> Result<u64> {
        self.count_ungraded_submissions_impl(class_ids).await
    }

    // 考试模块
    async fn create_exam(&self, exam: NewExam) -> Result<Exam> {
        self.create_exam_impl(exam).await
    }

    async fn get_exam_by_id(&self, id: i64) -> Result<Option<Exam>> {
        self.get_exam_by_id_impl(id).await
    }

    async fn list_class_exams(
        &self,
        class_id: i64,
        published_only: bool,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Exam>> {
        self.list_class_exams_impl(class_id, published_only, pagination)
            .await
    }

    async fn list_exams_for_classes(
        &self,
        class_ids: &[i64],
        published_only: bool,
    ) -> Result<Vec<Exam>> {
        self.list_exams_for_classes_impl(class_ids, published_only)
            .await
    }

    async fn update_exam(&self, id: i64, update: UpdateExamRequest) -> Result<Option<Exam>> {
        self.update_exam_impl(id, update).await
    }

    async fn delete_exam(&self, id: i64) -> Result<bool> {
        self.delete_exam_impl(id).await
    }

    async fn create_question(&self, question: NewQuestion) -> Result<Question> {
        self.create_question_impl(question).await
    }

    async fn get_question_by_id(&self, id: i64) -> Result<Option<Question>> {
        self.get_question_by_id_impl(id).await
    }

    async fn list_exam_questions(&self, exam_id: i64) -> Result<Vec<Question>> {
        self.list_exam_questions_impl(exam_id).await
    }

    async fn update_question(
        &self,
        id: i64,
        update: UpdateQuestionRequest,
    ) -> Result<Option<Question>> {
        self.update_question_impl(id, update).await
    }

    async fn delete_question(&self, id: i64) -> Result<bool> {
        self.delete_question_impl(id).await
    }

    async fn create_attempt(
        &self,
        exam_id: i64,
        student_id: i64,
        question_order: Vec<i64>,
    ) -> Result<ExamAttempt> {
        self.create_attempt_impl(exam_id, student_id, question_order)
            .await
    }

    async fn get_attempt_by_id(&self, id: i64) -> Result<Option<ExamAttempt>> {
        self.get_attempt_by_id_impl(id).await
    }

    async fn get_attempt(&self, exam_id: i64, student_id: i64) -> Result<Option<ExamAttempt>> {
        self.get_attempt_impl(exam_id, student_id).await
    }

    async fn list_exam_attempts(
        &self,
        exam_id: i64,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<ExamAttempt>> {
        self.list_exam_attempts_impl(exam_id, pagination).await
    }

    async fn list_student_attempts(
        &self,
        student_id: i64,
        exam_ids: &[i64],
    ) -> Result<Vec<ExamAttempt>> {
        self.list_student_attempts_impl(student_id, exam_ids).await
    }

    async fn save_answers(
        &self,
        attempt_id: i64,
        answers: &[AnswerInput],
    ) -> Result<Vec<QuestionAnswer>> {
        self.save_answers_impl(attempt_id, answers).await
    }

    async fn list_attempt_answers(&self, attempt_id: i64) -> Result<Vec<QuestionAnswer>> {
        self.list_attempt_answers_impl(attempt_id).await
    }

    async fn finalize_attempt(
        &self,
        attempt_id: i64,
        expected: AttemptStatus,
        next: AttemptStatus,
        marks: Vec<AnswerMark>,
        score: Option<f64>,
        graded_by: Option<i64>,
    ) -> Result<Option<ExamAttempt>> {
        self.finalize_attempt_impl(attempt_id, expected, next, marks, score, graded_by)
            .await
    }

    async fn count_attempts_by_status(
        &self,
        class_ids: &[i64],
        status: AttemptStatus,
    ) -> Result<u64> {
        self.count_attempts_by_status_impl(class_ids, status).await
    }

    // 考勤模块
    async fn create_attendance_session(
        &self,
        class_id: i64,
        session_date: &str,
        topic: Option<String>,
        created_by: i64,
    ) -> Result<AttendanceSession> {
        self.create_attendance_session_impl(class_id, session_date, topic, created_by)
            .await
    }

    async fn get_attendance_session(&self, id: i64) -> Result<Option<AttendanceSession>> {
        self.get_attendance_session_impl(id).await
    }

    async fn list_class_sessions(
        &self,
        class_id: i64,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<AttendanceSession>> {
        self.list_class_sessions_impl(class_id, pagination).await
    }

    async fn upsert_attendance_records(
        &self,
        session_id: i64,
        records: &[RecordInput],
    ) -> Result<Vec<AttendanceRecord>> {
        self.upsert_attendance_records_impl(session_id, records)
            .await
    }

    async fn list_session_records(&self, session_id: i64) -> Result<Vec<AttendanceRecord>> {
        self.list_session_records_impl(session_id).await
    }

    async fn list_student_attendance(
        &self,
        student_id: i64,
    ) -> Result<Vec<(i64, AttendanceStatus)>> {
        self.list_student_attendance_impl(student_id).await
    }

    // 资料模块
    async fn create_material(&self, material: NewMaterial) -> Result<Material> {
        self.create_material_impl(material).await
    }

    async fn get_material_by_id(&self, id: i64) -> Result<Option<Material>> {
        self.get_material_by_id_impl(id).await
    }

    async fn list_class_materials(
        &self,
        class_id: i64,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Material>> {
        self.list_class_materials_impl(class_id, pagination).await
    }

    async fn update_material(
        &self,
        id: i64,
        update: UpdateMaterialRequest,
    ) -> Result<Option<Material>> {
        self.update_material_impl(id, update).await
    }

    async fn delete_material(&self, id: i64) -> Result<bool> {
        self.delete_material_impl(id).await
    }

    // 公告模块
    async fn create_announcement(&self, announcement: NewAnnouncement) -> Result<Announcement> {
        self.create_announcement_impl(announcement).await
    }

    async fn get_announcement_by_id(&self, id: i64) -> Result<Option<Announcement>> {
        self.get_announcement_by_id_impl(id).await
    }

    async fn list_announcements(
        &self,
        scope: AnnouncementScope,
        class_id: Option<i64>,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Announcement>> {
        self.list_announcements_impl(scope, class_id, pagination)
            .await
    }

    async fn delete_announcement(&self, id: i64) -> Result<bool> {
        self.delete_announcement_impl(id).await
    }

    async fn count_announcements(&self) -> Result<u64> {
        self.count_announcements_impl().await
    }

    // 通知模块
    async fn create_notifications(&self, notifications: Vec<NewNotification>) -> Result<u64> {
        self.create_notifications_impl(notifications).await
    }

    async fn list_user_notifications(
        &self,
        user_id: i64,
        unread_only: bool,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Notification>> {
        self.list_user_notifications_impl(user_id, unread_only, pagination)
            .await
    }

    async fn count_unread_notifications(&self, user_id: i64) -> Result<u64> {
        self.count_unread_notifications_impl(user_id).await
    }

    async fn mark_notification_read(&self, id: i64, user_id: i64) -> Result<bool> {
        self.mark_notification_read_impl(id, user_id).await
    }

    async fn mark_all_notifications_read(&self, user_id: i64) -> Result<u64> {
        self.mark_all_notifications_read_impl(user_id).await
    }

    async fn delete_notification(&self, id: i64, user_id: i64) -> Result<bool> {
        self.delete_notification_impl(id, user_id).await
    }

    // 聊天模块
    async fn create_chat_room(&self, room: NewChatRoom) -> Result<ChatRoom> {
        self.create_chat_room_impl(room).await
    }

    async fn get_chat_room(&self, id: i64) -> Result<Option<ChatRoom>> {
        self.get_chat_room_impl(id).await
    }

    async fn find_direct_room(&self, user_a: i64, user_b: i64) -> Result<Option<ChatRoom>> {
        self.find_direct_room_impl(user_a, user_b).await
    }

    async fn find_class_room(&self, class_id: i64) -> Result<Option<ChatRoom>> {
        self.find_class_room_impl(class_id).await
    }

    async fn list_user_rooms(&self, user_id: i64) -> Result<Vec<ChatRoom>> {
        self.list_user_rooms_impl(user_id).await
    }

    async fn list_room_member_ids(&self, room_id: i64) -> Result<Vec<i64>> {
        self.list_room_member_ids_impl(room_id).await
    }

    async fn is_room_member(&self, room_id: i64, user_id: i64) -> Result<bool> {
        self.is_room_member_impl(room_id, user_id).await
    }

    async fn create_chat_message(
        &self,
        room_id: i64,
        sender_id: i64,
        content: String,
    ) -> Result<ChatMessage> {
        self.create_chat_message_impl(room_id, sender_id, content)
            .await
    }

    async fn list_room_messages(
        &self,
        room_id: i64,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<ChatMessage>> {
        self.list_room_messages_impl(room_id, pagination).await
    }

    // 日程模块
    async fn create_event(&self, event: NewEvent) -> Result<Event> {
        self.create_event_impl(event).await
    }

    async fn get_event_by_id(&self, id: i64) -> Result<Option<Event>> {
        self.get_event_by_id_impl(id).await
    }

    async fn list_events(&self, query: EventQuery) -> Result<Vec<Event>> {
        self.list_events_impl(query).await
    }

    async fn update_event(&self, id: i64, update: UpdateEventRequest) -> Result<Option<Event>> {
        self.update_event_impl(id, update).await
    }

    async fn delete_event(&self, id: i64) -> Result<bool> {
        self.delete_event_impl(id).await
    }

    // 审计模块
    async fn create_audit_log(&self, log: NewAuditLog) -> Result<AuditLog> {
        self.create_audit_log_impl(log).await
    }

    async fn list_audit_logs(&self, query: AuditListParams) -> Result<PaginatedResponse<AuditLog>> {
        self.list_audit_logs_impl(query).await
    }

    async fn list_recent_audit_logs(&self, limit: u64) -> Result<Vec<AuditLog>> {
        self.list_recent_audit_logs_impl(limit).await
    }

    async fn ping(&self) -> Result<()> {
        self.ping_impl().await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::SeaOrmStorage;
    use crate::models::users::{
        entities::{User, UserRole, UserStatus},
        requests::NewUser,
    };

    pub async fn memory_storage() -> SeaOrmStorage {
        SeaOrmStorage::from_url("sqlite::memory:", 1, 5)
            .await
            .expect("内存数据库初始化失败")
    }

    pub async fn seed_user(storage: &SeaOrmStorage, username: &str, role: UserRole) -> User {
        storage
            .create_user_impl(NewUser {
                username: username.to_string(),
                email: format!("{username}@school.test"),
                password_hash: "hash".to_string(),
                role,
                status: UserStatus::Active,
                display_name: None,
                grade_level: None,
                department: None,
            })
            .await
            .expect("创建用户失败")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("data.db").unwrap(),
            "sqlite://data.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert!(SeaOrmStorage::build_database_url("postgres://localhost/edu").is_ok());
        assert!(SeaOrmStorage::build_database_url("ftp://nope").is_err());
    }

    #[tokio::test]
    async fn test_ping_memory_database() {
        let storage = test_support::memory_storage().await;
        assert!(storage.ping_impl().await.is_ok());
    }
}
