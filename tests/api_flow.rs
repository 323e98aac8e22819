//! 端到端业务流程测试：内存 SQLite + Moka 缓存

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use educonnect::cache::ObjectCache;
use educonnect::cache::object_cache::moka::MokaCacheWrapper;
use educonnect::models::AppStartTime;
use educonnect::models::assignments::NewAssignment;
use educonnect::models::users::entities::{User, UserRole, UserStatus};
use educonnect::models::users::requests::NewUser;
use educonnect::routes;
use educonnect::storage::Storage;
use educonnect::storage::sea_orm_storage::SeaOrmStorage;
use educonnect::utils::jwt::JwtUtils;
use educonnect::utils::password::hash_password;

struct TestUser {
    user: User,
    token: String,
}

async fn memory_storage() -> Arc<dyn Storage> {
    let storage = SeaOrmStorage::from_url("sqlite::memory:", 1, 5)
        .await
        .expect("内存数据库初始化失败");
    Arc::new(storage)
}

async fn create_user(storage: &Arc<dyn Storage>, username: &str, role: UserRole) -> TestUser {
    let user = storage
        .create_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@school.test"),
            password_hash: hash_password("Passw0rd!").expect("哈希失败"),
            role,
            status: UserStatus::Active,
            display_name: None,
            grade_level: None,
            department: None,
        })
        .await
        .expect("创建用户失败");
    let (token, _) =
        JwtUtils::generate_access_token(user.id, user.role.as_str()).expect("签发 token 失败");
    TestUser { user, token }
}

macro_rules! init_app {
    ($storage:expr) => {{
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_capacity(1_000, 60));
        test::init_service(
            App::new()
                .app_data(web::Data::new($storage.clone()))
                .app_data(web::Data::new(cache))
                .app_data(web::Data::new(AppStartTime::now()))
                .configure(routes::configure),
        )
        .await
    }};
}

fn build_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> test::TestRequest {
    let mut req = match method {
        "POST" => test::TestRequest::post(),
        "PUT" => test::TestRequest::put(),
        "DELETE" => test::TestRequest::delete(),
        _ => test::TestRequest::get(),
    }
    .uri(uri);
    if let Some(token) = token {
        req = req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
    }
    if let Some(body) = body {
        req = req.set_json(body);
    }
    req
}

/// 发送请求，返回状态码和 JSON 响应体
macro_rules! send {
    ($app:expr, $method:expr, $uri:expr, $token:expr, $body:expr $(,)?) => {{
        let resp = test::call_service(
            &$app,
            build_request($method, &$uri, $token, $body).to_request(),
        )
        .await;
        let status: StatusCode = resp.status();
        let bytes = test::read_body(resp).await;
        let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }};
}

/// 教师建班，返回 (class_id, class_code)
macro_rules! create_class {
    ($app:expr, $teacher:expr, $name:expr) => {{
        let (status, body) = send!(
            $app,
            "POST",
            "/api/v1/classes",
            Some($teacher.token.as_str()),
            Some(json!({ "name": $name }))
        );
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let class_id = body["data"]["id"].as_i64().expect("class id");
        let code = body["data"]["class_code"]
            .as_str()
            .expect("class code")
            .to_string();
        (class_id, code)
    }};
}

/// 学生申请加入，教师给出决定
macro_rules! enroll {
    ($app:expr, $teacher:expr, $student:expr, $code:expr, $decision:expr) => {{
        let (status, body) = send!(
            $app,
            "POST",
            "/api/v1/enrollments",
            Some($student.token.as_str()),
            Some(json!({ "class_code": $code }))
        );
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let enrollment_id = body["data"]["id"].as_i64().expect("enrollment id");

        let (status, body) = send!(
            $app,
            "PUT",
            format!("/api/v1/enrollments/{enrollment_id}/decision"),
            Some($teacher.token.as_str()),
            Some(json!({ "status": $decision }))
        );
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["status"], $decision);
    }};
}

#[actix_web::test]
async fn test_health_is_public() {
    let storage = memory_storage().await;
    let app = init_app!(storage);

    let (status, body) = send!(app, "GET", "/api/v1/system/health", None, None);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], true);
}

#[actix_web::test]
async fn test_login_and_me() {
    let storage = memory_storage().await;
    let app = init_app!(storage);
    create_user(&storage, "login01", UserRole::Student).await;

    let (status, _) = send!(
        app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "login01", "password": "wrong-pass" })),
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send!(
        app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "login01@school.test", "password": "Passw0rd!" })),
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    let token = body["data"]["access_token"]
        .as_str()
        .expect("access token")
        .to_string();

    let (status, body) = send!(app, "GET", "/api/v1/auth/me", Some(token.as_str()), None);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "login01");
}

#[actix_web::test]
async fn test_protected_route_requires_token() {
    let storage = memory_storage().await;
    let app = init_app!(storage);

    let (status, _) = send!(app, "GET", "/api/v1/dashboard", None, None);
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_student_outside_class_cannot_submit() {
    let storage = memory_storage().await;
    let app = init_app!(storage);
    let teacher = create_user(&storage, "teacher01", UserRole::Teacher).await;
    let member = create_user(&storage, "member01", UserRole::Student).await;
    let outsider = create_user(&storage, "outsider01", UserRole::Student).await;

    let (class_id, code) = create_class!(app, teacher, "Algebra");
    enroll!(app, teacher, member, code, "approved");

    let (status, body) = send!(
        app,
        "POST",
        format!("/api/v1/classes/{class_id}/assignments"),
        Some(teacher.token.as_str()),
        Some(json!({ "title": "Homework 1", "max_points": 100.0 })),
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let assignment_id = body["data"]["id"].as_i64().expect("assignment id");
    let submit_uri = format!("/api/v1/assignments/{assignment_id}/submissions");

    let (status, _) = send!(
        app,
        "POST",
        submit_uri.clone(),
        Some(outsider.token.as_str()),
        Some(json!({ "content": "my answer" })),
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send!(
        app,
        "POST",
        submit_uri.clone(),
        Some(member.token.as_str()),
        Some(json!({ "content": "my answer" })),
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "submitted");
    assert_eq!(body["data"]["student_id"], member.user.id);
}

#[actix_web::test]
async fn test_rejected_enrollment_grants_no_access() {
    let storage = memory_storage().await;
    let app = init_app!(storage);
    let teacher = create_user(&storage, "teacher02", UserRole::Teacher).await;
    let student = create_user(&storage, "student02", UserRole::Student).await;

    let (class_id, code) = create_class!(app, teacher, "Biology");
    enroll!(app, teacher, student, code, "rejected");

    let (status, _) = send!(
        app,
        "GET",
        format!("/api/v1/classes/{class_id}"),
        Some(student.token.as_str()),
        None,
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send!(
        app,
        "GET",
        format!("/api/v1/classes/{class_id}/materials"),
        Some(student.token.as_str()),
        None,
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send!(app, "GET", "/api/v1/classes", Some(student.token.as_str()), None);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn test_exam_attempt_cannot_be_submitted_twice() {
    let storage = memory_storage().await;
    let app = init_app!(storage);
    let teacher = create_user(&storage, "teacher03", UserRole::Teacher).await;
    let student = create_user(&storage, "student03", UserRole::Student).await;

    let (class_id, code) = create_class!(app, teacher, "Physics");
    enroll!(app, teacher, student, code, "approved");

    let (status, body) = send!(
        app,
        "POST",
        format!("/api/v1/classes/{class_id}/exams"),
        Some(teacher.token.as_str()),
        Some(json!({ "title": "Quiz 1", "duration_minutes": 30 })),
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let exam_id = body["data"]["id"].as_i64().expect("exam id");

    // 没有题目时不能发布
    let (status, _) = send!(
        app,
        "PUT",
        format!("/api/v1/exams/{exam_id}"),
        Some(teacher.token.as_str()),
        Some(json!({ "is_published": true })),
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send!(
        app,
        "POST",
        format!("/api/v1/exams/{exam_id}/questions"),
        Some(teacher.token.as_str()),
        Some(json!({
            "question_type": "true_false",
            "prompt": "Light travels faster than sound",
            "correct_answer": "true",
            "marks": 2.0
        })),
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let question_id = body["data"]["id"].as_i64().expect("question id");

    let (status, _) = send!(
        app,
        "PUT",
        format!("/api/v1/exams/{exam_id}"),
        Some(teacher.token.as_str()),
        Some(json!({ "is_published": true })),
    );
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send!(
        app,
        "POST",
        format!("/api/v1/exams/{exam_id}/attempts"),
        Some(student.token.as_str()),
        None,
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "in_progress");
    let attempt_id = body["data"]["id"].as_i64().expect("attempt id");

    let (status, body) = send!(
        app,
        "PUT",
        format!("/api/v1/attempts/{attempt_id}/answers"),
        Some(student.token.as_str()),
        Some(json!({ "answers": [{ "question_id": question_id, "answer": "True" }] })),
    );
    assert_eq!(status, StatusCode::OK, "{body}");

    let submit_uri = format!("/api/v1/attempts/{attempt_id}/submit");
    let (status, body) = send!(app, "POST", submit_uri.clone(), Some(student.token.as_str()), None);
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "graded");
    assert_eq!(body["data"]["score"].as_f64(), Some(2.0));

    let (status, _) = send!(app, "POST", submit_uri.clone(), Some(student.token.as_str()), None);
    assert_eq!(status, StatusCode::CONFLICT);

    // 已提交后不能再开始新的作答
    let (status, _) = send!(
        app,
        "POST",
        format!("/api/v1/exams/{exam_id}/attempts"),
        Some(student.token.as_str()),
        None,
    );
    assert_eq!(status, StatusCode::CONFLICT);
}

/// 统计某用户收到的公告通知
macro_rules! announcement_notices {
    ($app:expr, $user:expr) => {{
        let (status, body) = send!(
            $app,
            "GET",
            "/api/v1/notifications",
            Some($user.token.as_str()),
            None
        );
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter(|n| n["kind"] == "announcement")
                    .count()
            })
            .unwrap_or(0)
    }};
}

#[actix_web::test]
async fn test_late_submission_rules() {
    let storage = memory_storage().await;
    let app = init_app!(storage);
    let teacher = create_user(&storage, "teacher04", UserRole::Teacher).await;
    let student = create_user(&storage, "student04", UserRole::Student).await;

    let (class_id, code) = create_class!(app, teacher, "Geography");
    enroll!(app, teacher, student, code, "approved");

    // 截止时间已过的作业只能直接写库构造
    let past_due = chrono::Utc::now() - chrono::Duration::days(1);
    let mut assignment_ids = Vec::new();
    for allow_late in [false, true] {
        let assignment = storage
            .create_assignment(NewAssignment {
                class_id,
                created_by: teacher.user.id,
                title: format!("Map study (late: {allow_late})"),
                description: None,
                due_date: Some(past_due),
                max_points: 20.0,
                allow_late,
            })
            .await
            .expect("创建作业失败");
        assignment_ids.push(assignment.id);
    }

    let (status, _) = send!(
        app,
        "POST",
        format!("/api/v1/assignments/{}/submissions", assignment_ids[0]),
        Some(student.token.as_str()),
        Some(json!({ "content": "rivers and mountains" })),
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send!(
        app,
        "POST",
        format!("/api/v1/assignments/{}/submissions", assignment_ids[1]),
        Some(student.token.as_str()),
        Some(json!({ "content": "rivers and mountains" })),
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "late");
}

#[actix_web::test]
async fn test_graded_submission_cannot_be_resubmitted() {
    let storage = memory_storage().await;
    let app = init_app!(storage);
    let teacher = create_user(&storage, "teacher05", UserRole::Teacher).await;
    let student = create_user(&storage, "student05", UserRole::Student).await;

    let (class_id, code) = create_class!(app, teacher, "Literature");
    enroll!(app, teacher, student, code, "approved");

    let (status, body) = send!(
        app,
        "POST",
        format!("/api/v1/classes/{class_id}/assignments"),
        Some(teacher.token.as_str()),
        Some(json!({ "title": "Poem analysis", "max_points": 50.0 })),
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let assignment_id = body["data"]["id"].as_i64().expect("assignment id");
    let submit_uri = format!("/api/v1/assignments/{assignment_id}/submissions");

    let (status, body) = send!(
        app,
        "POST",
        submit_uri.clone(),
        Some(student.token.as_str()),
        Some(json!({ "content": "first draft" })),
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    let submission_id = body["data"]["id"].as_i64().expect("submission id");

    // 超出满分的分数被拒绝
    let grade_uri = format!("/api/v1/submissions/{submission_id}/grade");
    let (status, _) = send!(
        app,
        "PUT",
        grade_uri.clone(),
        Some(teacher.token.as_str()),
        Some(json!({ "score": 51.0 })),
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send!(
        app,
        "PUT",
        grade_uri.clone(),
        Some(teacher.token.as_str()),
        Some(json!({ "score": 42.0, "feedback": "good imagery" })),
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "graded");

    let (status, _) = send!(
        app,
        "POST",
        submit_uri.clone(),
        Some(student.token.as_str()),
        Some(json!({ "content": "second draft" })),
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send!(
        app,
        "GET",
        format!("/api/v1/assignments/{assignment_id}/submissions/mine"),
        Some(student.token.as_str()),
        None,
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["content"], "first draft");
    assert_eq!(body["data"]["score"].as_f64(), Some(42.0));
}

#[actix_web::test]
async fn test_essay_attempt_is_graded_by_teacher() {
    let storage = memory_storage().await;
    let app = init_app!(storage);
    let teacher = create_user(&storage, "teacher06", UserRole::Teacher).await;
    let student = create_user(&storage, "student06", UserRole::Student).await;

    let (class_id, code) = create_class!(app, teacher, "Philosophy");
    enroll!(app, teacher, student, code, "approved");

    let (status, body) = send!(
        app,
        "POST",
        format!("/api/v1/classes/{class_id}/exams"),
        Some(teacher.token.as_str()),
        Some(json!({ "title": "Midterm essay" })),
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let exam_id = body["data"]["id"].as_i64().expect("exam id");

    let (status, body) = send!(
        app,
        "POST",
        format!("/api/v1/exams/{exam_id}/questions"),
        Some(teacher.token.as_str()),
        Some(json!({
            "question_type": "essay",
            "prompt": "Discuss free will",
            "marks": 4.0
        })),
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let question_id = body["data"]["id"].as_i64().expect("question id");

    let (status, _) = send!(
        app,
        "PUT",
        format!("/api/v1/exams/{exam_id}"),
        Some(teacher.token.as_str()),
        Some(json!({ "is_published": true })),
    );
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send!(
        app,
        "POST",
        format!("/api/v1/exams/{exam_id}/attempts"),
        Some(student.token.as_str()),
        None,
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let attempt_id = body["data"]["id"].as_i64().expect("attempt id");

    // 有人作答后题目被锁定
    let (status, _) = send!(
        app,
        "POST",
        format!("/api/v1/exams/{exam_id}/questions"),
        Some(teacher.token.as_str()),
        Some(json!({
            "question_type": "true_false",
            "prompt": "Determinism is true",
            "correct_answer": "false",
            "marks": 1.0
        })),
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let question_uri = format!("/api/v1/questions/{question_id}");
    let (status, _) = send!(
        app,
        "PUT",
        question_uri.clone(),
        Some(teacher.token.as_str()),
        Some(json!({ "marks": 10.0 })),
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send!(app, "DELETE", question_uri.clone(), Some(teacher.token.as_str()), None);
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send!(
        app,
        "PUT",
        format!("/api/v1/attempts/{attempt_id}/answers"),
        Some(student.token.as_str()),
        Some(json!({ "answers": [{ "question_id": question_id, "answer": "It is an illusion" }] })),
    );
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = send!(
        app,
        "POST",
        format!("/api/v1/attempts/{attempt_id}/submit"),
        Some(student.token.as_str()),
        None,
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "submitted");

    let grade_uri = format!("/api/v1/attempts/{attempt_id}/grade");
    let (status, _) = send!(
        app,
        "PUT",
        grade_uri.clone(),
        Some(teacher.token.as_str()),
        Some(json!({ "grades": [{ "question_id": question_id, "marks": 5.0 }] })),
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send!(
        app,
        "PUT",
        grade_uri.clone(),
        Some(teacher.token.as_str()),
        Some(json!({ "grades": [{ "question_id": question_id, "marks": 3.5 }] })),
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "graded");
    assert_eq!(body["data"]["score"].as_f64(), Some(3.5));
}

#[actix_web::test]
async fn test_announcement_reaches_approved_students_only() {
    let storage = memory_storage().await;
    let app = init_app!(storage);
    let admin = create_user(&storage, "admin07", UserRole::Admin).await;
    let teacher = create_user(&storage, "teacher07", UserRole::Teacher).await;
    let approved = create_user(&storage, "approved07", UserRole::Student).await;
    let pending = create_user(&storage, "pending07", UserRole::Student).await;

    let (class_id, code) = create_class!(app, teacher, "Music");
    enroll!(app, teacher, approved, code, "approved");
    let (status, body) = send!(
        app,
        "POST",
        "/api/v1/enrollments",
        Some(pending.token.as_str()),
        Some(json!({ "class_code": code })),
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = send!(
        app,
        "POST",
        "/api/v1/announcements",
        Some(teacher.token.as_str()),
        Some(json!({ "class_id": class_id, "title": "Concert", "content": "Friday at 5pm" })),
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");

    assert_eq!(announcement_notices!(app, approved), 1);
    assert_eq!(announcement_notices!(app, pending), 0);
    assert_eq!(announcement_notices!(app, teacher), 0);

    // 全校公告不通知作者本人
    let (status, body) = send!(
        app,
        "POST",
        "/api/v1/announcements",
        Some(admin.token.as_str()),
        Some(json!({ "title": "Holiday", "content": "School closed on Monday" })),
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");

    assert_eq!(announcement_notices!(app, admin), 0);
    assert_eq!(announcement_notices!(app, teacher), 1);
    assert_eq!(announcement_notices!(app, approved), 2);
}

#[actix_web::test]
async fn test_register_is_rate_limited() {
    let storage = memory_storage().await;
    let app = init_app!(storage);

    // 固定窗口可能恰好跨过边界，多发几次保证命中限制
    let mut limited = None;
    for attempt in 0..8 {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .insert_header(("X-Forwarded-For", "203.0.113.7"))
            .set_json(json!({
                "username": format!("flood{attempt}"),
                "email": format!("flood{attempt}@school.test"),
                "password": "Passw0rd!",
                "role": "student"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            limited = Some(resp);
            break;
        }
    }

    let resp = limited.expect("注册请求没有被限流");
    let retry_after = resp
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .expect("缺少 Retry-After");
    assert!((1..=60).contains(&retry_after));
    assert_eq!(
        resp.headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok()),
        Some("0")
    );
}
