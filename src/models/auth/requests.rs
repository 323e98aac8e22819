use serde::Deserialize;
use ts_rs::TS;

use crate::models::users::entities::UserRole;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct LoginRequest {
    /// 用户名或邮箱
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// 只能是 student 或 teacher，默认 student
    pub role: Option<UserRole>,
    pub display_name: Option<String>,
    pub grade_level: Option<String>,
    pub department: Option<String>,
}

// 当前用户更新资料
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub grade_level: Option<String>,
    pub department: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}
