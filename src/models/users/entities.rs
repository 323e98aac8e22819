use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::string_enum;

string_enum! {
    /// 用户角色
    #[ts(export, export_to = "user.ts")]
    pub enum UserRole {
        Student => "student",
        Teacher => "teacher",
        Admin => "admin",
    }
}

impl UserRole {
    pub fn admin_roles() -> &'static [UserRole] {
        &[UserRole::Admin]
    }

    pub fn teacher_roles() -> &'static [UserRole] {
        &[UserRole::Teacher, UserRole::Admin]
    }

    pub fn student_roles() -> &'static [UserRole] {
        &[UserRole::Student]
    }

    pub fn all_roles() -> &'static [UserRole] {
        UserRole::ALL
    }
}

string_enum! {
    /// 用户状态，只有 active 可以登录
    #[ts(export, export_to = "user.ts")]
    pub enum UserStatus {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// 仅学生使用
    pub grade_level: Option<String>,
    /// 仅教师使用
    pub department: Option<String>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
        }
    }

    /// 展示用名称，没有昵称时回退到用户名
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// 嵌入到其它列表中的用户简要信息
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("teacher".parse::<UserRole>().unwrap(), UserRole::Teacher);
        assert!("user".parse::<UserRole>().is_err());
        assert!(UserRole::teacher_roles().contains(&UserRole::Admin));
        assert!(!UserRole::teacher_roles().contains(&UserRole::Student));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let now = chrono::Utc::now();
        let user = User {
            id: 1,
            username: "alice".into(),
            email: "alice@school.edu".into(),
            password_hash: "secret".into(),
            role: UserRole::Student,
            status: UserStatus::Active,
            display_name: None,
            avatar_url: None,
            grade_level: Some("10".into()),
            department: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "student");
        assert_eq!(user.name(), "alice");
    }
}
