use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::users::entities::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct Class {
    pub id: i64,
    pub teacher_id: i64,
    pub name: String,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub room: Option<String>,
    pub schedule: Option<String>,
    /// 为空表示不限人数
    pub capacity: Option<i32>,
    pub class_code: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Class {
    /// 已批准人数是否达到上限
    pub fn is_full(&self, approved: u64) -> bool {
        self.capacity
            .is_some_and(|cap| approved >= u64::try_from(cap.max(0)).unwrap_or(0))
    }
}

/// 班级详情，带教师和人数
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct ClassDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub class: Class,
    pub teacher: Option<UserSummary>,
    pub student_count: i64,
}

/// 通过班级码查询时返回的公开信息
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct ClassPublicInfo {
    pub id: i64,
    pub name: String,
    pub subject: Option<String>,
    pub teacher_name: Option<String>,
    pub capacity: Option<i32>,
    pub student_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_with_capacity(capacity: Option<i32>) -> Class {
        let now = chrono::Utc::now();
        Class {
            id: 1,
            teacher_id: 2,
            name: "Biology".into(),
            subject: None,
            description: None,
            room: None,
            schedule: None,
            capacity,
            class_code: "ABCD2345".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_capacity() {
        assert!(!class_with_capacity(None).is_full(1000));
        assert!(!class_with_capacity(Some(2)).is_full(1));
        assert!(class_with_capacity(Some(2)).is_full(2));
        assert!(class_with_capacity(Some(0)).is_full(0));
    }
}
