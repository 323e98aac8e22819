use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::{PaginationQuery, deserialize_optional_i64};

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct ClassListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub teacher_id: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct CreateClassRequest {
    pub name: String,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub room: Option<String>,
    pub schedule: Option<String>,
    pub capacity: Option<i32>,
    /// 管理员创建时必须指定
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub room: Option<String>,
    pub schedule: Option<String>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewClass {
    pub teacher_id: i64,
    pub name: String,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub room: Option<String>,
    pub schedule: Option<String>,
    pub capacity: Option<i32>,
    pub class_code: String,
}

/// 存储层班级查询
#[derive(Debug, Clone, Default)]
pub struct ClassListQuery {
    pub pagination: PaginationQuery,
    pub teacher_id: Option<i64>,
    /// 只返回该学生已批准加入的班级
    pub student_id: Option<i64>,
    pub search: Option<String>,
}
