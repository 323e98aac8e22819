use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::{PaginationQuery, deserialize_optional_i64, string_enum};

string_enum! {
    #[ts(export, export_to = "announcement.ts")]
    pub enum AnnouncementPriority {
        Low => "low",
        Normal => "normal",
        High => "high",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "announcement.ts")]
pub struct Announcement {
    pub id: i64,
    /// 为空表示全校公告
    pub class_id: Option<i64>,
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub priority: AnnouncementPriority,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "announcement.ts")]
pub struct CreateAnnouncementRequest {
    pub class_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub priority: Option<AnnouncementPriority>,
}

#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    pub class_id: Option<i64>,
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub priority: AnnouncementPriority,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "announcement.ts")]
pub struct AnnouncementListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub class_id: Option<i64>,
}

/// 存储层公告可见范围
#[derive(Debug, Clone)]
pub enum AnnouncementScope {
    /// 管理员可见全部
    All,
    /// 全校公告加上这些班级的公告
    Classes(Vec<i64>),
}
