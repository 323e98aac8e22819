use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::{PaginationQuery, string_enum};
use crate::models::users::entities::UserSummary;

string_enum! {
    /// 选课状态，只有 approved 授予班级访问权
    #[ts(export, export_to = "enrollment.ts")]
    pub enum EnrollmentStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct Enrollment {
    pub id: i64,
    pub class_id: i64,
    pub student_id: i64,
    pub status: EnrollmentStatus,
    pub message: Option<String>,
    pub requested_at: chrono::DateTime<chrono::Utc>,
    pub decided_at: Option<chrono::DateTime<chrono::Utc>>,
    pub decided_by: Option<i64>,
}

/// 教师查看的选课记录，附带学生信息
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollmentWithStudent {
    #[serde(flatten)]
    #[ts(flatten)]
    pub enrollment: Enrollment,
    pub student: Option<UserSummary>,
}

/// 学生查看自己的选课记录，附带班级名称
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct MyEnrollment {
    #[serde(flatten)]
    #[ts(flatten)]
    pub enrollment: Enrollment,
    pub class_name: String,
    pub subject: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct JoinClassRequest {
    pub class_code: String,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct DecideEnrollmentRequest {
    /// approved 或 rejected
    pub status: EnrollmentStatus,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollmentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<EnrollmentStatus>,
}
