use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::string_enum;
use crate::models::users::entities::UserSummary;

string_enum! {
    #[ts(export, export_to = "attendance.ts")]
    pub enum AttendanceStatus {
        Present => "present",
        Absent => "absent",
        Late => "late",
        Excused => "excused",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceSession {
    pub id: i64,
    pub class_id: i64,
    /// YYYY-MM-DD
    pub session_date: String,
    pub topic: Option<String>,
    pub created_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceRecord {
    pub id: i64,
    pub session_id: i64,
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub note: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceRecordWithStudent {
    #[serde(flatten)]
    #[ts(flatten)]
    pub record: AttendanceRecord,
    pub student: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceSessionDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub session: AttendanceSession,
    pub records: Vec<AttendanceRecordWithStudent>,
}

/// 学生在某个班级的出勤统计
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceSummary {
    pub class_id: i64,
    pub class_name: String,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub excused: i64,
    pub total: i64,
    /// (present + late) / total，没有记录时为 null
    pub rate: Option<f64>,
}

impl AttendanceSummary {
    pub fn new(class_id: i64, class_name: String) -> Self {
        Self {
            class_id,
            class_name,
            ..Default::default()
        }
    }

    pub fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::Excused => self.excused += 1,
        }
        self.total += 1;
        self.rate = Some((self.present + self.late) as f64 / self.total as f64);
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct RecordInput {
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct CreateSessionRequest {
    pub session_date: String,
    pub topic: Option<String>,
    #[serde(default)]
    pub records: Vec<RecordInput>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct MarkAttendanceRequest {
    pub records: Vec<RecordInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_rate() {
        let mut s = AttendanceSummary::new(1, "Math".into());
        assert_eq!(s.rate, None);
        s.add(AttendanceStatus::Present);
        s.add(AttendanceStatus::Late);
        s.add(AttendanceStatus::Absent);
        s.add(AttendanceStatus::Excused);
        assert_eq!(s.total, 4);
        assert_eq!(s.rate, Some(0.5));
    }
}
