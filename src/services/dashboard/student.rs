use actix_web::HttpResponse;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::RECENT_LIMIT;
use crate::models::PaginationQuery;
use crate::models::announcements::AnnouncementScope;
use crate::models::attendance::AttendanceStatus;
use crate::models::dashboard::StudentDashboard;
use crate::models::exams::Exam;
use crate::models::submissions::SubmissionStatus;
use crate::models::users::entities::User;
use crate::services::responses::internal;
use crate::storage::Storage;

/// 学生当前的学习概况，首页和助手回复共用
#[derive(Debug, Default)]
pub struct StudentSnapshot {
    pub class_ids: Vec<i64>,
    pub pending_assignments: Vec<String>,
    /// 已发布、尚未作答且未结束的考试
    pub upcoming_exams: Vec<Exam>,
    pub unread_notifications: u64,
    pub attendance_rate: Option<f64>,
    pub graded_count: usize,
    /// 已批改作业的平均得分率（百分比）
    pub average_percent: Option<f64>,
}

pub async fn student_snapshot(
    storage: &Arc<dyn Storage>,
    student: &User,
) -> Result<StudentSnapshot, HttpResponse> {
    let now = Utc::now();

    let class_ids = storage
        .list_approved_class_ids(student.id)
        .await
        .map_err(internal("Failed to load classes"))?;

    let assignments = storage
        .list_assignments_for_classes(&class_ids)
        .await
        .map_err(internal("Failed to load assignments"))?;
    let assignment_ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();
    let submissions = storage
        .list_student_submissions(student.id, &assignment_ids)
        .await
        .map_err(internal("Failed to load submissions"))?;

    let submitted: HashSet<i64> = submissions.iter().map(|s| s.assignment_id).collect();
    let pending_assignments = assignments
        .iter()
        .filter(|a| !submitted.contains(&a.id) && (a.allow_late || !a.is_past_due(now)))
        .map(|a| a.title.clone())
        .collect();

    let max_points: HashMap<i64, f64> = assignments.iter().map(|a| (a.id, a.max_points)).collect();
    let percents: Vec<f64> = submissions
        .iter()
        .filter(|s| s.status == SubmissionStatus::Graded)
        .filter_map(|s| {
            let max = *max_points.get(&s.assignment_id)?;
            Some(s.score? / max * 100.0)
        })
        .collect();
    let average_percent =
        (!percents.is_empty()).then(|| percents.iter().sum::<f64>() / percents.len() as f64);

    let exams = storage
        .list_exams_for_classes(&class_ids, true)
        .await
        .map_err(internal("Failed to load exams"))?;
    let exam_ids: Vec<i64> = exams.iter().map(|e| e.id).collect();
    let attempted: HashSet<i64> = storage
        .list_student_attempts(student.id, &exam_ids)
        .await
        .map_err(internal("Failed to load attempts"))?
        .into_iter()
        .map(|a| a.exam_id)
        .collect();
    let mut upcoming_exams: Vec<Exam> = exams
        .into_iter()
        .filter(|e| !attempted.contains(&e.id) && e.ends_at.is_none_or(|end| end >= now))
        .collect();
    upcoming_exams.sort_by_key(|e| (e.starts_at, e.id));

    let unread_notifications = storage
        .count_unread_notifications(student.id)
        .await
        .map_err(internal("Failed to count notifications"))?;

    let records = storage
        .list_student_attendance(student.id)
        .await
        .map_err(internal("Failed to load attendance"))?;
    let attendance_rate = attendance_rate(records.iter().map(|(_, status)| *status));

    Ok(StudentSnapshot {
        class_ids,
        pending_assignments,
        upcoming_exams,
        unread_notifications,
        attendance_rate,
        graded_count: percents.len(),
        average_percent,
    })
}

/// 出勤率：到课和迟到计为出勤
pub fn attendance_rate(statuses: impl Iterator<Item = AttendanceStatus>) -> Option<f64> {
    let (mut attended, mut total) = (0u32, 0u32);
    for status in statuses {
        total += 1;
        if matches!(status, AttendanceStatus::Present | AttendanceStatus::Late) {
            attended += 1;
        }
    }
    (total > 0).then(|| f64::from(attended) / f64::from(total))
}

pub async fn student_dashboard(
    storage: &Arc<dyn Storage>,
    student: &User,
) -> Result<StudentDashboard, HttpResponse> {
    let snapshot = student_snapshot(storage, student).await?;

    let recent_announcements = storage
        .list_announcements(
            AnnouncementScope::Classes(snapshot.class_ids.clone()),
            None,
            PaginationQuery::new(1, RECENT_LIMIT as i64),
        )
        .await
        .map_err(internal("Failed to load announcements"))?
        .items;

    Ok(StudentDashboard {
        class_count: snapshot.class_ids.len() as i64,
        pending_assignments: snapshot.pending_assignments.len() as i64,
        upcoming_exams: snapshot.upcoming_exams,
        unread_notifications: snapshot.unread_notifications as i64,
        attendance_rate: snapshot.attendance_rate,
        recent_announcements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_rate_counts_late_as_attended() {
        use AttendanceStatus::*;
        assert_eq!(attendance_rate(std::iter::empty()), None);
        assert_eq!(
            attendance_rate([Present, Late, Absent, Excused].into_iter()),
            Some(0.5)
        );
    }
}
