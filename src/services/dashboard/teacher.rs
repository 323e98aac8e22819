use actix_web::HttpResponse;
use std::sync::Arc;

use super::RECENT_LIMIT;
use crate::models::PaginationQuery;
use crate::models::announcements::AnnouncementScope;
use crate::models::dashboard::TeacherDashboard;
use crate::models::enrollments::EnrollmentStatus;
use crate::models::exams::AttemptStatus;
use crate::models::users::entities::User;
use crate::services::responses::internal;
use crate::storage::Storage;

pub async fn teacher_dashboard(
    storage: &Arc<dyn Storage>,
    teacher: &User,
) -> Result<TeacherDashboard, HttpResponse> {
    let class_ids = storage
        .list_teacher_class_ids(teacher.id)
        .await
        .map_err(internal("Failed to load classes"))?;

    let mut student_count = 0;
    for class_id in &class_ids {
        student_count += storage
            .count_approved_students(*class_id)
            .await
            .map_err(internal("Failed to count students"))?;
    }

    let pending_enrollments = storage
        .count_enrollments_by_status(Some(&class_ids), EnrollmentStatus::Pending)
        .await
        .map_err(internal("Failed to count enrollments"))?;
    let submissions_to_grade = storage
        .count_ungraded_submissions(&class_ids)
        .await
        .map_err(internal("Failed to count submissions"))?;
    let attempts_to_grade = storage
        .count_attempts_by_status(&class_ids, AttemptStatus::Submitted)
        .await
        .map_err(internal("Failed to count attempts"))?;

    let recent_announcements = storage
        .list_announcements(
            AnnouncementScope::Classes(class_ids.clone()),
            None,
            PaginationQuery::new(1, RECENT_LIMIT as i64),
        )
        .await
        .map_err(internal("Failed to load announcements"))?
        .items;

    Ok(TeacherDashboard {
        class_count: class_ids.len() as i64,
        student_count: student_count as i64,
        pending_enrollments: pending_enrollments as i64,
        submissions_to_grade: submissions_to_grade as i64,
        attempts_to_grade: attempts_to_grade as i64,
        recent_announcements,
    })
}
