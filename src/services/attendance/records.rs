use actix_web::{HttpRequest, HttpResponse};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::info;

use super::AttendanceService;
use super::sessions::managed_session;
use crate::models::ErrorCode;
use crate::models::attendance::{
    AttendanceRecordWithStudent, AttendanceSession, AttendanceSessionDetail, AttendanceSummary,
    MarkAttendanceRequest, RecordInput,
};
use crate::services::access::{current_user, require_student, user_summaries};
use crate::services::responses::{ServiceResult, bad_request, internal, ok};
use crate::storage::Storage;
use crate::utils::validate::validate_text;

/// 只能给已批准的学生记考勤，同一学生不能重复出现
pub(super) async fn validate_records(
    storage: &Arc<dyn Storage>,
    class_id: i64,
    records: &[RecordInput],
) -> Result<(), HttpResponse> {
    if records.is_empty() {
        return Ok(());
    }

    let approved: HashSet<i64> = storage
        .list_approved_student_ids(class_id)
        .await
        .map_err(internal("Failed to load students"))?
        .into_iter()
        .collect();

    let mut seen = HashSet::new();
    for record in records {
        if !approved.contains(&record.student_id) {
            return Err(bad_request(
                ErrorCode::BadRequest,
                format!("Student {} is not enrolled in this class", record.student_id),
            ));
        }
        if !seen.insert(record.student_id) {
            return Err(bad_request(
                ErrorCode::BadRequest,
                format!("Student {} appears more than once", record.student_id),
            ));
        }
        if let Some(note) = &record.note {
            validate_text("Note", note, 0, 500)
                .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
        }
    }
    Ok(())
}

pub(super) async fn write_records(
    storage: &Arc<dyn Storage>,
    session_id: i64,
    records: &[RecordInput],
) -> Result<(), HttpResponse> {
    storage
        .upsert_attendance_records(session_id, records)
        .await
        .map_err(internal("Failed to save attendance records"))?;
    Ok(())
}

pub(super) async fn session_detail(
    storage: &Arc<dyn Storage>,
    session: AttendanceSession,
) -> Result<AttendanceSessionDetail, HttpResponse> {
    let records = storage
        .list_session_records(session.id)
        .await
        .map_err(internal("Failed to load attendance records"))?;
    let students = user_summaries(storage, records.iter().map(|r| r.student_id)).await?;

    let records = records
        .into_iter()
        .map(|record| AttendanceRecordWithStudent {
            student: students.get(&record.student_id).cloned(),
            record,
        })
        .collect();

    Ok(AttendanceSessionDetail { session, records })
}

pub async fn mark_records(
    service: &AttendanceService,
    request: &HttpRequest,
    session_id: i64,
    records: MarkAttendanceRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let session = managed_session(&storage, &user, session_id).await?;
    if records.records.is_empty() {
        return Err(bad_request(ErrorCode::BadRequest, "No records provided"));
    }
    validate_records(&storage, session.class_id, &records.records).await?;
    write_records(&storage, session.id, &records.records).await?;

    info!(
        "{} attendance records saved for session {} by {}",
        records.records.len(),
        session.id,
        user.username
    );
    let detail = session_detail(&storage, session).await?;
    ok(detail, "Attendance recorded successfully")
}

/// 学生按班级汇总自己的出勤
pub async fn my_summary(service: &AttendanceService, request: &HttpRequest) -> ServiceResult {
    let student = current_user(request)?;
    require_student(&student)?;
    let storage = service.get_storage(request)?;

    let class_ids = storage
        .list_approved_class_ids(student.id)
        .await
        .map_err(internal("Failed to load classes"))?;
    let records = storage
        .list_student_attendance(student.id)
        .await
        .map_err(internal("Failed to load attendance"))?;

    let mut all_ids: Vec<i64> = class_ids;
    all_ids.extend(records.iter().map(|(class_id, _)| *class_id));
    all_ids.sort_unstable();
    all_ids.dedup();

    let classes = storage
        .get_classes_by_ids(&all_ids)
        .await
        .map_err(internal("Failed to load classes"))?;

    let mut summaries: BTreeMap<i64, AttendanceSummary> = classes
        .into_iter()
        .map(|class| (class.id, AttendanceSummary::new(class.id, class.name)))
        .collect();
    for (class_id, status) in records {
        if let Some(summary) = summaries.get_mut(&class_id) {
            summary.add(status);
        }
    }

    ok(
        summaries.into_values().collect::<Vec<_>>(),
        "Attendance summary retrieved successfully",
    )
}
