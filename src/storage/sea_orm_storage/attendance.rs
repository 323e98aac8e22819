//! 考勤存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::attendance_records::{
    ActiveModel as RecordActiveModel, Column as RecordColumn, Entity as AttendanceRecords,
    Model as RecordModel,
};
use crate::entity::attendance_sessions::{
    ActiveModel, Column, Entity as AttendanceSessions, Model,
};
use crate::errors::Result;
use crate::models::{
    PaginatedResponse, PaginationQuery,
    attendance::{AttendanceRecord, AttendanceSession, AttendanceStatus, RecordInput},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;

impl SeaOrmStorage {
    /// 同一班级同一日期只能有一次考勤
    pub async fn create_attendance_session_impl(
        &self,
        class_id: i64,
        session_date: &str,
        topic: Option<String>,
        created_by: i64,
    ) -> Result<AttendanceSession> {
        let model = ActiveModel {
            class_id: Set(class_id),
            session_date: Set(session_date.to_string()),
            topic: Set(topic),
            created_by: Set(created_by),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(db_err("创建考勤失败"))?;

        Ok(result.into_session())
    }

    pub async fn get_attendance_session_impl(&self, id: i64) -> Result<Option<AttendanceSession>> {
        let result = AttendanceSessions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询考勤失败"))?;

        Ok(result.map(Model::into_session))
    }

    pub async fn list_class_sessions_impl(
        &self,
        class_id: i64,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<AttendanceSession>> {
        let select = AttendanceSessions::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_desc(Column::SessionDate)
            .order_by_desc(Column::Id);

        self.fetch_page(select, pagination, "查询考勤列表失败", Model::into_session)
            .await
    }

    /// 批量写入考勤记录，已有学生记录会被覆盖
    pub async fn upsert_attendance_records_impl(
        &self,
        session_id: i64,
        records: &[RecordInput],
    ) -> Result<Vec<AttendanceRecord>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        for input in records {
            let existing = AttendanceRecords::find()
                .filter(RecordColumn::SessionId.eq(session_id))
                .filter(RecordColumn::StudentId.eq(input.student_id))
                .one(&txn)
                .await
                .map_err(db_err("查询考勤记录失败"))?;

            match existing {
                Some(model) => {
                    let mut active: RecordActiveModel = model.into();
                    active.status = Set(input.status.to_string());
                    active.note = Set(input.note.clone());
                    active.updated_at = Set(now);
                    active.update(&txn).await.map_err(db_err("更新考勤记录失败"))?;
                }
                None => {
                    RecordActiveModel {
                        session_id: Set(session_id),
                        student_id: Set(input.student_id),
                        status: Set(input.status.to_string()),
                        note: Set(input.note.clone()),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await
                    .map_err(db_err("写入考勤记录失败"))?;
                }
            }
        }

        txn.commit().await.map_err(db_err("提交事务失败"))?;

        self.list_session_records_impl(session_id).await
    }

    pub async fn list_session_records_impl(&self, session_id: i64) -> Result<Vec<AttendanceRecord>> {
        let result = AttendanceRecords::find()
            .filter(RecordColumn::SessionId.eq(session_id))
            .order_by_asc(RecordColumn::StudentId)
            .all(&self.db)
            .await
            .map_err(db_err("查询考勤记录失败"))?;

        Ok(result.into_iter().map(RecordModel::into_record).collect())
    }

    /// 学生所有考勤记录，附带所属班级
    pub async fn list_student_attendance_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<(i64, AttendanceStatus)>> {
        let records = AttendanceRecords::find()
            .filter(RecordColumn::StudentId.eq(student_id))
            .all(&self.db)
            .await
            .map_err(db_err("查询考勤记录失败"))?;

        if records.is_empty() {
            return Ok(Vec::new());
        }

        let session_ids: Vec<i64> = records.iter().map(|r| r.session_id).collect();
        let session_class: HashMap<i64, i64> = AttendanceSessions::find()
            .filter(Column::Id.is_in(session_ids))
            .all(&self.db)
            .await
            .map_err(db_err("查询考勤失败"))?
            .into_iter()
            .map(|s| (s.id, s.class_id))
            .collect();

        Ok(records
            .into_iter()
            .filter_map(|r| {
                let class_id = *session_class.get(&r.session_id)?;
                let record = r.into_record();
                Some((class_id, record.status))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_storage, seed_user};
    use super::*;
    use crate::errors::EduConnectError;
    use crate::models::classes::requests::NewClass;
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_attendance_records_upsert_and_summary_source() {
        let storage = memory_storage().await;
        let teacher = seed_user(&storage, "teacher1", UserRole::Teacher).await;
        let student = seed_user(&storage, "student1", UserRole::Student).await;
        let class = storage
            .create_class_impl(NewClass {
                teacher_id: teacher.id,
                name: "Art".to_string(),
                subject: None,
                description: None,
                room: None,
                schedule: None,
                capacity: None,
                class_code: "ARTS2345".to_string(),
            })
            .await
            .unwrap();

        let session = storage
            .create_attendance_session_impl(class.id, "2025-03-01", None, teacher.id)
            .await
            .unwrap();

        let duplicate = storage
            .create_attendance_session_impl(class.id, "2025-03-01", None, teacher.id)
            .await
            .unwrap_err();
        assert!(matches!(duplicate, EduConnectError::Conflict(_)));

        storage
            .upsert_attendance_records_impl(
                session.id,
                &[RecordInput {
                    student_id: student.id,
                    status: AttendanceStatus::Absent,
                    note: None,
                }],
            )
            .await
            .unwrap();
        let records = storage
            .upsert_attendance_records_impl(
                session.id,
                &[RecordInput {
                    student_id: student.id,
                    status: AttendanceStatus::Late,
                    note: Some("bus".to_string()),
                }],
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttendanceStatus::Late);

        let mine = storage.list_student_attendance_impl(student.id).await.unwrap();
        assert_eq!(mine, vec![(class.id, AttendanceStatus::Late)]);
    }
}
