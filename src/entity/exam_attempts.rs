//! 考试作答实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exam_attempts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exam_id: i64,
    pub student_id: i64,
    pub status: String,
    pub question_order: Option<String>,
    pub score: Option<f64>,
    pub graded_by: Option<i64>,
    pub started_at: i64,
    pub submitted_at: Option<i64>,
    pub graded_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exams::Entity",
        from = "Column::ExamId",
        to = "super::exams::Column::Id"
    )]
    Exam,
    #[sea_orm(has_many = "super::question_answers::Entity")]
    Answers,
}

impl Related<super::exams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl Related<super::question_answers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_attempt(self) -> crate::models::exams::ExamAttempt {
        use crate::models::exams::{AttemptStatus, ExamAttempt};

        ExamAttempt {
            id: self.id,
            exam_id: self.exam_id,
            student_id: self.student_id,
            status: self.status.parse().unwrap_or(AttemptStatus::InProgress),
            question_order: self
                .question_order
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or_default(),
            score: self.score,
            started_at: super::to_datetime(self.started_at),
            submitted_at: super::to_opt_datetime(self.submitted_at),
            graded_at: super::to_opt_datetime(self.graded_at),
            graded_by: self.graded_by,
        }
    }
}
