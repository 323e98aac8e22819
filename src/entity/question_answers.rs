//! 作答答案实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "question_answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    pub answer: String,
    pub is_correct: Option<bool>,
    pub marks_awarded: Option<f64>,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exam_attempts::Entity",
        from = "Column::AttemptId",
        to = "super::exam_attempts::Column::Id"
    )]
    Attempt,
}

impl Related<super::exam_attempts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attempt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_answer(self) -> crate::models::exams::QuestionAnswer {
        crate::models::exams::QuestionAnswer {
            id: self.id,
            attempt_id: self.attempt_id,
            question_id: self.question_id,
            answer: self.answer,
            is_correct: self.is_correct,
            marks_awarded: self.marks_awarded,
            updated_at: super::to_datetime(self.updated_at),
        }
    }
}
