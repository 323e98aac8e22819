//! 考题实体，选项以 JSON 数组文本保存

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exam_questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exam_id: i64,
    pub question_type: String,
    pub prompt: String,
    pub options: Option<String>,
    pub correct_answer: Option<String>,
    pub marks: f64,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exams::Entity",
        from = "Column::ExamId",
        to = "super::exams::Column::Id"
    )]
    Exam,
}

impl Related<super::exams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_question(self) -> crate::models::exams::Question {
        use crate::models::exams::{Question, QuestionType};

        Question {
            id: self.id,
            exam_id: self.exam_id,
            question_type: self.question_type.parse().unwrap_or(QuestionType::Essay),
            prompt: self.prompt,
            options: self
                .options
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or_default(),
            correct_answer: self.correct_answer,
            marks: self.marks,
            position: self.position,
        }
    }
}
