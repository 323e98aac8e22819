use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

use super::entities::QuestionType;
use crate::models::common::PaginationQuery;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct CreateExamRequest {
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shuffle_questions: bool,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct UpdateExamRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub shuffle_questions: Option<bool>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct CreateQuestionRequest {
    pub question_type: QuestionType,
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: Option<String>,
    pub marks: f64,
    pub position: Option<i32>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct UpdateQuestionRequest {
    pub question_type: Option<QuestionType>,
    pub prompt: Option<String>,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<String>,
    pub marks: Option<f64>,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct AnswerInput {
    pub question_id: i64,
    pub answer: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct SaveAnswersRequest {
    pub answers: Vec<AnswerInput>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct AnswerGrade {
    pub question_id: i64,
    pub marks: f64,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct GradeAttemptRequest {
    pub grades: Vec<AnswerGrade>,
}

#[derive(Debug, Clone)]
pub struct NewExam {
    pub class_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub shuffle_questions: bool,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub exam_id: i64,
    pub question_type: QuestionType,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: Option<String>,
    pub marks: f64,
    pub position: i32,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct ExamListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
}
