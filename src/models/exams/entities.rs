use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::string_enum;
use crate::models::users::entities::UserSummary;

string_enum! {
    /// 题型，前两种可自动判分
    #[ts(export, export_to = "exam.ts")]
    pub enum QuestionType {
        MultipleChoice => "multiple_choice",
        TrueFalse => "true_false",
        ShortAnswer => "short_answer",
        Essay => "essay",
    }
}

impl QuestionType {
    /// 客观题按标准答案自动判分
    pub fn is_objective(&self) -> bool {
        matches!(
            self,
            QuestionType::MultipleChoice | QuestionType::TrueFalse | QuestionType::ShortAnswer
        )
    }
}

string_enum! {
    /// in_progress -> submitted -> graded，全部客观题时直接 graded
    #[ts(export, export_to = "exam.ts")]
    pub enum AttemptStatus {
        InProgress => "in_progress",
        Submitted => "submitted",
        Graded => "graded",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct Exam {
    pub id: i64,
    pub class_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub total_marks: f64,
    pub shuffle_questions: bool,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Exam {
    /// 是否处于可作答窗口
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.is_published
            && self.starts_at.is_none_or(|start| now >= start)
            && self.ends_at.is_none_or(|end| now <= end)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct Question {
    pub id: i64,
    pub exam_id: i64,
    pub question_type: QuestionType,
    pub prompt: String,
    pub options: Vec<String>,
    /// 对学生隐藏，批改后才返回
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    pub marks: f64,
    pub position: i32,
}

impl Question {
    pub fn without_answer(mut self) -> Self {
        self.correct_answer = None;
        self
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct ExamDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub exam: Exam,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct ExamAttempt {
    pub id: i64,
    pub exam_id: i64,
    pub student_id: i64,
    pub status: AttemptStatus,
    /// 作答时的题目顺序（题目 ID）
    pub question_order: Vec<i64>,
    pub score: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub graded_at: Option<DateTime<Utc>>,
    pub graded_by: Option<i64>,
}

impl ExamAttempt {
    /// 作答截止时间：开始时间加时长，且不晚于考试结束时间
    pub fn deadline(&self, exam: &Exam) -> Option<DateTime<Utc>> {
        let by_duration = exam
            .duration_minutes
            .map(|m| self.started_at + chrono::Duration::minutes(i64::from(m)));
        match (by_duration, exam.ends_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct QuestionAnswer {
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    pub answer: String,
    pub is_correct: Option<bool>,
    pub marks_awarded: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

/// 学生查看作答详情
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct AttemptDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub attempt: ExamAttempt,
    pub deadline: Option<DateTime<Utc>>,
    pub questions: Vec<Question>,
    pub answers: Vec<QuestionAnswer>,
}

/// 教师查看的作答列表项
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct AttemptWithStudent {
    #[serde(flatten)]
    #[ts(flatten)]
    pub attempt: ExamAttempt,
    pub student: Option<UserSummary>,
}

/// 存储层一次性写入的判分结果
#[derive(Debug, Clone)]
pub struct AnswerMark {
    pub question_id: i64,
    pub is_correct: Option<bool>,
    pub marks_awarded: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exam(duration: Option<i32>, ends_at: Option<DateTime<Utc>>) -> Exam {
        let now = Utc::now();
        Exam {
            id: 1,
            class_id: 1,
            created_by: 1,
            title: "Quiz".into(),
            description: None,
            duration_minutes: duration,
            starts_at: None,
            ends_at,
            total_marks: 0.0,
            shuffle_questions: false,
            is_published: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn attempt(started_at: DateTime<Utc>) -> ExamAttempt {
        ExamAttempt {
            id: 1,
            exam_id: 1,
            student_id: 2,
            status: AttemptStatus::InProgress,
            question_order: vec![],
            score: None,
            started_at,
            submitted_at: None,
            graded_at: None,
            graded_by: None,
        }
    }

    #[test]
    fn test_deadline_uses_earliest_bound() {
        let start = Utc::now();
        let end = start + chrono::Duration::minutes(10);
        let a = attempt(start);
        assert_eq!(a.deadline(&exam(Some(30), Some(end))), Some(end));
        assert_eq!(
            a.deadline(&exam(Some(5), Some(end))),
            Some(start + chrono::Duration::minutes(5))
        );
        assert_eq!(a.deadline(&exam(None, None)), None);
    }

    #[test]
    fn test_open_window() {
        let now = Utc::now();
        let mut e = exam(None, Some(now - chrono::Duration::minutes(1)));
        assert!(!e.is_open_at(now));
        e.ends_at = None;
        assert!(e.is_open_at(now));
        e.is_published = false;
        assert!(!e.is_open_at(now));
    }

    #[test]
    fn test_objective_types() {
        assert!(QuestionType::TrueFalse.is_objective());
        assert!(!QuestionType::Essay.is_objective());
        assert_eq!(
            "multiple_choice".parse::<QuestionType>().unwrap(),
            QuestionType::MultipleChoice
        );
    }
}
