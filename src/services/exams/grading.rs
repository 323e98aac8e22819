//! 题目校验与自动判分
//!
//! 答案比较前先去掉首尾空白并转成小写。选择题的答案可以是选项原文、
//! 选项字母（A、B、C…）或从 1 开始的序号，统一解析成选项下标后比较。

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

use crate::models::exams::{AnswerGrade, AnswerMark, Question, QuestionAnswer, QuestionType};

pub const MAX_OPTIONS: usize = 10;
pub const MAX_MARKS: f64 = 1000.0;

pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

fn parse_bool(answer: &str) -> Option<bool> {
    match normalize_answer(answer).as_str() {
        "true" | "t" | "yes" | "1" => Some(true),
        "false" | "f" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// 把选择题答案解析为选项下标
pub fn resolve_option(options: &[String], answer: &str) -> Option<usize> {
    let normalized = normalize_answer(answer);
    if normalized.is_empty() {
        return None;
    }

    if let Some(index) = options
        .iter()
        .position(|option| normalize_answer(option) == normalized)
    {
        return Some(index);
    }

    // 单个字母按 A=0 解析
    let mut chars = normalized.chars();
    if let (Some(letter), None) = (chars.next(), chars.next())
        && letter.is_ascii_lowercase()
    {
        let index = (letter as u8 - b'a') as usize;
        return (index < options.len()).then_some(index);
    }

    normalized
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=options.len()).contains(n))
        .map(|n| n - 1)
}

/// 客观题判分，主观题返回 None
pub fn is_correct(question: &Question, answer: &str) -> Option<bool> {
    let expected = question.correct_answer.as_deref()?;
    let correct = match question.question_type {
        QuestionType::Essay => return None,
        QuestionType::TrueFalse => match (parse_bool(answer), parse_bool(expected)) {
            (Some(given), Some(want)) => given == want,
            _ => false,
        },
        QuestionType::MultipleChoice => {
            match (
                resolve_option(&question.options, answer),
                resolve_option(&question.options, expected),
            ) {
                (Some(given), Some(want)) => given == want,
                _ => normalize_answer(answer) == normalize_answer(expected),
            }
        }
        QuestionType::ShortAnswer => {
            let given = normalize_answer(answer);
            !given.is_empty() && given == normalize_answer(expected)
        }
    };
    Some(correct)
}

/// 校验题目内容，通过时返回规范化后的标准答案
pub fn validate_question(
    question_type: QuestionType,
    prompt: &str,
    options: &[String],
    correct_answer: Option<&str>,
    marks: f64,
) -> Result<Option<String>, String> {
    let prompt_len = prompt.trim().chars().count();
    if !(1..=2000).contains(&prompt_len) {
        return Err("Prompt must be between 1 and 2000 characters".to_string());
    }
    if !marks.is_finite() || marks <= 0.0 || marks > MAX_MARKS {
        return Err(format!("Marks must be greater than 0 and at most {MAX_MARKS}"));
    }

    let answer = correct_answer
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string);

    match question_type {
        QuestionType::MultipleChoice => {
            if !(2..=MAX_OPTIONS).contains(&options.len()) {
                return Err(format!(
                    "Multiple choice questions need between 2 and {MAX_OPTIONS} options"
                ));
            }
            let mut seen = std::collections::HashSet::new();
            for option in options {
                let normalized = normalize_answer(option);
                if normalized.is_empty() {
                    return Err("Options cannot be empty".to_string());
                }
                if !seen.insert(normalized) {
                    return Err("Options must be unique".to_string());
                }
            }
            let answer = answer.ok_or("Correct answer is required")?;
            let index = resolve_option(options, &answer)
                .ok_or("Correct answer must match one of the options")?;
            Ok(Some(options[index].trim().to_string()))
        }
        QuestionType::TrueFalse => {
            let answer = answer.ok_or("Correct answer is required")?;
            let value = parse_bool(&answer).ok_or("Correct answer must be true or false")?;
            Ok(Some(value.to_string()))
        }
        QuestionType::ShortAnswer => Ok(Some(answer.ok_or("Correct answer is required")?)),
        QuestionType::Essay => Ok(None),
    }
}

/// 作答时的题目顺序
pub fn question_order<R: Rng + ?Sized>(
    questions: &[Question],
    shuffle: bool,
    rng: &mut R,
) -> Vec<i64> {
    let mut ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
    if shuffle {
        ids.shuffle(rng);
    }
    ids
}

/// 按作答记录中的顺序排列题目，之后新增的题目排在末尾
pub fn order_questions(mut questions: Vec<Question>, order: &[i64]) -> Vec<Question> {
    let rank: HashMap<i64, usize> = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    questions.sort_by_key(|q| (rank.get(&q.id).copied().unwrap_or(usize::MAX), q.position, q.id));
    questions
}

#[derive(Debug)]
pub struct AutoGrade {
    pub marks: Vec<AnswerMark>,
    pub score: f64,
    /// 全部为客观题时无需人工批改
    pub fully_graded: bool,
}

/// 交卷时自动批改客观题
pub fn auto_grade(questions: &[Question], answers: &HashMap<i64, String>) -> AutoGrade {
    let mut marks = Vec::with_capacity(questions.len());
    let mut score = 0.0;
    let mut fully_graded = true;

    for question in questions {
        let answer = answers.get(&question.id).map(String::as_str).unwrap_or("");
        match is_correct(question, answer) {
            Some(correct) => {
                let awarded = if correct { question.marks } else { 0.0 };
                score += awarded;
                marks.push(AnswerMark {
                    question_id: question.id,
                    is_correct: Some(correct),
                    marks_awarded: Some(awarded),
                });
            }
            None => {
                fully_graded = false;
                marks.push(AnswerMark {
                    question_id: question.id,
                    is_correct: None,
                    marks_awarded: None,
                });
            }
        }
    }

    AutoGrade {
        marks,
        score,
        fully_graded,
    }
}

#[derive(Debug, PartialEq)]
pub enum GradeError {
    UnknownQuestion(i64),
    AutoGraded(i64),
    OutOfRange { question_id: i64, max: f64 },
}

impl std::fmt::Display for GradeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradeError::UnknownQuestion(id) => write!(f, "Question {id} does not belong to this exam"),
            GradeError::AutoGraded(id) => write!(f, "Question {id} is graded automatically"),
            GradeError::OutOfRange { question_id, max } => {
                write!(f, "Marks for question {question_id} must be between 0 and {max}")
            }
        }
    }
}

#[derive(Debug)]
pub struct ManualGrade {
    pub marks: Vec<AnswerMark>,
    pub score: f64,
    /// 每道题都已有得分
    pub complete: bool,
}

/// 教师批改主观题，已有得分与本次评分合并后计算总分
pub fn apply_manual_grades(
    questions: &[Question],
    answers: &[QuestionAnswer],
    grades: &[AnswerGrade],
) -> Result<ManualGrade, GradeError> {
    let by_id: HashMap<i64, &Question> = questions.iter().map(|q| (q.id, q)).collect();

    let mut awarded: HashMap<i64, f64> = answers
        .iter()
        .filter_map(|a| a.marks_awarded.map(|m| (a.question_id, m)))
        .collect();

    let mut marks = Vec::with_capacity(grades.len());
    for grade in grades {
        let question = by_id
            .get(&grade.question_id)
            .ok_or(GradeError::UnknownQuestion(grade.question_id))?;
        if question.question_type.is_objective() {
            return Err(GradeError::AutoGraded(question.id));
        }
        if !grade.marks.is_finite() || grade.marks < 0.0 || grade.marks > question.marks {
            return Err(GradeError::OutOfRange {
                question_id: question.id,
                max: question.marks,
            });
        }
        awarded.insert(question.id, grade.marks);
        marks.push(AnswerMark {
            question_id: question.id,
            is_correct: None,
            marks_awarded: Some(grade.marks),
        });
    }

    let complete = questions.iter().all(|q| awarded.contains_key(&q.id));
    let score = questions
        .iter()
        .filter_map(|q| awarded.get(&q.id))
        .sum();

    Ok(ManualGrade {
        marks,
        score,
        complete,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(id: i64, question_type: QuestionType, options: &[&str], answer: Option<&str>) -> Question {
        Question {
            id,
            exam_id: 1,
            question_type,
            prompt: format!("Q{id}"),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer: answer.map(str::to_string),
            marks: 2.0,
            position: id as i32,
        }
    }

    #[test]
    fn test_multiple_choice_by_text_letter_and_number() {
        let q = question(1, QuestionType::MultipleChoice, &["Paris", "Rome", "Berlin"], Some("Rome"));
        assert_eq!(is_correct(&q, " rome "), Some(true));
        assert_eq!(is_correct(&q, "B"), Some(true));
        assert_eq!(is_correct(&q, "2"), Some(true));
        assert_eq!(is_correct(&q, "a"), Some(false));
        assert_eq!(is_correct(&q, "Z"), Some(false));
        assert_eq!(is_correct(&q, ""), Some(false));
    }

    #[test]
    fn test_true_false_and_short_answer() {
        let tf = question(1, QuestionType::TrueFalse, &[], Some("true"));
        assert_eq!(is_correct(&tf, "Yes"), Some(true));
        assert_eq!(is_correct(&tf, "false"), Some(false));
        assert_eq!(is_correct(&tf, "maybe"), Some(false));

        let short = question(2, QuestionType::ShortAnswer, &[], Some("Photosynthesis"));
        assert_eq!(is_correct(&short, "  PHOTOSYNTHESIS"), Some(true));
        assert_eq!(is_correct(&short, ""), Some(false));

        let essay = question(3, QuestionType::Essay, &[], None);
        assert_eq!(is_correct(&essay, "anything"), None);
    }

    #[test]
    fn test_validate_question() {
        let opts = vec!["Red".to_string(), "Blue".to_string()];
        assert_eq!(
            validate_question(QuestionType::MultipleChoice, "Color?", &opts, Some("b"), 1.0),
            Ok(Some("Blue".to_string()))
        );
        assert!(validate_question(QuestionType::MultipleChoice, "Color?", &opts, Some("Green"), 1.0).is_err());
        assert!(validate_question(QuestionType::MultipleChoice, "Color?", &opts[..1], Some("Red"), 1.0).is_err());

        let dup = vec!["Red".to_string(), " red".to_string()];
        assert!(validate_question(QuestionType::MultipleChoice, "Color?", &dup, Some("Red"), 1.0).is_err());

        assert_eq!(
            validate_question(QuestionType::TrueFalse, "Sky is blue", &[], Some("T"), 1.0),
            Ok(Some("true".to_string()))
        );
        assert!(validate_question(QuestionType::ShortAnswer, "Name it", &[], None, 1.0).is_err());
        assert_eq!(validate_question(QuestionType::Essay, "Discuss", &[], None, 5.0), Ok(None));
        assert!(validate_question(QuestionType::Essay, "Discuss", &[], None, 0.0).is_err());
        assert!(validate_question(QuestionType::Essay, "   ", &[], None, 1.0).is_err());
    }

    #[test]
    fn test_auto_grade_mixed_exam() {
        let questions = vec![
            question(1, QuestionType::TrueFalse, &[], Some("true")),
            question(2, QuestionType::ShortAnswer, &[], Some("mitochondria")),
            question(3, QuestionType::Essay, &[], None),
        ];
        let answers = HashMap::from([(1, "TRUE".to_string()), (2, "ribosome".to_string())]);

        let result = auto_grade(&questions, &answers);
        assert!(!result.fully_graded);
        assert_eq!(result.score, 2.0);
        assert_eq!(result.marks.len(), 3);
        assert_eq!(result.marks[1].is_correct, Some(false));
        assert_eq!(result.marks[2].marks_awarded, None);

        let objective_only = auto_grade(&questions[..2], &answers);
        assert!(objective_only.fully_graded);
    }

    #[test]
    fn test_manual_grades_complete_the_score() {
        let questions = vec![
            question(1, QuestionType::TrueFalse, &[], Some("true")),
            question(2, QuestionType::Essay, &[], None),
        ];
        let now = chrono::Utc::now();
        let answers = vec![
            QuestionAnswer {
                id: 1,
                attempt_id: 1,
                question_id: 1,
                answer: "true".into(),
                is_correct: Some(true),
                marks_awarded: Some(2.0),
                updated_at: now,
            },
            QuestionAnswer {
                id: 2,
                attempt_id: 1,
                question_id: 2,
                answer: "essay".into(),
                is_correct: None,
                marks_awarded: None,
                updated_at: now,
            },
        ];

        let partial = apply_manual_grades(&questions, &answers, &[]).unwrap();
        assert!(!partial.complete);

        let graded = apply_manual_grades(
            &questions,
            &answers,
            &[AnswerGrade {
                question_id: 2,
                marks: 1.5,
            }],
        )
        .unwrap();
        assert!(graded.complete);
        assert_eq!(graded.score, 3.5);

        let too_many = AnswerGrade {
            question_id: 2,
            marks: 3.0,
        };
        assert!(matches!(
            apply_manual_grades(&questions, &answers, &[too_many]),
            Err(GradeError::OutOfRange { question_id: 2, .. })
        ));
        let objective = AnswerGrade {
            question_id: 1,
            marks: 1.0,
        };
        assert_eq!(
            apply_manual_grades(&questions, &answers, &[objective]).unwrap_err(),
            GradeError::AutoGraded(1)
        );
    }

    #[test]
    fn test_question_order_shuffle_is_stable_per_seed() {
        let questions: Vec<Question> = (1..=8)
            .map(|id| question(id, QuestionType::Essay, &[], None))
            .collect();

        let plain = question_order(&questions, false, &mut StdRng::seed_from_u64(7));
        assert_eq!(plain, (1..=8).collect::<Vec<i64>>());

        let first = question_order(&questions, true, &mut StdRng::seed_from_u64(42));
        let second = question_order(&questions, true, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, plain);
    }

    #[test]
    fn test_order_questions_appends_new_ones() {
        let questions: Vec<Question> = (1..=3)
            .map(|id| question(id, QuestionType::Essay, &[], None))
            .collect();
        let ordered = order_questions(questions, &[3, 1]);
        let ids: Vec<i64> = ordered.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
