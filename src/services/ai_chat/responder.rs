//! 基于关键词的助手回复
//!
//! 消息先转小写并按非字母数字切词，再按固定优先级匹配意图，
//! 回复模板用调用者的实时数据填充。

use crate::models::ai_chat::{AiChatResponse, ChatIntent};
use crate::models::users::entities::UserRole;

/// 意图按顺序匹配，具体话题优先于寒暄
const INTENT_KEYWORDS: &[(ChatIntent, &[&str])] = &[
    (
        ChatIntent::Assignments,
        &["assignment", "assignments", "homework", "due", "deadline", "deadlines", "task", "tasks"],
    ),
    (
        ChatIntent::Exams,
        &["exam", "exams", "test", "tests", "quiz", "quizzes", "midterm", "final"],
    ),
    (
        ChatIntent::Grades,
        &["grade", "grades", "score", "scores", "marks", "result", "results", "gpa"],
    ),
    (
        ChatIntent::Attendance,
        &["attendance", "absent", "absence", "absences", "present", "late"],
    ),
    (
        ChatIntent::Schedule,
        &["schedule", "timetable", "calendar", "event", "events", "today", "tomorrow", "week"],
    ),
    (
        ChatIntent::Materials,
        &["material", "materials", "notes", "resources", "slides", "reading", "video", "videos"],
    ),
    (ChatIntent::Help, &["help", "support", "guide", "commands", "assist"]),
    (ChatIntent::Thanks, &["thanks", "thank", "thx", "ty", "appreciate", "cheers"]),
    (
        ChatIntent::Greeting,
        &["hi", "hello", "hey", "morning", "afternoon", "evening", "greetings", "yo"],
    ),
];

pub fn normalize_message(message: &str) -> Vec<String> {
    message
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn detect_intent(message: &str) -> ChatIntent {
    let words = normalize_message(message);
    INTENT_KEYWORDS
        .iter()
        .find(|(_, keywords)| words.iter().any(|w| keywords.contains(&w.as_str())))
        .map(|(intent, _)| *intent)
        .unwrap_or(ChatIntent::Unknown)
}

/// 填充回复模板所需的用户数据
#[derive(Debug, Default)]
pub struct ReplyContext {
    pub name: String,
    pub role: Option<UserRole>,
    pub pending_assignments: Vec<String>,
    pub upcoming_exams: Vec<String>,
    pub unread_notifications: u64,
    pub attendance_rate: Option<f64>,
    pub graded_count: usize,
    pub average_percent: Option<f64>,
    pub upcoming_events: Vec<String>,
    pub submissions_to_grade: u64,
    pub attempts_to_grade: u64,
}

impl ReplyContext {
    fn is_student(&self) -> bool {
        self.role == Some(UserRole::Student)
    }
}

fn list_preview(items: &[String]) -> String {
    const PREVIEW: usize = 3;
    let mut text = items
        .iter()
        .take(PREVIEW)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if items.len() > PREVIEW {
        text.push_str(&format!(" and {} more", items.len() - PREVIEW));
    }
    text
}

fn default_suggestions() -> Vec<String> {
    [
        "What assignments are due?",
        "Do I have any exams coming up?",
        "How is my attendance?",
        "What's on my schedule?",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

pub fn compose_reply(assistant: &str, intent: ChatIntent, ctx: &ReplyContext) -> AiChatResponse {
    let reply = match intent {
        ChatIntent::Greeting => {
            let mut reply = format!("Hi {}! I'm {assistant}, your study assistant.", ctx.name);
            if ctx.unread_notifications > 0 {
                reply.push_str(&format!(
                    " You have {} unread notification(s).",
                    ctx.unread_notifications
                ));
            }
            reply.push_str(" How can I help you today?");
            reply
        }
        ChatIntent::Assignments | ChatIntent::Grades if !ctx.is_student() => format!(
            "There are {} submission(s) and {} exam attempt(s) waiting for grading.",
            ctx.submissions_to_grade, ctx.attempts_to_grade
        ),
        ChatIntent::Assignments => {
            if ctx.pending_assignments.is_empty() {
                "You're all caught up, there are no pending assignments.".to_string()
            } else {
                format!(
                    "You have {} pending assignment(s): {}.",
                    ctx.pending_assignments.len(),
                    list_preview(&ctx.pending_assignments)
                )
            }
        }
        ChatIntent::Exams if !ctx.is_student() => format!(
            "{} exam attempt(s) are waiting for your grading.",
            ctx.attempts_to_grade
        ),
        ChatIntent::Exams => {
            if ctx.upcoming_exams.is_empty() {
                "You have no upcoming exams right now.".to_string()
            } else {
                format!(
                    "You have {} upcoming exam(s): {}. Good luck!",
                    ctx.upcoming_exams.len(),
                    list_preview(&ctx.upcoming_exams)
                )
            }
        }
        ChatIntent::Grades => match ctx.average_percent {
            Some(average) => format!(
                "You have {} graded assignment(s) with an average of {:.1}%.",
                ctx.graded_count, average
            ),
            None => "None of your assignments have been graded yet.".to_string(),
        },
        ChatIntent::Attendance => match ctx.attendance_rate {
            Some(rate) => format!("Your attendance rate is {:.1}%.", rate * 100.0),
            None if ctx.is_student() => "No attendance has been recorded for you yet.".to_string(),
            None => "Attendance rates are tracked for students. Open a class to record attendance."
                .to_string(),
        },
        ChatIntent::Schedule => {
            if ctx.upcoming_events.is_empty() {
                "Nothing is scheduled for the next 7 days.".to_string()
            } else {
                format!(
                    "Coming up in the next 7 days: {}.",
                    list_preview(&ctx.upcoming_events)
                )
            }
        }
        ChatIntent::Materials => {
            "Learning materials are listed on each class page under Materials.".to_string()
        }
        ChatIntent::Help => format!(
            "I'm {assistant}. Ask me about assignments, exams, grades, attendance, your schedule or class materials."
        ),
        ChatIntent::Thanks => "You're welcome! Anything else I can help with?".to_string(),
        ChatIntent::Unknown => {
            "Sorry, I didn't quite get that. Try one of the suggestions below.".to_string()
        }
    };

    let suggestions = match intent {
        ChatIntent::Unknown | ChatIntent::Help | ChatIntent::Greeting => default_suggestions(),
        _ => Vec::new(),
    };

    AiChatResponse {
        intent,
        reply,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student_context() -> ReplyContext {
        ReplyContext {
            name: "Alice".to_string(),
            role: Some(UserRole::Student),
            pending_assignments: vec!["Essay".into(), "Lab".into(), "Quiz prep".into(), "Poem".into()],
            unread_notifications: 2,
            attendance_rate: Some(0.875),
            ..Default::default()
        }
    }

    #[test]
    fn test_detect_intent_by_keyword() {
        assert_eq!(detect_intent("Hello there!"), ChatIntent::Greeting);
        assert_eq!(detect_intent("what HOMEWORK is due?"), ChatIntent::Assignments);
        assert_eq!(detect_intent("hi, any exams soon?"), ChatIntent::Exams);
        assert_eq!(detect_intent("my grades please"), ChatIntent::Grades);
        assert_eq!(detect_intent("Thanks a lot"), ChatIntent::Thanks);
        assert_eq!(detect_intent("purple elephants"), ChatIntent::Unknown);
        // 按整词匹配
        assert_eq!(detect_intent("history"), ChatIntent::Unknown);
    }

    #[test]
    fn test_reply_uses_context() {
        let ctx = student_context();
        let reply = compose_reply("EduBot", ChatIntent::Assignments, &ctx);
        assert!(reply.reply.contains("4 pending assignment(s)"));
        assert!(reply.reply.contains("and 1 more"));

        let reply = compose_reply("EduBot", ChatIntent::Attendance, &ctx);
        assert_eq!(reply.reply, "Your attendance rate is 87.5%.");

        let reply = compose_reply("EduBot", ChatIntent::Greeting, &ctx);
        assert!(reply.reply.contains("EduBot"));
        assert!(reply.reply.contains("2 unread"));
    }

    #[test]
    fn test_teacher_and_fallback_replies() {
        let ctx = ReplyContext {
            name: "Mr. Lee".into(),
            role: Some(UserRole::Teacher),
            submissions_to_grade: 3,
            attempts_to_grade: 1,
            ..Default::default()
        };
        let reply = compose_reply("EduBot", ChatIntent::Assignments, &ctx);
        assert!(reply.reply.contains("3 submission(s)"));

        let fallback = compose_reply("EduBot", ChatIntent::Unknown, &ctx);
        assert!(!fallback.suggestions.is_empty());
        assert_eq!(fallback.intent, ChatIntent::Unknown);
    }
}
