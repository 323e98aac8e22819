use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::string_enum;

pub const MAX_AI_MESSAGE_CHARS: usize = 1000;

string_enum! {
    #[ts(export, export_to = "ai_chat.ts")]
    pub enum ChatIntent {
        Greeting => "greeting",
        Assignments => "assignments",
        Exams => "exams",
        Attendance => "attendance",
        Grades => "grades",
        Schedule => "schedule",
        Materials => "materials",
        Help => "help",
        Thanks => "thanks",
        Unknown => "unknown",
    }
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "ai_chat.ts")]
pub struct AiChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "ai_chat.ts")]
pub struct AiChatResponse {
    pub intent: ChatIntent,
    pub reply: String,
    pub suggestions: Vec<String>,
}
