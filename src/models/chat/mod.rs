use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::{PaginationQuery, string_enum};

pub const MAX_MESSAGE_CHARS: usize = 2000;

string_enum! {
    #[ts(export, export_to = "chat.ts")]
    pub enum RoomType {
        Direct => "direct",
        Group => "group",
        Class => "class",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "chat.ts")]
pub struct ChatRoom {
    pub id: i64,
    pub name: Option<String>,
    pub room_type: RoomType,
    pub class_id: Option<i64>,
    pub created_by: i64,
    pub last_message_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "chat.ts")]
pub struct ChatRoomDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub room: ChatRoom,
    pub member_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "chat.ts")]
pub struct ChatMessage {
    pub id: i64,
    pub room_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "chat.ts")]
pub struct CreateRoomRequest {
    pub room_type: RoomType,
    pub name: Option<String>,
    /// direct 房间为对方 ID，group 房间为其它成员
    #[serde(default)]
    pub member_ids: Vec<i64>,
    /// class 房间必填
    pub class_id: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "chat.ts")]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewChatRoom {
    pub name: Option<String>,
    pub room_type: RoomType,
    pub class_id: Option<i64>,
    pub created_by: i64,
    pub member_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "chat.ts")]
pub struct MessageListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
}
