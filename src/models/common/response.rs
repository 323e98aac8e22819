use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::ErrorCode;

// 统一的 API 响应结构
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "api.ts")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: ErrorCode::Success as i32,
            message: Some(message.into()),
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: ErrorCode::Success as i32,
            message: Some(message.into()),
            data: None,
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code as i32,
            message: None,
            data: None,
            error: Some(error.into()),
            timestamp: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let body = serde_json::to_value(ApiResponse::success(vec![1, 2], "ok")).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"][1], 2);
        assert!(body.get("error").is_none());
    }

    #[test]
    fn test_error_envelope() {
        let body =
            serde_json::to_value(ApiResponse::error_empty(ErrorCode::ClassFull, "Class is full"))
                .unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], ErrorCode::ClassFull as i32);
        assert_eq!(body["error"], "Class is full");
        assert!(body.get("data").is_none());
    }
}
