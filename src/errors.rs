//! 统一错误处理模块
//!
//! 错误类型由宏生成，每个变体带有稳定的错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 生成 enum 定义、`code()`、`error_type()`、`message()` 以及 snake_case 构造函数。
macro_rules! define_educonnect_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum EduConnectError {
            $($variant(String),)*
        }

        impl EduConnectError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(EduConnectError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(EduConnectError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(EduConnectError::$variant(msg) => msg,)*
                }
            }
        }

        paste::paste! {
            impl EduConnectError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        EduConnectError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_educonnect_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    Io("E006", "IO Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    DateParse("E010", "Date Parse Error"),
    Authentication("E011", "Authentication Error"),
    Authorization("E012", "Authorization Error"),
    Conflict("E013", "Conflict"),
}

impl EduConnectError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 数据库唯一约束冲突
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, EduConnectError::Conflict(_))
    }
}

impl fmt::Display for EduConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for EduConnectError {}

impl From<sea_orm::DbErr> for EduConnectError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => EduConnectError::Conflict(msg),
            _ => EduConnectError::DatabaseOperation(err.to_string()),
        }
    }
}

impl From<std::io::Error> for EduConnectError {
    fn from(err: std::io::Error) -> Self {
        EduConnectError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EduConnectError {
    fn from(err: serde_json::Error) -> Self {
        EduConnectError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for EduConnectError {
    fn from(err: chrono::ParseError) -> Self {
        EduConnectError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EduConnectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(EduConnectError::cache_connection("x").code(), "E001");
        assert_eq!(EduConnectError::database_operation("x").code(), "E005");
        assert_eq!(EduConnectError::validation("x").code(), "E007");
        assert_eq!(EduConnectError::conflict("x").code(), "E013");
    }

    #[test]
    fn test_error_types_and_message() {
        let err = EduConnectError::not_found("class 3");
        assert_eq!(err.error_type(), "Resource Not Found");
        assert_eq!(err.message(), "class 3");
        assert!(err.format_simple().contains("class 3"));
        assert_eq!(err.to_string(), "Resource Not Found: class 3");
    }

    #[test]
    fn test_unique_violation_from_db_err() {
        let err: EduConnectError = sea_orm::DbErr::Custom("boom".into()).into();
        assert_eq!(err.code(), "E005");
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn test_from_json_error() {
        let err: EduConnectError = serde_json::from_str::<i32>("nope").unwrap_err().into();
        assert_eq!(err.error_type(), "Serialization Error");
    }
}
