use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("Invalid url regex"));

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "12345678",
    "123456789",
    "qwerty123",
    "admin123",
    "password1",
    "welcome1",
    "letmein1",
    "abcd1234",
    "iloveyou1",
];

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    let len = username.chars().count();
    if !(5..=16).contains(&len) {
        return Err("Username length must be between 5 and 16 characters");
    }
    if !USERNAME_RE.is_match(username) {
        return Err("Username must contain only letters, numbers, underscores or hyphens");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.len() > 254 || !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 密码策略检查，返回全部未满足的规则
///
/// 至少 8 个字符，包含大写字母、小写字母和数字，且不在常见弱密码列表中。
pub fn password_policy_violations(password: &str) -> Vec<&'static str> {
    let mut violations = Vec::new();

    if password.chars().count() < 8 {
        violations.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("Password must contain at least one digit");
    }
    if COMMON_PASSWORDS
        .iter()
        .any(|weak| password.eq_ignore_ascii_case(weak))
    {
        violations.push("Password is too common, please choose a stronger password");
    }

    violations
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let violations = password_policy_violations(password);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations.join("; "))
    }
}

/// 校验去除首尾空白后的文本长度（按字符计）
pub fn validate_text(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        if min > 0 {
            return Err(format!(
                "{field} must be between {min} and {max} characters"
            ));
        }
        return Err(format!("{field} must be at most {max} characters"));
    }
    Ok(())
}

pub fn validate_url(url: &str) -> Result<(), &'static str> {
    if url.len() > 2048 || !URL_RE.is_match(url) {
        return Err("URL must start with http:// or https://");
    }
    Ok(())
}

/// 解析 `YYYY-MM-DD` 日期
pub fn parse_date(value: &str) -> Result<NaiveDate, &'static str> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| "Date must be formatted as YYYY-MM-DD")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("bob").is_err());
        assert!(validate_username("this-name-is-way-too-long").is_err());
        assert!(validate_username("bad name").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("teacher@school.edu").is_ok());
        assert!(validate_email("no-at-sign.edu").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password("SecurePass123").is_ok());
        assert!(validate_password("MyP@ssw0rd").is_ok());
    }

    #[test]
    fn test_password_violations() {
        let v = password_policy_violations("abc");
        assert!(v.contains(&"Password must be at least 8 characters long"));
        assert!(v.contains(&"Password must contain at least one uppercase letter"));
        assert!(v.contains(&"Password must contain at least one digit"));

        let v = password_policy_violations("ABCD5678");
        assert_eq!(
            v,
            vec!["Password must contain at least one lowercase letter"]
        );
    }

    #[test]
    fn test_common_password() {
        let err = validate_password("Password1").unwrap_err();
        assert!(err.contains("too common"));
    }

    #[test]
    fn test_text_length() {
        assert!(validate_text("Name", "  Math  ", 1, 100).is_ok());
        assert!(validate_text("Name", "   ", 1, 100).is_err());
        assert!(validate_text("Note", &"x".repeat(11), 0, 10).is_err());
    }

    #[test]
    fn test_url_and_date() {
        assert!(validate_url("https://cdn.school.edu/notes.pdf").is_ok());
        assert!(validate_url("ftp://files").is_err());
        assert!(parse_date("2025-03-01").is_ok());
        assert!(parse_date("2025-13-01").is_err());
        assert!(parse_date("01/03/2025").is_err());
    }
}
