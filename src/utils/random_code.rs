use rand::Rng;

/// 班级码长度
pub const CLASS_CODE_LENGTH: usize = 8;

// 去掉了容易混淆的 0/O、1/I/L
const CODE_CHARSET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// 生成指定长度的随机码
pub fn generate_random_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

pub fn generate_class_code() -> String {
    generate_random_code(CLASS_CODE_LENGTH)
}

/// 规范化用户输入的班级码，格式不对时返回 None
pub fn normalize_class_code(input: &str) -> Option<String> {
    let code = input.trim().to_ascii_uppercase();
    (code.len() == CLASS_CODE_LENGTH && code.chars().all(|c| c.is_ascii_alphanumeric()))
        .then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..50 {
            let code = generate_class_code();
            assert_eq!(code.len(), CLASS_CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
        }
    }

    #[test]
    fn test_normalize_class_code() {
        assert_eq!(normalize_class_code(" abcd2345 "), Some("ABCD2345".to_string()));
        assert_eq!(normalize_class_code("ABC"), None);
        assert_eq!(normalize_class_code("ABCD-345"), None);
    }
}
