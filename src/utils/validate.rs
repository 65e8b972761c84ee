use once_cell::sync::Lazy;
use regex::Regex;

static KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("Invalid key regex"));

/// 课程与练习标识的最大长度
pub const MAX_KEY_LENGTH: usize = 64;

/// 校验课程或练习标识
pub fn validate_key(key: &str) -> Result<(), &'static str> {
    if key.is_empty() || key.len() > MAX_KEY_LENGTH {
        return Err("Key length must be between 1 and 64 characters");
    }
    // 只能包含字母、数字、下划线、点或连字符
    if !KEY_RE.is_match(key) {
        return Err("Key must contain only letters, numbers, underscores, dots or hyphens");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        assert!(validate_key("cs-101").is_ok());
        assert!(validate_key("prog_2024.spring").is_ok());
        assert!(validate_key("X").is_ok());
    }

    #[test]
    fn test_invalid_keys() {
        assert!(validate_key("").is_err());
        assert!(validate_key("has space").is_err());
        assert!(validate_key("../etc").is_err());
        assert!(validate_key("課程").is_err());
        assert!(validate_key(&"a".repeat(MAX_KEY_LENGTH + 1)).is_err());
    }
}
