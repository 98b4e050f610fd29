use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid date regex"));

const MAX_NAME_LEN: usize = 100;

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 人名、班级名、课程名等：非空、不超过 100 字符、不含控制字符
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name must not be empty");
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err("Name must be at most 100 characters");
    }
    if trimmed.chars().any(char::is_control) {
        return Err("Name must not contain control characters");
    }
    Ok(())
}

/// `YYYY-MM-DD` 且为真实日期
pub fn validate_iso_date(date: &str) -> Result<NaiveDate, String> {
    if !ISO_DATE_RE.is_match(date) {
        return Err(format!("Invalid date '{date}', expected YYYY-MM-DD"));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| format!("Invalid date '{date}': {e}"))
}

/// 可选的起止日期，两者都给出时要求 start <= end
pub fn validate_date_range(start: Option<&str>, end: Option<&str>) -> Result<(), String> {
    let start = start.map(validate_iso_date).transpose()?;
    let end = end.map(validate_iso_date).transpose()?;
    if let (Some(s), Some(e)) = (start, end)
        && s > e
    {
        return Err("start_date must not be after end_date".to_string());
    }
    Ok(())
}

/// 密码策略验证结果
#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

impl PasswordValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// 密码策略：至少 8 位，同时包含大写、小写字母和数字，且不是常见弱密码
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    if password.len() < 8 {
        errors.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }

    let weak_passwords = [
        "password1",
        "teacher123",
        "school123",
        "welcome123",
        "admin1234",
        "qwerty123",
        "abcd1234",
    ];
    if weak_passwords
        .iter()
        .any(|&weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(validate_email("teacher@bridge.school").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_name() {
        assert!(validate_name("Grade 5 - Blue").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
        assert!(validate_name("bad\u{0007}name").is_err());
    }

    #[test]
    fn test_iso_date() {
        assert!(validate_iso_date("2025-09-01").is_ok());
        assert!(validate_iso_date("2025-02-30").is_err());
        assert!(validate_iso_date("2025-9-1").is_err());
        assert!(validate_iso_date("01/09/2025").is_err());
    }

    #[test]
    fn test_date_range() {
        assert!(validate_date_range(Some("2025-09-01"), Some("2026-06-30")).is_ok());
        assert!(validate_date_range(Some("2026-09-01"), Some("2026-06-30")).is_err());
        assert!(validate_date_range(None, Some("2026-06-30")).is_ok());
        assert!(validate_date_range(Some("bad"), None).is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("SecurePass123").is_valid);

        let result = validate_password("Ab1");
        assert!(
            result
                .errors
                .contains(&"Password must be at least 8 characters long")
        );

        let result = validate_password("abcd12345");
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one uppercase letter")
        );

        let result = validate_password("Teacher123");
        assert!(
            result
                .errors
                .contains(&"Password is too common, please choose a stronger password")
        );
    }
}
