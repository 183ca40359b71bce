use crate::utils::error::{Result, TaxError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> TaxError {
    TaxError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 只接受 http / https 的 base URL
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.trim().is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", url.scheme()),
        ));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        Err(invalid(field_name, path, "Path cannot be empty"))
    } else if path.contains('\0') {
        Err(invalid(field_name, path, "Path contains null bytes"))
    } else {
        Ok(())
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field_name, value, format!("Value must be between {} and {}", min, max)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountIssue {
    Missing,
    NotANumber,
    Negative,
}

/// 解析表單金額欄位（原始字串），需為 >= 0 的有限數字
pub fn parse_non_negative_amount(raw: &str) -> std::result::Result<f64, AmountIssue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AmountIssue::Missing);
    }

    let value: f64 = trimmed.parse().map_err(|_| AmountIssue::NotANumber)?;
    if !value.is_finite() {
        return Err(AmountIssue::NotANumber);
    }
    if value < 0.0 {
        return Err(AmountIssue::Negative);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("base_url", "https://example.com/api/v1").is_ok());
        assert!(validate_url("base_url", "http://localhost:8000/api/v1").is_ok());
        assert!(validate_url("base_url", "").is_err());
        assert!(validate_url("base_url", "invalid-url").is_err());
        assert!(validate_url("base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("timeout_seconds", 30, 1, 300).is_ok());
        assert!(validate_range("timeout_seconds", 0, 1, 300).is_err());
        assert!(validate_range("timeout_seconds", 301, 1, 300).is_err());
    }

    #[test]
    fn test_parse_non_negative_amount() {
        assert_eq!(parse_non_negative_amount("75000"), Ok(75000.0));
        assert_eq!(parse_non_negative_amount(" 10.5 "), Ok(10.5));
        assert_eq!(parse_non_negative_amount("0"), Ok(0.0));
        assert_eq!(parse_non_negative_amount(""), Err(AmountIssue::Missing));
        assert_eq!(parse_non_negative_amount("   "), Err(AmountIssue::Missing));
        assert_eq!(parse_non_negative_amount("-100"), Err(AmountIssue::Negative));
        assert_eq!(parse_non_negative_amount("abc"), Err(AmountIssue::NotANumber));
        assert_eq!(parse_non_negative_amount("NaN"), Err(AmountIssue::NotANumber));
        assert_eq!(parse_non_negative_amount("inf"), Err(AmountIssue::NotANumber));
    }
}
