use thiserror::Error;

/// 验证错误类型
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name is too long (max 100 characters)")]
    NameTooLong,

    #[error("Vehicle class must be 1-30 letters, digits or dashes")]
    InvalidClass,

    #[error("Invalid year: {0} (must be between 1950 and 2100)")]
    InvalidYear(i32),

    #[error("Invalid price: {0} (must be positive)")]
    InvalidPrice(i64),

    #[error("Invalid seat count: {0} (must be between 1 and 80)")]
    InvalidSeats(i32),

    #[error("Description is too long (max 5000 characters)")]
    DescriptionTooLong,

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Return date must not be before pickup date")]
    DatesOutOfOrder,

    #[error("Pickup date is in the past")]
    PickupInPast,

    #[error("Invalid JSON data")]
    InvalidJson,
}

/// 验证器trait
pub trait Validator {
    type Error;

    fn validate(&self) -> Result<(), Self::Error>;
}

/// 字符串验证工具
pub struct StringValidator;

impl StringValidator {
    pub fn validate_name(name: &str) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        if name.chars().count() > 100 {
            return Err(ValidationError::NameTooLong);
        }

        Ok(())
    }

    pub fn validate_class(class: &str) -> Result<(), ValidationError> {
        let class = class.trim();
        if class.is_empty() || class.len() > 30 {
            return Err(ValidationError::InvalidClass);
        }

        if !class
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ValidationError::InvalidClass);
        }

        Ok(())
    }

    pub fn validate_description(description: &Option<String>) -> Result<(), ValidationError> {
        if let Some(text) = description {
            if text.chars().count() > 5000 {
                return Err(ValidationError::DescriptionTooLong);
            }
        }
        Ok(())
    }

    /// 允许绝对 http(s) 地址和本站存储路径（以 `/` 开头）
    pub fn validate_url(url: &Option<String>) -> Result<(), ValidationError> {
        if let Some(url_str) = url {
            if url_str.is_empty() || url_str.starts_with('/') {
                return Ok(());
            }
            match url::Url::parse(url_str) {
                Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
                _ => return Err(ValidationError::InvalidUrl(url_str.clone())),
            }
        }
        Ok(())
    }
}

/// 数值验证工具
pub struct NumberValidator;

impl NumberValidator {
    pub fn validate_year(year: i32) -> Result<(), ValidationError> {
        if !(1950..=2100).contains(&year) {
            return Err(ValidationError::InvalidYear(year));
        }
        Ok(())
    }

    pub fn validate_price(price: i64) -> Result<(), ValidationError> {
        if price <= 0 {
            return Err(ValidationError::InvalidPrice(price));
        }
        Ok(())
    }

    pub fn validate_seats(seats: i32) -> Result<(), ValidationError> {
        if !(1..=80).contains(&seats) {
            return Err(ValidationError::InvalidSeats(seats));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(StringValidator::validate_url(&None).is_ok());
        assert!(StringValidator::validate_url(&Some("https://cdn.example.com/a.webp".into())).is_ok());
        assert!(StringValidator::validate_url(&Some("/storage/vehicles/a.webp".into())).is_ok());
        assert!(StringValidator::validate_url(&Some("javascript:alert(1)".into())).is_err());
        assert!(StringValidator::validate_url(&Some("not a url".into())).is_err());
    }

    #[test]
    fn test_validate_class() {
        assert!(StringValidator::validate_class("suv").is_ok());
        assert!(StringValidator::validate_class("mini-bus").is_ok());
        assert_eq!(
            StringValidator::validate_class("sports car"),
            Err(ValidationError::InvalidClass)
        );
        assert_eq!(StringValidator::validate_class(""), Err(ValidationError::InvalidClass));
    }

    #[test]
    fn test_number_validators() {
        assert!(NumberValidator::validate_year(2024).is_ok());
        assert_eq!(NumberValidator::validate_year(1900), Err(ValidationError::InvalidYear(1900)));
        assert_eq!(NumberValidator::validate_price(0), Err(ValidationError::InvalidPrice(0)));
        assert_eq!(NumberValidator::validate_seats(0), Err(ValidationError::InvalidSeats(0)));
        assert!(NumberValidator::validate_seats(50).is_ok());
    }
}
