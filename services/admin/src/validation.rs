//! Input validation utilities

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::{error::ApiError, models::Permission};

/// Validate a required free-text field
pub fn validate_required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} is required", field)));
    }
    if value.len() > 255 {
        return Err(ApiError::Validation(format!(
            "{} must be at most 255 characters long",
            field
        )));
    }
    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::Validation("Email is required".to_string()));
    }

    if email.len() > 254 {
        return Err(ApiError::Validation(
            "Email must be at most 254 characters long".to_string(),
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(ApiError::Validation("Invalid email format".to_string()));
    }

    Ok(())
}

/// Validate an optional phone number (digits, optional leading +)
pub fn validate_phone(phone: Option<&str>) -> Result<(), ApiError> {
    let Some(phone) = phone else {
        return Ok(());
    };

    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX
        .get_or_init(|| Regex::new(r"^\+?[0-9]{6,15}$").expect("Failed to compile phone regex"));

    if !regex.is_match(phone) {
        return Err(ApiError::Validation("Invalid phone number".to_string()));
    }

    Ok(())
}

/// Validate an optional `#rrggbb` display color
pub fn validate_color(color: Option<&str>) -> Result<(), ApiError> {
    let Some(color) = color else {
        return Ok(());
    };

    static COLOR_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = COLOR_REGEX
        .get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("Failed to compile color regex"));

    if !regex.is_match(color) {
        return Err(ApiError::Validation(
            "Color must be a hex value like #1a2b3c".to_string(),
        ));
    }

    Ok(())
}

/// Validate a staff password
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(ApiError::Validation(
            "Password must be at most 128 characters long".to_string(),
        ));
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !(has_upper && has_lower && has_digit) {
        return Err(ApiError::Validation(
            "Password must contain upper case, lower case and digit characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate an optional gender code
pub fn validate_gender(gender: Option<&str>) -> Result<(), ApiError> {
    match gender {
        Some(g) if !crate::columns::GENDERS.contains(&g) => Err(ApiError::Validation(format!(
            "Gender must be one of {}",
            crate::columns::GENDERS.join(", ")
        ))),
        _ => Ok(()),
    }
}

/// Every key of a role ACL must name a known permission
pub fn validate_acl(acl: &HashMap<String, bool>) -> Result<(), ApiError> {
    let mut unknown: Vec<&str> = acl
        .keys()
        .map(String::as_str)
        .filter(|name| Permission::from_code(name).is_none())
        .collect();

    if unknown.is_empty() {
        return Ok(());
    }

    unknown.sort_unstable();
    Err(ApiError::Validation(format!(
        "Unknown permission(s): {}",
        unknown.join(", ")
    )))
}
