//! Input validation utilities

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Validate phone number
pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone.is_empty() {
        return Err("Phone number is required".to_string());
    }

    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX
        .get_or_init(|| Regex::new(r"^\+?[0-9]{5,15}$").expect("Failed to compile phone regex"));

    if !regex.is_match(phone) {
        return Err("Invalid phone number format".to_string());
    }

    Ok(())
}

/// Validate password: 6 to 12 non-whitespace characters
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    let length = password.chars().count();
    if !(6..=12).contains(&length) {
        return Err("Password must be 6 to 12 characters long".to_string());
    }

    if password.chars().any(char::is_whitespace) {
        return Err("Password must not contain whitespace".to_string());
    }

    Ok(())
}

/// Validate captcha code: exactly six digits
pub fn validate_captcha(captcha: &str) -> Result<(), String> {
    if captcha.len() != 6 || !captcha.chars().all(|c| c.is_ascii_digit()) {
        return Err("Captcha must be 6 digits".to_string());
    }

    Ok(())
}

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    let length = username.trim().chars().count();

    if length == 0 {
        return Err("Username is required".to_string());
    }

    if length < 2 {
        return Err("Username must be at least 2 characters long".to_string());
    }

    if length > 20 {
        return Err("Username must be at most 20 characters long".to_string());
    }

    Ok(())
}

/// Validate the optional length-limited profile fields
pub fn validate_max_length(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("{field} must be at most {max} characters long"));
    }

    Ok(())
}

/// Validate a personal website: empty, or an http(s) URL of at most 100 characters
pub fn validate_website(website: &str) -> Result<(), String> {
    if website.is_empty() {
        return Ok(());
    }

    validate_max_length("Website", website, 100)?;

    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = URL_REGEX
        .get_or_init(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("Failed to compile URL regex"));

    if !regex.is_match(website) {
        return Err("Website must be a valid http(s) URL".to_string());
    }

    Ok(())
}

/// Parse a `YYYY-MM-DD` start-work date that is not in the future
pub fn parse_start_work_date(value: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    if value.trim().is_empty() {
        return Err("Start work date is required".to_string());
    }

    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| "Start work date must be formatted as YYYY-MM-DD".to_string())?;

    if date > today {
        return Err("Start work date cannot be in the future".to_string());
    }

    Ok(date)
}
