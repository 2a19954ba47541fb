//! Input validation for API requests.
//!
//! This module provides validation functions for API request data,
//! ensuring all inputs meet the required format and constraints.
//!
//! For collecting multiple validation errors and returning them as an ApiError,
//! use the `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating email addresses (pragmatic, not RFC 5322)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$"
    ).unwrap();

    /// Regex for validating ticker symbols (letters, digits, dot, dash)
    static ref SYMBOL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.\-]{1,12}$"
    ).unwrap();
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if name.len() > 120 {
        return Err("Name is too long (max 120 characters)".to_string());
    }

    Ok(())
}

/// Validate a password at signup. Only presence and length are checked;
/// strength policy is out of scope.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }

    Ok(())
}

/// Validate a ticker symbol
pub fn validate_symbol(symbol: &str) -> Result<(), String> {
    if symbol.is_empty() {
        return Err("Symbol is required".to_string());
    }

    if !SYMBOL_REGEX.is_match(symbol) {
        return Err(
            "Invalid symbol format. Use 1-12 letters, digits, dots or dashes".to_string(),
        );
    }

    Ok(())
}

/// Validate an analysis lookback window
pub fn validate_lookback(lookback: usize) -> Result<(), String> {
    if !(2..=500).contains(&lookback) {
        return Err("Lookback must be between 2 and 500".to_string());
    }

    Ok(())
}

/// Validate an optional watchlist note
pub fn validate_note(note: &Option<String>) -> Result<(), String> {
    if let Some(n) = note {
        if n.len() > 500 {
            return Err("Note is too long (max 500 characters)".to_string());
        }
    }

    Ok(())
}
