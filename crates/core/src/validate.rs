//! Field-presence checks shared by every form.
//!
//! The backend is the authority on business rules; these only stop requests
//! that would obviously be rejected (blank names, non-positive amounts).

use crate::error::{DomainError, DomainResult};

/// A required text field: trimmed, must not be empty.
pub fn required_text(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} es obligatorio")));
    }
    Ok(trimmed.to_string())
}

/// An optional text field: trimmed, blank becomes `None` (sent as `null`).
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// A strictly positive integer (quantities, minutes).
pub fn positive_int(field: &str, value: i64) -> DomainResult<i64> {
    if value <= 0 {
        return Err(DomainError::validation(format!("{field} debe ser > 0")));
    }
    Ok(value)
}

/// A non-negative integer (stock levels, travel minutes).
pub fn non_negative_int(field: &str, value: i64) -> DomainResult<i64> {
    if value < 0 {
        return Err(DomainError::validation(format!("{field} no puede ser negativo")));
    }
    Ok(value)
}

/// A strictly positive, finite amount (payments).
pub fn positive_amount(field: &str, value: f64) -> DomainResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::validation(format!("{field} debe ser > 0")));
    }
    Ok(value)
}

/// A non-negative, finite amount (prices).
pub fn non_negative_amount(field: &str, value: f64) -> DomainResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!("{field} no puede ser negativo")));
    }
    Ok(value)
}

/// Parse a user-typed decimal, accepting a comma as the decimal separator.
pub fn parse_decimal(field: &str, raw: &str) -> DomainResult<f64> {
    let normalized = raw.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DomainError::validation(format!("{field} debe ser numérico")))
}
