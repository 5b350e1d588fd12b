//! Validation of free-text answers

use crate::expense::parse_date;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid date format")]
    InvalidDateFormat,
    #[error("not a number")]
    InvalidNumber,
}

/// Accept a `dd.mm.yyyy` date, returning it as typed
pub fn date(text: &str) -> Result<String, InputError> {
    let text = text.trim();
    parse_date(text).map_err(|_| InputError::InvalidDateFormat)?;
    Ok(text.to_string())
}

/// Accept a finite decimal amount
pub fn amount(text: &str) -> Result<f64, InputError> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InputError::InvalidNumber),
    }
}

/// Accept an integer expense id
pub fn expense_id(text: &str) -> Result<i64, InputError> {
    text.trim().parse().map_err(|_| InputError::InvalidNumber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amounts() {
        assert_eq!(amount(" 12.5 "), Ok(12.5));
        assert_eq!(amount("-3"), Ok(-3.0));
        assert_eq!(amount("twelve"), Err(InputError::InvalidNumber));
        assert_eq!(amount("inf"), Err(InputError::InvalidNumber));
        assert_eq!(amount("NaN"), Err(InputError::InvalidNumber));
        assert_eq!(amount("12,5"), Err(InputError::InvalidNumber));
    }

    #[test]
    fn test_ids() {
        assert_eq!(expense_id("42"), Ok(42));
        assert_eq!(expense_id("4.2"), Err(InputError::InvalidNumber));
        assert_eq!(expense_id(""), Err(InputError::InvalidNumber));
    }

    #[test]
    fn test_dates() {
        assert_eq!(date("01.03.2024"), Ok("01.03.2024".to_string()));
        assert_eq!(date("2024-03-01"), Err(InputError::InvalidDateFormat));
    }
}
