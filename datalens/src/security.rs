//! Input hardening for user-supplied names and thresholds.
//!
//! Column names come straight from uploaded files and end up inside SQL
//! text, so they are always quoted rather than matched against a whitelist.

use crate::error::{InsightError, Result};

/// Maximum identifier length accepted for SQL interpolation.
pub const MAX_IDENTIFIER_LENGTH: usize = 1024;

/// SQL identifier escaping utilities.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Validates and escapes a SQL identifier (table or column name).
    ///
    /// The identifier is wrapped in double quotes and any embedded double
    /// quote is doubled, so spaces, punctuation and keywords are all safe.
    ///
    /// # Examples
    /// ```rust
    /// use datalens::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::escape_identifier("age").unwrap(), "\"age\"");
    /// assert_eq!(
    ///     SqlSecurity::escape_identifier("Unit \"Price\"").unwrap(),
    ///     "\"Unit \"\"Price\"\"\""
    /// );
    /// assert!(SqlSecurity::escape_identifier("").is_err());
    /// ```
    pub fn escape_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;

        let escaped = identifier.replace('"', "\"\"");
        Ok(format!("\"{escaped}\""))
    }

    /// Validates a SQL identifier without escaping it.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.is_empty() {
            return Err(InsightError::Security(
                "SQL identifier cannot be empty".to_string(),
            ));
        }

        InputValidator::validate_string_length(identifier, MAX_IDENTIFIER_LENGTH, "SQL identifier")?;
        InputValidator::validate_no_null_bytes(identifier, "SQL identifier")?;

        Ok(())
    }
}

/// Input validation utilities for various data types.
pub struct InputValidator;

impl InputValidator {
    /// Validates a numeric threshold value.
    pub fn validate_threshold(value: f64, name: &str) -> Result<()> {
        if !value.is_finite() {
            return Err(InsightError::Security(format!(
                "Invalid {name} value: must be finite (not NaN or infinite)"
            )));
        }
        Ok(())
    }

    /// Validates a ratio value (0.0 to 1.0).
    pub fn validate_percentage(value: f64, name: &str) -> Result<()> {
        Self::validate_threshold(value, name)?;

        if !(0.0..=1.0).contains(&value) {
            return Err(InsightError::Security(format!(
                "Invalid {name} value: must be between 0.0 and 1.0, got {value}"
            )));
        }
        Ok(())
    }

    /// Validates a string length.
    pub fn validate_string_length(value: &str, max_length: usize, name: &str) -> Result<()> {
        if value.len() > max_length {
            return Err(InsightError::Security(format!(
                "{name} too long: {} characters (max {max_length})",
                value.len()
            )));
        }
        Ok(())
    }

    /// Validates that a string doesn't contain null bytes.
    pub fn validate_no_null_bytes(value: &str, name: &str) -> Result<()> {
        if value.contains('\0') {
            return Err(InsightError::Security(format!(
                "{name} cannot contain null bytes"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_from_spreadsheets_are_accepted() {
        assert!(SqlSecurity::validate_identifier("customer_id").is_ok());
        assert!(SqlSecurity::validate_identifier("Unit Price").is_ok());
        assert!(SqlSecurity::validate_identifier("123col").is_ok());
        assert!(SqlSecurity::validate_identifier("select").is_ok());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(SqlSecurity::validate_identifier("").is_err());
        assert!(SqlSecurity::validate_identifier(&"a".repeat(2000)).is_err());
        assert!(SqlSecurity::validate_identifier("col\0name").is_err());
    }

    #[test]
    fn test_sql_identifier_escaping() {
        assert_eq!(
            SqlSecurity::escape_identifier("customer_id").unwrap(),
            "\"customer_id\""
        );
        assert_eq!(
            SqlSecurity::escape_identifier("id\"; DROP TABLE data; --").unwrap(),
            "\"id\"\"; DROP TABLE data; --\""
        );
    }

    #[test]
    fn test_input_validation() {
        assert!(InputValidator::validate_threshold(5.5, "threshold").is_ok());
        assert!(InputValidator::validate_percentage(0.95, "percentage").is_ok());
        assert!(InputValidator::validate_string_length("short", 100, "name").is_ok());

        assert!(InputValidator::validate_threshold(f64::NAN, "threshold").is_err());
        assert!(InputValidator::validate_threshold(f64::INFINITY, "threshold").is_err());
        assert!(InputValidator::validate_percentage(1.5, "percentage").is_err());
        assert!(InputValidator::validate_percentage(-0.1, "percentage").is_err());
        assert!(InputValidator::validate_string_length("too long", 5, "name").is_err());
        assert!(InputValidator::validate_no_null_bytes("contains\0null", "name").is_err());
    }
}
