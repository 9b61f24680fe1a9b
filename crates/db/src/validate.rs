//! Total parsing functions used at the validation boundary.
//!
//! Every raw (string) input is converted here, once, before any SQL is
//! built. Failures are always `DbError::Validation`.

use rust_decimal::Decimal;

use crate::DbError;

/// Parse an integer-valued option such as `minEmployees=10`.
pub fn parse_int(key: &str, raw: &str) -> Result<i32, DbError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| DbError::validation(format!("{key} must be an integer, got {raw:?}")))
}

/// Parse a boolean option. Only the canonical `true` / `false` are accepted.
pub fn parse_bool(key: &str, raw: &str) -> Result<bool, DbError> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(DbError::validation(format!(
            "{key} must be \"true\" or \"false\", got {other:?}"
        ))),
    }
}

/// Escape `LIKE` / `ILIKE` metacharacters so user text matches literally.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `%<text>%` substring pattern with metacharacters escaped.
pub fn contains_pattern(raw: &str) -> String {
    format!("%{}%", escape_like(raw))
}

pub(crate) fn non_negative(key: &str, value: Option<i32>) -> Result<(), DbError> {
    match value {
        Some(v) if v < 0 => Err(DbError::validation(format!("{key} must be >= 0, got {v}"))),
        _ => Ok(()),
    }
}

pub(crate) fn equity_in_range(value: Option<Decimal>) -> Result<(), DbError> {
    match value {
        Some(v) if v < Decimal::ZERO || v > Decimal::ONE => Err(DbError::validation(format!(
            "equity must be between 0 and 1, got {v}"
        ))),
        _ => Ok(()),
    }
}

/// Lowercase slug of `[a-z0-9-]`, 1 to `max_len` characters.
pub(crate) fn slug(key: &str, value: &str, max_len: usize) -> Result<(), DbError> {
    if value.is_empty() || value.len() > max_len {
        return Err(DbError::validation(format!(
            "{key} must be 1 to {max_len} characters, got {} ({value:?})",
            value.len()
        )));
    }
    if !value
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return Err(DbError::validation(format!(
            "{key} may only contain a-z, 0-9 and '-', got {value:?}"
        )));
    }
    Ok(())
}

pub(crate) fn not_blank(key: &str, value: &str) -> Result<(), DbError> {
    if value.trim().is_empty() {
        return Err(DbError::validation(format!("{key} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parse_int_accepts_integers_and_rejects_text() {
        assert_eq!(parse_int("minEmployees", "42").unwrap(), 42);
        assert_eq!(parse_int("minEmployees", " 7 ").unwrap(), 7);
        assert!(parse_int("minEmployees", "nope").unwrap_err().is_validation());
        assert!(parse_int("minEmployees", "1.5").unwrap_err().is_validation());
        assert!(parse_int("minEmployees", "").unwrap_err().is_validation());
    }

    #[test]
    fn parse_bool_is_strict() {
        assert!(parse_bool("hasEquity", "true").unwrap());
        assert!(!parse_bool("hasEquity", "false").unwrap());
        for bad in ["TRUE", "1", "yes", "", "False"] {
            assert!(parse_bool("hasEquity", bad).unwrap_err().is_validation(), "{bad}");
        }
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(contains_pattern("acme"), "%acme%");
        assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn range_checks() {
        assert!(non_negative("salary", Some(-1)).is_err());
        assert!(non_negative("salary", Some(0)).is_ok());
        assert!(non_negative("salary", None).is_ok());
        assert!(equity_in_range(Some(Decimal::from_str("1.01").unwrap())).is_err());
        assert!(equity_in_range(Some(Decimal::from_str("0.45").unwrap())).is_ok());
        assert!(not_blank("name", "  ").is_err());
        assert!(slug("handle", "c-1", 25).is_ok());
        assert!(slug("handle", "", 25).is_err());
        assert!(slug("handle", "abc", 2).is_err());
        assert!(slug("handle", "a.b", 25).is_err());
    }
}
