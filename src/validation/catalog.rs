use uuid::Uuid;

use crate::error::{AppError, Result};

/// `garde` rule for color hex codes: `#RGB` or `#RRGGBB`.
pub fn hex_color(value: &str, _ctx: &()) -> garde::Result {
    let digits = value
        .trim()
        .strip_prefix('#')
        .ok_or_else(|| garde::Error::new("hex color must start with '#'"))?;

    if !matches!(digits.len(), 3 | 6) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(garde::Error::new("hex color must be #RGB or #RRGGBB"));
    }

    Ok(())
}

/// Parses a UUID from a form field or query parameter.
pub fn parse_uuid(field: &str, value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::Validation(format!("{field} must be a valid UUID")))
}

/// Largest price, in currency units, whose cent value fits in an `i64`.
pub const MAX_PRICE: f64 = i64::MAX as f64 / 100.0;

/// Parses a decimal price into cents, rounding to the nearest cent.
pub fn parse_price_in_cents(value: &str) -> Result<i64> {
    let price: f64 = value
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("price must be a number".to_string()))?;

    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation(
            "price must be a non-negative number".to_string(),
        ));
    }

    let cents = (price * 100.0).round();
    if cents >= i64::MAX as f64 {
        return Err(AppError::Validation(format!("price must not exceed {MAX_PRICE}")));
    }

    Ok(cents as i64)
}

/// Parses a form boolean; only `true` and `false` are accepted.
pub fn parse_flag(field: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(AppError::Validation(format!("{field} must be true or false"))),
    }
}

/// Treats an empty query parameter as absent.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_accepts_short_and_long_forms() {
        assert!(hex_color("#fff", &()).is_ok());
        assert!(hex_color("#A1B2C3", &()).is_ok());
    }

    #[test]
    fn hex_color_rejects_malformed_values() {
        for value in ["fff", "#ffff", "#GGGGGG", "#", ""] {
            assert!(hex_color(value, &()).is_err(), "{value} should be rejected");
        }
    }

    #[test]
    fn price_rounds_to_cents() {
        assert_eq!(parse_price_in_cents("19.99").unwrap(), 1999);
        assert_eq!(parse_price_in_cents("0.005").unwrap(), 1);
        assert_eq!(parse_price_in_cents("10").unwrap(), 1000);
        assert!(parse_price_in_cents("ten").is_err());
        assert!(parse_price_in_cents("-1").is_err());
    }

    #[test]
    fn price_too_large_for_cents_is_rejected() {
        assert!(matches!(
            parse_price_in_cents("1e300"),
            Err(AppError::Validation(_))
        ));
        assert!(parse_price_in_cents("1e17").is_err());
        assert_eq!(
            parse_price_in_cents("1000000000").unwrap(),
            100_000_000_000
        );
    }

    #[test]
    fn flags_are_strict() {
        assert!(parse_flag("isFeatured", "true").unwrap());
        assert!(!parse_flag("isFeatured", "false").unwrap());
        assert!(parse_flag("isFeatured", "yes").is_err());
    }
}
