use rust_decimal::Decimal;
use std::str::FromStr;

use super::models::{AddExpenseRequest, TransactionType};
use crate::common::{ValidationResult, Validator};

pub const MAX_DESCRIPTION_LEN: usize = 255;
pub const MAX_CATEGORY_LEN: usize = 64;
pub const MAX_AMOUNT_SCALE: u32 = 2;
/// Largest accepted amount, in whole units
pub const MAX_AMOUNT_UNITS: i64 = 1_000_000_000_000;

impl Validator<AddExpenseRequest> for AddExpenseRequest {
    fn validate(&self, data: &AddExpenseRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require_text(
            "description",
            "Description",
            &data.description,
            MAX_DESCRIPTION_LEN,
        );
        result.require_text("category", "Category", &data.category, MAX_CATEGORY_LEN);

        if let Err(message) = parse_amount(&data.amount) {
            result.add_error("amount", message);
        }

        if data.ptype.parse::<TransactionType>().is_err() {
            result.add_error("ptype", "Type must be 'income' or 'expense'");
        }

        result
    }
}

/// Parses a monetary amount: a plain non-negative decimal with at most two
/// fractional digits, no larger than `MAX_AMOUNT_UNITS`.
///
/// Signs, exponents and digit separators are rejected. The returned value's
/// `to_string()` is the form that gets stored.
pub fn parse_amount(raw: &str) -> Result<Decimal, &'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Amount is required");
    }
    if trimmed.starts_with('-') {
        return Err("Amount must not be negative");
    }

    let plain = trimmed.chars().all(|c| c.is_ascii_digit() || c == '.')
        && trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed.matches('.').count() <= 1;
    if !plain {
        return Err("Amount must be a number");
    }

    let amount = Decimal::from_str(trimmed).map_err(|_| "Amount must be a number")?;

    if amount.scale() > MAX_AMOUNT_SCALE {
        return Err("Amount must have at most two decimal places");
    }
    if amount > Decimal::from(MAX_AMOUNT_UNITS) {
        return Err("Amount must not exceed 1000000000000");
    }

    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(description: &str, amount: &str, category: &str, ptype: &str) -> AddExpenseRequest {
        AddExpenseRequest {
            description: description.to_string(),
            amount: amount.to_string(),
            category: category.to_string(),
            ptype: ptype.to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        let req = request("coffee", "450", "food", "expense");
        assert!(req.validate(&req).is_valid);

        let req = request("salary", "2500.50", "work", "income");
        assert!(req.validate(&req).is_valid);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("450").unwrap(), Decimal::from(450));
        assert_eq!(parse_amount(" 12.5 ").unwrap().to_string(), "12.5");
        assert_eq!(parse_amount("0").unwrap(), Decimal::ZERO);

        assert_eq!(parse_amount(""), Err("Amount is required"));
        assert_eq!(parse_amount("abc"), Err("Amount must be a number"));
        assert_eq!(parse_amount("-3"), Err("Amount must not be negative"));
        assert_eq!(
            parse_amount("1.999"),
            Err("Amount must have at most two decimal places")
        );
    }

    #[test]
    fn test_parse_amount_rejects_non_plain_forms() {
        for raw in ["1_000", "1e3", "1E3", "+5", "1.2.3", ".", "0x10", "12 50"] {
            assert_eq!(parse_amount(raw), Err("Amount must be a number"), "{}", raw);
        }
        assert_eq!(parse_amount("-0"), Err("Amount must not be negative"));
    }

    #[test]
    fn test_parse_amount_is_canonical() {
        assert_eq!(parse_amount("00012").unwrap().to_string(), "12");
        assert_eq!(parse_amount("12.50").unwrap().to_string(), "12.50");
        assert_eq!(parse_amount("0.5").unwrap().to_string(), "0.5");
    }

    #[test]
    fn test_parse_amount_caps_magnitude() {
        assert!(parse_amount("1000000000000").is_ok());
        assert_eq!(
            parse_amount("1000000000000.01"),
            Err("Amount must not exceed 1000000000000")
        );
        assert_eq!(
            parse_amount("79228162514264337593543950335"),
            Err("Amount must not exceed 1000000000000")
        );
    }

    #[test]
    fn test_every_bad_field_reported() {
        let req = request("  ", "abc", "", "transfer");
        let result = req.validate(&req);

        assert!(!result.is_valid);
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["description", "category", "amount", "ptype"]);
    }

    #[test]
    fn test_description_too_long() {
        let req = request(&"a".repeat(MAX_DESCRIPTION_LEN + 1), "1", "food", "expense");
        let result = req.validate(&req);
        assert!(result.errors.iter().any(|e| e.field == "description"));
    }
}
