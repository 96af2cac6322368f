use thiserror::Error;

use crate::Money;

#[derive(Debug, Clone, Error)]
#[error("Invalid amount: {0}")]
pub struct AmountParseError(String);

/// Parse an export amount string into [`Money`].
///
/// Export amounts are whole minor units with optional thousands separators, e.g. `"1,200"` parses to the same value
/// as `"1200"`. A blank string parses to zero, matching the continuation rows of a multi-line order.
pub fn parse_amount(value: &str) -> Result<Money, AmountParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(Money::default());
    }
    let normalized = trimmed.replace(',', "");
    normalized
        .parse::<i64>()
        .map(Money::from)
        .map_err(|e| AmountParseError(format!("{value}. {e}")))
}

/// Parse a fee amount string into a non-negative [`Money`].
///
/// The export records fees from the seller's perspective, so they usually carry a leading minus. Ledger entries want
/// the magnitude; the sign is reapplied when the fee detail line is built.
pub fn parse_fee(value: &str) -> Result<Money, AmountParseError> {
    parse_amount(value).map(|m| m.abs())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn amounts_with_thousands_separators() {
        assert_eq!(parse_amount("1,200").unwrap().value(), 1200);
        assert_eq!(parse_amount("1200").unwrap().value(), 1200);
        assert_eq!(parse_amount("1,234,567").unwrap().value(), 1_234_567);
    }

    #[test]
    fn blank_amount_is_zero() {
        assert_eq!(parse_amount("").unwrap().value(), 0);
        assert_eq!(parse_amount("  ").unwrap().value(), 0);
    }

    #[test]
    fn negative_fees_take_absolute_value() {
        assert_eq!(parse_fee("-100").unwrap().value(), 100);
        assert_eq!(parse_fee("100").unwrap().value(), 100);
        assert_eq!(parse_fee("-1,050").unwrap().value(), 1050);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_amount("12.50").is_err());
        assert!(parse_amount("abc").is_err());
    }
}
