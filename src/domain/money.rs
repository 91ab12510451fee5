use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Amounts are exact decimals in major units (rupees, pounds, ...).
/// Floating point never touches a balance.
pub type Amount = Decimal;

/// Currency the wallet account is held in.
pub const ACCOUNT_CURRENCY: &str = "INR";

/// Parse a user-supplied amount.
/// Example: "50.00" -> 50.00, "1,500" -> 1500, "12.345" -> 12.34 (truncated)
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(ParseAmountError::InvalidFormat);
    }

    let amount = Decimal::from_str(&cleaned).map_err(|_| ParseAmountError::InvalidFormat)?;
    Ok(amount.round_dp_with_strategy(2, RoundingStrategy::ToZero))
}

/// Format an amount the way an en-IN locale renders currency:
/// symbol prefix, lakh/crore digit grouping and exactly two decimals.
/// Example: (123456.789, "INR") -> "₹1,23,456.79"
pub fn format_currency(amount: Amount, currency: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let plain = format!("{:.2}", rounded.abs());
    let (units, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    format!(
        "{}{}{}.{}",
        sign,
        currency_symbol(currency),
        group_indian(units),
        fraction
    )
}

/// Format a plain two-decimal amount without symbol or grouping (used by exports).
pub fn format_plain(amount: Amount) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Example: 2024-01-15T14:30:00Z -> "15 Jan 2024, 02:30 PM"
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%d %b %Y, %I:%M %p").to_string()
}

fn currency_symbol(code: &str) -> String {
    match code.to_uppercase().as_str() {
        "INR" => "₹".to_string(),
        "GBP" => "£".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "AUD" => "A$".to_string(),
        "CAD" => "CA$".to_string(),
        other => format!("{} ", other),
    }
}

/// Indian grouping: the last three digits, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "invalid amount format"),
        }
    }
}

impl std::error::Error for ParseAmountError {}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_format_currency_inr_grouping() {
        assert_eq!(format_currency(dec!(0), "INR"), "₹0.00");
        assert_eq!(format_currency(dec!(999), "INR"), "₹999.00");
        assert_eq!(format_currency(dec!(25000), "INR"), "₹25,000.00");
        assert_eq!(format_currency(dec!(123456.789), "INR"), "₹1,23,456.79");
        assert_eq!(format_currency(dec!(12345678), "INR"), "₹1,23,45,678.00");
        assert_eq!(format_currency(dec!(-1500), "INR"), "-₹1,500.00");
    }

    #[test]
    fn test_format_currency_other_codes() {
        assert_eq!(format_currency(dec!(241.5), "GBP"), "£241.50");
        assert_eq!(format_currency(dec!(10), "JPY"), "JPY 10.00");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("50.00"), Ok(dec!(50.00)));
        assert_eq!(parse_amount("50"), Ok(dec!(50)));
        assert_eq!(parse_amount(" 1,500 "), Ok(dec!(1500)));
        assert_eq!(parse_amount("12.345"), Ok(dec!(12.34))); // Truncates
        assert_eq!(parse_amount("-20"), Ok(dec!(-20)));
    }

    #[test]
    fn test_parse_amount_invalid() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("12.34.56").is_err());
    }

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap();
        assert_eq!(format_timestamp(ts), "15 Jan 2024, 02:30 PM");
    }

    #[test]
    fn test_format_plain() {
        assert_eq!(format_plain(dec!(34.255)), "34.26");
        assert_eq!(format_plain(dec!(1500)), "1500.00");
    }
}
