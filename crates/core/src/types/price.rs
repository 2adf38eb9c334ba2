//! Rupee prices using decimal arithmetic.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A catalog price in Indian rupees.
///
/// The Catalog Store sends prices either as JSON numbers or as numeric
/// strings; both deserialize through `rust_decimal`'s lenient visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display, e.g. `₹1,23,456.5`.
    #[must_use]
    pub fn display(&self) -> String {
        format_inr(self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// Format an amount with the rupee sign and Indian digit grouping.
///
/// The last three integer digits form one group and the remaining digits are
/// grouped in pairs (`12,34,567`). At most three fraction digits are kept and
/// trailing zeros are dropped.
#[must_use]
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').map_or((text.as_str(), None), |(i, f)| (i, Some(f)));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 2);
    let head_len = digits.len().saturating_sub(3);
    for (idx, ch) in digits.iter().enumerate() {
        if idx > 0 && idx < head_len && (head_len - idx) % 2 == 0 {
            grouped.push(',');
        }
        if idx == head_len && head_len > 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}₹{grouped}.{frac}"),
        None => format!("{sign}₹{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn inr(s: &str) -> String {
        format_inr(Decimal::from_str(s).expect("valid decimal"))
    }

    #[test]
    fn test_format_inr_small_amounts() {
        assert_eq!(inr("0"), "₹0");
        assert_eq!(inr("99"), "₹99");
        assert_eq!(inr("999"), "₹999");
    }

    #[test]
    fn test_format_inr_indian_grouping() {
        assert_eq!(inr("1000"), "₹1,000");
        assert_eq!(inr("123456"), "₹1,23,456");
        assert_eq!(inr("1234567"), "₹12,34,567");
        assert_eq!(inr("123456789"), "₹12,34,56,789");
    }

    #[test]
    fn test_format_inr_fraction_and_sign() {
        assert_eq!(inr("1499.50"), "₹1,499.5");
        assert_eq!(inr("10.1234"), "₹10.123");
        assert_eq!(inr("-2500"), "-₹2,500");
    }

    #[test]
    fn test_price_deserializes_from_number_or_string() {
        let a: Price = serde_json::from_str("249.5").expect("number");
        let b: Price = serde_json::from_str("\"249.5\"").expect("string");
        assert_eq!(a, b);
        assert_eq!(a.display(), "₹249.5");
    }
}
