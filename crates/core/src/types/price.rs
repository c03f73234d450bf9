//! Catalog prices.
//!
//! Amounts are whole Vietnamese đồng. The currency has no subunit in this
//! domain, so the amount is an unsigned integer rather than a decimal.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Price`] from form input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a whole, non-negative number.
    #[error("price must be a whole number")]
    NotANumber,
    /// The price is zero where a positive amount is required.
    #[error("price must be greater than 0")]
    NotPositive,
    /// A stored amount that is negative, infinite or too large.
    #[error("price is out of range")]
    OutOfRange,
}

/// A non-negative price in whole currency units.
///
/// Serializes as a plain integer. Stored prices written with a fraction
/// (`199.5`) are rounded to the nearest unit when decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "WirePrice", into = "u64")]
pub struct Price(u64);

#[derive(Deserialize)]
#[serde(untagged)]
enum WirePrice {
    Whole(u64),
    Fractional(f64),
}

impl TryFrom<WirePrice> for Price {
    type Error = PriceError;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn try_from(wire: WirePrice) -> Result<Self, Self::Error> {
        match wire {
            WirePrice::Whole(amount) => Ok(Self(amount)),
            WirePrice::Fractional(amount) => {
                let rounded = amount.round();
                if rounded.is_finite() && rounded >= 0.0 && rounded <= u64::MAX as f64 {
                    Ok(Self(rounded as u64))
                } else {
                    Err(PriceError::OutOfRange)
                }
            }
        }
    }
}

impl Price {
    /// Currency suffix used when formatting.
    pub const CURRENCY_SYMBOL: &'static str = "₫";

    /// Create a price from a whole amount.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// The amount in whole currency units.
    #[must_use]
    pub const fn amount(self) -> u64 {
        self.0
    }

    /// Parse a price typed into a product form.
    ///
    /// Group separators (`.`, `,`, spaces) are ignored so `"150.000"` and
    /// `"150000"` are the same price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotANumber`] if the input has no digits or
    /// contains anything else, and [`PriceError::NotPositive`] for zero.
    pub fn parse_positive(input: &str) -> Result<Self, PriceError> {
        let digits: String = input
            .trim()
            .chars()
            .filter(|c| !matches!(c, '.' | ',' | ' '))
            .collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PriceError::NotANumber);
        }
        let amount: u64 = digits.parse().map_err(|_| PriceError::NotANumber)?;
        if amount == 0 {
            return Err(PriceError::NotPositive);
        }
        Ok(Self(amount))
    }

    /// Format with `.` thousands separators, e.g. `1.250.000₫`.
    #[must_use]
    pub fn display(self) -> String {
        let raw = self.0.to_string();
        let mut grouped = String::with_capacity(raw.len() + raw.len() / 3);
        for (i, c) in raw.chars().enumerate() {
            if i > 0 && (raw.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        format!("{grouped}{}", Self::CURRENCY_SYMBOL)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<u64> for Price {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl From<Price> for u64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::new(0).display(), "0₫");
        assert_eq!(Price::new(999).display(), "999₫");
        assert_eq!(Price::new(1_000).display(), "1.000₫");
        assert_eq!(Price::new(1_250_000).display(), "1.250.000₫");
    }

    #[test]
    fn test_parse_positive_accepts_separators() {
        assert_eq!(Price::parse_positive("150.000").unwrap(), Price::new(150_000));
        assert_eq!(Price::parse_positive(" 150000 ").unwrap(), Price::new(150_000));
    }

    #[test]
    fn test_parse_positive_rejects_zero_and_garbage() {
        assert_eq!(Price::parse_positive("0"), Err(PriceError::NotPositive));
        assert_eq!(Price::parse_positive(""), Err(PriceError::NotANumber));
        assert_eq!(Price::parse_positive("-5"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse_positive("12.5k"), Err(PriceError::NotANumber));
    }

    #[test]
    fn test_serde_is_a_plain_number() {
        let json = serde_json::to_string(&Price::new(150)).unwrap();
        assert_eq!(json, "150");
        assert_eq!(serde_json::from_str::<Price>("150").unwrap(), Price::new(150));
    }

    #[test]
    fn test_fractional_amount_rounds_to_whole_unit() {
        assert_eq!(serde_json::from_str::<Price>("199.5").unwrap(), Price::new(200));
        assert_eq!(serde_json::from_str::<Price>("199.4").unwrap(), Price::new(199));
        assert_eq!(serde_json::from_str::<Price>("250000.0").unwrap(), Price::new(250_000));
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        assert!(serde_json::from_str::<Price>("-1").is_err());
        assert!(serde_json::from_str::<Price>("-0.6").is_err());
        assert!(serde_json::from_str::<Price>("\"150\"").is_err());
    }
}
