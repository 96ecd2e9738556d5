//! Monetary value helpers.
//!
//! Amounts are `rust_decimal::Decimal` (fixed-point) everywhere; binary
//! floating point never touches money.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// ISO-4217 style currency code (three upper-case ASCII letters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl AsRef<str>) -> DomainResult<Self> {
        let code = code.as_ref().trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(DomainError::validation(format!(
                "currency must be a three-letter code, got '{code}'"
            )));
        }
        Ok(Self(code))
    }

    /// Korean won, the home currency.
    pub fn krw() -> Self {
        Self("KRW".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Currency {}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

/// Reject zero and negative amounts for `field`.
pub fn ensure_positive_amount(field: &str, amount: Decimal) -> DomainResult<()> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::validation(format!("{field} must be positive")));
    }
    Ok(())
}

/// `a + b`, or a validation error when the sum leaves the representable range.
pub fn checked_add(a: Decimal, b: Decimal) -> DomainResult<Decimal> {
    a.checked_add(b).ok_or_else(out_of_range)
}

/// `a * b`, or a validation error when the product leaves the representable range.
pub fn checked_mul(a: Decimal, b: Decimal) -> DomainResult<Decimal> {
    a.checked_mul(b).ok_or_else(out_of_range)
}

pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> DomainResult<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, checked_add)
}

fn out_of_range() -> DomainError {
    DomainError::validation("amount is out of the supported range")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_is_normalized_to_upper_case() {
        assert_eq!(Currency::new(" krw ").unwrap().as_str(), "KRW");
    }

    #[test]
    fn currency_rejects_bad_codes() {
        assert!(Currency::new("KR").is_err());
        assert!(Currency::new("K1W").is_err());
        assert!("EURO".parse::<Currency>().is_err());
    }

    #[test]
    fn currency_deserializes_with_validation() {
        let ok: Currency = serde_json::from_str("\"usd\"").unwrap();
        assert_eq!(ok.as_str(), "USD");
        assert!(serde_json::from_str::<Currency>("\"dollars\"").is_err());
    }

    #[test]
    fn positive_amount_guard() {
        assert!(ensure_positive_amount("amount", Decimal::ONE).is_ok());
        assert_eq!(
            ensure_positive_amount("amount", Decimal::ZERO).unwrap_err(),
            DomainError::validation("amount must be positive")
        );
    }

    #[test]
    fn checked_arithmetic_rejects_overflow() {
        assert_eq!(checked_add(Decimal::ONE, Decimal::TWO).unwrap(), Decimal::from(3));
        assert!(checked_add(Decimal::MAX, Decimal::ONE).is_err());
        let huge = Decimal::from(1_000_000_000_000_000_i64);
        assert!(checked_mul(huge, huge).is_err());
        assert!(checked_sum([Decimal::MAX, Decimal::ONE]).is_err());
        assert_eq!(checked_sum(Vec::new()).unwrap(), Decimal::ZERO);
    }
}
