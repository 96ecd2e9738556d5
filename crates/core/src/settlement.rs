//! Calculated settlement status for payables and receivables.
//!
//! The status is **never stored**: read views derive it from the sum of
//! payment rows every time they are built.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment progress of a financial document, derived from its payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementStatus {
    Pending,
    PartiallyPaid,
    Paid,
}

impl SettlementStatus {
    /// Derive the status from the document total and the summed payments.
    ///
    /// Order matters: `paid >= total` wins, so an exactly-settled document is
    /// PAID. Comparison is exact because both sides are fixed-point decimals.
    pub fn calculate(total: Decimal, paid: Decimal) -> Self {
        if paid >= total {
            SettlementStatus::Paid
        } else if paid > Decimal::ZERO {
            SettlementStatus::PartiallyPaid
        } else {
            SettlementStatus::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Pending => "PENDING",
            SettlementStatus::PartiallyPaid => "PARTIALLY_PAID",
            SettlementStatus::Paid => "PAID",
        }
    }
}

/// Outstanding amount, clamped at zero.
pub fn remaining_balance(total: Decimal, paid: Decimal) -> Decimal {
    (total - paid).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fully_paid_is_paid() {
        let total = Decimal::from(1000);
        assert_eq!(
            SettlementStatus::calculate(total, Decimal::from(1000)),
            SettlementStatus::Paid
        );
        assert_eq!(remaining_balance(total, Decimal::from(1000)), Decimal::ZERO);
    }

    #[test]
    fn partial_payment_reports_remaining() {
        let total = Decimal::from(1000);
        let paid = Decimal::from(400);
        assert_eq!(
            SettlementStatus::calculate(total, paid),
            SettlementStatus::PartiallyPaid
        );
        assert_eq!(remaining_balance(total, paid), Decimal::from(600));
    }

    #[test]
    fn no_payment_is_pending() {
        assert_eq!(
            SettlementStatus::calculate(Decimal::from(1000), Decimal::ZERO),
            SettlementStatus::Pending
        );
    }

    #[test]
    fn decimal_cents_do_not_drift() {
        // 0.1 + 0.2 == 0.3 exactly in fixed-point.
        let total: Decimal = "0.30".parse().unwrap();
        let paid: Decimal = "0.1".parse::<Decimal>().unwrap() + "0.2".parse::<Decimal>().unwrap();
        assert_eq!(SettlementStatus::calculate(total, paid), SettlementStatus::Paid);
    }

    #[test]
    fn serializes_screaming_snake_case() {
        let json = serde_json::to_string(&SettlementStatus::PartiallyPaid).unwrap();
        assert_eq!(json, "\"PARTIALLY_PAID\"");
        assert_eq!(SettlementStatus::PartiallyPaid.as_str(), "PARTIALLY_PAID");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: for any positive total and any split into payments, the
        /// status matches the ordering rule and remaining + paid covers total.
        #[test]
        fn status_follows_ordering_rule(
            total_cents in 1i64..10_000_000i64,
            payments in prop::collection::vec(0i64..5_000_000i64, 0..6)
        ) {
            let total = Decimal::new(total_cents, 2);
            let paid = payments
                .iter()
                .fold(Decimal::ZERO, |acc, p| acc + Decimal::new(*p, 2));

            let status = SettlementStatus::calculate(total, paid);
            let remaining = remaining_balance(total, paid);

            if paid >= total {
                prop_assert_eq!(status, SettlementStatus::Paid);
                prop_assert_eq!(remaining, Decimal::ZERO);
            } else if paid > Decimal::ZERO {
                prop_assert_eq!(status, SettlementStatus::PartiallyPaid);
                prop_assert_eq!(remaining + paid, total);
            } else {
                prop_assert_eq!(status, SettlementStatus::Pending);
                prop_assert_eq!(remaining, total);
            }
        }
    }
}
