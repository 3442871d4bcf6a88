//! Parking fee calculation
//!
//! One rate strategy per spot class, resolved by an exhaustive match.
//! Fees are prorated by the minute and rounded half away from zero to
//! cents; the configured minimum applies on top.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::domain::SpotClass;

const MINUTES_PER_HOUR: i64 = 60;

/// Priced view of a (possibly still running) stay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeQuote {
    pub duration_minutes: i64,
    pub class: SpotClass,
    pub hourly_rate: Decimal,
    pub amount_due: Decimal,
    pub currency: String,
    pub summary: String,
}

#[derive(Debug, Clone)]
pub struct FeeCalculator {
    pricing: PricingConfig,
}

impl FeeCalculator {
    pub fn new(pricing: PricingConfig) -> Self {
        Self { pricing }
    }

    pub fn currency(&self) -> &str {
        &self.pricing.currency
    }

    pub fn minimum_fee(&self) -> Decimal {
        self.pricing.minimum_fee
    }

    pub fn hourly_rate(&self, class: SpotClass) -> Decimal {
        match class {
            SpotClass::Vip => self.pricing.vip_hourly_rate,
            SpotClass::Standard | SpotClass::Handicap | SpotClass::EvCharging => {
                self.pricing.standard_hourly_rate
            }
        }
    }

    /// The class strategy on its own: zero for a missing or non-positive
    /// duration, no minimum floor.
    pub fn prorated_fee(&self, duration_minutes: Option<i64>, class: SpotClass) -> Decimal {
        match duration_minutes {
            Some(minutes) if minutes > 0 => (Decimal::from(minutes) * self.hourly_rate(class)
                / Decimal::from(MINUTES_PER_HOUR))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            _ => Decimal::ZERO,
        }
    }

    /// Amount due for a stay; never below the minimum fee
    pub fn calculate_fee(&self, duration_minutes: i64, class: SpotClass) -> Decimal {
        self.prorated_fee(Some(duration_minutes), class)
            .max(self.pricing.minimum_fee)
    }

    pub fn quote(&self, duration_minutes: i64, class: SpotClass) -> FeeQuote {
        let duration_minutes = duration_minutes.max(0);
        let hourly_rate = self.hourly_rate(class);
        let amount_due = self.calculate_fee(duration_minutes, class);
        let summary = format!(
            "{}h {}min @ ${:.2}/hr = ${:.2}",
            duration_minutes / MINUTES_PER_HOUR,
            duration_minutes % MINUTES_PER_HOUR,
            hourly_rate,
            amount_due
        );
        FeeQuote {
            duration_minutes,
            class,
            hourly_rate,
            amount_due,
            currency: self.pricing.currency.clone(),
            summary,
        }
    }
}

impl Default for FeeCalculator {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn ninety_minutes_standard_is_fifteen() {
        let fees = FeeCalculator::default();
        assert_eq!(fees.calculate_fee(90, SpotClass::Standard), dec("15.00"));
    }

    #[test]
    fn vip_uses_its_own_rate() {
        let fees = FeeCalculator::default();
        assert_eq!(fees.calculate_fee(90, SpotClass::Vip), dec("30.00"));
    }

    #[test]
    fn other_classes_fall_back_to_standard() {
        let fees = FeeCalculator::default();
        for class in [SpotClass::Handicap, SpotClass::EvCharging, SpotClass::from_str_lossy("REGULAR")] {
            assert_eq!(fees.calculate_fee(60, class), dec("10.00"));
        }
    }

    #[test]
    fn prorates_by_minute_with_half_up_rounding() {
        let fees = FeeCalculator::default();
        // 7 min @ 10/hr = 1.1666..
        assert_eq!(fees.prorated_fee(Some(7), SpotClass::Standard), dec("1.17"));
        // 1 min @ 10/hr = 0.1666..
        assert_eq!(fees.prorated_fee(Some(1), SpotClass::Standard), dec("0.17"));
    }

    #[test]
    fn midpoint_rounds_away_from_zero() {
        let fees = FeeCalculator::new(PricingConfig {
            standard_hourly_rate: dec("0.30"),
            ..PricingConfig::default()
        });
        // 1 min @ 0.30/hr = 0.005
        assert_eq!(fees.prorated_fee(Some(1), SpotClass::Standard), dec("0.01"));
    }

    #[test]
    fn strategy_is_zero_for_missing_or_non_positive_duration() {
        let fees = FeeCalculator::default();
        assert_eq!(fees.prorated_fee(None, SpotClass::Vip), Decimal::ZERO);
        assert_eq!(fees.prorated_fee(Some(0), SpotClass::Vip), Decimal::ZERO);
        assert_eq!(fees.prorated_fee(Some(-5), SpotClass::Vip), Decimal::ZERO);
    }

    #[test]
    fn minimum_fee_floor() {
        let fees = FeeCalculator::default();
        assert_eq!(fees.calculate_fee(0, SpotClass::Standard), Decimal::ONE);
        assert_eq!(fees.calculate_fee(3, SpotClass::Standard), Decimal::ONE);
        assert_eq!(fees.calculate_fee(6, SpotClass::Standard), Decimal::ONE);
        assert_eq!(fees.calculate_fee(7, SpotClass::Standard), dec("1.17"));
    }

    #[test]
    fn fee_is_monotonic_in_duration() {
        let fees = FeeCalculator::default();
        for class in [SpotClass::Standard, SpotClass::Vip] {
            let mut previous = Decimal::ZERO;
            for minutes in -10..=24 * 60 {
                let fee = fees.calculate_fee(minutes, class);
                assert!(fee >= previous, "{minutes} min dropped to {fee}");
                assert!(fee >= fees.minimum_fee());
                previous = fee;
            }
        }
    }

    #[test]
    fn quote_summary() {
        let quote = FeeCalculator::default().quote(90, SpotClass::Standard);
        assert_eq!(quote.summary, "1h 30min @ $10.00/hr = $15.00");
        assert_eq!(quote.currency, "USD");
        assert_eq!(quote.amount_due, dec("15.00"));
    }
}
