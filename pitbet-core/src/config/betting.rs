//! Limits and rates applied by the bet service.

use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BettingRules {
    pub min_bet: Decimal,
    pub max_bet: Decimal,
    /// Fraction of the losing stake kept by the house.
    pub commission_rate: Decimal,
    /// Upper bound of larger stake / smaller stake for PAGO bets.
    pub max_pago_ratio: Decimal,
    /// Pending proposals older than this are expired.
    pub pago_ttl: Duration,
    pub expiry_scan_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("min_bet and max_bet must be positive")]
    NonPositiveLimit,
    #[error("min_bet ({min}) exceeds max_bet ({max})")]
    InvertedLimits { min: Decimal, max: Decimal },
    #[error("commission_rate must be in [0, 1), got {0}")]
    CommissionOutOfRange(Decimal),
    #[error("max_pago_ratio must be at least 1, got {0}")]
    PagoRatioTooSmall(Decimal),
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

impl Default for BettingRules {
    fn default() -> Self {
        Self {
            min_bet: Decimal::from(10),
            max_bet: Decimal::from(100_000),
            commission_rate: Decimal::new(10, 2),
            max_pago_ratio: Decimal::from(3),
            pago_ttl: Duration::from_secs(300),
            expiry_scan_interval: Duration::from_secs(15),
        }
    }
}

impl BettingRules {
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.min_bet <= Decimal::ZERO || self.max_bet <= Decimal::ZERO {
            return Err(RulesError::NonPositiveLimit);
        }
        if self.min_bet > self.max_bet {
            return Err(RulesError::InvertedLimits {
                min: self.min_bet,
                max: self.max_bet,
            });
        }
        if self.commission_rate < Decimal::ZERO || self.commission_rate >= Decimal::ONE {
            return Err(RulesError::CommissionOutOfRange(self.commission_rate));
        }
        if self.max_pago_ratio < Decimal::ONE {
            return Err(RulesError::PagoRatioTooSmall(self.max_pago_ratio));
        }
        if self.pago_ttl.is_zero() {
            return Err(RulesError::ZeroDuration("pago_ttl_secs"));
        }
        if self.expiry_scan_interval.is_zero() {
            return Err(RulesError::ZeroDuration("expiry_scan_secs"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(BettingRules::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_limits() {
        let rules = BettingRules {
            min_bet: dec!(0),
            ..Default::default()
        };
        assert_eq!(rules.validate(), Err(RulesError::NonPositiveLimit));

        let rules = BettingRules {
            min_bet: dec!(500),
            max_bet: dec!(100),
            ..Default::default()
        };
        assert!(matches!(
            rules.validate(),
            Err(RulesError::InvertedLimits { .. })
        ));
    }

    #[test]
    fn rejects_bad_rates() {
        for rate in [dec!(-0.01), dec!(1), dec!(1.5)] {
            let rules = BettingRules {
                commission_rate: rate,
                ..Default::default()
            };
            assert_eq!(
                rules.validate(),
                Err(RulesError::CommissionOutOfRange(rate))
            );
        }

        let rules = BettingRules {
            max_pago_ratio: dec!(0.5),
            ..Default::default()
        };
        assert_eq!(
            rules.validate(),
            Err(RulesError::PagoRatioTooSmall(dec!(0.5)))
        );
    }

    #[test]
    fn rejects_zero_durations() {
        let rules = BettingRules {
            expiry_scan_interval: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(
            rules.validate(),
            Err(RulesError::ZeroDuration("expiry_scan_secs"))
        );
    }
}
