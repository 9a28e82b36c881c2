//! Loss-given-default estimation.
//!
//! Two strategies exist side by side:
//!   - risk-based:   0.05 + flood_risk * 0.1
//!   - equity-based: 1 - (value - loan) / value
//!
//! Both are clamped into [0, 1].

use crate::{
    error::{RiskError, RiskResult},
    portfolio::PropertyRecord,
    types::clamp_unit,
};
use serde::{Deserialize, Serialize};

pub const BASE_LOSS_RATE: f64 = 0.05;
pub const FLOOD_RISK_LOSS_WEIGHT: f64 = 0.1;

/// Risk-based LGD.
///
/// NOTE: `_loan_amount` does not enter the result. It is kept in the
/// signature because callers historically pass it; a principal-scaled
/// figure is available separately as `expected_loss_amount`.
pub fn loss_given_default(_loan_amount: f64, flood_risk: f64) -> f64 {
    let risk = clamp_unit(flood_risk);
    clamp_unit(BASE_LOSS_RATE + risk * FLOOD_RISK_LOSS_WEIGHT)
}

/// Equity-based LGD: the loan-to-value share of the property.
pub fn loss_given_default_from_equity(loan_amount: f64, property_value: f64) -> RiskResult<f64> {
    let equity = equity_ratio(loan_amount, property_value)?;
    Ok(clamp_unit(1.0 - equity))
}

/// Borrower equity as a fraction of property value.
/// Negative when the loan exceeds the value.
pub fn equity_ratio(loan_amount: f64, property_value: f64) -> RiskResult<f64> {
    check_amount("loan_amount", loan_amount)?;
    check_amount("property_value", property_value)?;
    if property_value == 0.0 {
        return Err(RiskError::DivisionByZero {
            operation: "equity ratio (property value is zero)",
        });
    }
    Ok((property_value - loan_amount) / property_value)
}

/// Principal-scaled loss: loan amount times risk-based LGD.
pub fn expected_loss_amount(loan_amount: f64, flood_risk: f64) -> RiskResult<f64> {
    check_amount("loan_amount", loan_amount)?;
    Ok(loan_amount * loss_given_default(loan_amount, flood_risk))
}

pub(crate) fn check_amount(field: &'static str, value: f64) -> RiskResult<()> {
    if !value.is_finite() {
        return Err(RiskError::InvalidInput {
            field,
            reason: format!("{value} is not a finite number"),
        });
    }
    if value < 0.0 {
        return Err(RiskError::InvalidInput {
            field,
            reason: format!("{value} is negative"),
        });
    }
    Ok(())
}

/// Which LGD variant the pipeline applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossStrategy {
    #[default]
    RiskBased,
    EquityBased,
}

impl LossStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RiskBased => "risk_based",
            Self::EquityBased => "equity_based",
        }
    }

    /// Estimate LGD for a record. Risk-based estimation needs a
    /// flood-risk score to be present already.
    pub fn estimate(&self, record: &PropertyRecord) -> RiskResult<f64> {
        match self {
            Self::RiskBased => {
                let risk = record.flood_risk.ok_or_else(|| RiskError::InvalidInput {
                    field: "flood_risk",
                    reason: "record has not been scored".into(),
                })?;
                Ok(loss_given_default(record.loan_amount, risk))
            }
            Self::EquityBased => {
                loss_given_default_from_equity(record.loan_amount, record.property_value)
            }
        }
    }
}

impl std::str::FromStr for LossStrategy {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "risk_based" | "risk" => Ok(Self::RiskBased),
            "equity_based" | "equity" => Ok(Self::EquityBased),
            other => Err(RiskError::Parse {
                field: "loss_strategy",
                input: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn risk_based_endpoints() {
        assert!((loss_given_default(250_000.0, 0.0) - 0.05).abs() < EPS);
        assert!((loss_given_default(250_000.0, 1.0) - 0.15).abs() < EPS);
        assert!((loss_given_default(250_000.0, 0.8) - 0.13).abs() < EPS);
    }

    #[test]
    fn loan_amount_does_not_change_risk_based_lgd() {
        let a = loss_given_default(1.0, 0.42);
        let b = loss_given_default(9_000_000.0, 0.42);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn risk_based_is_non_decreasing() {
        let mut previous = 0.0;
        for i in 0..=100 {
            let lgd = loss_given_default(0.0, i as f64 / 100.0);
            assert!(lgd >= previous, "LGD decreased at {i}");
            previous = lgd;
        }
    }

    #[test]
    fn risk_based_clamps_out_of_range_scores() {
        assert!((loss_given_default(0.0, 5.0) - 0.15).abs() < EPS);
        assert!((loss_given_default(0.0, -5.0) - 0.05).abs() < EPS);
    }

    #[test]
    fn equity_based_matches_loan_to_value() {
        let lgd = loss_given_default_from_equity(250_000.0, 300_000.0).unwrap();
        assert!((lgd - 0.833_333).abs() < 1e-4, "Got {lgd}");

        let equity = equity_ratio(250_000.0, 300_000.0).unwrap();
        assert!((equity - 0.166_667).abs() < 1e-4, "Got {equity}");
    }

    #[test]
    fn equity_based_rejects_zero_value() {
        let err = loss_given_default_from_equity(100_000.0, 0.0).unwrap_err();
        assert!(matches!(err, RiskError::DivisionByZero { .. }), "Got {err:?}");
    }

    #[test]
    fn equity_based_rejects_bad_amounts() {
        assert!(matches!(
            loss_given_default_from_equity(f64::NAN, 100.0),
            Err(RiskError::InvalidInput { field: "loan_amount", .. })
        ));
        assert!(matches!(
            loss_given_default_from_equity(10.0, -100.0),
            Err(RiskError::InvalidInput { field: "property_value", .. })
        ));
    }

    #[test]
    fn underwater_loan_clamps_to_full_loss() {
        let lgd = loss_given_default_from_equity(600_000.0, 500_000.0).unwrap();
        assert_eq!(lgd, 1.0);
    }

    #[test]
    fn expected_loss_scales_with_principal() {
        let loss = expected_loss_amount(175_000.0, 0.82).unwrap();
        assert!((loss - 175_000.0 * 0.132).abs() < 1e-6, "Got {loss}");
    }

    #[test]
    fn strategy_parses() {
        assert_eq!("equity_based".parse::<LossStrategy>().unwrap(), LossStrategy::EquityBased);
        assert_eq!("risk".parse::<LossStrategy>().unwrap(), LossStrategy::RiskBased);
        assert!("ltv".parse::<LossStrategy>().is_err());
    }
}
