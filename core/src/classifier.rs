//! Flood-risk score → loan risk label.
//!
//! Intervals are closed at the lower bound:
//!   [0, 0.3) Low, [0.3, 0.7) Moderate, [0.7, 1] High.

use crate::types::clamp_unit;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MODERATE_THRESHOLD: f64 = 0.3;
pub const HIGH_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoanRisk {
    Low,
    Moderate,
    High,
}

impl LoanRisk {
    pub const ALL: [LoanRisk; 3] = [LoanRisk::Low, LoanRisk::Moderate, LoanRisk::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }

    /// Long-form assessment text used in console output.
    pub fn assessment(&self) -> &'static str {
        match self {
            Self::Low => "Low risk",
            Self::Moderate => "Moderate risk",
            Self::High => "High risk",
        }
    }
}

impl fmt::Display for LoanRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total over all f64: out-of-range scores are clamped first.
pub fn classify(flood_risk: f64) -> LoanRisk {
    let risk = clamp_unit(flood_risk);
    if risk < MODERATE_THRESHOLD {
        LoanRisk::Low
    } else if risk < HIGH_THRESHOLD {
        LoanRisk::Moderate
    } else {
        LoanRisk::High
    }
}
