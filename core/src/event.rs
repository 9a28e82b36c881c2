//! The enrichment event log.
//!
//! Every state change the pipeline makes to a record is mirrored by
//! one event, in record order. The log is serialisable as JSON lines.

use crate::{
    classifier::LoanRisk,
    loss::LossStrategy,
    types::{RowIndex, RunId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    // ── Run boundaries ─────────────────────────────
    RunStarted {
        run_id:  RunId,
        seed:    u64,
        records: usize,
        model:   String,
        geocoder: String,
    },
    RunCompleted {
        run_id:         RunId,
        records:        usize,
        geocoded:       usize,
        loss_failures:  usize,
    },

    // ── Per-record steps ───────────────────────────
    RecordGeocoded {
        row:       RowIndex,
        latitude:  f64,
        longitude: f64,
    },
    GeocodeMissed {
        row:     RowIndex,
        address: String,
    },
    FloodRiskSimulated {
        row:                RowIndex,
        proximity_to_water: f64,
        flood_risk:         f64,
    },
    LoanRiskClassified {
        row:       RowIndex,
        loan_risk: LoanRisk,
    },
    LossEstimated {
        row:                RowIndex,
        strategy:           LossStrategy,
        loss_given_default: f64,
    },
    LossEstimateFailed {
        row:      RowIndex,
        strategy: LossStrategy,
        reason:   String,
    },
}

impl PipelineEvent {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "run_started",
            Self::RunCompleted { .. } => "run_completed",
            Self::RecordGeocoded { .. } => "record_geocoded",
            Self::GeocodeMissed { .. } => "geocode_missed",
            Self::FloodRiskSimulated { .. } => "flood_risk_simulated",
            Self::LoanRiskClassified { .. } => "loan_risk_classified",
            Self::LossEstimated { .. } => "loss_estimated",
            Self::LossEstimateFailed { .. } => "loss_estimate_failed",
        }
    }

    /// Row the event refers to, if any.
    pub fn row(&self) -> Option<RowIndex> {
        match self {
            Self::RunStarted { .. } | Self::RunCompleted { .. } => None,
            Self::RecordGeocoded { row, .. }
            | Self::GeocodeMissed { row, .. }
            | Self::FloodRiskSimulated { row, .. }
            | Self::LoanRiskClassified { row, .. }
            | Self::LossEstimated { row, .. }
            | Self::LossEstimateFailed { row, .. } => Some(*row),
        }
    }
}
