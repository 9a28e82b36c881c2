//! Portfolio-level figures: label distribution, score histogram,
//! and loss aggregates.

use crate::{classifier::LoanRisk, portfolio::Portfolio};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const HISTOGRAM_BINS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub records:             usize,
    pub geocoded:            usize,
    pub by_loan_risk:        BTreeMap<LoanRisk, usize>,
    /// Counts of flood-risk scores in ten equal bins over [0, 1].
    pub flood_risk_histogram: [usize; HISTOGRAM_BINS],
    pub mean_flood_risk:     Option<f64>,
    pub mean_lgd:            Option<f64>,
    /// Σ loan_amount × LGD over records that have an LGD.
    pub expected_loss:       f64,
}

impl PortfolioSummary {
    pub fn from_portfolio(portfolio: &Portfolio) -> Self {
        let mut by_loan_risk: BTreeMap<LoanRisk, usize> =
            LoanRisk::ALL.iter().map(|label| (*label, 0)).collect();
        let mut histogram = [0usize; HISTOGRAM_BINS];
        let mut risks = Vec::new();
        let mut lgds = Vec::new();
        let mut expected_loss = 0.0;

        for record in portfolio.iter() {
            if let Some(label) = record.loan_risk {
                *by_loan_risk.entry(label).or_insert(0) += 1;
            }
            if let Some(risk) = record.flood_risk {
                histogram[histogram_bin(risk)] += 1;
                risks.push(risk);
            }
            if let Some(lgd) = record.loss_given_default {
                expected_loss += record.loan_amount * lgd;
                lgds.push(lgd);
            }
        }

        Self {
            records: portfolio.len(),
            geocoded: portfolio.located().count(),
            by_loan_risk,
            flood_risk_histogram: histogram,
            mean_flood_risk: mean(&risks),
            mean_lgd: mean(&lgds),
            expected_loss,
        }
    }

    pub fn count(&self, label: LoanRisk) -> usize {
        self.by_loan_risk.get(&label).copied().unwrap_or(0)
    }

    /// Share of classified records carrying `label`.
    pub fn share(&self, label: LoanRisk) -> f64 {
        let classified: usize = self.by_loan_risk.values().sum();
        if classified == 0 {
            return 0.0;
        }
        self.count(label) as f64 / classified as f64
    }
}

/// Bin index for a score; 1.0 lands in the last bin.
pub fn histogram_bin(risk: f64) -> usize {
    let scaled = (risk.clamp(0.0, 1.0) * HISTOGRAM_BINS as f64).floor() as usize;
    scaled.min(HISTOGRAM_BINS - 1)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

impl fmt::Display for PortfolioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== PORTFOLIO SUMMARY ===")?;
        writeln!(f, "  records:        {}", self.records)?;
        writeln!(f, "  geocoded:       {}", self.geocoded)?;
        for label in LoanRisk::ALL {
            writeln!(
                f,
                "  {:<15} {} ({:.0}%)",
                format!("{}:", label.assessment()),
                self.count(label),
                self.share(label) * 100.0
            )?;
        }
        match self.mean_flood_risk {
            Some(m) => writeln!(f, "  mean risk:      {m:.2}")?,
            None => writeln!(f, "  mean risk:      n/a")?,
        }
        match self.mean_lgd {
            Some(m) => writeln!(f, "  mean LGD:       {:.2}%", m * 100.0)?,
            None => writeln!(f, "  mean LGD:       n/a")?,
        }
        writeln!(f, "  expected loss:  {:.0}", self.expected_loss)?;
        writeln!(f, "  risk histogram:")?;
        for (i, count) in self.flood_risk_histogram.iter().enumerate() {
            let lo = i as f64 / HISTOGRAM_BINS as f64;
            let hi = (i + 1) as f64 / HISTOGRAM_BINS as f64;
            writeln!(f, "    [{lo:.1}, {hi:.1}) {}", "#".repeat(*count))?;
        }
        Ok(())
    }
}
