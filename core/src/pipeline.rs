//! The enrichment pipeline.
//!
//! PER-RECORD ORDER (fixed):
//!   1. Geocode            (miss → null coordinates, never fatal)
//!   2. Simulate flood risk
//!   3. Classify loan risk
//!   4. Estimate LGD       (failure → LGD left empty, never fatal)
//!
//! RULES:
//!   - Records are processed in table order, one at a time.
//!   - No state carries from one record to the next except the RNG
//!     streams, which are drawn in row order.
//!   - Every step is recorded in the event log.

use crate::{
    classifier::classify,
    config::PipelineConfig,
    error::RiskResult,
    event::PipelineEvent,
    geocode::Geocoder,
    loss::LossStrategy,
    portfolio::{Portfolio, PropertyRecord},
    rng::{RandomSource, RngBank, StreamSlot},
    simulator::{FloodRiskModel, SimulatedFloodRisk},
    types::{clamp_unit, RowIndex, RunId},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentReport {
    pub run_id:         RunId,
    pub seed:           u64,
    pub generated_at:   DateTime<Utc>,
    pub events:         Vec<PipelineEvent>,
    pub geocoded:       usize,
    pub geocode_misses: usize,
    pub loss_failures:  usize,
}

impl EnrichmentReport {
    pub fn events_for_row(&self, row: RowIndex) -> impl Iterator<Item = &PipelineEvent> {
        self.events.iter().filter(move |e| e.row() == Some(row))
    }

    /// One JSON object per line.
    pub fn events_jsonl(&self) -> RiskResult<String> {
        let mut out = String::new();
        for event in &self.events {
            out.push_str(&serde_json::to_string(event)?);
            out.push('\n');
        }
        Ok(out)
    }
}

pub struct EnrichmentPipeline {
    geocoder:      Box<dyn Geocoder>,
    model:         Box<dyn FloodRiskModel>,
    loss_strategy: LossStrategy,
    rng_bank:      RngBank,
}

#[derive(Default)]
struct RecordOutcome {
    geocoded:    bool,
    loss_failed: bool,
}

impl EnrichmentPipeline {
    pub fn new(
        geocoder: Box<dyn Geocoder>,
        model: Box<dyn FloodRiskModel>,
        loss_strategy: LossStrategy,
        rng_bank: RngBank,
    ) -> Self {
        Self {
            geocoder,
            model,
            loss_strategy,
            rng_bank,
        }
    }

    /// Build the production pipeline for a config: simulated risk,
    /// the configured loss strategy, seeded or entropy-backed RNG.
    pub fn from_config(config: &PipelineConfig, geocoder: Box<dyn Geocoder>) -> Self {
        let rng_bank = match config.seed {
            Some(seed) => RngBank::new(seed),
            None => RngBank::from_entropy(),
        };
        Self::new(geocoder, Box::new(SimulatedFloodRisk), config.loss_strategy, rng_bank)
    }

    pub fn seed(&self) -> u64 {
        self.rng_bank.master_seed()
    }

    pub fn loss_strategy(&self) -> LossStrategy {
        self.loss_strategy
    }

    /// Enrich every record in place.
    ///
    /// Per-record failures are logged and recorded; only a failure to
    /// build the report itself is returned as an error.
    pub fn enrich(&mut self, portfolio: &mut Portfolio) -> RiskResult<EnrichmentReport> {
        let run_id = Uuid::new_v4().to_string();
        let seed = self.rng_bank.master_seed();
        let mut risk_rng = self.rng_bank.stream(StreamSlot::FloodRisk);
        let mut proximity_rng = self.rng_bank.stream(StreamSlot::Proximity);

        log::info!(
            "run={run_id} seed={seed} records={} model={} geocoder={} strategy={}",
            portfolio.len(),
            self.model.name(),
            self.geocoder.name(),
            self.loss_strategy.as_str()
        );

        let mut events = vec![PipelineEvent::RunStarted {
            run_id: run_id.clone(),
            seed,
            records: portfolio.len(),
            model: self.model.name().to_string(),
            geocoder: self.geocoder.name().to_string(),
        }];
        let mut geocoded = 0;
        let mut loss_failures = 0;

        for (row, record) in portfolio.records_mut().iter_mut().enumerate() {
            let outcome = self.enrich_record(
                row,
                record,
                &mut risk_rng,
                &mut proximity_rng,
                &mut events,
            );
            geocoded += usize::from(outcome.geocoded);
            loss_failures += usize::from(outcome.loss_failed);
        }

        events.push(PipelineEvent::RunCompleted {
            run_id: run_id.clone(),
            records: portfolio.len(),
            geocoded,
            loss_failures,
        });

        log::info!(
            "run={run_id} done: geocoded={geocoded}/{} loss_failures={loss_failures}",
            portfolio.len()
        );

        Ok(EnrichmentReport {
            run_id,
            seed,
            generated_at: Utc::now(),
            events,
            geocoded,
            geocode_misses: portfolio.len() - geocoded,
            loss_failures,
        })
    }

    fn enrich_record(
        &mut self,
        row: RowIndex,
        record: &mut PropertyRecord,
        risk_rng: &mut dyn RandomSource,
        proximity_rng: &mut dyn RandomSource,
        events: &mut Vec<PipelineEvent>,
    ) -> RecordOutcome {
        let mut outcome = RecordOutcome::default();

        // 1. Geocode. Non-finite coordinates count as a miss.
        let coords = self
            .geocoder
            .geocode(&record.address)
            .filter(|c| c.latitude.is_finite() && c.longitude.is_finite());
        record.set_coordinates(coords);
        match record.coordinates() {
            Some(c) => {
                outcome.geocoded = true;
                events.push(PipelineEvent::RecordGeocoded {
                    row,
                    latitude: c.latitude,
                    longitude: c.longitude,
                });
            }
            None => {
                log::warn!("row={row} no coordinates for {:?}", record.address);
                events.push(PipelineEvent::GeocodeMissed {
                    row,
                    address: record.address.clone(),
                });
            }
        }

        // 2. Simulate. The proximity draw only happens when the record
        //    has no measured value, so it uses its own stream.
        let proximity = match record.proximity_to_water {
            Some(p) => p,
            None => proximity_rng.next_f64(),
        };
        let flood_risk = clamp_unit(self.model.score(record.property_type, proximity, risk_rng));
        record.flood_risk = Some(flood_risk);
        events.push(PipelineEvent::FloodRiskSimulated {
            row,
            proximity_to_water: proximity,
            flood_risk,
        });

        // 3. Classify
        let loan_risk = classify(flood_risk);
        record.loan_risk = Some(loan_risk);
        events.push(PipelineEvent::LoanRiskClassified { row, loan_risk });

        // 4. Estimate loss
        match self.loss_strategy.estimate(record) {
            Ok(lgd) => {
                let lgd = clamp_unit(lgd);
                record.loss_given_default = Some(lgd);
                events.push(PipelineEvent::LossEstimated {
                    row,
                    strategy: self.loss_strategy,
                    loss_given_default: lgd,
                });
            }
            Err(e) => {
                log::warn!("row={row} loss estimate failed: {e}");
                record.loss_given_default = None;
                outcome.loss_failed = true;
                events.push(PipelineEvent::LossEstimateFailed {
                    row,
                    strategy: self.loss_strategy,
                    reason: e.to_string(),
                });
            }
        }

        log::debug!(
            "row={row} risk={flood_risk:.4} label={loan_risk} lgd={:?}",
            record.loss_given_default
        );

        outcome
    }
}
