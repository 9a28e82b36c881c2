//! End-to-end enrichment scenarios with stubbed collaborators.

use floodrisk_core::{
    classifier::{classify, LoanRisk},
    event::PipelineEvent,
    geocode::{DisabledGeocoder, Gazetteer},
    loss::LossStrategy,
    pipeline::EnrichmentPipeline,
    portfolio::{NewMortgage, Portfolio},
    rng::{RandomSource, RngBank},
    simulator::{FloodRiskModel, SimulatedFloodRisk},
    types::PropertyType,
};

const CARDIFF: &str = "Cardiff Bay, Cardiff, CF10";

/// Returns a fixed score and ignores its inputs.
struct FixedRisk(f64);

impl FloodRiskModel for FixedRisk {
    fn name(&self) -> &'static str { "fixed" }

    fn score(&mut self, _: PropertyType, _: f64, _: &mut dyn RandomSource) -> f64 {
        self.0
    }
}

fn cardiff_portfolio() -> Portfolio {
    Portfolio::from_mortgages(
        [NewMortgage::new(CARDIFF, 175_000.0, 200_000.0)],
        PropertyType::Residential,
    )
    .unwrap()
}

#[test]
fn cardiff_record_is_fully_enriched() {
    let geocoder = Gazetteer::new().with_entry(CARDIFF, 51.46, -3.16);
    let mut pipeline = EnrichmentPipeline::new(
        Box::new(geocoder),
        Box::new(FixedRisk(0.82)),
        LossStrategy::RiskBased,
        RngBank::new(1),
    );
    let mut portfolio = cardiff_portfolio();

    let report = pipeline.enrich(&mut portfolio).unwrap();
    let record = portfolio.get(0).unwrap();

    assert_eq!(record.latitude, Some(51.46));
    assert_eq!(record.longitude, Some(-3.16));
    assert_eq!(record.flood_risk, Some(0.82));
    assert_eq!(record.loan_risk, Some(LoanRisk::High));
    let lgd = record.loss_given_default.unwrap();
    assert!((lgd - 0.132).abs() < 1e-9, "Expected LGD 0.132, got {lgd}");

    assert_eq!(report.geocoded, 1);
    assert_eq!(report.geocode_misses, 0);
    assert_eq!(report.loss_failures, 0);
}

#[test]
fn missing_geocode_still_scores() {
    let mut pipeline = EnrichmentPipeline::new(
        Box::new(DisabledGeocoder),
        Box::new(FixedRisk(0.82)),
        LossStrategy::RiskBased,
        RngBank::new(1),
    );
    let mut portfolio = cardiff_portfolio();

    let report = pipeline.enrich(&mut portfolio).unwrap();
    let record = portfolio.get(0).unwrap();

    assert_eq!(portfolio.len(), 1, "Record must not be dropped");
    assert!(record.latitude.is_none() && record.longitude.is_none());
    assert_eq!(portfolio.located().count(), 0, "No marker without coordinates");
    assert_eq!(record.flood_risk, Some(0.82));
    assert_eq!(record.loan_risk, Some(LoanRisk::High));
    assert!(record.loss_given_default.is_some());

    assert_eq!(report.geocode_misses, 1);
    assert!(report
        .events_for_row(0)
        .any(|e| matches!(e, PipelineEvent::GeocodeMissed { .. })));
}

#[test]
fn one_miss_does_not_affect_neighbours() {
    let geocoder = Gazetteer::new()
        .with_entry("1 Town Square, Barking, IG11 7LU", 51.54, 0.08)
        .with_entry(CARDIFF, 51.46, -3.16);
    let mut pipeline = EnrichmentPipeline::new(
        Box::new(geocoder),
        Box::new(SimulatedFloodRisk),
        LossStrategy::RiskBased,
        RngBank::new(7),
    );
    let mut portfolio = Portfolio::sample();

    let report = pipeline.enrich(&mut portfolio).unwrap();

    assert_eq!(report.geocoded, 2);
    assert!(portfolio.get(1).unwrap().coordinates().is_none());
    for record in portfolio.iter() {
        let risk = record.flood_risk.expect("every record is scored");
        assert!((0.0..=1.0).contains(&risk));
        assert!(record.loss_given_default.is_some());
    }
}

#[test]
fn out_of_range_model_output_is_clamped() {
    let mut pipeline = EnrichmentPipeline::new(
        Box::new(DisabledGeocoder),
        Box::new(FixedRisk(3.5)),
        LossStrategy::RiskBased,
        RngBank::new(1),
    );
    let mut portfolio = cardiff_portfolio();
    pipeline.enrich(&mut portfolio).unwrap();

    let record = portfolio.get(0).unwrap();
    assert_eq!(record.flood_risk, Some(1.0));
    assert!((record.loss_given_default.unwrap() - 0.15).abs() < 1e-9);
}

#[test]
fn zero_value_property_fails_only_its_own_row() {
    let mut portfolio = Portfolio::sample();
    portfolio
        .push(NewMortgage::new("Vacant Plot, Nowhere", 50_000.0, 0.0), PropertyType::Other)
        .unwrap();

    let mut pipeline = EnrichmentPipeline::new(
        Box::new(DisabledGeocoder),
        Box::new(SimulatedFloodRisk),
        LossStrategy::EquityBased,
        RngBank::new(3),
    );
    let report = pipeline.enrich(&mut portfolio).unwrap();

    assert_eq!(report.loss_failures, 1);
    let failed = portfolio.get(3).unwrap();
    assert!(failed.loss_given_default.is_none());
    assert!(failed.loan_risk.is_some(), "Scoring still happens for the failed row");
    assert!(report.events_for_row(3).any(|e| matches!(
        e,
        PipelineEvent::LossEstimateFailed { strategy: LossStrategy::EquityBased, .. }
    )));

    let barking = portfolio.get(0).unwrap().loss_given_default.unwrap();
    assert!((barking - 250_000.0 / 300_000.0).abs() < 1e-9, "Got {barking}");
}

#[test]
fn reclassifying_stored_scores_is_stable() {
    let mut pipeline = EnrichmentPipeline::new(
        Box::new(DisabledGeocoder),
        Box::new(SimulatedFloodRisk),
        LossStrategy::RiskBased,
        RngBank::new(2024),
    );
    let mut portfolio = Portfolio::sample();
    pipeline.enrich(&mut portfolio).unwrap();

    for record in portfolio.iter() {
        let risk = record.flood_risk.unwrap();
        assert_eq!(Some(classify(risk)), record.loan_risk);
        assert_eq!(classify(risk), classify(risk));
    }
}

#[test]
fn event_log_brackets_each_run() {
    let mut pipeline = EnrichmentPipeline::new(
        Box::new(DisabledGeocoder),
        Box::new(SimulatedFloodRisk),
        LossStrategy::RiskBased,
        RngBank::new(5),
    );
    let mut portfolio = Portfolio::sample();
    let report = pipeline.enrich(&mut portfolio).unwrap();

    assert_eq!(report.events.first().map(|e| e.type_name()), Some("run_started"));
    assert_eq!(report.events.last().map(|e| e.type_name()), Some("run_completed"));
    // geocode + simulate + classify + loss per row, plus the two brackets
    assert_eq!(report.events.len(), 3 * 4 + 2);

    let jsonl = report.events_jsonl().unwrap();
    assert_eq!(jsonl.lines().count(), report.events.len());
    assert!(jsonl.lines().next().unwrap().contains(r#""type":"run_started""#));
}

#[test]
fn non_finite_coordinates_count_as_a_miss() {
    let geocoder = Gazetteer::new().with_entry(CARDIFF, f64::NAN, -3.16);
    let mut pipeline = EnrichmentPipeline::new(
        Box::new(geocoder),
        Box::new(FixedRisk(0.82)),
        LossStrategy::RiskBased,
        RngBank::new(1),
    );
    let mut portfolio = cardiff_portfolio();

    let report = pipeline.enrich(&mut portfolio).unwrap();
    let record = portfolio.get(0).unwrap();

    assert_eq!(report.geocoded, portfolio.located().count());
    assert_eq!(report.geocoded, 0);
    assert_eq!(report.geocode_misses, 1);
    assert!(record.latitude.is_none() && record.longitude.is_none());
    assert!(report
        .events_for_row(0)
        .any(|e| matches!(e, PipelineEvent::GeocodeMissed { .. })));
    assert!(!report
        .events_for_row(0)
        .any(|e| matches!(e, PipelineEvent::RecordGeocoded { .. })));
    assert_eq!(record.loan_risk, Some(LoanRisk::High));
}
