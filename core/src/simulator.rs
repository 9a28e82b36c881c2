//! Flood-risk simulation.
//!
//! The score is a base rate per property category, nudged up by
//! proximity to water and perturbed by one uniform draw:
//!
//!   risk = base + proximity * 0.02 + U(-0.05, 0.05), clamped to [0, 1]

use crate::{
    rng::RandomSource,
    types::{clamp_unit, PropertyType},
};

pub const RESIDENTIAL_BASE_RISK: f64 = 0.3;
pub const OTHER_BASE_RISK: f64 = 0.5;
pub const PROXIMITY_WEIGHT: f64 = 0.02;
pub const PERTURBATION: f64 = 0.05;

/// Simulate a flood-risk score. Consumes exactly one draw from `rng`.
///
/// `proximity_to_water` is taken as given; a non-finite value
/// contributes nothing. The result always lies in [0, 1].
pub fn simulate_flood_risk(
    property_type: PropertyType,
    proximity_to_water: f64,
    rng: &mut dyn RandomSource,
) -> f64 {
    let base = match property_type {
        PropertyType::Residential => RESIDENTIAL_BASE_RISK,
        PropertyType::Other => OTHER_BASE_RISK,
    };
    let increase = if proximity_to_water.is_finite() {
        proximity_to_water * PROXIMITY_WEIGHT
    } else {
        0.0
    };
    let perturbation = rng.uniform(-PERTURBATION, PERTURBATION);

    clamp_unit(base + increase + perturbation)
}

/// Produces a flood-risk score for one property.
///
/// The pipeline clamps whatever a model returns, so implementations
/// (including test doubles) cannot push a score out of [0, 1].
pub trait FloodRiskModel {
    fn name(&self) -> &'static str;

    fn score(
        &mut self,
        property_type: PropertyType,
        proximity_to_water: f64,
        rng: &mut dyn RandomSource,
    ) -> f64;
}

/// The production model: `simulate_flood_risk` as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedFloodRisk;

impl FloodRiskModel for SimulatedFloodRisk {
    fn name(&self) -> &'static str { "simulated" }

    fn score(
        &mut self,
        property_type: PropertyType,
        proximity_to_water: f64,
        rng: &mut dyn RandomSource,
    ) -> f64 {
        simulate_flood_risk(property_type, proximity_to_water, rng)
    }
}
