//! Shared primitive types used across the scoring core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Positional identity of a record inside a portfolio.
pub type RowIndex = usize;

/// A stable identifier for one enrichment run.
pub type RunId = String;

/// Clamp a score into [0, 1]. NaN collapses to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Property category fed to the flood-risk simulator.
/// Deserialises with the same tolerance as `FromStr`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum PropertyType {
    #[default]
    Residential,
    Other,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Other => "other",
        }
    }
}

/// Unknown categories ("commercial", "", ...) are treated as `Other`.
impl FromStr for PropertyType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("residential") {
            Ok(Self::Residential)
        } else {
            Ok(Self::Other)
        }
    }
}

impl From<String> for PropertyType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(property_type) => property_type,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude:  f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}
