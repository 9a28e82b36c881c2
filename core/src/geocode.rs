//! Address → coordinates lookup.
//!
//! RULE: a geocoder never surfaces an error to the pipeline.
//! Anything that goes wrong is logged and reported as a miss.

use crate::{
    error::{RiskError, RiskResult},
    types::Coordinates,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub trait Geocoder {
    fn name(&self) -> &'static str;

    /// Look up one address. `None` means "not found".
    fn geocode(&mut self, address: &str) -> Option<Coordinates>;
}

/// Always misses. Used when geocoding is switched off.
#[derive(Debug, Default)]
pub struct DisabledGeocoder;

impl Geocoder for DisabledGeocoder {
    fn name(&self) -> &'static str { "disabled" }

    fn geocode(&mut self, _address: &str) -> Option<Coordinates> {
        None
    }
}

/// Fixed address table, matched case-insensitively on trimmed text.
#[derive(Debug, Default, Clone)]
pub struct Gazetteer {
    entries: HashMap<String, Coordinates>,
}

impl Gazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, address: &str, latitude: f64, longitude: f64) -> Self {
        self.insert(address, Coordinates::new(latitude, longitude));
        self
    }

    pub fn insert(&mut self, address: &str, coords: Coordinates) {
        self.entries.insert(normalize(address), coords);
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Load a JSON object mapping address → `{latitude, longitude}`.
    pub fn load(path: &Path) -> RiskResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RiskError::io(path, e))?;
        let raw: HashMap<String, Coordinates> = serde_json::from_str(&content)?;
        let mut gazetteer = Self::new();
        for (address, coords) in raw {
            gazetteer.insert(&address, coords);
        }
        log::debug!("gazetteer: loaded {} entries from {}", gazetteer.len(), path.display());
        Ok(gazetteer)
    }
}

impl Geocoder for Gazetteer {
    fn name(&self) -> &'static str { "gazetteer" }

    fn geocode(&mut self, address: &str) -> Option<Coordinates> {
        self.entries.get(&normalize(address)).copied()
    }
}

fn normalize(address: &str) -> String {
    address.trim().to_lowercase()
}

pub const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

/// OpenStreetMap Nominatim over blocking HTTP. One request per
/// address, no retry.
pub struct NominatimGeocoder {
    endpoint: String,
    client:   reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(endpoint: &str, user_agent: &str) -> RiskResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| RiskError::Geocoder(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
        })
    }

    fn lookup(&self, address: &str) -> RiskResult<Option<Coordinates>> {
        let places: Vec<NominatimPlace> = self
            .client
            .get(&self.endpoint)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json::<Vec<NominatimPlace>>())
            .map_err(|e| RiskError::Geocoder(e.to_string()))?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };
        Ok(Some(parse_place(&place)?))
    }
}

fn parse_place(place: &NominatimPlace) -> RiskResult<Coordinates> {
    let latitude = place.lat.trim().parse().map_err(|_| RiskError::Parse {
        field: "latitude",
        input: place.lat.clone(),
    })?;
    let longitude = place.lon.trim().parse().map_err(|_| RiskError::Parse {
        field: "longitude",
        input: place.lon.clone(),
    })?;
    Ok(Coordinates::new(latitude, longitude))
}

impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &'static str { "nominatim" }

    fn geocode(&mut self, address: &str) -> Option<Coordinates> {
        match self.lookup(address) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("nominatim: lookup for {address:?} failed: {e}");
                None
            }
        }
    }
}
