//! Interactive map output: a self-contained Leaflet page with one
//! marker per located record and an optional flood-zone overlay.

use crate::{
    error::{RiskError, RiskResult},
    flood_zones::FloodZoneLayer,
    portfolio::{Portfolio, PropertyRecord},
    types::{Coordinates, RowIndex},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

pub const DEFAULT_ZOOM: u8 = 10;

/// Centre of Great Britain, used when nothing else can anchor the view.
pub const FALLBACK_CENTER: Coordinates = Coordinates {
    latitude:  54.0,
    longitude: -2.5,
};

#[derive(Debug, Clone, Serialize)]
pub struct MapMarker {
    pub row:       RowIndex,
    pub latitude:  f64,
    pub longitude: f64,
    pub popup:     String,
}

#[derive(Debug, Clone)]
pub struct MapDocument {
    pub center:       Coordinates,
    pub zoom:         u8,
    pub markers:      Vec<MapMarker>,
    pub generated_at: DateTime<Utc>,
    overlay:          Option<String>,
}

impl MapDocument {
    /// Centre on the mean marker position, else the overlay centre.
    pub fn build(portfolio: &Portfolio, overlay: Option<&FloodZoneLayer>) -> RiskResult<Self> {
        let markers: Vec<MapMarker> = portfolio
            .records()
            .iter()
            .enumerate()
            .filter_map(|(row, record)| {
                record.coordinates().map(|c| MapMarker {
                    row,
                    latitude: c.latitude,
                    longitude: c.longitude,
                    popup: popup_text(record),
                })
            })
            .collect();

        let center = mean_position(&markers)
            .or_else(|| overlay.and_then(FloodZoneLayer::center))
            .unwrap_or(FALLBACK_CENTER);

        let overlay = overlay.map(FloodZoneLayer::to_geojson).transpose()?;

        log::debug!(
            "map: {} of {} records placed, centre=({:.4}, {:.4})",
            markers.len(),
            portfolio.len(),
            center.latitude,
            center.longitude
        );

        Ok(Self {
            center,
            zoom: DEFAULT_ZOOM,
            markers,
            generated_at: Utc::now(),
            overlay,
        })
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn render_html(&self) -> RiskResult<String> {
        let markers = script_safe(&serde_json::to_string(&self.markers)?);
        let overlay = match &self.overlay {
            Some(geojson) => script_safe(geojson),
            None => "null".to_string(),
        };

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Mortgage flood risk ({generated})</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map("map").setView([{lat}, {lon}], {zoom});
L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
  attribution: "&copy; OpenStreetMap contributors"
}}).addTo(map);
var overlay = {overlay};
if (overlay) {{ L.geoJSON(overlay).addTo(map); }}
var markers = {markers};
markers.forEach(function (m) {{
  L.marker([m.latitude, m.longitude]).bindPopup(m.popup).addTo(map);
}});
</script>
</body>
</html>
"#,
            generated = self.generated_at.format("%Y-%m-%d %H:%M UTC"),
            lat = self.center.latitude,
            lon = self.center.longitude,
            zoom = self.zoom,
        ))
    }

    pub fn write_to(&self, path: &Path) -> RiskResult<()> {
        let html = self.render_html()?;
        std::fs::write(path, html).map_err(|e| RiskError::io(path, e))?;
        log::info!("map: wrote {} markers to {}", self.markers.len(), path.display());
        Ok(())
    }
}

/// Popup body for one record. Missing values print as `n/a`.
pub fn popup_text(record: &PropertyRecord) -> String {
    let flood_risk = record
        .flood_risk
        .map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}"));
    let loan_risk = record
        .loan_risk
        .map_or_else(|| "n/a".to_string(), |r| r.to_string());
    let lgd = record
        .loss_given_default
        .map_or_else(|| "n/a".to_string(), |l| format!("{:.2}%", l * 100.0));

    format!(
        "Loan Amount: {}, Property Value: {}, Flood Risk: {flood_risk}, Loan Risk: {loan_risk}, LGD: {lgd}",
        record.loan_amount, record.property_value
    )
}

fn mean_position(markers: &[MapMarker]) -> Option<Coordinates> {
    if markers.is_empty() {
        return None;
    }
    let n = markers.len() as f64;
    let lat = markers.iter().map(|m| m.latitude).sum::<f64>() / n;
    let lon = markers.iter().map(|m| m.longitude).sum::<f64>() / n;
    Some(Coordinates::new(lat, lon))
}

// Stops a literal "</script>" inside data from closing the tag.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
