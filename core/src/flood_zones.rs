//! Flood-zone overlay: the indicative flood-risk-area dataset, read
//! either from its GeoJSON export or from the ESRI shapefile itself.
//!
//! A path may name the file itself or a directory holding it, in
//! which case the first `.geojson`, then `.json`, then `.shp` file by
//! name wins. A `.shp` needs its `.dbf` alongside for attributes.

use crate::{
    error::{RiskError, RiskResult},
    types::Coordinates,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shapefile::dbase::FieldValue;
use shapefile::{PolygonRing, Shape};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloodZoneFeature {
    #[serde(rename = "type")]
    kind: String,
    pub geometry: Option<Value>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl FloodZoneFeature {
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    features: Vec<FloodZoneFeature>,
}

#[derive(Debug, Clone)]
pub struct FloodZoneLayer {
    pub source: PathBuf,
    features:   Vec<FloodZoneFeature>,
}

impl FloodZoneLayer {
    pub fn load(path: &Path) -> RiskResult<Self> {
        let file = if path.is_dir() { find_layer_file(path)? } else { path.to_path_buf() };
        let layer = if has_extension(&file, "shp") {
            Self::from_shapefile(&file)?
        } else {
            let content = std::fs::read_to_string(&file).map_err(|e| RiskError::io(&file, e))?;
            Self::from_geojson(&content, file)?
        };
        log::info!(
            "flood zones: {} features from {}",
            layer.features.len(),
            layer.source.display()
        );
        if let Some(c) = layer.center() {
            if c.latitude.abs() > 90.0 || c.longitude.abs() > 180.0 {
                log::warn!(
                    "flood zones: coordinates look projected (centre {:.0}, {:.0}); map expects WGS84",
                    c.longitude,
                    c.latitude
                );
            }
        }
        Ok(layer)
    }

    /// Load for display only: failures are logged, never returned.
    pub fn load_overlay(path: &Path) -> Option<Self> {
        match Self::load(path) {
            Ok(layer) => Some(layer),
            Err(e) => {
                log::error!("flood zones: skipping overlay: {e}");
                None
            }
        }
    }

    /// Read a `.shp` plus its `.dbf`. Polygon rings keep the file's
    /// outer/inner grouping; several outer rings become a MultiPolygon.
    pub fn from_shapefile(path: &Path) -> RiskResult<Self> {
        let shp_error = |e: shapefile::Error| RiskError::FloodZones(format!("{}: {e}", path.display()));
        let mut reader = shapefile::Reader::from_path(path).map_err(shp_error)?;

        let mut features = Vec::new();
        for item in reader.iter_shapes_and_records() {
            let (shape, record) = item.map_err(shp_error)?;
            let fields: HashMap<String, FieldValue> = record.into();
            let mut properties: Vec<(String, Value)> = fields
                .into_iter()
                .map(|(name, value)| (name, field_to_json(value)))
                .collect();
            properties.sort_by(|a, b| a.0.cmp(&b.0));

            features.push(FloodZoneFeature {
                kind: "Feature".into(),
                geometry: shape_to_geometry(&shape),
                properties: properties.into_iter().collect(),
            });
        }

        Ok(Self {
            source: path.to_path_buf(),
            features,
        })
    }

    pub fn from_geojson(content: &str, source: PathBuf) -> RiskResult<Self> {
        let collection: FeatureCollection = serde_json::from_str(content)?;
        if collection.kind != "FeatureCollection" {
            return Err(RiskError::FloodZones(format!(
                "expected a FeatureCollection, found {:?}",
                collection.kind
            )));
        }
        if let Some(bad) = collection.features.iter().find(|f| f.kind != "Feature") {
            return Err(RiskError::FloodZones(format!(
                "expected Feature entries, found {:?}",
                bad.kind
            )));
        }
        Ok(Self {
            source,
            features: collection.features,
        })
    }

    pub fn len(&self) -> usize { self.features.len() }
    pub fn is_empty(&self) -> bool { self.features.is_empty() }

    pub fn features(&self) -> &[FloodZoneFeature] {
        &self.features
    }

    /// Re-serialise as a FeatureCollection for embedding in a map.
    pub fn to_geojson(&self) -> RiskResult<String> {
        let collection = FeatureCollection {
            kind: "FeatureCollection".into(),
            features: self.features.clone(),
        };
        Ok(serde_json::to_string(&collection)?)
    }

    /// Mean of every vertex in the layer. GeoJSON positions are
    /// [longitude, latitude].
    pub fn center(&self) -> Option<Coordinates> {
        let mut positions = Vec::new();
        for feature in &self.features {
            if let Some(coords) = feature.geometry.as_ref().and_then(|g| g.get("coordinates")) {
                collect_positions(coords, &mut positions);
            }
        }
        if positions.is_empty() {
            return None;
        }
        let n = positions.len() as f64;
        let (lon_sum, lat_sum) = positions
            .iter()
            .fold((0.0, 0.0), |(lon, lat), (x, y)| (lon + x, lat + y));
        Some(Coordinates::new(lat_sum / n, lon_sum / n))
    }
}

fn find_layer_file(dir: &Path) -> RiskResult<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| RiskError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    candidates.sort();

    for ext in ["geojson", "json", "shp"] {
        if let Some(found) = candidates.iter().find(|p| has_extension(p, ext)) {
            return Ok(found.clone());
        }
    }
    Err(RiskError::FloodZones(format!(
        "no .geojson, .json or .shp file in {}",
        dir.display()
    )))
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn shape_to_geometry(shape: &Shape) -> Option<Value> {
    match shape {
        Shape::NullShape => None,
        Shape::Point(p) => Some(geometry("Point", position(p.x, p.y))),
        Shape::PointM(p) => Some(geometry("Point", position(p.x, p.y))),
        Shape::PointZ(p) => Some(geometry("Point", position(p.x, p.y))),
        Shape::Multipoint(m) => Some(geometry(
            "MultiPoint",
            Value::Array(m.points().iter().map(|p| position(p.x, p.y)).collect()),
        )),
        Shape::Polyline(l) => Some(lines(l.parts().iter().map(|part| {
            part.iter().map(|p| (p.x, p.y)).collect()
        }))),
        Shape::PolylineM(l) => Some(lines(l.parts().iter().map(|part| {
            part.iter().map(|p| (p.x, p.y)).collect()
        }))),
        Shape::PolylineZ(l) => Some(lines(l.parts().iter().map(|part| {
            part.iter().map(|p| (p.x, p.y)).collect()
        }))),
        Shape::Polygon(poly) => Some(polygons(poly.rings().iter().map(|r| ring(r, |p| (p.x, p.y))))),
        Shape::PolygonM(poly) => Some(polygons(poly.rings().iter().map(|r| ring(r, |p| (p.x, p.y))))),
        Shape::PolygonZ(poly) => Some(polygons(poly.rings().iter().map(|r| ring(r, |p| (p.x, p.y))))),
        _ => {
            log::debug!("flood zones: skipping unsupported shape (multipatch)");
            None
        }
    }
}

/// (is_outer, vertices) for one ring.
fn ring<P>(ring: &PolygonRing<P>, xy: impl Fn(&P) -> (f64, f64)) -> (bool, Vec<(f64, f64)>) {
    match ring {
        PolygonRing::Outer(points) => (true, points.iter().map(&xy).collect()),
        PolygonRing::Inner(points) => (false, points.iter().map(&xy).collect()),
    }
}

fn polygons(rings: impl Iterator<Item = (bool, Vec<(f64, f64)>)>) -> Value {
    let mut grouped: Vec<Vec<Value>> = Vec::new();
    for (is_outer, points) in rings {
        let coords = Value::Array(points.into_iter().map(|(x, y)| position(x, y)).collect());
        match grouped.last_mut() {
            Some(current) if !is_outer => current.push(coords),
            _ => grouped.push(vec![coords]),
        }
    }
    if grouped.len() == 1 {
        geometry("Polygon", Value::Array(grouped.remove(0)))
    } else {
        geometry(
            "MultiPolygon",
            Value::Array(grouped.into_iter().map(Value::Array).collect()),
        )
    }
}

fn lines(parts: impl Iterator<Item = Vec<(f64, f64)>>) -> Value {
    let parts: Vec<Value> = parts
        .map(|part| Value::Array(part.into_iter().map(|(x, y)| position(x, y)).collect()))
        .collect();
    geometry("MultiLineString", Value::Array(parts))
}

fn geometry(kind: &str, coordinates: Value) -> Value {
    serde_json::json!({ "type": kind, "coordinates": coordinates })
}

fn position(x: f64, y: f64) -> Value {
    serde_json::json!([x, y])
}

fn field_to_json(value: FieldValue) -> Value {
    match value {
        FieldValue::Character(text) => text.map_or(Value::Null, |t| Value::String(t.trim().to_string())),
        FieldValue::Memo(text) => Value::String(text),
        FieldValue::Numeric(n) => n.map_or(Value::Null, |n| serde_json::json!(n)),
        FieldValue::Float(n) => n.map_or(Value::Null, |n| serde_json::json!(n)),
        FieldValue::Double(n) => serde_json::json!(n),
        FieldValue::Currency(n) => serde_json::json!(n),
        FieldValue::Integer(n) => serde_json::json!(n),
        FieldValue::Logical(b) => b.map_or(Value::Null, Value::Bool),
        other => Value::String(format!("{other:?}")),
    }
}

fn collect_positions(value: &Value, out: &mut Vec<(f64, f64)>) {
    let Some(items) = value.as_array() else { return };
    match (items.first().and_then(Value::as_f64), items.get(1).and_then(Value::as_f64)) {
        (Some(x), Some(y)) => out.push((x, y)),
        _ => {
            for item in items {
                collect_positions(item, out);
            }
        }
    }
}
