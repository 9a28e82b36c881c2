//! Pipeline configuration loading.

use floodrisk_core::{
    config::{GeocoderConfig, PipelineConfig},
    geocode::NOMINATIM_ENDPOINT,
    loss::LossStrategy,
    types::PropertyType,
};
use std::fs;
use tempfile::TempDir;

#[test]
fn empty_document_takes_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{}").unwrap();

    let config = PipelineConfig::load(&path).unwrap();
    assert_eq!(config, PipelineConfig::default());
    assert_eq!(config.mortgages.len(), 3);
    assert!(config.seed.is_none());
    assert_eq!(
        config.geocoder,
        GeocoderConfig::Nominatim {
            endpoint: NOMINATIM_ENDPOINT.into(),
            user_agent: "floodrisk-runner".into(),
        }
    );
}

#[test]
fn full_document_overrides_everything() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "seed": 7,
            "property_type": "other",
            "loss_strategy": "equity_based",
            "mortgages": [
                { "address": "Cardiff Bay, Cardiff, CF10", "loan_amount": 175000, "property_value": 200000 }
            ],
            "geocoder": { "kind": "gazetteer", "path": "places.json" },
            "flood_zones": "data/zones",
            "map_output": "risk.html",
            "prompt_for_record": true
        }"#,
    )
    .unwrap();

    let config = PipelineConfig::load(&path).unwrap();
    assert_eq!(config.seed, Some(7));
    assert_eq!(config.property_type, PropertyType::Other);
    assert_eq!(config.loss_strategy, LossStrategy::EquityBased);
    assert_eq!(config.mortgages.len(), 1);
    assert_eq!(config.geocoder, GeocoderConfig::Gazetteer { path: "places.json".into() });
    assert!(config.prompt_for_record);

    let portfolio = config.portfolio().unwrap();
    assert_eq!(portfolio.get(0).unwrap().property_type, PropertyType::Other);
}

#[test]
fn negative_amount_is_reported_with_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(
        &path,
        r#"{ "mortgages": [ { "address": "x", "loan_amount": -5, "property_value": 10 } ] }"#,
    )
    .unwrap();

    let err = PipelineConfig::load(&path).unwrap_err().to_string();
    assert!(err.contains("bad.json"), "Got {err}");
    assert!(err.contains("loan_amount"), "Got {err}");
}

#[test]
fn missing_file_names_the_path() {
    let err = PipelineConfig::load(std::path::Path::new("/definitely/not/here.json"))
        .unwrap_err()
        .to_string();
    assert!(err.contains("Cannot read /definitely/not/here.json"), "Got {err}");
}

#[test]
fn gazetteer_config_builds_a_geocoder() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("places.json");
    fs::write(
        &path,
        r#"{ "Cardiff Bay, Cardiff, CF10": { "latitude": 51.46, "longitude": -3.16 } }"#,
    )
    .unwrap();

    let mut geocoder = GeocoderConfig::Gazetteer { path }.build().unwrap();
    assert_eq!(geocoder.name(), "gazetteer");
    let hit = geocoder.geocode("Cardiff Bay, Cardiff, CF10").unwrap();
    assert_eq!((hit.latitude, hit.longitude), (51.46, -3.16));
}

#[test]
fn property_type_is_read_tolerantly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    for (text, expected) in [
        ("commercial", PropertyType::Other),
        ("Residential", PropertyType::Residential),
        (" RESIDENTIAL ", PropertyType::Residential),
        ("other", PropertyType::Other),
    ] {
        fs::write(&path, format!(r#"{{ "property_type": "{text}" }}"#)).unwrap();
        let config = PipelineConfig::load(&path)
            .unwrap_or_else(|e| panic!("{text:?} should load, got {e}"));
        assert_eq!(config.property_type, expected, "Input {text:?}");
    }
}
