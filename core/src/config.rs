use crate::{
    error::RiskResult,
    geocode::{DisabledGeocoder, Gazetteer, Geocoder, NominatimGeocoder, NOMINATIM_ENDPOINT},
    loss::LossStrategy,
    portfolio::{sample_mortgages, NewMortgage, Portfolio},
    types::PropertyType,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_USER_AGENT: &str = "floodrisk-runner";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeocoderConfig {
    Nominatim {
        #[serde(default = "default_endpoint")]
        endpoint:   String,
        #[serde(default = "default_user_agent")]
        user_agent: String,
    },
    Gazetteer {
        path: PathBuf,
    },
    Disabled,
}

fn default_endpoint() -> String { NOMINATIM_ENDPOINT.into() }
fn default_user_agent() -> String { DEFAULT_USER_AGENT.into() }

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self::Nominatim {
            endpoint: default_endpoint(),
            user_agent: default_user_agent(),
        }
    }
}

impl GeocoderConfig {
    pub fn build(&self) -> RiskResult<Box<dyn Geocoder>> {
        let geocoder: Box<dyn Geocoder> = match self {
            Self::Nominatim { endpoint, user_agent } => {
                Box::new(NominatimGeocoder::new(endpoint, user_agent)?)
            }
            Self::Gazetteer { path } => Box::new(Gazetteer::load(path)?),
            Self::Disabled => Box::new(DisabledGeocoder),
        };
        Ok(geocoder)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Master seed. `None` draws one from the OS per run.
    pub seed:              Option<u64>,
    pub property_type:     PropertyType,
    pub loss_strategy:     LossStrategy,
    pub mortgages:         Vec<NewMortgage>,
    pub geocoder:          GeocoderConfig,
    pub flood_zones:       Option<PathBuf>,
    pub map_output:        Option<PathBuf>,
    /// Ask for one extra mortgage on the console before enriching.
    pub prompt_for_record: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            property_type: PropertyType::Residential,
            loss_strategy: LossStrategy::RiskBased,
            mortgages: sample_mortgages(),
            geocoder: GeocoderConfig::default(),
            flood_zones: None,
            map_output: None,
            prompt_for_record: false,
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    /// In tests, use PipelineConfig::default_test().
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?;
        for (i, mortgage) in config.mortgages.iter().enumerate() {
            mortgage
                .validate()
                .map_err(|e| anyhow::anyhow!("{}: mortgage #{i}: {e}", path.display()))?;
        }
        Ok(config)
    }

    /// Config with hardcoded defaults for use in tests: fixed seed,
    /// no network, no files.
    pub fn default_test() -> Self {
        Self {
            seed: Some(42),
            geocoder: GeocoderConfig::Disabled,
            ..Self::default()
        }
    }

    pub fn portfolio(&self) -> RiskResult<Portfolio> {
        Portfolio::from_mortgages(self.mortgages.iter().cloned(), self.property_type)
    }
}
