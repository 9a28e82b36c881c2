use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Division by zero in {operation}")]
    DivisionByZero { operation: &'static str },

    #[error("Could not parse {field} from {input:?}")]
    Parse { field: &'static str, input: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Flood zone layer error: {0}")]
    FloodZones(String),

    #[error("Geocoder error: {0}")]
    Geocoder(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RiskError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type RiskResult<T> = Result<T, RiskError>;
