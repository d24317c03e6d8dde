use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid point \"{0}\": expected \"lat,lng\" in degrees")]
    InvalidPoint(String),

    #[error("invalid age class {0}; must be 0 through 5")]
    InvalidAgeClass(i64),

    #[error("age class \"{0}\" is not a number")]
    UnparsableAgeClass(String),

    #[error("search radius {meters}m out of range; must be {min}..={max}")]
    RadiusOutOfRange { meters: u32, min: u32, max: u32 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// The facility dataset could not be read or parsed.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dataset must be a JSON array of facilities, found {found}")]
    NotAnArray { found: &'static str },
}
