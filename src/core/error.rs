use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontlineError {
    #[error("Invalid hex key: {0:?} (expected \"q,r\")")]
    InvalidHexKey(String),

    #[error("Unknown terrain: {0}")]
    UnknownTerrain(String),

    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("Map too large: {width}x{height} (at most {max} hexes)")]
    MapTooLarge { width: u32, height: u32, max: usize },

    #[error("Invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("Unsupported scenario format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, FrontlineError>;
