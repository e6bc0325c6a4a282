use thiserror::Error;

/// Errors surfaced by the engine seam, configuration loading and event decoding.
#[derive(Error, Debug)]
pub enum PlayerError {
    /// Filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file that is not valid TOML or has mistyped values
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// The player engine failed to load, seek or unload
    #[error("engine error: {0}")]
    Engine(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, PlayerError>;
