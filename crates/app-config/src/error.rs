// In crates/app-config/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid [strategy] section: {0}")]
    Strategy(#[from] strategies::Error),

    #[error("Invalid setting `{key}`: {reason}")]
    Validation { key: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
