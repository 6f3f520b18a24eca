use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating a [`crate::NodeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for `{parameter}`: {reason}")]
    Invalid {
        parameter: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid<S: Into<String>>(parameter: &'static str, reason: S) -> Self {
        ConfigError::Invalid {
            parameter,
            reason: reason.into(),
        }
    }
}
