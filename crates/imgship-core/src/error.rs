use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {key} in environment: {reason}")]
    InvalidEnvOverride { key: &'static str, reason: String },

    // ── Image references ──
    #[error("invalid image reference {reference:?}: {reason}")]
    InvalidImageRef {
        reference: String,
        reason: &'static str,
    },

    #[error("invalid registry {registry:?}: {reason}")]
    InvalidRegistry {
        registry: String,
        reason: &'static str,
    },
}
