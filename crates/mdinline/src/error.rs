//! CLI error types.

use mdinline_config::ConfigError;
use mdinline_core::{ConvertError, CopyError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Convert(#[from] ConvertError),

    #[error("{0}")]
    Copy(#[from] CopyError),

    #[error("{0}")]
    Validation(String),
}
