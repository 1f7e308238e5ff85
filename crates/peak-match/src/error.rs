use peak_model::Origin;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("record {index} in the {expected} set has origin {found}")]
    OriginMismatch {
        expected: Origin,
        found: Origin,
        index: usize,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, MatchError>;
