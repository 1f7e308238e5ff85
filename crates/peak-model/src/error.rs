use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("coordinate out of range: lon {lon}, lat {lat}")]
    InvalidCoordinate { lon: f64, lat: f64 },
}

pub type Result<T> = std::result::Result<T, ModelError>;
