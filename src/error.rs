use thiserror::Error;

/// Input validation failures. Nothing is ever partially applied when one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HeatError {
    #[error("Invalid weight {weight} at ({x}, {y}): weights must be positive and finite")]
    InvalidWeight { x: f64, y: f64, weight: f64 },
    #[error("Invalid position ({x}, {y}): coordinates must be finite")]
    InvalidPosition { x: f64, y: f64 },
    #[error("Invalid scale {0}: must be positive and finite")]
    InvalidScale(f64),
    #[error("Invalid heat config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, HeatError>;
