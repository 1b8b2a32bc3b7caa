use thiserror::Error;

/// Problems with an initial state or a parameter set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("grid {width}x{height} is too small, need at least 3x3")]
    GridTooSmall { width: usize, height: usize },
    #[error("{name} has {actual} values, expected {expected}")]
    DataLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("particle {index} at ({x}, {y}) is outside the grid")]
    ParticleOutOfDomain { index: usize, x: f32, y: f32 },
    #[error("invalid parameter {name}: {reason}")]
    InvalidParam {
        name: &'static str,
        reason: String,
    },
}
