use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("a signal needs at least one phase")]
    EmptyPhases,

    #[error("phase {index} has non-positive duration {duration}")]
    InvalidPhaseDuration { index: usize, duration: f32 },

    #[error("green-wave speed must be positive, got {0}")]
    InvalidWaveSpeed(f32),
}

pub type SignalResult<T> = Result<T, SignalError>;
