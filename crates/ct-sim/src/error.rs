use ct_road::RoadError;
use ct_signal::SignalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("road graph error: {0}")]
    Road(#[from] RoadError),

    #[error("signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("road graph has no main or highway lane to spawn on")]
    NoSpawnPoint,
}

pub type SimResult<T> = Result<T, SimError>;
