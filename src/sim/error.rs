//! Simulation error types

use thiserror::Error;

use super::machine::StateId;

/// Errors raised by the simulation core
#[derive(Debug, Error)]
pub enum SimError {
    /// A transition targeted a state the machine never registered
    #[error("state {0:?} is not registered on this machine")]
    UnregisteredState(StateId),
    /// A level index past the campaign
    #[error("level {index} does not exist (campaign has {count})")]
    UnknownLevel { index: usize, count: usize },
    /// Settings or level data failed to parse
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}
