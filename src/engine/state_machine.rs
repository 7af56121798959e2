use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerState {
    Idle,            // Invocation received
    ResolvingConfig, // Reading pipeline config
    Computing,       // Generating samples
    Publishing,      // Replacing the remote time series
    Reporting,       // Writing the run status
    Done,
}

impl fmt::Display for HandlerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Invalid transition from {0} to {1}")]
    InvalidTransition(HandlerState, HandlerState),
}

pub struct HandlerStateMachine;

impl HandlerStateMachine {
    pub fn transition(current: HandlerState, next: HandlerState) -> Result<HandlerState, StateError> {
        match (current, next) {
            (HandlerState::Idle, HandlerState::ResolvingConfig) => Ok(next),

            // Config failures leave the machine here; no report is written
            (HandlerState::ResolvingConfig, HandlerState::Computing) => Ok(next),

            (HandlerState::Computing, HandlerState::Publishing) => Ok(next),
            (HandlerState::Computing, HandlerState::Reporting) => Ok(next), // failure exit

            (HandlerState::Publishing, HandlerState::Reporting) => Ok(next),

            (HandlerState::Reporting, HandlerState::Done) => Ok(next),

            // Terminal
            (HandlerState::Done, _) => Err(StateError::InvalidTransition(current, next)),

            _ => Err(StateError::InvalidTransition(current, next)),
        }
    }

    pub fn is_terminal(state: HandlerState) -> bool {
        state == HandlerState::Done
    }
}
