use crate::{Error, Result};
use tracing::{debug, info, warn};

// Request states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Validating,
    Normalizing,
    Dispatching,
    Decoding,
    Remapping,
    Responding,
}

// Request events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEvent {
    Received,
    Validated,
    Rejected,
    Normalized,
    Completed,
    Decoded,
    Failed,
    Remapped,
}

/// How the request left the pipeline, once it reaches `Responding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ClientError,
    ServerError,
}

// Linear FSM, one per request
pub struct RequestStateMachine {
    state: RequestState,
    outcome: Option<Outcome>,
}

impl RequestStateMachine {
    pub fn new() -> Self {
        Self {
            state: RequestState::Idle,
            outcome: None,
        }
    }

    pub fn current_state(&self) -> RequestState {
        self.state
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn transition(&mut self, event: RequestEvent) -> Result<()> {
        let old_state = self.state;
        debug!("FSM processing event {:?} in state {:?}", event, old_state);

        let (new_state, outcome) = match (self.state, event) {
            (RequestState::Idle, RequestEvent::Received) => (RequestState::Validating, None),
            (RequestState::Validating, RequestEvent::Validated) => {
                (RequestState::Normalizing, None)
            }
            (RequestState::Validating, RequestEvent::Rejected) => {
                (RequestState::Responding, Some(Outcome::ClientError))
            }
            (RequestState::Normalizing, RequestEvent::Normalized) => {
                (RequestState::Dispatching, None)
            }
            (RequestState::Dispatching, RequestEvent::Completed) => {
                (RequestState::Decoding, None)
            }
            (RequestState::Dispatching, RequestEvent::Failed) => {
                (RequestState::Responding, Some(Outcome::ServerError))
            }
            (RequestState::Decoding, RequestEvent::Decoded) => (RequestState::Remapping, None),
            (RequestState::Decoding, RequestEvent::Failed) => {
                (RequestState::Responding, Some(Outcome::ServerError))
            }
            (RequestState::Remapping, RequestEvent::Remapped) => {
                (RequestState::Responding, Some(Outcome::Success))
            }
            _ => {
                warn!(
                    "Invalid FSM transition from {:?} with event {:?}",
                    self.state, event
                );
                return Err(Error::fsm(format!(
                    "Invalid transition from {:?} with event {:?}",
                    self.state, event
                )));
            }
        };

        info!(
            "FSM state transition: {:?} -> {:?} (event: {:?})",
            old_state, new_state, event
        );

        if let Some(outcome) = outcome {
            info!("Request finished with outcome {:?}", outcome);
        }

        self.state = new_state;
        self.outcome = outcome;
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.state == RequestState::Responding
    }
}

impl Default for RequestStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
