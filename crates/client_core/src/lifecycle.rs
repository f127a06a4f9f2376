use std::fmt::Display;

use shared::error::SubmitError;
use tracing::debug;

/// Observable phase of one workflow's request cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState<T> {
    Idle,
    Pending,
    Succeeded(T),
    Failed(String),
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        RequestState::Idle
    }
}

impl<T> RequestState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }
}

/// Ticket for one accepted submission. Resolutions must present it back;
/// a ticket from a superseded submission is silently discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    seq: u64,
}

/// Single-request-at-a-time state machine: `Idle -> Pending -> Succeeded |
/// Failed`, re-submission allowed from any settled state. Each accepted
/// submission gets a monotonically increasing sequence number so that a slow
/// response belonging to an older submission can never overwrite a newer
/// one. Pure state, no I/O; the owning workflow drives it.
#[derive(Debug)]
pub struct RequestLifecycle<T> {
    state: RequestState<T>,
    seq: u64,
}

impl<T> Default for RequestLifecycle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RequestLifecycle<T> {
    pub fn new() -> Self {
        Self {
            state: RequestState::Idle,
            seq: 0,
        }
    }

    pub fn state(&self) -> &RequestState<T> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    pub fn payload(&self) -> Option<&T> {
        match &self.state {
            RequestState::Succeeded(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            RequestState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Accepts a new submission unless one is already in flight. Any prior
    /// payload stays visible until the new submission resolves.
    pub fn submit(&mut self) -> Result<Submission, SubmitError> {
        if self.state.is_pending() {
            return Err(SubmitError::AlreadyInFlight);
        }
        self.seq += 1;
        self.state = RequestState::Pending;
        Ok(Submission { seq: self.seq })
    }

    /// Applies a resolution. Returns false (and changes nothing) when the
    /// submission has been superseded or the lifecycle is no longer pending.
    pub fn resolve<E: Display>(&mut self, submission: Submission, outcome: Result<T, E>) -> bool {
        if submission.seq != self.seq || !self.state.is_pending() {
            debug!(
                submission_seq = submission.seq,
                current_seq = self.seq,
                "discarding stale request resolution"
            );
            return false;
        }
        self.state = match outcome {
            Ok(payload) => RequestState::Succeeded(payload),
            Err(err) => RequestState::Failed(err.to_string()),
        };
        true
    }

    pub fn succeed(&mut self, submission: Submission, payload: T) -> bool {
        self.resolve::<&str>(submission, Ok(payload))
    }

    pub fn fail<E: Display>(&mut self, submission: Submission, err: E) -> bool {
        self.resolve(submission, Err(err))
    }

    /// Back to `Idle`, dropping any payload or error.
    pub fn reset(&mut self) {
        self.state = RequestState::Idle;
    }
}
