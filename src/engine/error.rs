use ulid::Ulid;

use crate::model::RequestStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No zone has a free slot.
    NoSlotAvailable,
    NotFound(Ulid),
    InvalidTransition {
        id: Ulid,
        status: RequestStatus,
    },
    LimitExceeded(&'static str),
    /// Internal bookkeeping disagrees with itself. Nothing was changed.
    Inconsistent(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NoSlotAvailable => write!(f, "no slot available in any zone"),
            EngineError::NotFound(id) => write!(f, "request not found: {id}"),
            EngineError::InvalidTransition { id, status } => {
                write!(f, "request {id} is {status}, transition not allowed")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Inconsistent(msg) => write!(f, "internal inconsistency: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl EngineError {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            EngineError::NoSlotAvailable => "no_slot",
            EngineError::NotFound(_) => "not_found",
            EngineError::InvalidTransition { .. } => "invalid_transition",
            EngineError::LimitExceeded(_) => "limit_exceeded",
            EngineError::Inconsistent(_) => "inconsistent",
        }
    }
}
