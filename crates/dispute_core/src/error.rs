//! Error types for the dispute core.
//!
//! Every failure here is local and recoverable: the caller gets back which
//! field or which transition was rejected and decides what to show the user.

use crate::schema::DisputeStatus;
use thiserror::Error;

/// Input that does not satisfy the dispute model.
///
/// `field` is the wire name of the offending field (`issueType`,
/// `userPhone`, ...) so it can be reported back to the filer unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// A status change the lifecycle does not allow.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidTransitionError {
    /// The lifecycle has no edge between these two statuses
    #[error("cannot move dispute from {from} to {to}")]
    Illegal {
        from: DisputeStatus,
        to: DisputeStatus,
    },

    /// The dispute is resolved or rejected
    #[error("dispute is {from} and accepts no further changes")]
    Terminal { from: DisputeStatus },

    /// Requested status equals the current one
    #[error("dispute is already {status}")]
    AlreadyInStatus { status: DisputeStatus },
}

/// Umbrella error for dispute operations.
#[derive(Error, Debug)]
pub enum DisputeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransitionError),

    #[error("Timestamp formatting error: {0}")]
    Timestamp(#[from] time::error::Format),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Policy parse error: {0}")]
    PolicyParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DisputeError {
    /// The validation failure, if this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// The rejected transition, if this is one
    pub fn as_transition(&self) -> Option<&InvalidTransitionError> {
        match self {
            Self::InvalidTransition(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for dispute operations
pub type Result<T> = std::result::Result<T, DisputeError>;
