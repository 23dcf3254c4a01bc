//! Shared error taxonomy.
//!
//! Individual crates define their own narrower error enums and convert into
//! or wrap `DtError` at their boundary via `#[from]`, following the same
//! per-crate-then-shared split the teacher framework uses.

use thiserror::Error;

use crate::AgentAddress;

#[derive(Debug, Error)]
pub enum DtError {
    /// No feasible insertion point exists for an order into a courier's
    /// schedule under its current constraints.
    #[error("no feasible slot for order into schedule: {reason}")]
    InfeasibleAssignment { reason: String },

    /// A message or directory lookup referenced an address with no
    /// registered agent.
    #[error("no agent registered for address {0}")]
    UnknownEntityType(AgentAddress),

    /// The simulation clock was asked to move backwards. Fatal: the caller
    /// should abort the run rather than attempt to recover.
    #[error("clock monotonicity violation: attempted to set time backwards")]
    ClockMonotonicityViolation,

    /// A message referencing a negotiation round that has already been
    /// superseded (e.g. a quote reply for a request the order agent has
    /// since abandoned). Dropped, not fatal.
    #[error("stale message ignored: {0}")]
    StaleMessage(String),

    /// A message failed a structural precondition (e.g. a commit referencing
    /// a variant id the courier never offered).
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type DtResult<T> = Result<T, DtError>;
