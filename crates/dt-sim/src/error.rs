//! `dt-sim`'s own error type, wrapping `dt-core`'s shared taxonomy at this
//! crate's boundary (same per-crate-then-shared split as every other crate
//! in the workspace).

use thiserror::Error;

use dt_core::DtError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Dt(#[from] DtError),

    /// Raised by [`crate::scene::Scene::advance_clock`] if a script event's
    /// timestamp would move the clock backwards — mirrors the teacher-
    /// source `Scene.time` setter, which raises rather than silently
    /// clamping.
    #[error("clock monotonicity violation: attempted to advance to an earlier time")]
    ClockMonotonicityViolation,
}

pub type SimResult<T> = Result<T, SimError>;
