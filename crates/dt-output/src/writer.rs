//! The `OutputWriter` trait implemented by all backend writers.

use crate::{OutputResult, ScheduleRecordRow};

/// Trait implemented by CSV, SQLite, and Parquet writers.
///
/// All methods are infallible from the observer's perspective — errors are
/// stored internally and retrieved with [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of schedule records, in whatever order the caller
    /// collected them.
    fn write_records(&mut self, rows: &[ScheduleRecordRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

/// Stable textual name for a [`dt_core::RecType`], shared by every backend
/// that needs to store it as a string or tag.
pub(crate) fn rec_type_name(rt: dt_core::RecType) -> &'static str {
    match rt {
        dt_core::RecType::MoveToPickup => "move_to_pickup",
        dt_core::RecType::MoveWithLoad => "move_with_load",
        dt_core::RecType::MoveToCharge => "move_to_charge",
        dt_core::RecType::IdleWithLoad => "idle_with_load",
        dt_core::RecType::Idle => "idle",
    }
}
