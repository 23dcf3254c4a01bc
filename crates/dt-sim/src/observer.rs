//! Simulation observer trait for progress reporting (§4.H's "invoke callback
//! with `{time, tick_counter, tick_size}`").

use dt_core::SimTime;

/// Callbacks invoked by [`Simulator::run`][crate::Simulator::run] at key
/// points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about — same shape as the teacher's
/// `SimObserver`, minus the mobility-snapshot hook (there is no road
/// network here to snapshot; a host wanting periodic schedule snapshots
/// reads them from [`crate::Simulator::export_all`] in its own
/// `on_tick_end`).
pub trait SimObserver {
    /// Called at the very start of each tick, before scripted events are
    /// applied.
    fn on_tick_start(&mut self, _time: SimTime, _tick_counter: u64) {}

    /// Called at the end of each tick, once the dispatcher has drained to
    /// quiescence (or hit the round cap).
    fn on_tick_end(&mut self, _time: SimTime, _tick_counter: u64, _quiescence_rounds: usize) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_time: SimTime) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
