//! Fluent builder for constructing a [`Simulator`].

use crate::script::Script;
use crate::simulator::{Simulator, SimulatorConfig};

/// Builder for [`Simulator`].
///
/// # Required inputs
///
/// None — every field defaults. `.script(..)` is the only one most callers
/// need to set; a builder with no script produces a simulator that ticks
/// forward with nothing scripted to happen, which is a legitimate (if
/// useless) configuration and not an error.
///
/// # Example
///
/// ```rust,ignore
/// let sim = SimulatorBuilder::new()
///     .tick_size(1.0)
///     .time_stop(200.0)
///     .seed(42)
///     .script(script)
///     .build();
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimulatorBuilder {
    config: SimulatorConfig,
    script: Option<Script>,
}

impl SimulatorBuilder {
    pub fn new() -> Self {
        Self { config: SimulatorConfig::default(), script: None }
    }

    pub fn tick_size(mut self, tick_size: f64) -> Self {
        self.config.tick_size = tick_size;
        self
    }

    pub fn time_stop(mut self, time_stop: f64) -> Self {
        self.config.time_stop = time_stop;
        self
    }

    pub fn max_quiescence_rounds(mut self, max_rounds: usize) -> Self {
        self.config.max_quiescence_rounds = max_rounds;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn script(mut self, script: Script) -> Self {
        self.script = Some(script);
        self
    }

    pub fn build(self) -> Simulator {
        Simulator::new(self.config, self.script.unwrap_or_else(Script::empty))
    }
}

impl Default for SimulatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
