//! `dt-sim` — the scripted-event tick loop that drives a negotiation-engine
//! simulation end to end.
//!
//! # Tick loop
//!
//! ```text
//! while scene.time <= time_stop:
//!   events = script.events_in [scene.time, scene.time + tick_size)
//!   scene.time += tick_size
//!   for event in events: apply NewOrder / NewCourier / RemoveOrder / RemoveCourier
//!   dispatcher.tick_agents()             // enqueue self-Tick to every agent
//!   dispatcher.run_until_quiescent(..)   // drain the negotiation cascade
//!   observer.on_tick_end(..)
//! ```
//!
//! There is no separate arrivals/intents/apply split here — agents act by
//! exchanging messages through [`dt_agent::Dispatcher`], so "apply" and
//! "intents" collapse into the dispatcher's own round-draining loop.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                      |
//! |------------|--------------------------------------------------------------|
//! | `parallel` | Propagates to `dt-agent`, running each round's agents on Rayon. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dt_sim::{NoopObserver, SimulatorBuilder};
//! use dt_sim::script::{Script, ScriptEvent, ScriptEventKind};
//!
//! let script = Script::new(vec![
//!     ScriptEvent::new(SimTime(0.0), ScriptEventKind::NewCourier(courier)),
//!     ScriptEvent::new(SimTime(0.0), ScriptEventKind::NewOrder(order)),
//! ]);
//! let mut sim = SimulatorBuilder::new().time_stop(100.0).seed(42).script(script).build();
//! sim.run(&mut NoopObserver)?;
//! let exports = sim.export_all();
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod scene;
pub mod script;
pub mod simulator;


pub use builder::SimulatorBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use scene::Scene;
pub use script::{Script, ScriptEvent, ScriptEventKind};
pub use simulator::{Simulator, SimulatorConfig};
