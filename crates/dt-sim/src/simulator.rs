//! The `Simulator` and its tick loop (§4.H).
//!
//! ```text
//! while scene.time <= time_stop:
//!   events = script.events_in [scene.time, scene.time + tick_size)
//!   scene.time += tick_size
//!   for event in events: dispatch NewOrder/NewCourier/Remove*
//!   tick all agents
//!   wait for quiescence (bounded)
//!   invoke callback with {time, tick_counter, tick_size}
//! ```
//!
//! Grounded on the teacher's `Sim::run`/`process_tick` split: a single
//! public `run` driving a private per-iteration step, observer hooks at the
//! same two boundaries (tick start/end, plus sim end). What replaces the
//! teacher's wake-queue-driven phase split is the dispatcher's own
//! round-draining loop ([`Dispatcher::run_until_quiescent`]) — there is no
//! separate "intent then apply" split here because agents communicate by
//! message, not by returning intents to a central mover.

use dt_agent::Dispatcher;
use dt_behavior::{Agent, AgentContext, Export};
use dt_core::{AgentAddress, AgentRng, CourierId, DtError, OrderId, SimRng, SimTime};
use dt_negotiation::{CourierAgent, OrderAgent};
use dt_schedule::{Courier, Order};

use crate::error::{SimError, SimResult};
use crate::observer::SimObserver;
use crate::scene::Scene;
use crate::script::{Script, ScriptEventKind};

/// Tunable knobs for a [`Simulator`] run, grounded on the teacher's
/// `SimConfig` (plain struct, no config-file parsing in core — see
/// `SPEC_FULL.md` §1).
#[derive(Clone, Debug)]
pub struct SimulatorConfig {
    /// How much `scene.time` advances per loop iteration.
    pub tick_size: f64,
    /// The loop stops once `scene.time` exceeds this.
    pub time_stop: f64,
    /// Upper bound on rounds spent draining one tick's message cascade to
    /// quiescence (§8's bounded-rounds negotiation property; also a
    /// defensive backstop against a malformed cascade).
    pub max_quiescence_rounds: usize,
    /// Seed for per-agent RNGs and the dispatcher's tick-order shuffle.
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self { tick_size: 1.0, time_stop: 100.0, max_quiescence_rounds: 64, seed: 0 }
    }
}

/// Ties together the [`Scene`], [`Script`], and [`Dispatcher`] and drives
/// the scripted-event tick loop.
pub struct Simulator {
    pub scene: Scene,
    script: Script,
    dispatcher: Dispatcher,
    config: SimulatorConfig,
    rng: SimRng,
}

impl Simulator {
    pub fn new(config: SimulatorConfig, script: Script) -> Self {
        let scene = Scene::new(config.tick_size);
        let rng = SimRng::new(config.seed);
        Self { scene, script, dispatcher: Dispatcher::new(), config, rng }
    }

    /// Number of messages enqueued so far, across the whole run — the
    /// scene's conceptual "counter of messages sent" (§3), backed by the
    /// dispatcher's mailbox substrate rather than duplicated state.
    pub fn message_count(&self) -> u64 {
        self.dispatcher.message_count()
    }

    /// Snapshot every live agent's exported state (courier schedules, order
    /// delivery data) — what a host hands to an output writer.
    pub fn export_all(&mut self) -> Vec<Export> {
        self.dispatcher.export_all()
    }

    fn rng_for(&self, address: AgentAddress) -> AgentRng {
        AgentRng::new(self.config.seed, address)
    }

    fn context(&self) -> AgentContext {
        AgentContext::with_known_couriers(self.scene.now(), self.dispatcher.courier_ids())
    }

    /// Run from the current time to `config.time_stop`, inclusive, invoking
    /// `observer`'s hooks at each tick boundary.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.scene.now().0 <= self.config.time_stop {
            self.step(observer)?;
        }
        observer.on_sim_end(self.scene.now());
        Ok(())
    }

    /// Run exactly `n` further ticks, ignoring `time_stop`. Useful for tests
    /// and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let from = self.scene.now();
        let to = from.offset(self.config.tick_size);
        let tick_counter = self.scene.clock.tick_counter;

        observer.on_tick_start(from, tick_counter);

        let events = self.script.events_in(from, to).to_vec();
        self.scene.advance_clock(to)?;

        for event in events {
            self.apply_event(event.kind)?;
        }

        self.dispatcher.tick_agents(Some(&mut self.rng));
        let ctx = self.context();
        let seed = self.config.seed;
        let mut factory = |addr: AgentAddress| AgentRng::new(seed, addr);
        let rounds = self.dispatcher.run_until_quiescent(&ctx, &mut factory, self.config.max_quiescence_rounds);

        observer.on_tick_end(self.scene.now(), self.scene.clock.tick_counter, rounds);
        Ok(())
    }

    fn apply_event(&mut self, kind: ScriptEventKind) -> SimResult<()> {
        match kind {
            ScriptEventKind::NewOrder(order) => self.add_order(order),
            ScriptEventKind::NewCourier(courier) => self.add_courier(courier),
            ScriptEventKind::RemoveOrder(id) => self.remove_order(id),
            ScriptEventKind::RemoveCourier(id) => self.remove_courier(id),
        }
    }

    /// Register a new order entity and its agent (§4.G `add_entity`).
    pub fn add_order(&mut self, order: Order) -> SimResult<()> {
        let id = order.id;
        self.scene.register_order(id);
        self.dispatcher.add_entity(Box::new(OrderAgent::new(order)) as Box<dyn Agent>);
        Ok(())
    }

    /// Register a new courier entity and its agent.
    pub fn add_courier(&mut self, courier: Courier) -> SimResult<()> {
        let id = courier.id;
        self.scene.register_courier(id);
        self.dispatcher.add_entity(Box::new(CourierAgent::new(courier)) as Box<dyn Agent>);
        Ok(())
    }

    /// Tear down an order entity (§4.G `remove_entity`, §3 lifecycle).
    /// Unknown ids are logged and skipped (§7 `UnknownEntityType`), not
    /// treated as fatal.
    pub fn remove_order(&mut self, id: OrderId) -> SimResult<()> {
        if !self.scene.mark_order_deleting(id) {
            return Ok(());
        }
        let address = AgentAddress::Order(id);
        let ctx = self.context();
        let mut rng = self.rng_for(address);
        match self.dispatcher.remove_entity(address, &ctx, &mut rng) {
            Ok(()) | Err(DtError::UnknownEntityType(_)) => {}
            Err(e) => return Err(SimError::Dt(e)),
        }
        self.scene.forget_order(id);
        Ok(())
    }

    /// Tear down a courier entity. Its agent's `Exit` handler broadcasts
    /// `DELETED_COURIER` to every order agent before this call returns.
    pub fn remove_courier(&mut self, id: CourierId) -> SimResult<()> {
        if !self.scene.mark_courier_deleting(id) {
            return Ok(());
        }
        let address = AgentAddress::Courier(id);
        let ctx = self.context();
        let mut rng = self.rng_for(address);
        match self.dispatcher.remove_entity(address, &ctx, &mut rng) {
            Ok(()) | Err(DtError::UnknownEntityType(_)) => {}
            Err(e) => return Err(SimError::Dt(e)),
        }
        self.scene.forget_courier(id);
        Ok(())
    }
}
