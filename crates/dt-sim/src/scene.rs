//! The scene: entity registry partitioned by type, plus the monotone
//! simulation clock (§3, §4.I).
//!
//! Unlike the teacher's [`AgentStore`] (a dense, index-addressed SoA store
//! built once at startup), entities here arrive and leave throughout a run
//! driven by [`crate::script::Script`] events, so the registry is a sparse
//! map keyed by the entity's own identity rather than a `Vec` indexed by
//! position. What survives from the teacher's shape is the split between
//! "registry of what exists" (here) and "the thing that actually processes
//! messages" ([`dt_agent::Dispatcher`]) — Scene never holds a `Courier` or
//! `Order` value itself, only the fact that one exists and whether it is
//! mid-teardown.

use std::collections::HashMap;

use dt_core::{CourierId, OrderId, SimClock, SimTime};

use crate::error::{SimError, SimResult};

/// Entity registry and simulation clock.
///
/// The `bool` in each map is the §3 "`is_deleting`" flag: set the instant a
/// removal event is applied, before the corresponding agent is handed its
/// exit signal, so any lookup racing the teardown sees the entity as gone
/// rather than live.
pub struct Scene {
    pub clock: SimClock,
    orders: HashMap<OrderId, bool>,
    couriers: HashMap<CourierId, bool>,
}

impl Scene {
    pub fn new(tick_size: f64) -> Self {
        Self { clock: SimClock::new(tick_size), orders: HashMap::new(), couriers: HashMap::new() }
    }

    // ── Clock ────────────────────────────────────────────────────────────

    /// Advance the clock to `to`, bumping the tick counter. Fails (fatal,
    /// §7) if `to` is strictly before the current time — the simulator loop
    /// only ever calls this with `current_time + tick_size`, so a failure
    /// here indicates a programming error, not adversarial input.
    pub fn advance_clock(&mut self, to: SimTime) -> SimResult<()> {
        if !self.clock.try_set(to) {
            return Err(SimError::ClockMonotonicityViolation);
        }
        self.clock.tick_counter += 1;
        Ok(())
    }

    pub fn now(&self) -> SimTime {
        self.clock.current_time
    }

    // ── Orders ───────────────────────────────────────────────────────────

    pub fn register_order(&mut self, id: OrderId) {
        self.orders.insert(id, false);
    }

    pub fn contains_order(&self, id: OrderId) -> bool {
        self.orders.contains_key(&id)
    }

    pub fn is_order_deleting(&self, id: OrderId) -> bool {
        self.orders.get(&id).copied().unwrap_or(false)
    }

    /// Set the order's `is_deleting` flag. Returns `false` if the order is
    /// not registered (§7 `UnknownEntityType` — caller logs and skips).
    pub fn mark_order_deleting(&mut self, id: OrderId) -> bool {
        match self.orders.get_mut(&id) {
            Some(flag) => {
                *flag = true;
                true
            }
            None => false,
        }
    }

    pub fn forget_order(&mut self, id: OrderId) {
        self.orders.remove(&id);
    }

    pub fn order_ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.orders.keys().copied()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    // ── Couriers ─────────────────────────────────────────────────────────

    pub fn register_courier(&mut self, id: CourierId) {
        self.couriers.insert(id, false);
    }

    pub fn contains_courier(&self, id: CourierId) -> bool {
        self.couriers.contains_key(&id)
    }

    pub fn is_courier_deleting(&self, id: CourierId) -> bool {
        self.couriers.get(&id).copied().unwrap_or(false)
    }

    pub fn mark_courier_deleting(&mut self, id: CourierId) -> bool {
        match self.couriers.get_mut(&id) {
            Some(flag) => {
                *flag = true;
                true
            }
            None => false,
        }
    }

    pub fn forget_courier(&mut self, id: CourierId) {
        self.couriers.remove(&id);
    }

    pub fn courier_ids(&self) -> impl Iterator<Item = CourierId> + '_ {
        self.couriers.keys().copied()
    }

    pub fn courier_count(&self) -> usize {
        self.couriers.len()
    }
}
