//! Read-only state passed to every agent handler call.

use dt_core::{CourierId, SimTime};

/// Snapshot of simulation state visible to an agent while handling one
/// message. Built fresh by the dispatcher for every `handle` call — the
/// agent never sees the scene registry or reference book directly (see §5:
/// shared state is read during broadcast resolution, which is the
/// dispatcher's job, not the agent's).
///
/// `known_couriers` is the one piece of registry data an order agent needs
/// to run its own negotiation loop: the set of courier identities a
/// `PRICE_REQUEST` broadcast fanned out to, so it can track an
/// outstanding-response set (§4.F) without holding a reference to the
/// dispatcher's reference book itself.
#[derive(Clone, Debug, Default)]
pub struct AgentContext {
    pub now: SimTime,
    pub known_couriers: Vec<CourierId>,
}

impl AgentContext {
    pub fn new(now: SimTime) -> Self {
        Self { now, known_couriers: Vec::new() }
    }

    pub fn with_known_couriers(now: SimTime, known_couriers: Vec<CourierId>) -> Self {
        Self { now, known_couriers }
    }
}
