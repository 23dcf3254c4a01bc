//! The `Agent` trait — the per-entity actor every order and courier
//! implements.

use dt_core::{AgentAddress, AgentRng, CourierId, OrderId};
use dt_schedule::{DeliveryData, ScheduleItem};

use crate::context::AgentContext;
use crate::message::{Message, Outgoing};

/// Final state an agent hands back to its host, e.g. for output writing.
#[derive(Clone, Debug)]
pub enum Export {
    Courier { courier_id: CourierId, schedule: Vec<ScheduleItem> },
    Order { order_id: OrderId, delivery_data: Option<DeliveryData> },
}

/// A message-driven actor addressed by an [`AgentAddress`].
///
/// # No-reentrancy
///
/// `handle` takes `&mut self`; the dispatcher guarantees it is never called
/// concurrently with another call on the same agent (§5's no-reentrancy
/// invariant). Distinct agents may be handled concurrently by distinct
/// threads — only one agent's own mailbox is ever serialized against itself.
///
/// Handlers must not panic on a malformed or stale message: log (by
/// returning no outgoing messages) and move on. Only clock monotonicity and
/// schedule-invariant corruption are meant to be fatal, and those propagate
/// from the schedule engine, not from here.
pub trait Agent: Send {
    fn address(&self) -> AgentAddress;

    /// Handle one message from `from`, returning zero or more messages to
    /// send in response. Must never block and must never panic on
    /// adversarial input.
    fn handle(
        &mut self,
        from: AgentAddress,
        message: Message,
        ctx: &AgentContext,
        rng: &mut AgentRng,
    ) -> Vec<Outgoing>;

    /// Snapshot of this agent's externally relevant state.
    fn export(&self) -> Export;
}
