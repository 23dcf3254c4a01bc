//! Protocol messages, variant offers, and the addressing types the
//! dispatcher resolves broadcasts through.

use dt_core::{AgentAddress, CourierId, OrderId, SimTime};
use dt_schedule::Order;

// ── Variants ─────────────────────────────────────────────────────────────────

/// One entry in a reschedule variant's shift chain: an already-assigned
/// order, pushed forward to make room for the new one.
#[derive(Clone, Debug, PartialEq)]
pub struct ShiftEntry {
    pub order: OrderId,
    pub new_start: SimTime,
    pub new_end: SimTime,
    /// Cost carried over unchanged from the pre-shift assignment.
    pub cost: f64,
}

/// What kind of offer a variant represents, and the data specific to it.
#[derive(Clone, Debug, PartialEq)]
pub enum VariantKind {
    Asap,
    Jit,
    /// Evict `order_to_displace` to make room in the requested slot.
    Conflict { order_to_displace: OrderId },
    /// Shift every order in `shift_chain` forward to make room.
    Reschedule { shift_chain: Vec<ShiftEntry> },
}

/// A concrete offer from a courier to an order.
#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    pub kind: VariantKind,
    pub courier: CourierId,
    pub start_time: SimTime,
    pub end_time: SimTime,
    pub price: f64,
}

impl Variant {
    pub fn name(&self) -> &'static str {
        match self.kind {
            VariantKind::Asap => "asap",
            VariantKind::Jit => "jit",
            VariantKind::Conflict { .. } => "conflict",
            VariantKind::Reschedule { .. } => "reschedule",
        }
    }
}

// ── Messages ─────────────────────────────────────────────────────────────────

/// The protocol's message payloads.
#[derive(Clone, Debug)]
pub enum Message {
    /// Sent by the dispatcher right after an agent is registered.
    Init,
    /// Order agent to courier agents: request assignment offers.
    PriceRequest { order: Order },
    /// Courier agent's reply: zero to three variants.
    PriceResponse { order: OrderId, variants: Vec<Variant> },
    /// Order agent to its chosen courier: commit to a variant.
    PlanningRequest { order: OrderId, variant: Variant },
    /// Courier agent's reply to a planning request.
    PlanningResponse { order: OrderId, success: bool },
    /// Courier agent to an evicted order's agent.
    RemoveOrder { courier: CourierId },
    /// Broadcast when a courier is torn down.
    DeletedCourier { courier: CourierId },
    /// Broadcast when a new courier joins, so unassigned/quoting orders can
    /// request a quote from it directly.
    NewCourier { courier: CourierId },
    /// Per-tick signal; reserved for self-improvement hooks (no-op today).
    Tick,
    /// Dispatcher's teardown signal.
    Exit,
}

// ── Addressing ───────────────────────────────────────────────────────────────

/// Where an `Outgoing` message should be delivered.
///
/// `AllCouriers`/`AllOrders` are resolved by the dispatcher against its
/// reference book at delivery time — agents never see the registry directly.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Recipient {
    One(AgentAddress),
    AllCouriers,
    AllOrders,
}

/// One message an agent wants to send, before the dispatcher expands its
/// recipient into concrete addresses.
#[derive(Clone, Debug)]
pub struct Outgoing {
    pub to: Recipient,
    pub message: Message,
}

impl Outgoing {
    pub fn one(to: AgentAddress, message: Message) -> Self {
        Outgoing { to: Recipient::One(to), message }
    }
}

/// A point-to-point message, as delivered into a mailbox.
#[derive(Clone, Debug)]
pub struct Envelope {
    pub from: AgentAddress,
    pub to: AgentAddress,
    pub message: Message,
}
