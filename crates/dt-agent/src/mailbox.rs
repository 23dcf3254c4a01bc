//! At-least-once, per-sender→receiver-FIFO local mailbox substrate (§4.D, §5).
//!
//! Delivery is local-process only (Non-goal: "distributed or fault-tolerant
//! message delivery across processes", §1) — a `HashMap` of `VecDeque`s is
//! sufficient; there is no network, so "at-least-once" reduces to "exactly
//! once, synchronously queued."

use std::collections::VecDeque;

#[cfg(feature = "fx-hash")]
use rustc_hash::FxHashMap as Map;
#[cfg(not(feature = "fx-hash"))]
use std::collections::HashMap as Map;

use dt_behavior::Envelope;
use dt_core::AgentAddress;

/// Per-address inboxes plus a running count of everything ever enqueued
/// (the Scene's "counter of messages sent", §3).
#[derive(Default)]
pub struct MailboxSubstrate {
    queues: Map<AgentAddress, VecDeque<Envelope>>,
    sent_count: u64,
}

impl MailboxSubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue one envelope. FIFO per sender→receiver pair falls out of
    /// `VecDeque` push/pop order applied per `to` address — within one
    /// address's queue, envelopes from the same `from` always stay ordered
    /// relative to each other since nothing reorders a queue's contents.
    pub fn push(&mut self, envelope: Envelope) {
        self.sent_count += 1;
        self.queues.entry(envelope.to).or_default().push_back(envelope);
    }

    /// Drain every envelope currently queued for `address`, preserving
    /// arrival order.
    pub fn drain(&mut self, address: AgentAddress) -> Vec<Envelope> {
        match self.queues.get_mut(&address) {
            Some(q) => q.drain(..).collect(),
            None => Vec::new(),
        }
    }

    /// Addresses with at least one pending envelope.
    pub fn pending_addresses(&self) -> Vec<AgentAddress> {
        self.queues
            .iter()
            .filter(|(_, q)| !q.is_empty())
            .map(|(a, _)| *a)
            .collect()
    }

    pub fn has_pending(&self) -> bool {
        self.queues.values().any(|q| !q.is_empty())
    }

    /// Drop a deleted agent's own inbox (anything still queued for it is
    /// now undeliverable — §7 `StaleMessage`, harmlessly discarded).
    pub fn discard(&mut self, address: AgentAddress) {
        self.queues.remove(&address);
    }

    pub fn sent_count(&self) -> u64 {
        self.sent_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_behavior::Message;
    use dt_core::OrderId;

    fn envelope(from: AgentAddress, to: AgentAddress) -> Envelope {
        Envelope { from, to, message: Message::Tick }
    }

    #[test]
    fn push_then_drain_preserves_order() {
        let mut mb = MailboxSubstrate::new();
        let a = AgentAddress::Order(OrderId(1));
        let b = AgentAddress::Order(OrderId(2));
        mb.push(envelope(a, b));
        mb.push(envelope(a, b));
        let drained = mb.drain(b);
        assert_eq!(drained.len(), 2);
        assert!(mb.drain(b).is_empty());
    }

    #[test]
    fn sent_count_tracks_all_pushes() {
        let mut mb = MailboxSubstrate::new();
        let a = AgentAddress::Order(OrderId(1));
        mb.push(envelope(a, a));
        mb.push(envelope(a, a));
        assert_eq!(mb.sent_count(), 2);
    }

    #[test]
    fn pending_addresses_excludes_empty_queues() {
        let mut mb = MailboxSubstrate::new();
        let a = AgentAddress::Order(OrderId(1));
        let b = AgentAddress::Order(OrderId(2));
        mb.push(envelope(a, b));
        assert_eq!(mb.pending_addresses(), vec![b]);
        mb.drain(b);
        assert!(mb.pending_addresses().is_empty());
    }
}
