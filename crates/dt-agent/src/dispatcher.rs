//! The dispatcher: entity lifecycle (create/destroy) plus the tick-driven
//! cooperative message loop (§4.G, §4.D, §5).
//!
//! # Round structure
//!
//! [`run_until_quiescent`](Dispatcher::run_until_quiescent) drains the
//! mailbox substrate in rounds: every address with pending mail is handed
//! its queued envelopes (one `Agent::handle` call per envelope, in arrival
//! order — the no-reentrancy invariant of §5 holds because a single round
//! never calls `handle` twice concurrently for the same address), and the
//! `Outgoing` messages produced are routed into the *next* round's mailboxes
//! rather than redelivered within the same round. This keeps the loop's
//! progress boundable: round count is an upper bound on negotiation
//! "hops" (§8's bounded-rounds property), not unbounded recursion.
//!
//! With the `parallel` feature, the agents handled within one round run on
//! Rayon's thread pool — sound because [`ReferenceBook::get_many_mut`]
//! hands out disjoint `&mut` references, one per distinct address.

use dt_behavior::{Agent, AgentContext, Message, Outgoing, Recipient};
use dt_core::{AgentAddress, AgentRng, CourierId, DtError, DtResult, SimRng};

use crate::mailbox::MailboxSubstrate;
use crate::reference_book::ReferenceBook;

pub struct Dispatcher {
    book: ReferenceBook,
    mailbox: MailboxSubstrate,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self { book: ReferenceBook::new(), mailbox: MailboxSubstrate::new() }
    }

    pub fn len(&self) -> usize {
        self.book.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book.is_empty()
    }

    pub fn contains(&self, address: AgentAddress) -> bool {
        self.book.contains(address)
    }

    pub fn message_count(&self) -> u64 {
        self.mailbox.sent_count()
    }

    /// Every currently registered courier's id — what the host builds an
    /// [`AgentContext::known_couriers`] snapshot from before each round of
    /// message delivery.
    pub fn courier_ids(&self) -> Vec<CourierId> {
        self.book
            .courier_addresses()
            .filter_map(|a| match a {
                AgentAddress::Courier(id) => Some(id),
                AgentAddress::Order(_) => None,
            })
            .collect()
    }

    /// Register `agent` and queue it a self-addressed `Init` message,
    /// delivered on the next [`run_until_quiescent`](Self::run_until_quiescent)
    /// call. Matches §4.G's `add_entity`.
    pub fn add_entity(&mut self, agent: Box<dyn Agent>) {
        let address = agent.address();
        self.book.insert(agent);
        self.mailbox.push(dt_behavior::Envelope { from: address, to: address, message: Message::Init });
    }

    /// Deliver an `Exit` signal to `address` synchronously, route whatever
    /// it replies with (e.g. a `DeletedCourier` broadcast), then tombstone
    /// its slot and drop its own inbox. Matches §3's "set `is_deleting`,
    /// then tear down" lifecycle and §4.G's `remove_entity`.
    ///
    /// Returns `UnknownEntityType` if no agent is registered at `address`.
    pub fn remove_entity(
        &mut self,
        address: AgentAddress,
        ctx: &AgentContext,
        rng: &mut AgentRng,
    ) -> DtResult<()> {
        let Some(agent) = self.book.get_mut(address) else {
            return Err(DtError::UnknownEntityType(address));
        };
        let outgoing = agent.handle(address, Message::Exit, ctx, rng);
        self.route(address, outgoing);
        self.book.remove(address);
        self.mailbox.discard(address);
        Ok(())
    }

    /// Enqueue a self-addressed `Tick` for every registered agent. If `rng`
    /// is supplied, the enqueue order is shuffled first — §4.G explicitly
    /// allows (but does not require) randomizing per-tick processing order
    /// "to avoid bias," which here affects which courier's `PriceResponse`
    /// lands first in an order agent's variant list (relevant to scoring's
    /// insertion-order tie-break, §4.F).
    pub fn tick_agents(&mut self, rng: Option<&mut SimRng>) {
        let mut addresses: Vec<AgentAddress> = self.book.addresses().collect();
        if let Some(rng) = rng {
            rng.shuffle(&mut addresses);
        }
        for address in addresses {
            self.mailbox.push(dt_behavior::Envelope { from: address, to: address, message: Message::Tick });
        }
    }

    /// Drain the mailbox substrate to quiescence, bounded by `max_rounds`
    /// (a defensive backstop against a malformed negotiation cascade looping
    /// forever — §8 expects termination within a bounded number of rounds
    /// for any realistic scenario). Returns the number of rounds actually
    /// run.
    pub fn run_until_quiescent(
        &mut self,
        ctx: &AgentContext,
        agent_rngs: &mut dyn FnMut(AgentAddress) -> AgentRng,
        max_rounds: usize,
    ) -> usize {
        let mut round = 0;
        while round < max_rounds {
            let mut addresses = self.mailbox.pending_addresses();
            if addresses.is_empty() {
                break;
            }
            addresses.sort();

            let outgoing_by_round = self.run_round(&addresses, ctx, agent_rngs);
            for (from, outgoing) in outgoing_by_round {
                self.route(from, outgoing);
            }
            round += 1;
        }
        round
    }

    #[cfg(not(feature = "parallel"))]
    fn run_round(
        &mut self,
        addresses: &[AgentAddress],
        ctx: &AgentContext,
        agent_rngs: &mut dyn FnMut(AgentAddress) -> AgentRng,
    ) -> Vec<(AgentAddress, Vec<Outgoing>)> {
        addresses
            .iter()
            .map(|&address| {
                let envelopes = self.mailbox.drain(address);
                let mut rng = agent_rngs(address);
                let mut all_outgoing = Vec::new();
                if let Some(agent) = self.book.get_mut(address) {
                    for envelope in envelopes {
                        all_outgoing.extend(agent.handle(envelope.from, envelope.message, ctx, &mut rng));
                    }
                }
                (address, all_outgoing)
            })
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn run_round(
        &mut self,
        addresses: &[AgentAddress],
        ctx: &AgentContext,
        agent_rngs: &mut dyn FnMut(AgentAddress) -> AgentRng,
    ) -> Vec<(AgentAddress, Vec<Outgoing>)> {
        use rayon::prelude::*;

        let envelopes_by_address: Vec<_> =
            addresses.iter().map(|&a| (a, self.mailbox.drain(a), agent_rngs(a))).collect();
        let agents = self.book.get_many_mut(addresses);

        agents
            .into_par_iter()
            .zip(envelopes_by_address.into_par_iter())
            .map(|(agent, (address, envelopes, mut rng))| {
                let mut all_outgoing = Vec::new();
                for envelope in envelopes {
                    all_outgoing.extend(agent.handle(envelope.from, envelope.message, ctx, &mut rng));
                }
                (address, all_outgoing)
            })
            .collect()
    }

    /// Expand `outgoing`'s `Recipient`s against the current reference book
    /// and enqueue the resulting envelopes. `AllCouriers`/`AllOrders` are
    /// resolved here rather than by the sending agent, since only the
    /// dispatcher sees the reference book (§5: shared state reads are
    /// serialized here, not inside an agent's handler).
    fn route(&mut self, from: AgentAddress, outgoing: Vec<Outgoing>) {
        for out in outgoing {
            match out.to {
                Recipient::One(to) => {
                    if self.book.contains(to) {
                        self.mailbox.push(dt_behavior::Envelope { from, to, message: out.message });
                    }
                    // else: stale address (deleted since the agent formed
                    // its reply) — dropped, per §7 StaleMessage.
                }
                Recipient::AllCouriers => {
                    let targets: Vec<_> = self.book.courier_addresses().collect();
                    for to in targets {
                        self.mailbox.push(dt_behavior::Envelope {
                            from,
                            to,
                            message: out.message.clone(),
                        });
                    }
                }
                Recipient::AllOrders => {
                    let targets: Vec<_> = self.book.order_addresses().collect();
                    for to in targets {
                        self.mailbox.push(dt_behavior::Envelope {
                            from,
                            to,
                            message: out.message.clone(),
                        });
                    }
                }
            }
        }
    }

    /// Snapshot every registered agent's exported state (e.g. for output
    /// writers at the end of a run).
    pub fn export_all(&mut self) -> Vec<dt_behavior::Export> {
        let addresses: Vec<_> = self.book.addresses().collect();
        addresses
            .into_iter()
            .filter_map(|a| self.book.get_mut(a).map(|agent| agent.export()))
            .collect()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_behavior::{Export, Message as Msg};
    use dt_core::{CourierId, OrderId};

    struct Echo {
        address: AgentAddress,
        replies_to: Option<AgentAddress>,
    }

    impl Agent for Echo {
        fn address(&self) -> AgentAddress {
            self.address
        }

        fn handle(
            &mut self,
            _from: AgentAddress,
            message: Msg,
            _ctx: &AgentContext,
            _rng: &mut AgentRng,
        ) -> Vec<Outgoing> {
            match (message, self.replies_to) {
                (Msg::Init, Some(to)) => vec![Outgoing::one(to, Msg::Tick)],
                _ => vec![],
            }
        }

        fn export(&self) -> Export {
            Export::Order { order_id: OrderId(0), delivery_data: None }
        }
    }

    fn rng_factory() -> impl FnMut(AgentAddress) -> AgentRng {
        |addr| AgentRng::new(1, addr)
    }

    #[test]
    fn add_entity_delivers_init_on_next_round() {
        let mut d = Dispatcher::new();
        let a = AgentAddress::Order(OrderId(1));
        d.add_entity(Box::new(Echo { address: a, replies_to: None }));
        let ctx = AgentContext::new(dt_core::SimTime(0.0));
        let rounds = d.run_until_quiescent(&ctx, &mut rng_factory(), 10);
        assert_eq!(rounds, 1);
    }

    #[test]
    fn init_triggering_a_reply_is_delivered_next_round() {
        let mut d = Dispatcher::new();
        let a = AgentAddress::Order(OrderId(1));
        let b = AgentAddress::Courier(CourierId(1));
        d.add_entity(Box::new(Echo { address: a, replies_to: Some(b) }));
        d.add_entity(Box::new(Echo { address: b, replies_to: None }));
        let ctx = AgentContext::new(dt_core::SimTime(0.0));
        let rounds = d.run_until_quiescent(&ctx, &mut rng_factory(), 10);
        // round 1: both Inits processed (a's Init emits a message to b);
        // round 2: b's queued Tick from a is delivered and processed.
        assert_eq!(rounds, 2);
    }

    #[test]
    fn remove_entity_discards_its_inbox_and_tombstones() {
        let mut d = Dispatcher::new();
        let a = AgentAddress::Order(OrderId(1));
        d.add_entity(Box::new(Echo { address: a, replies_to: None }));
        let ctx = AgentContext::new(dt_core::SimTime(0.0));
        let mut rng = AgentRng::new(1, a);
        d.remove_entity(a, &ctx, &mut rng).unwrap();
        assert!(!d.contains(a));
        assert_eq!(d.run_until_quiescent(&ctx, &mut rng_factory(), 10), 0);
    }

    #[test]
    fn remove_unknown_entity_errors() {
        let mut d = Dispatcher::new();
        let ctx = AgentContext::new(dt_core::SimTime(0.0));
        let a = AgentAddress::Order(OrderId(99));
        let mut rng = AgentRng::new(1, a);
        assert!(d.remove_entity(a, &ctx, &mut rng).is_err());
    }

    #[test]
    fn bounded_rounds_stop_a_runaway_cascade() {
        struct Bouncer(AgentAddress, AgentAddress);
        impl Agent for Bouncer {
            fn address(&self) -> AgentAddress {
                self.0
            }
            fn handle(
                &mut self,
                _from: AgentAddress,
                _message: Msg,
                _ctx: &AgentContext,
                _rng: &mut AgentRng,
            ) -> Vec<Outgoing> {
                vec![Outgoing::one(self.1, Msg::Tick)]
            }
            fn export(&self) -> Export {
                Export::Order { order_id: OrderId(0), delivery_data: None }
            }
        }

        let mut d = Dispatcher::new();
        let a = AgentAddress::Order(OrderId(1));
        let b = AgentAddress::Order(OrderId(2));
        d.add_entity(Box::new(Bouncer(a, b)));
        d.add_entity(Box::new(Bouncer(b, a)));
        let ctx = AgentContext::new(dt_core::SimTime(0.0));
        let rounds = d.run_until_quiescent(&ctx, &mut rng_factory(), 5);
        assert_eq!(rounds, 5);
    }
}
