//! `OrderAgent` — the concrete order side of the protocol (§4.F).
//!
//! Drives the Unassigned → AwaitingQuotes → AwaitingCommit → Assigned state
//! machine: fan out `PRICE_REQUEST`, score the collected variants with
//! [`dt_behavior::scoring`], commit to the best one, and re-negotiate
//! whenever a courier walks away from an assignment.

use std::collections::HashSet;

use dt_behavior::{select_best, Agent, AgentContext, Export, Message, Outgoing, Recipient, ScoringWeights, Variant};
use dt_core::{AgentAddress, AgentRng, CourierId, SimTime};
use dt_schedule::{DeliveryData, Order};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OrderState {
    Unassigned,
    AwaitingQuotes,
    AwaitingCommit,
    Assigned,
}

pub struct OrderAgent {
    address: AgentAddress,
    order: Order,
    state: OrderState,
    /// Couriers we've sent a `PRICE_REQUEST` to and haven't heard back from.
    outstanding: HashSet<CourierId>,
    /// Every variant collected so far this negotiation round, across all
    /// couriers that have replied.
    variants: Vec<Variant>,
    /// The variant currently out for commitment, if any — tracked
    /// explicitly rather than re-derived by price, so a failed commit drops
    /// exactly the offer we sent and nothing else.
    sent_variant: Option<Variant>,
    weights: ScoringWeights,
    /// When the current `AwaitingQuotes` round started, for the
    /// `response_timeout` check on `TICK` (§5).
    receive_start: SimTime,
}

impl OrderAgent {
    pub fn new(order: Order) -> Self {
        Self::with_weights(order, ScoringWeights::default())
    }

    pub fn with_weights(order: Order, weights: ScoringWeights) -> Self {
        let address = AgentAddress::Order(order.id);
        Self {
            address,
            order,
            state: OrderState::Unassigned,
            outstanding: HashSet::new(),
            variants: Vec::new(),
            sent_variant: None,
            weights,
            receive_start: SimTime::default(),
        }
    }

    fn broadcast_price_request(&mut self, ctx: &AgentContext) -> Vec<Outgoing> {
        self.state = OrderState::AwaitingQuotes;
        self.outstanding = ctx.known_couriers.iter().copied().collect();
        self.receive_start = ctx.now;
        self.variants.clear();
        self.sent_variant = None;
        vec![Outgoing { to: Recipient::AllCouriers, message: Message::PriceRequest { order: self.order.clone() } }]
    }

    /// Score everything collected so far and commit to the winner; if
    /// nothing scores, the order simply waits (for `NEW_COURIER` or a
    /// timeout-forced retry).
    fn try_advance_after_quotes(&mut self) -> Vec<Outgoing> {
        let Some(idx) = select_best(&self.variants, &self.weights) else {
            return vec![];
        };
        let variant = self.variants.remove(idx);
        let to = AgentAddress::Courier(variant.courier);
        self.sent_variant = Some(variant.clone());
        self.state = OrderState::AwaitingCommit;
        vec![Outgoing::one(to, Message::PlanningRequest { order: self.order.id, variant })]
    }

    fn reset_for_replan(&mut self) {
        self.order.delivery_data = None;
        self.variants.clear();
        self.sent_variant = None;
    }
}

impl Agent for OrderAgent {
    fn address(&self) -> AgentAddress {
        self.address
    }

    fn handle(&mut self, from: AgentAddress, message: Message, ctx: &AgentContext, _rng: &mut AgentRng) -> Vec<Outgoing> {
        match message {
            Message::Init => self.broadcast_price_request(ctx),

            Message::PriceResponse { order, variants } => {
                if order != self.order.id || self.state != OrderState::AwaitingQuotes {
                    return vec![]; // stale: superseded round or already committing
                }
                let AgentAddress::Courier(courier) = from else { return vec![] };
                if !self.outstanding.remove(&courier) {
                    return vec![]; // stale: not an address we're waiting on this round
                }
                self.variants.extend(variants);
                if self.outstanding.is_empty() {
                    self.try_advance_after_quotes()
                } else {
                    vec![]
                }
            }

            Message::PlanningResponse { order, success } => {
                if order != self.order.id || self.state != OrderState::AwaitingCommit {
                    return vec![];
                }
                let Some(sent) = self.sent_variant.take() else { return vec![] };
                let AgentAddress::Courier(sent_courier) = from else {
                    self.sent_variant = Some(sent);
                    return vec![];
                };
                if sent.courier != sent_courier {
                    // Reply from a courier we didn't hand the winning offer to.
                    self.sent_variant = Some(sent);
                    return vec![];
                }

                if success {
                    self.order.delivery_data = Some(DeliveryData {
                        courier: sent.courier,
                        price: sent.price,
                        time_from: sent.start_time,
                        time_to: sent.end_time,
                    });
                    self.state = OrderState::Assigned;
                    self.variants.clear();
                    vec![]
                } else if !self.variants.is_empty() {
                    self.try_advance_after_quotes()
                } else {
                    self.broadcast_price_request(ctx)
                }
            }

            Message::RemoveOrder { courier } => {
                if self.state != OrderState::Assigned {
                    return vec![];
                }
                if self.order.delivery_data.as_ref().map(|d| d.courier) != Some(courier) {
                    return vec![];
                }
                self.reset_for_replan();
                self.broadcast_price_request(ctx)
            }

            Message::DeletedCourier { courier } => {
                if self.state == OrderState::Assigned
                    && self.order.delivery_data.as_ref().map(|d| d.courier) == Some(courier)
                {
                    self.reset_for_replan();
                    self.broadcast_price_request(ctx)
                } else {
                    vec![] // §4.F: other-courier deletions are ignored; an
                           // outstanding quote from a deleted courier is
                           // cleared instead by the response-timeout check
                }
            }

            Message::NewCourier { courier } => match self.state {
                OrderState::Unassigned | OrderState::AwaitingQuotes => {
                    self.state = OrderState::AwaitingQuotes;
                    self.outstanding.insert(courier);
                    vec![Outgoing::one(AgentAddress::Courier(courier), Message::PriceRequest { order: self.order.clone() })]
                }
                OrderState::AwaitingCommit | OrderState::Assigned => vec![],
            },

            Message::Tick => {
                if self.state == OrderState::AwaitingQuotes
                    && !self.outstanding.is_empty()
                    && (ctx.now - self.receive_start) >= self.order.response_timeout
                {
                    self.outstanding.clear();
                    self.try_advance_after_quotes()
                } else {
                    vec![]
                }
            }

            Message::PriceRequest { .. } | Message::PlanningRequest { .. } | Message::Exit => vec![],
        }
    }

    fn export(&self) -> Export {
        Export::Order { order_id: self.order.id, delivery_data: self.order.delivery_data.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_behavior::VariantKind;
    use dt_core::{OrderId, Point};

    fn order() -> Order {
        Order {
            id: OrderId(1),
            name: "o1".into(),
            mass: 1.0,
            volume: 1.0,
            price: 10.0,
            pickup: Point::new(30.0, 0.0),
            delivery: Point::new(30.0, 40.0),
            time_from: SimTime(5.0),
            time_to: SimTime(100.0),
            order_type: None,
            is_urgent: false,
            appearance_time: SimTime(0.0),
            response_timeout: 10.0,
            delivery_data: None,
        }
    }

    fn variant(courier: u32, price: f64) -> Variant {
        Variant { kind: VariantKind::Asap, courier: CourierId(courier), start_time: SimTime(0.0), end_time: SimTime(7.0), price }
    }

    fn rng() -> AgentRng {
        AgentRng::new(1, AgentAddress::Order(OrderId(1)))
    }

    #[test]
    fn init_broadcasts_price_request_and_tracks_outstanding() {
        let mut agent = OrderAgent::new(order());
        let ctx = AgentContext::with_known_couriers(SimTime(0.0), vec![CourierId(1), CourierId(2)]);
        let out = agent.handle(agent.address(), Message::Init, &ctx, &mut rng());
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0].to, Recipient::AllCouriers));
        assert_eq!(agent.outstanding.len(), 2);
        assert_eq!(agent.state, OrderState::AwaitingQuotes);
    }

    #[test]
    fn collecting_all_quotes_commits_to_best_variant() {
        let mut agent = OrderAgent::new(order());
        let ctx = AgentContext::with_known_couriers(SimTime(0.0), vec![CourierId(1), CourierId(2)]);
        agent.handle(agent.address(), Message::Init, &ctx, &mut rng());

        agent.handle(
            AgentAddress::Courier(CourierId(1)),
            Message::PriceResponse { order: OrderId(1), variants: vec![variant(1, 20.0)] },
            &ctx,
            &mut rng(),
        );
        let out = agent.handle(
            AgentAddress::Courier(CourierId(2)),
            Message::PriceResponse { order: OrderId(1), variants: vec![variant(2, 5.0)] },
            &ctx,
            &mut rng(),
        );

        assert_eq!(out.len(), 1);
        match &out[0].message {
            Message::PlanningRequest { variant, .. } => assert_eq!(variant.courier, CourierId(2)),
            _ => panic!("expected PlanningRequest"),
        }
        assert_eq!(agent.state, OrderState::AwaitingCommit);
    }

    #[test]
    fn planning_success_assigns_and_stores_delivery_data() {
        let mut agent = OrderAgent::new(order());
        let ctx = AgentContext::with_known_couriers(SimTime(0.0), vec![CourierId(1)]);
        agent.handle(agent.address(), Message::Init, &ctx, &mut rng());
        agent.handle(
            AgentAddress::Courier(CourierId(1)),
            Message::PriceResponse { order: OrderId(1), variants: vec![variant(1, 20.0)] },
            &ctx,
            &mut rng(),
        );
        let out = agent.handle(
            AgentAddress::Courier(CourierId(1)),
            Message::PlanningResponse { order: OrderId(1), success: true },
            &ctx,
            &mut rng(),
        );
        assert!(out.is_empty());
        assert_eq!(agent.state, OrderState::Assigned);
        assert!(agent.order.delivery_data.is_some());
    }

    #[test]
    fn planning_failure_tries_next_variant_then_rebroadcasts() {
        let mut agent = OrderAgent::new(order());
        let ctx = AgentContext::with_known_couriers(SimTime(0.0), vec![CourierId(1), CourierId(2)]);
        agent.handle(agent.address(), Message::Init, &ctx, &mut rng());
        agent.handle(
            AgentAddress::Courier(CourierId(1)),
            Message::PriceResponse { order: OrderId(1), variants: vec![variant(1, 20.0)] },
            &ctx,
            &mut rng(),
        );
        agent.handle(
            AgentAddress::Courier(CourierId(2)),
            Message::PriceResponse { order: OrderId(1), variants: vec![variant(2, 5.0)] },
            &ctx,
            &mut rng(),
        );
        // Best (courier 2, price 5) was sent; fail it and expect a retry
        // against the remaining variant (courier 1).
        let out = agent.handle(
            AgentAddress::Courier(CourierId(2)),
            Message::PlanningResponse { order: OrderId(1), success: false },
            &ctx,
            &mut rng(),
        );
        match &out[0].message {
            Message::PlanningRequest { variant, .. } => assert_eq!(variant.courier, CourierId(1)),
            _ => panic!("expected retry PlanningRequest"),
        }

        let out2 = agent.handle(
            AgentAddress::Courier(CourierId(1)),
            Message::PlanningResponse { order: OrderId(1), success: false },
            &ctx,
            &mut rng(),
        );
        assert!(matches!(out2[0].to, Recipient::AllCouriers));
        assert_eq!(agent.state, OrderState::AwaitingQuotes);
    }

    #[test]
    fn remove_order_clears_assignment_and_rebroadcasts() {
        let mut agent = OrderAgent::new(order());
        let ctx = AgentContext::with_known_couriers(SimTime(0.0), vec![CourierId(1)]);
        agent.handle(agent.address(), Message::Init, &ctx, &mut rng());
        agent.handle(
            AgentAddress::Courier(CourierId(1)),
            Message::PriceResponse { order: OrderId(1), variants: vec![variant(1, 20.0)] },
            &ctx,
            &mut rng(),
        );
        agent.handle(
            AgentAddress::Courier(CourierId(1)),
            Message::PlanningResponse { order: OrderId(1), success: true },
            &ctx,
            &mut rng(),
        );
        assert_eq!(agent.state, OrderState::Assigned);

        let out = agent.handle(AgentAddress::Courier(CourierId(1)), Message::RemoveOrder { courier: CourierId(1) }, &ctx, &mut rng());
        assert_eq!(agent.state, OrderState::AwaitingQuotes);
        assert!(agent.order.delivery_data.is_none());
        assert!(matches!(out[0].to, Recipient::AllCouriers));
    }

    #[test]
    fn new_courier_is_ignored_once_assigned() {
        let mut agent = OrderAgent::new(order());
        let ctx = AgentContext::with_known_couriers(SimTime(0.0), vec![CourierId(1)]);
        agent.handle(agent.address(), Message::Init, &ctx, &mut rng());
        agent.handle(
            AgentAddress::Courier(CourierId(1)),
            Message::PriceResponse { order: OrderId(1), variants: vec![variant(1, 20.0)] },
            &ctx,
            &mut rng(),
        );
        agent.handle(
            AgentAddress::Courier(CourierId(1)),
            Message::PlanningResponse { order: OrderId(1), success: true },
            &ctx,
            &mut rng(),
        );
        let out = agent.handle(AgentAddress::Courier(CourierId(2)), Message::NewCourier { courier: CourierId(2) }, &ctx, &mut rng());
        assert!(out.is_empty());
    }

    #[test]
    fn tick_forces_advance_after_timeout_elapses() {
        let mut agent = OrderAgent::new(order());
        let ctx0 = AgentContext::with_known_couriers(SimTime(0.0), vec![CourierId(1), CourierId(2)]);
        agent.handle(agent.address(), Message::Init, &ctx0, &mut rng());
        agent.handle(
            AgentAddress::Courier(CourierId(1)),
            Message::PriceResponse { order: OrderId(1), variants: vec![variant(1, 20.0)] },
            &ctx0,
            &mut rng(),
        );
        // Courier 2 never responds; after response_timeout elapses a TICK
        // should force a decision on what's collected so far.
        let ctx_late = AgentContext::with_known_couriers(SimTime(20.0), vec![CourierId(1), CourierId(2)]);
        let out = agent.handle(agent.address(), Message::Tick, &ctx_late, &mut rng());
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0].message, Message::PlanningRequest { .. }));
        assert_eq!(agent.state, OrderState::AwaitingCommit);
    }
}
