//! `CourierAgent` — the concrete courier side of the protocol (§4.E).
//!
//! Variant generation is the free function in [`crate::variant`]; this
//! module wraps it with the agent's own state (the live [`Courier`] plus a
//! cache of every [`Order`] it has ever been asked to quote) and adds the
//! atomic planning-commitment half of §4.E: snapshot, apply, rollback on
//! any failure.

use std::collections::{HashMap, HashSet};

use dt_behavior::{Agent, AgentContext, Export, Message, Outgoing, Recipient, Variant, VariantKind};
use dt_core::{AgentAddress, AgentRng, OrderId, SimTime};
use dt_schedule::{Courier, Order};

use crate::variant::generate_variants;

/// The courier-side agent. Owns the live schedule; every mutation to it
/// happens inside [`Agent::handle`], so no other thread ever observes it
/// mid-edit (§5's no-reentrancy invariant).
pub struct CourierAgent {
    address: AgentAddress,
    courier: Courier,
    /// Full data for every order this courier has been sent in a
    /// `PRICE_REQUEST`, keyed by id. Doubles as the `assigned` lookup
    /// `generate_variants` needs (any order still occupying a schedule slot
    /// is necessarily in here) and as the source of truth for rebuilding a
    /// shifted order's parameters during a reschedule commit.
    known_orders: HashMap<OrderId, Order>,
}

impl CourierAgent {
    pub fn new(courier: Courier) -> Self {
        Self { address: AgentAddress::Courier(courier.id), courier, known_orders: HashMap::new() }
    }

    /// Snapshot, apply `variant`, and roll back to the snapshot on any
    /// failure — the atomicity boundary §4.E and §5 both require.
    fn commit(&mut self, order_id: OrderId, variant: &Variant, now: SimTime) -> bool {
        let Some(incoming) = self.known_orders.get(&order_id).cloned() else {
            // Never quoted this order: malformed commit request (§7).
            return false;
        };

        let snapshot = self.courier.schedule.clone();
        let ok = match &variant.kind {
            VariantKind::Asap | VariantKind::Jit => {
                self.courier.add_order_to_schedule(&incoming, variant.start_time, variant.end_time, variant.price)
            }
            VariantKind::Conflict { order_to_displace } => {
                self.commit_conflict(&incoming, variant, *order_to_displace, now)
            }
            VariantKind::Reschedule { shift_chain } => self.commit_reschedule(&incoming, variant, shift_chain),
        };

        if !ok {
            self.courier.schedule = snapshot;
        }
        ok
    }

    /// Evict `order_to_displace`, then insert the incoming order in its
    /// slot. Re-validates displaceability and the single-victim precondition
    /// against the *current* schedule rather than trusting the variant —
    /// another commit may have landed since the variant was quoted (§5:
    /// couriers must tolerate a now-infeasible `PLANNING_REQUEST`).
    ///
    /// `end_time` is re-derived from the courier's post-deletion geometry
    /// rather than taken from the variant: removing the victim moves
    /// `last_point()`, so the window the variant was quoted against no
    /// longer matches what `add_order_to_schedule`'s own geometry check will
    /// compute.
    fn commit_conflict(&mut self, incoming: &Order, variant: &Variant, order_to_displace: OrderId, now: SimTime) -> bool {
        let conflicts = self.courier.get_conflicts(variant.start_time, variant.end_time);
        let conflicted: HashSet<OrderId> =
            conflicts.iter().filter_map(|&i| self.courier.schedule[i].order).collect();
        if conflicted.len() != 1 || !conflicted.contains(&order_to_displace) {
            return false;
        }
        if !self.courier.is_order_displaceable(order_to_displace, now) {
            return false;
        }

        self.courier.delete_order(order_to_displace);
        let end_time = expected_end_time(&self.courier, incoming, variant.start_time);
        self.courier.add_order_to_schedule(incoming, variant.start_time, end_time, variant.price)
    }

    /// Remove every order in the shift chain, insert the incoming order,
    /// then reinsert each shifted order at its precomputed start and
    /// original cost. Every `end_time` is re-derived against the schedule
    /// as it stands right before that insertion (see `commit_conflict`) —
    /// each removal and reinsertion moves `last_point()`, so the windows
    /// computed when the variant was quoted no longer hold. Any single
    /// reinsertion failing aborts the whole commit — the caller restores
    /// the pre-commit snapshot.
    fn commit_reschedule(&mut self, incoming: &Order, variant: &Variant, shift_chain: &[dt_behavior::ShiftEntry]) -> bool {
        for entry in shift_chain {
            self.courier.delete_order(entry.order);
        }
        let incoming_end = expected_end_time(&self.courier, incoming, variant.start_time);
        if !self.courier.add_order_to_schedule(incoming, variant.start_time, incoming_end, variant.price) {
            return false;
        }
        for entry in shift_chain {
            let Some(shifted) = self.known_orders.get(&entry.order).cloned() else {
                return false;
            };
            let end_time = expected_end_time(&self.courier, &shifted, entry.new_start);
            if !self.courier.add_order_to_schedule(&shifted, entry.new_start, end_time, entry.cost) {
                return false;
            }
        }
        true
    }
}

/// The `end_time` `add_order_to_schedule` will itself require for `order`
/// starting at `start_time`, given the courier's schedule *right now* —
/// i.e. `start_time + distance(last_point, pickup)/speed +
/// distance(pickup, delivery)/speed`. Used to re-derive a commit's window
/// after a deletion has moved `last_point()` out from under a
/// generation-time variant.
fn expected_end_time(courier: &Courier, order: &Order, start_time: SimTime) -> SimTime {
    let last_point = courier.last_point();
    let t_pickup = last_point.distance(order.pickup) / courier.speed;
    let t_deliver = order.pickup.distance(order.delivery) / courier.speed;
    start_time.offset(t_pickup + t_deliver)
}

impl Agent for CourierAgent {
    fn address(&self) -> AgentAddress {
        self.address
    }

    fn handle(&mut self, from: AgentAddress, message: Message, ctx: &AgentContext, _rng: &mut AgentRng) -> Vec<Outgoing> {
        match message {
            // A fresh courier announces itself so any order already
            // mid-negotiation (and thus not re-broadcasting) learns it
            // exists (§3 Ownership & lifecycle, mirrored from the
            // teacher-source courier agent's init handler).
            Message::Init => vec![Outgoing {
                to: Recipient::AllOrders,
                message: Message::NewCourier { courier: self.courier.id },
            }],

            Message::PriceRequest { order } => {
                self.known_orders.insert(order.id, order.clone());
                let variants = generate_variants(&self.courier, &self.known_orders, &order, ctx.now);
                vec![Outgoing::one(from, Message::PriceResponse { order: order.id, variants })]
            }

            Message::PlanningRequest { order, variant } => {
                let success = self.commit(order, &variant, ctx.now);
                let mut out = vec![Outgoing::one(from, Message::PlanningResponse { order, success })];
                if success {
                    if let VariantKind::Conflict { order_to_displace } = variant.kind {
                        out.push(Outgoing::one(
                            AgentAddress::Order(order_to_displace),
                            Message::RemoveOrder { courier: self.courier.id },
                        ));
                    }
                }
                out
            }

            Message::Exit => vec![Outgoing {
                to: Recipient::AllOrders,
                message: Message::DeletedCourier { courier: self.courier.id },
            }],

            // Not addressed to couriers in this protocol; dropped per §7.
            Message::PriceResponse { .. }
            | Message::PlanningResponse { .. }
            | Message::RemoveOrder { .. }
            | Message::DeletedCourier { .. }
            | Message::NewCourier { .. }
            | Message::Tick => vec![],
        }
    }

    fn export(&self) -> Export {
        Export::Courier { courier_id: self.courier.id, schedule: self.courier.schedule.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_core::{CourierId, Point};

    fn courier() -> Courier {
        Courier {
            id: CourierId(1),
            name: "c1".into(),
            init_point: Point::new(0.0, 0.0),
            deployment_cost: 0.0,
            rate: 1.0,
            speed: 10.0,
            max_mass: 50.0,
            types: vec![],
            capacity: 100.0,
            min_charge: 5.0,
            charge_velocity: 5.0,
            flight_discharge: 1.0,
            load_discharge_a: 0.0,
            load_discharge_b: 0.0,
            init_time: 0.0,
            appearance_time: 0.0,
            schedule: vec![],
        }
    }

    fn order(id: u32, price: f64) -> Order {
        Order {
            id: OrderId(id),
            name: format!("o{id}"),
            mass: 1.0,
            volume: 1.0,
            price,
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

    fn ctx() -> AgentContext {
        AgentContext::new(SimTime(0.0))
    }

    fn rng() -> AgentRng {
        AgentRng::new(1, AgentAddress::Courier(CourierId(1)))
    }

    #[test]
    fn price_request_replies_with_variants_to_sender() {
        let mut agent = CourierAgent::new(courier());
        let from = AgentAddress::Order(OrderId(1));
        let out = agent.handle(from, Message::PriceRequest { order: order(1, 10.0) }, &ctx(), &mut rng());
        assert_eq!(out.len(), 1);
        match &out[0].message {
            Message::PriceResponse { order: oid, variants } => {
                assert_eq!(*oid, OrderId(1));
                assert!(!variants.is_empty());
            }
            _ => panic!("expected PriceResponse"),
        }
    }

    #[test]
    fn planning_request_commits_asap_variant_and_replies_success() {
        let mut agent = CourierAgent::new(courier());
        let from = AgentAddress::Order(OrderId(1));
        let o = order(1, 10.0);
        let resp = agent.handle(from, Message::PriceRequest { order: o.clone() }, &ctx(), &mut rng());
        let Message::PriceResponse { variants, .. } = &resp[0].message else { panic!() };
        let asap = variants.iter().find(|v| v.kind == VariantKind::Asap).unwrap().clone();

        let out = agent.handle(from, Message::PlanningRequest { order: o.id, variant: asap }, &ctx(), &mut rng());
        assert_eq!(out.len(), 1);
        match &out[0].message {
            Message::PlanningResponse { success, .. } => assert!(*success),
            _ => panic!("expected PlanningResponse"),
        }
        assert!(!agent.courier.schedule.is_empty());
    }

    #[test]
    fn planning_request_for_unknown_order_fails_without_mutating_schedule() {
        let mut agent = CourierAgent::new(courier());
        let from = AgentAddress::Order(OrderId(1));
        let fake = Variant { kind: VariantKind::Asap, courier: CourierId(1), start_time: SimTime(0.0), end_time: SimTime(7.0), price: 10.0 };
        let out = agent.handle(from, Message::PlanningRequest { order: OrderId(99), variant: fake }, &ctx(), &mut rng());
        match &out[0].message {
            Message::PlanningResponse { success, .. } => assert!(!*success),
            _ => panic!(),
        }
        assert!(agent.courier.schedule.is_empty());
    }

    #[test]
    fn conflict_commit_evicts_and_notifies_victim() {
        let mut agent = CourierAgent::new(courier());
        let victim = order(1, 50.0);
        agent.handle(AgentAddress::Order(OrderId(1)), Message::PriceRequest { order: victim.clone() }, &ctx(), &mut rng());
        assert!(agent.courier.add_order_to_schedule(&victim, SimTime(5.0), SimTime(12.0), 40.0));

        let incoming = order(2, 200.0);
        agent.handle(AgentAddress::Order(OrderId(2)), Message::PriceRequest { order: incoming.clone() }, &ctx(), &mut rng());

        let variant = Variant {
            kind: VariantKind::Conflict { order_to_displace: OrderId(1) },
            courier: CourierId(1),
            start_time: SimTime(5.0),
            end_time: SimTime(12.0),
            price: 60.0,
        };
        let out = agent.handle(
            AgentAddress::Order(OrderId(2)),
            Message::PlanningRequest { order: OrderId(2), variant },
            &ctx(),
            &mut rng(),
        );
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0].message, Message::PlanningResponse { success: true, .. }));
        assert!(matches!(out[1].message, Message::RemoveOrder { .. }));
        assert!(agent.courier.schedule.iter().all(|i| i.order != Some(OrderId(1))));
    }

    #[test]
    fn conflict_variant_from_generate_variants_commits_despite_moved_geometry() {
        // Regression: the victim's removal moves the courier's `last_point`,
        // so a conflict variant quoted against the pre-removal position must
        // still commit once its window is re-derived post-deletion.
        let mut agent = CourierAgent::new(courier());
        let mut victim = order(1, 50.0);
        victim.pickup = Point::new(10.0, 0.0);
        victim.delivery = Point::new(10.0, 40.0);
        agent.handle(AgentAddress::Order(OrderId(1)), Message::PriceRequest { order: victim.clone() }, &ctx(), &mut rng());
        assert!(agent.courier.add_order_to_schedule(&victim, SimTime(1.0), SimTime(6.0), 40.0));

        let mut incoming = order(2, 200.0);
        incoming.pickup = Point::new(10.0, 40.0);
        incoming.delivery = Point::new(10.0, 80.0);
        incoming.time_from = SimTime(2.0);

        let resp =
            agent.handle(AgentAddress::Order(OrderId(2)), Message::PriceRequest { order: incoming.clone() }, &ctx(), &mut rng());
        let Message::PriceResponse { variants, .. } = &resp[0].message else { panic!("expected PriceResponse") };
        let conflict = variants
            .iter()
            .find(|v| matches!(v.kind, VariantKind::Conflict { order_to_displace } if order_to_displace == OrderId(1)))
            .expect("generate_variants should offer a displacement of the victim")
            .clone();

        let out = agent.handle(
            AgentAddress::Order(OrderId(2)),
            Message::PlanningRequest { order: OrderId(2), variant: conflict },
            &ctx(),
            &mut rng(),
        );
        assert!(matches!(out[0].message, Message::PlanningResponse { success: true, .. }));
        assert!(agent.courier.schedule.iter().any(|i| i.order == Some(OrderId(2))));
        assert!(agent.courier.schedule.iter().all(|i| i.order != Some(OrderId(1))));
    }

    #[test]
    fn exit_broadcasts_deleted_courier() {
        let mut agent = CourierAgent::new(courier());
        let out = agent.handle(agent.address(), Message::Exit, &ctx(), &mut rng());
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0].to, Recipient::AllOrders));
        assert!(matches!(out[0].message, Message::DeletedCourier { .. }));
    }
}
