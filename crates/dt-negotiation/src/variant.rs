//! Variant generation — the courier side of a `PRICE_REQUEST` (§4.E).
//!
//! A free function rather than a method on [`CourierAgent`]: it only needs
//! read access to the courier's schedule and its cache of currently assigned
//! orders, and keeping it standalone makes each of the four variant shapes
//! (ASAP / JIT / displacement / reschedule) independently testable against a
//! bare [`Courier`] without constructing a whole agent.

use std::collections::HashMap;

use dt_core::{OrderId, RecType, SimTime};
use dt_schedule::{Courier, Order};

use dt_behavior::{ShiftEntry, Variant, VariantKind};

/// Generate up to three offers (ASAP, plus one of JIT / a conflict-slot
/// {displacement, reschedule} pair) for `order`.
///
/// `assigned` is the courier agent's cache of the full [`Order`] for every
/// order currently occupying a schedule slot — needed because the
/// displacement and reschedule checks compare against an assigned order's
/// `price`/`time_to`, which a bare [`dt_schedule::ScheduleItem`] doesn't
/// carry.
pub fn generate_variants(
    courier: &Courier,
    assigned: &HashMap<OrderId, Order>,
    order: &Order,
    now: SimTime,
) -> Vec<Variant> {
    if order.mass > courier.max_mass || !order.accepted_by(&courier.types) {
        return Vec::new();
    }

    let last_point = courier.last_point();
    let t_pickup = last_point.distance(order.pickup) / courier.speed;
    let t_deliver = order.pickup.distance(order.delivery) / courier.speed;
    let duration = t_pickup + t_deliver;
    let price = duration * courier.rate;

    let mut variants = Vec::with_capacity(3);
    variants.push(asap_variant(courier, order, now, t_pickup, t_deliver, duration, price));

    let ideal_start = order.time_from.offset(-t_pickup);
    if ideal_start >= now {
        let ideal_end = ideal_start.offset(duration);
        if courier.get_conflicts(ideal_start, ideal_end).is_empty() {
            variants.push(Variant {
                kind: VariantKind::Jit,
                courier: courier.id,
                start_time: ideal_start,
                end_time: ideal_end,
                price,
            });
        } else {
            if let Some(v) = displacement_variant(courier, assigned, order, ideal_start, ideal_end, price, now) {
                variants.push(v);
            }
            if let Some(v) = reschedule_variant(courier, assigned, order, ideal_start, ideal_end, price, now) {
                variants.push(v);
            }
        }
    }

    variants
}

/// ASAP: start as soon as the courier is free, inflating the start (and
/// quoted price) if the trip plus an eventual return to base would dip the
/// battery below `min_charge` (§4.E, scenario 5).
fn asap_variant(
    courier: &Courier,
    order: &Order,
    now: SimTime,
    t_pickup: f64,
    t_deliver: f64,
    duration: f64,
    price: f64,
) -> Variant {
    let start = courier.last_time(true).max(now);

    let charge_now = courier.charge_at_time(start);
    let consumption = t_pickup * courier.discharge_rate(0.0) + t_deliver * courier.discharge_rate(order.mass);
    let return_leg = order.delivery.distance(courier.init_point) / courier.speed;
    let return_consumption = return_leg * courier.discharge_rate(0.0);
    let projected = charge_now - consumption - return_consumption;

    let (start, price) = if projected < courier.min_charge {
        let total_consumption = consumption + return_consumption;
        let recharge_time = total_consumption / courier.charge_velocity;

        let last_point = courier.last_point();
        let direct = last_point.distance(order.pickup);
        let via_base = last_point.distance(courier.init_point) + courier.init_point.distance(order.pickup);
        let extra_travel_time = (via_base - direct).max(0.0) / courier.speed;

        let need_window = recharge_time + extra_travel_time;
        (start.offset(need_window), price + extra_travel_time * courier.rate)
    } else {
        (start, price)
    };

    Variant { kind: VariantKind::Asap, courier: courier.id, start_time: start, end_time: start.offset(duration), price }
}

/// Among the JIT slot's conflicting orders, evict the cheapest displaceable
/// one that is worth less than the incoming order.
fn displacement_variant(
    courier: &Courier,
    assigned: &HashMap<OrderId, Order>,
    order: &Order,
    start: SimTime,
    end: SimTime,
    price: f64,
    now: SimTime,
) -> Option<Variant> {
    let conflicts = courier.get_conflicts(start, end);
    let mut seen = std::collections::HashSet::new();
    let mut best: Option<(OrderId, f64)> = None;

    for i in conflicts {
        let Some(oid) = courier.schedule[i].order else { continue };
        if !seen.insert(oid) {
            continue;
        }
        if !courier.is_order_displaceable(oid, now) {
            continue;
        }
        let Some(existing) = assigned.get(&oid) else { continue };
        if existing.price >= order.price {
            continue;
        }
        if best.is_none_or(|(_, p)| existing.price < p) {
            best = Some((oid, existing.price));
        }
    }

    best.map(|(order_to_displace, _)| Variant {
        kind: VariantKind::Conflict { order_to_displace },
        courier: courier.id,
        start_time: start,
        end_time: end,
        price,
    })
}

/// Walk the schedule forward from the JIT slot, shifting each conflicting
/// order in turn to open room for the new one. Aborts (returns `None`)
/// without partial output if any link in the chain is non-displaceable or
/// would miss its own deadline once shifted.
fn reschedule_variant(
    courier: &Courier,
    assigned: &HashMap<OrderId, Order>,
    order: &Order,
    start: SimTime,
    end: SimTime,
    price: f64,
    now: SimTime,
) -> Option<Variant> {
    let mut shift_chain: Vec<ShiftEntry> = Vec::new();
    let mut displaced = std::collections::HashSet::new();
    let mut frontier = end;

    loop {
        let next = courier
            .schedule
            .iter()
            .filter(|item| matches!(item.rec_type, RecType::MoveToPickup | RecType::MoveWithLoad))
            .filter_map(|item| item.order.map(|oid| (oid, item.start_time)))
            .filter(|(oid, start_time)| !displaced.contains(oid) && *start_time < frontier)
            .min_by(|a, b| a.1.cmp(&b.1));

        let Some((oid, _)) = next else { break };

        if !courier.is_order_displaceable(oid, now) {
            return None;
        }
        let original = assigned.get(&oid)?;

        let indices = courier.get_all_order_records(oid);
        let original_start = indices.iter().map(|&i| courier.schedule[i].start_time).min()?;
        let original_end = indices.iter().map(|&i| courier.schedule[i].end_time).max()?;
        let original_duration = original_end - original_start;
        let cost: f64 = indices.iter().map(|&i| courier.schedule[i].cost).sum();

        let new_start = frontier;
        let new_end = new_start.offset(original_duration);
        if new_end > original.time_to {
            return None;
        }

        shift_chain.push(ShiftEntry { order: oid, new_start, new_end, cost });
        displaced.insert(oid);
        frontier = new_end;
    }

    if shift_chain.is_empty() {
        return None;
    }

    Some(Variant {
        kind: VariantKind::Reschedule { shift_chain },
        courier: courier.id,
        start_time: start,
        end_time: end,
        price,
    })
}
