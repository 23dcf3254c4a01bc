//! The schedule engine: conflict queries, battery projection, atomic
//! insertion, and the two structural repair strategies (displacement,
//! cascade reschedule) operate through the methods gathered here.
//!
//! Every method takes `&self`/`&mut self` on [`Courier`] directly — there is
//! no separate "engine" value, since a courier's schedule only ever needs
//! its own fields (`init_point`, `speed`, battery parameters) to answer
//! these queries.

use dt_core::{OrderId, Point, RecType, SimTime};

use crate::courier::Courier;
use crate::item::ScheduleItem;
use crate::order::Order;

/// Tolerance for the geometric-consistency check in `add_order_to_schedule`.
const INSERT_EPS: f64 = 1e-7;

impl Courier {
    // ── Queries ────────────────────────────────────────────────────────────

    /// The terminal point the courier is logically at: the last productive
    /// item's endpoint, or `init_point` if the schedule is empty. A trailing
    /// `MoveToCharge` is looked through — charging is a reversible tail hop,
    /// so the courier logically remains where the last productive work
    /// ended.
    pub fn last_point(&self) -> Point {
        match self.schedule.last() {
            None => self.init_point,
            Some(last) if last.rec_type == RecType::MoveToCharge => self
                .schedule
                .get(self.schedule.len().saturating_sub(2))
                .map(|i| i.point_to)
                .unwrap_or(self.init_point),
            Some(last) => last.point_to,
        }
    }

    /// `end_time` of the last item. With `consider_charge = false`, a
    /// trailing `MoveToCharge` is skipped and the previous item's end is
    /// returned instead (or `init_time` if charging is the only item).
    pub fn last_time(&self, consider_charge: bool) -> SimTime {
        match self.schedule.last() {
            None => SimTime(self.init_time),
            Some(last) if !consider_charge && last.rec_type == RecType::MoveToCharge => self
                .schedule
                .get(self.schedule.len().saturating_sub(2))
                .map(|i| i.end_time)
                .unwrap_or(SimTime(self.init_time)),
            Some(last) => last.end_time,
        }
    }

    /// Indices of items whose `[start_time, end_time)` intersects
    /// `[start, end)`, excluding `Idle`/`IdleWithLoad` records and
    /// zero-length items.
    pub fn get_conflicts(&self, start: SimTime, end: SimTime) -> Vec<usize> {
        self.schedule
            .iter()
            .enumerate()
            .filter(|(_, item)| !matches!(item.rec_type, RecType::Idle | RecType::IdleWithLoad))
            .filter(|(_, item)| !item.is_zero_length())
            .filter(|(_, item)| item.overlaps(start, end))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of all items belonging to `order`.
    pub fn get_all_order_records(&self, order: OrderId) -> Vec<usize> {
        self.schedule
            .iter()
            .enumerate()
            .filter(|(_, item)| item.order == Some(order))
            .map(|(i, _)| i)
            .collect()
    }

    // ── Battery projection ──────────────────────────────────────────────────

    /// Project remaining charge forward to time `t`, starting from full
    /// charge at `init_point`. Floored at zero; a zero result signals the
    /// current assignment is infeasible.
    pub fn charge_at_time(&self, t: SimTime) -> f64 {
        let mut charge = self.capacity;
        let mut cursor = SimTime(self.init_time);
        let mut at_base = true;

        for item in &self.schedule {
            if cursor >= t {
                break;
            }

            let seg_start = item.start_time.max(cursor);
            if seg_start > cursor {
                if at_base {
                    let gap = seg_start - cursor;
                    charge = (charge + gap * self.charge_velocity).min(self.capacity);
                }
                cursor = seg_start;
            }
            if cursor >= t {
                break;
            }

            let seg_end = item.end_time.min(t);
            if seg_end > cursor {
                let duration = seg_end - cursor;
                let rate = self.discharge_rate(item.mass);
                charge = (charge - duration * rate).max(0.0);
                cursor = seg_end;
            }

            if item.end_time <= t {
                at_base = item.rec_type == RecType::MoveToCharge;
            }
        }

        if cursor < t && at_base {
            let gap = t - cursor;
            charge = (charge + gap * self.charge_velocity).min(self.capacity);
        }

        charge.max(0.0)
    }

    // ── Insertion ───────────────────────────────────────────────────────────

    /// Atomically insert `order` at `[start_time, end_time)` with the stated
    /// `cost`. Returns `false` and leaves the schedule untouched if any
    /// precondition fails.
    pub fn add_order_to_schedule(
        &mut self,
        order: &Order,
        start_time: SimTime,
        end_time: SimTime,
        cost: f64,
    ) -> bool {
        // A trailing charge is reversible; lift it out while validating so
        // it doesn't itself register as a conflict, and restore it verbatim
        // if any precondition below fails.
        let lifted_charge = if matches!(self.schedule.last(), Some(i) if i.rec_type == RecType::MoveToCharge)
        {
            self.schedule.pop()
        } else {
            None
        };

        if !self.try_insert(order, start_time, end_time, cost) {
            if let Some(charge) = lifted_charge {
                self.schedule.push(charge);
            }
            return false;
        }
        true
    }

    fn try_insert(&mut self, order: &Order, start_time: SimTime, end_time: SimTime, cost: f64) -> bool {
        if self.last_time(true) > start_time {
            return false;
        }

        let last_point = self.last_point();
        let t_pickup = last_point.distance(order.pickup) / self.speed;
        let t_deliver = order.pickup.distance(order.delivery) / self.speed;
        let expected_end = start_time.offset(t_pickup + t_deliver);
        if (end_time - expected_end).abs() > INSERT_EPS {
            return false;
        }

        if !self.get_conflicts(start_time, end_time).is_empty() {
            return false;
        }

        let pickup_arrival = start_time.offset(t_pickup);

        let move_to_pickup = ScheduleItem {
            order: Some(order.id),
            rec_type: RecType::MoveToPickup,
            start_time,
            end_time: pickup_arrival,
            point_from: last_point,
            point_to: order.pickup,
            cost: 0.0,
            mass: 0.0,
        };
        if !move_to_pickup.is_zero_length() {
            self.schedule.push(move_to_pickup);
        }

        let move_with_load = ScheduleItem {
            order: Some(order.id),
            rec_type: RecType::MoveWithLoad,
            start_time: pickup_arrival,
            end_time: expected_end,
            point_from: order.pickup,
            point_to: order.delivery,
            cost,
            mass: order.mass,
        };
        if !move_with_load.is_zero_length() {
            self.schedule.push(move_with_load);
        }

        if end_time - expected_end > 0.0 {
            let idle = ScheduleItem {
                order: Some(order.id),
                rec_type: RecType::IdleWithLoad,
                start_time: expected_end,
                end_time,
                point_from: order.delivery,
                point_to: order.delivery,
                cost: 0.0,
                mass: order.mass,
            };
            if !idle.is_zero_length() {
                self.schedule.push(idle);
            }
        }

        self.schedule.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        self.auto_add_charge();
        true
    }

    /// Insert a `MoveToCharge` wherever the energy gained from an early
    /// return to base exceeds the extra flight cost of the detour.
    /// Idempotent: a second call on an already-charged schedule is a no-op.
    /// Returns the net cost this pass added.
    pub fn auto_add_charge(&mut self) -> f64 {
        let mut total_delta = 0.0;
        let mut cursor = 0usize;

        while cursor < self.schedule.len() {
            if !matches!(
                self.schedule[cursor].rec_type,
                RecType::MoveToPickup | RecType::MoveWithLoad
            ) {
                cursor += 1;
                continue;
            }

            if matches!(
                self.schedule.get(cursor + 1).map(|i| i.rec_type),
                Some(RecType::MoveToCharge)
            ) {
                cursor += 1;
                continue;
            }

            let this_end_time = self.schedule[cursor].end_time;
            let this_end_point = self.schedule[cursor].point_to;

            let mut next = cursor + 1;
            while next < self.schedule.len()
                && !matches!(
                    self.schedule[next].rec_type,
                    RecType::MoveToPickup | RecType::MoveWithLoad
                )
            {
                next += 1;
            }

            if next >= self.schedule.len() {
                let duration = this_end_point.distance(self.init_point) / self.speed;
                if duration > 0.0 {
                    let cost = self.rate * duration;
                    self.schedule.push(ScheduleItem {
                        order: None,
                        rec_type: RecType::MoveToCharge,
                        start_time: this_end_time,
                        end_time: this_end_time.offset(duration),
                        point_from: this_end_point,
                        point_to: self.init_point,
                        cost,
                        mass: 0.0,
                    });
                    total_delta += cost;
                }
                cursor += 1;
                continue;
            }

            let next_start_time = self.schedule[next].start_time;
            let next_start_point = self.schedule[next].point_from;
            let next_order = self.schedule[next].order;
            let next_is_move_to_pickup = self.schedule[next].rec_type == RecType::MoveToPickup;

            let pause = next_start_time - this_end_time;
            let duration_to_base = this_end_point.distance(self.init_point) / self.speed;
            let duration_from_base_to_next = self.init_point.distance(next_start_point) / self.speed;

            let gain = self.charge_velocity * (pause - duration_to_base - duration_from_base_to_next);
            let extra = self.flight_discharge * (duration_to_base + duration_from_base_to_next);

            if gain > extra {
                if next_is_move_to_pickup {
                    self.schedule.remove(next);
                }

                let charge_cost = self.rate * duration_to_base;
                let charge_start = this_end_time;
                let charge_end = charge_start.offset(duration_to_base);
                let rejoin_end = charge_end.offset(duration_from_base_to_next);

                self.schedule.insert(
                    cursor + 1,
                    ScheduleItem {
                        order: None,
                        rec_type: RecType::MoveToCharge,
                        start_time: charge_start,
                        end_time: charge_end,
                        point_from: this_end_point,
                        point_to: self.init_point,
                        cost: charge_cost,
                        mass: 0.0,
                    },
                );
                self.schedule.insert(
                    cursor + 2,
                    ScheduleItem {
                        order: next_order,
                        rec_type: RecType::MoveToPickup,
                        start_time: charge_end,
                        end_time: rejoin_end,
                        point_from: self.init_point,
                        point_to: next_start_point,
                        cost: 0.0,
                        mass: 0.0,
                    },
                );

                total_delta += charge_cost;
            }

            cursor += 1;
        }

        self.schedule.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        total_delta
    }

    // ── Displacement & deletion ─────────────────────────────────────────────

    /// An order is displaceable iff its earliest scheduled item has not yet
    /// started at `now`.
    pub fn is_order_displaceable(&self, order: OrderId, now: SimTime) -> bool {
        self.get_all_order_records(order)
            .into_iter()
            .map(|i| self.schedule[i].start_time)
            .min()
            .is_some_and(|earliest| earliest > now)
    }

    /// Remove every item of `order` (and any charging move immediately
    /// following one of them), re-run `auto_add_charge`, and return the net
    /// cost delta.
    pub fn delete_order(&mut self, order: OrderId) -> f64 {
        let mut removed_cost = 0.0;
        let mut i = 0;
        while i < self.schedule.len() {
            if self.schedule[i].order == Some(order) {
                removed_cost += self.schedule.remove(i).cost;
                if i < self.schedule.len() && self.schedule[i].rec_type == RecType::MoveToCharge {
                    removed_cost += self.schedule.remove(i).cost;
                }
            } else {
                i += 1;
            }
        }

        let auto_charge_delta = self.auto_add_charge();
        auto_charge_delta - removed_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_core::{CourierId, OrderId};

    fn base_courier() -> Courier {
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
            min_charge: 10.0,
            charge_velocity: 5.0,
            flight_discharge: 1.0,
            load_discharge_a: 0.0,
            load_discharge_b: 0.0,
            init_time: 0.0,
            appearance_time: 0.0,
            schedule: vec![],
        }
    }

    fn single_order() -> Order {
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

    #[test]
    fn last_point_and_time_on_empty_schedule() {
        let c = base_courier();
        assert!(c.last_point().close_enough(Point::new(0.0, 0.0)));
        assert_eq!(c.last_time(true), SimTime(0.0));
    }

    #[test]
    fn scenario_single_courier_single_order() {
        let mut c = base_courier();
        let o = single_order();
        // time_to_pickup = 30/10 = 3, time_with_load = 40/10 = 4, end = 0+3+4 = 7
        let ok = c.add_order_to_schedule(&o, SimTime(0.0), SimTime(7.0), 40.0);
        assert!(ok);

        let productive: Vec<_> = c
            .schedule
            .iter()
            .filter(|i| i.rec_type != RecType::MoveToCharge)
            .collect();
        assert_eq!(productive.len(), 2);
        assert_eq!(productive[0].rec_type, RecType::MoveToPickup);
        assert_eq!(productive[0].start_time, SimTime(0.0));
        assert_eq!(productive[0].end_time, SimTime(3.0));
        assert_eq!(productive[1].rec_type, RecType::MoveWithLoad);
        assert_eq!(productive[1].end_time, SimTime(7.0));

        assert_eq!(c.schedule.last().unwrap().rec_type, RecType::MoveToCharge);
    }

    #[test]
    fn insertion_rejects_inconsistent_geometry() {
        let mut c = base_courier();
        let o = single_order();
        // wrong end_time: should be 7, not 8
        let ok = c.add_order_to_schedule(&o, SimTime(0.0), SimTime(8.0), 40.0);
        assert!(!ok);
        assert!(c.schedule.is_empty());
    }

    #[test]
    fn rollback_law_on_conflict() {
        let mut c = base_courier();
        let o = single_order();
        assert!(c.add_order_to_schedule(&o, SimTime(0.0), SimTime(7.0), 40.0));
        let before = c.schedule.clone();

        let mut o2 = single_order();
        o2.id = OrderId(2);
        // overlaps the first order's window -- should fail and not mutate.
        let ok = c.add_order_to_schedule(&o2, SimTime(2.0), SimTime(9.0), 40.0);
        assert!(!ok);
        assert_eq!(c.schedule, before);
    }

    #[test]
    fn charge_never_negative_or_over_capacity() {
        let mut c = base_courier();
        let o = single_order();
        c.add_order_to_schedule(&o, SimTime(0.0), SimTime(7.0), 40.0);
        for t in [0.0, 1.0, 3.0, 7.0, 20.0, 100.0] {
            let charge = c.charge_at_time(SimTime(t));
            assert!(charge >= 0.0);
            assert!(charge <= c.capacity);
        }
    }

    #[test]
    fn delete_order_removes_its_items_and_trailing_charge() {
        let mut c = base_courier();
        let o = single_order();
        c.add_order_to_schedule(&o, SimTime(0.0), SimTime(7.0), 40.0);
        assert!(c.schedule.iter().any(|i| i.rec_type == RecType::MoveToCharge));

        c.delete_order(OrderId(1));
        assert!(c.schedule.iter().all(|i| i.order != Some(OrderId(1))));
    }

    #[test]
    fn auto_add_charge_is_idempotent() {
        let mut c = base_courier();
        let o = single_order();
        c.add_order_to_schedule(&o, SimTime(0.0), SimTime(7.0), 40.0);
        let before = c.schedule.clone();
        let delta = c.auto_add_charge();
        assert_eq!(delta, 0.0);
        assert_eq!(c.schedule, before);
    }

    #[test]
    fn displaceable_only_before_start() {
        let mut c = base_courier();
        let o = single_order();
        c.add_order_to_schedule(&o, SimTime(0.0), SimTime(7.0), 40.0);
        assert!(c.is_order_displaceable(OrderId(1), SimTime(-1.0)));
        assert!(!c.is_order_displaceable(OrderId(1), SimTime(0.0)));
        assert!(!c.is_order_displaceable(OrderId(1), SimTime(1.0)));
    }
}
