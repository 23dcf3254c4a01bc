//! Scripted events: a time-sorted sequence of entity create/destroy
//! instructions the simulator plays back as its clock advances.
//!
//! Both a wake queue and this script are "things sparse in time that the
//! tick loop drains," but a tick-indexed wake queue is sparse *per tick*
//! (a `BTreeMap<Tick, Vec<AgentId>>`) for an integer tick counter. Here time
//! is continuous (`SimTime`), so the natural shape is a flat sorted `Vec`
//! queried by half-open range rather than an exact-key map.

use dt_core::{CourierId, OrderId, SimTime};
use dt_schedule::{Courier, Order};

/// What a scripted event does when applied.
#[derive(Clone, Debug)]
pub enum ScriptEventKind {
    NewOrder(Order),
    NewCourier(Courier),
    RemoveOrder(OrderId),
    RemoveCourier(CourierId),
}

/// One entry in a [`Script`]: a time plus the event to apply at it.
#[derive(Clone, Debug)]
pub struct ScriptEvent {
    pub time: SimTime,
    pub kind: ScriptEventKind,
}

impl ScriptEvent {
    pub fn new(time: SimTime, kind: ScriptEventKind) -> Self {
        Self { time, kind }
    }
}

/// A time-sorted sequence of [`ScriptEvent`]s.
///
/// Events are sorted once at construction; [`events_in`](Self::events_in)
/// then answers each half-open `[from, to)` query with a pair of binary
/// searches. Since the simulator loop advances `from`/`to` forward by
/// exactly `tick_size` each call and never re-queries a range it has already
/// consumed, every event is returned by exactly one call over a full run.
pub struct Script {
    events: Vec<ScriptEvent>,
}

impl Script {
    pub fn new(mut events: Vec<ScriptEvent>) -> Self {
        events.sort_by(|a, b| a.time.cmp(&b.time));
        Self { events }
    }

    pub fn empty() -> Self {
        Self { events: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Events with `from <= time < to`.
    pub fn events_in(&self, from: SimTime, to: SimTime) -> &[ScriptEvent] {
        if to <= from {
            return &[];
        }
        let start = self.events.partition_point(|e| e.time < from);
        let end = self.events.partition_point(|e| e.time < to);
        &self.events[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: u32) -> Order {
        use dt_core::Point;
        Order {
            id: OrderId(id),
            name: format!("o{id}"),
            mass: 1.0,
            volume: 1.0,
            price: 10.0,
            pickup: Point::new(0.0, 0.0),
            delivery: Point::new(1.0, 1.0),
            time_from: SimTime(0.0),
            time_to: SimTime(10.0),
            order_type: None,
            is_urgent: false,
            appearance_time: SimTime(0.0),
            response_timeout: 5.0,
            delivery_data: None,
        }
    }

    #[test]
    fn events_sorted_at_construction() {
        let script = Script::new(vec![
            ScriptEvent::new(SimTime(5.0), ScriptEventKind::RemoveOrder(OrderId(1))),
            ScriptEvent::new(SimTime(1.0), ScriptEventKind::NewOrder(order(1))),
        ]);
        assert_eq!(script.events_in(SimTime(0.0), SimTime(2.0)).len(), 1);
        assert_eq!(script.events_in(SimTime(2.0), SimTime(6.0)).len(), 1);
    }

    #[test]
    fn half_open_range_excludes_upper_bound() {
        let script = Script::new(vec![ScriptEvent::new(SimTime(5.0), ScriptEventKind::NewOrder(order(1)))]);
        assert_eq!(script.events_in(SimTime(0.0), SimTime(5.0)).len(), 0);
        assert_eq!(script.events_in(SimTime(5.0), SimTime(10.0)).len(), 1);
    }

    #[test]
    fn each_event_returned_exactly_once_across_a_full_sweep() {
        let script = Script::new(vec![
            ScriptEvent::new(SimTime(0.0), ScriptEventKind::NewOrder(order(1))),
            ScriptEvent::new(SimTime(3.0), ScriptEventKind::NewOrder(order(2))),
            ScriptEvent::new(SimTime(7.0), ScriptEventKind::NewOrder(order(3))),
        ]);
        let mut seen = 0;
        let mut t = SimTime(0.0);
        let tick = 2.0;
        while t.0 < 10.0 {
            seen += script.events_in(t, t.offset(tick)).len();
            t = t.offset(tick);
        }
        assert_eq!(seen, 3);
    }
}
