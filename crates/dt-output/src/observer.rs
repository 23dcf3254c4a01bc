//! `SimOutputObserver<W>` — bridges `dt_sim::SimObserver` to an
//! [`OutputWriter`].

use std::collections::HashMap;

use dt_behavior::Export;
use dt_core::{CourierId, OrderId, SimTime};
use dt_schedule::Courier;
use dt_sim::{SimObserver, Simulator};

use crate::row::ScheduleRecordRow;
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that, once per run, snapshots every courier's final
/// schedule through a [`Simulator`] and writes it as [`ScheduleRecordRow`]s
/// via any [`OutputWriter`] backend (CSV, SQLite, Parquet, …).
///
/// The negotiation engine's `Export::Courier` variant carries only a
/// courier's id and schedule — not its name or battery parameters, which
/// live on the `Courier` record the host originally constructed and which
/// agents don't re-export in full. This observer is handed those records at
/// construction ([`with_couriers`][Self::with_couriers]) so it can resolve
/// names and recompute `charge_on_end` via [`Courier::charge_at_time`]
/// exactly as the engine itself would, rather than leaving the column
/// unpopulated.
///
/// Errors from the writer are stored internally because `SimObserver`
/// methods have no return value. After `sim.run()` returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer: W,
    couriers: HashMap<CourierId, Courier>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, with no known courier
    /// records — names fall back to `courier_<id>` and `charge_on_end` is
    /// left at `0.0`.
    pub fn new(writer: W) -> Self {
        Self { writer, couriers: HashMap::new(), last_error: None }
    }

    /// Create an observer that resolves names and battery parameters from
    /// the host's original `couriers` (their `schedule` field is ignored —
    /// each export's own schedule is substituted before projecting charge).
    pub fn with_couriers(writer: W, couriers: &[Courier]) -> Self {
        let couriers = couriers.iter().map(|c| (c.id, c.clone())).collect();
        Self { writer, couriers, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }

    /// Pull every courier's schedule from `sim`, flatten it into rows, and
    /// write them. Called from `on_sim_end` — the engine has no notion of
    /// intermediate "tick snapshots" worth persisting on their own, since a
    /// courier's schedule is revised in place until the order settles.
    pub fn flush(&mut self, sim: &mut Simulator) {
        let rows = schedule_rows(sim.export_all(), &self.couriers);
        let result = self.writer.write_records(&rows);
        self.store_err(result);
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_sim_end(&mut self, _final_time: SimTime) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}

/// Flatten every `Export::Courier`'s schedule into output rows, resolving
/// `task_id`/`task_name` for order-bound items, `resource_name`, and
/// `charge_on_end` against `known_couriers`. Non-courier exports
/// (`Export::Order`) carry no schedule of their own and are skipped.
fn schedule_rows(exports: Vec<Export>, known_couriers: &HashMap<CourierId, Courier>) -> Vec<ScheduleRecordRow> {
    let mut rows = Vec::new();
    for export in exports {
        let Export::Courier { courier_id, schedule } = export else { continue };

        let resource_name =
            known_couriers.get(&courier_id).map(|c| c.name.clone()).unwrap_or_else(|| format!("courier_{}", courier_id.0));

        // Substitute the live schedule into the template so
        // `charge_at_time` projects from the courier's actual battery
        // parameters rather than a bare default.
        let projector = known_couriers.get(&courier_id).map(|template| {
            let mut t = template.clone();
            t.schedule = schedule.clone();
            t
        });

        for item in &schedule {
            let charge_on_end = projector.as_ref().map(|p| p.charge_at_time(item.end_time)).unwrap_or(0.0);
            rows.push(ScheduleRecordRow {
                resource_id: courier_id.0,
                resource_name: resource_name.clone(),
                task_id: item.order.map(|o| o.0),
                task_name: item.order.map(order_task_name),
                rec_type: item.rec_type,
                from: item.point_from,
                to: item.point_to,
                start_time: item.start_time,
                end_time: item.end_time,
                cost: item.cost,
                is_move_to_charge: item.rec_type == dt_core::RecType::MoveToCharge,
                charge_on_end,
            });
        }
    }
    rows
}

/// Order names are not carried by `Export::Order` for courier-schedule
/// rows; a host wanting the original order name should look it up from its
/// own records by this id.
fn order_task_name(id: OrderId) -> String {
    format!("order_{}", id.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_core::{Point, RecType};
    use dt_schedule::ScheduleItem;

    fn item(order: Option<u32>, rec_type: RecType) -> ScheduleItem {
        ScheduleItem {
            order: order.map(OrderId),
            rec_type,
            start_time: SimTime(0.0),
            end_time: SimTime(5.0),
            point_from: Point::new(0.0, 0.0),
            point_to: Point::new(1.0, 1.0),
            cost: 2.0,
            mass: 1.0,
        }
    }

    #[test]
    fn flattens_courier_schedules_into_rows() {
        let exports = vec![
            Export::Courier { courier_id: CourierId(1), schedule: vec![item(Some(1), RecType::MoveToPickup)] },
            Export::Order { order_id: OrderId(1), delivery_data: None },
        ];
        let rows = schedule_rows(exports, &HashMap::new());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].resource_name, "courier_1");
        assert_eq!(rows[0].task_id, Some(1));
        assert!(!rows[0].is_move_to_charge);
    }

    #[test]
    fn marks_move_to_charge_rows() {
        let exports = vec![Export::Courier { courier_id: CourierId(1), schedule: vec![item(None, RecType::MoveToCharge)] }];
        let rows = schedule_rows(exports, &HashMap::new());
        assert!(rows[0].is_move_to_charge);
        assert!(rows[0].task_id.is_none());
    }
}
