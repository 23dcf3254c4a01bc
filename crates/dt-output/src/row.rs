//! Plain data row written by output backends — one row per schedule item,
//! matching the external interface's schedule-record shape (§6).

use dt_core::{OrderId, Point, RecType, SimTime};

/// One courier schedule item, flattened for a tabular sink.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRecordRow {
    pub resource_id: u32,
    pub resource_name: String,
    pub task_id: Option<u32>,
    pub task_name: Option<String>,
    pub rec_type: RecType,
    pub from: Point,
    pub to: Point,
    pub start_time: SimTime,
    pub end_time: SimTime,
    pub cost: f64,
    pub is_move_to_charge: bool,
    /// Courier's projected battery charge at `end_time`.
    pub charge_on_end: f64,
}

impl ScheduleRecordRow {
    pub fn task_order_id(&self) -> Option<OrderId> {
        self.task_id.map(OrderId)
    }
}
