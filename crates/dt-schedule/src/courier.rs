//! `Courier`: immutable fleet parameters plus the mutable `schedule` the
//! engine operates on.

use dt_core::{CourierId, Point};

use crate::item::ScheduleItem;

/// A courier's fixed operating parameters and its live schedule.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Courier {
    pub id: CourierId,
    pub name: String,
    /// Starting point, and also the point `MoveToCharge` items return to.
    pub init_point: Point,
    pub deployment_cost: f64,
    /// Monetary rate charged per unit time of committed work.
    pub rate: f64,
    pub speed: f64,
    pub max_mass: f64,
    /// Order types this courier is willing to carry. Empty means "accepts
    /// everything untyped" (see [`crate::order::Order::accepted_by`]).
    pub types: Vec<String>,

    pub capacity: f64,
    pub min_charge: f64,
    pub charge_velocity: f64,
    pub flight_discharge: f64,
    pub load_discharge_a: f64,
    pub load_discharge_b: f64,

    pub init_time: f64,
    /// Simulation time at which this courier becomes available.
    pub appearance_time: f64,

    /// Ordered by `start_time`; see engine invariants.
    pub schedule: Vec<ScheduleItem>,
}

impl Courier {
    /// Per-unit-time discharge rate for a segment carrying `mass`.
    ///
    /// The quadratic term models non-linear energy draw under load; an
    /// unladen segment reduces to plain `flight_discharge`.
    #[inline]
    pub fn discharge_rate(&self, mass: f64) -> f64 {
        if mass <= 0.0 {
            self.flight_discharge
        } else {
            (mass * self.load_discharge_a).powi(2) + mass * self.load_discharge_b + self.flight_discharge
        }
    }
}
