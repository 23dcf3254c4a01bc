//! Plain input records and their conversion into [`Order`]/[`Courier`].
//!
//! These are the structured shapes a host hands the engine (§6 of the
//! interface contract); how a host reads them from a spreadsheet, a
//! database, or a network call is outside this crate's concern — only the
//! `TryFrom` validation boundary lives here.

use dt_core::{CourierId, OrderId, Point, SimTime};

use crate::courier::Courier;
use crate::error::{ScheduleError, ScheduleResult};
use crate::order::Order;

#[derive(Clone, Debug)]
pub struct OrderRecord {
    pub number: u32,
    pub name: String,
    pub mass: f64,
    pub volume: f64,
    pub price: f64,
    pub pickup_x: f64,
    pub pickup_y: f64,
    pub delivery_x: f64,
    pub delivery_y: f64,
    pub time_from: f64,
    pub time_to: f64,
    pub order_type: Option<String>,
    pub is_urgent: bool,
    pub appearance_time: f64,
    pub response_timeout: f64,
}

impl TryFrom<OrderRecord> for Order {
    type Error = ScheduleError;

    fn try_from(r: OrderRecord) -> ScheduleResult<Order> {
        if r.appearance_time > r.time_from {
            return Err(ScheduleError::InvalidField(format!(
                "order {}: appearance_time {} > time_from {}",
                r.number, r.appearance_time, r.time_from
            )));
        }
        if r.time_from > r.time_to {
            return Err(ScheduleError::InvalidField(format!(
                "order {}: time_from {} > time_to {}",
                r.number, r.time_from, r.time_to
            )));
        }
        Ok(Order {
            id: OrderId(r.number),
            name: r.name,
            mass: r.mass,
            volume: r.volume,
            price: r.price,
            pickup: Point::new(r.pickup_x, r.pickup_y),
            delivery: Point::new(r.delivery_x, r.delivery_y),
            time_from: SimTime(r.time_from),
            time_to: SimTime(r.time_to),
            order_type: r.order_type,
            is_urgent: r.is_urgent,
            appearance_time: SimTime(r.appearance_time),
            response_timeout: r.response_timeout,
            delivery_data: None,
        })
    }
}

#[derive(Clone, Debug)]
pub struct CourierRecord {
    pub number: u32,
    pub name: String,
    pub init_x: f64,
    pub init_y: f64,
    pub deployment_cost: f64,
    pub rate: f64,
    pub charge_velocity: f64,
    pub flight_discharge: f64,
    pub load_discharge_a: f64,
    pub load_discharge_b: f64,
    pub capacity: f64,
    pub init_time: f64,
    pub speed: f64,
    pub max_mass: f64,
    pub appearance_time: f64,
    pub min_charge: f64,
    /// Semicolon-separated in the host's raw form; already split here.
    pub types: Vec<String>,
}

impl TryFrom<CourierRecord> for Courier {
    type Error = ScheduleError;

    fn try_from(r: CourierRecord) -> ScheduleResult<Courier> {
        if r.speed <= 0.0 {
            return Err(ScheduleError::InvalidField(format!(
                "courier {}: speed must be positive, got {}",
                r.number, r.speed
            )));
        }
        if r.min_charge > r.capacity {
            return Err(ScheduleError::InvalidField(format!(
                "courier {}: min_charge {} exceeds capacity {}",
                r.number, r.min_charge, r.capacity
            )));
        }
        Ok(Courier {
            id: CourierId(r.number),
            name: r.name,
            init_point: Point::new(r.init_x, r.init_y),
            deployment_cost: r.deployment_cost,
            rate: r.rate,
            speed: r.speed,
            max_mass: r.max_mass,
            types: r.types,
            capacity: r.capacity,
            min_charge: r.min_charge,
            charge_velocity: r.charge_velocity,
            flight_discharge: r.flight_discharge,
            load_discharge_a: r.load_discharge_a,
            load_discharge_b: r.load_discharge_b,
            init_time: r.init_time,
            appearance_time: r.appearance_time,
            schedule: Vec::new(),
        })
    }
}
