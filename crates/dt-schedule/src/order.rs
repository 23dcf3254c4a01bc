//! `Order`: immutable request data plus the mutable `delivery_data` slot
//! recording its current accepted assignment, if any.

use dt_core::{CourierId, OrderId, Point, SimTime};

/// The courier/price/window an order is currently committed to, or `None`
/// if it has not (yet) been assigned.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeliveryData {
    pub courier: CourierId,
    pub price: f64,
    pub time_from: SimTime,
    pub time_to: SimTime,
}

/// An order to be picked up and delivered.
///
/// Invariant: `appearance_time <= time_from <= time_to`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    pub id: OrderId,
    pub name: String,
    pub mass: f64,
    pub volume: f64,
    pub price: f64,
    pub pickup: Point,
    pub delivery: Point,
    /// Earliest time the order may be picked up.
    pub time_from: SimTime,
    /// Delivery deadline.
    pub time_to: SimTime,
    pub order_type: Option<String>,
    pub is_urgent: bool,
    pub appearance_time: SimTime,
    /// How long the order agent waits for all outstanding quotes before
    /// proceeding with whatever it has collected.
    pub response_timeout: f64,

    /// Current accepted assignment, if any.
    pub delivery_data: Option<DeliveryData>,
}

impl Order {
    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.delivery_data.is_some()
    }

    /// Whether a courier of `courier_types` is willing to carry this order,
    /// per its (optional) `order_type` tag.
    pub fn accepted_by(&self, courier_types: &[String]) -> bool {
        match &self.order_type {
            None => true,
            Some(t) => courier_types.is_empty() || courier_types.iter().any(|ct| ct == t),
        }
    }
}
