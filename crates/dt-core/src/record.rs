//! The schedule-item kind shared by the schedule engine, the negotiation
//! agents' exported plans, and output row writers.

use std::fmt;

/// What a single schedule item represents.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecType {
    /// Empty-handed travel from the courier's current point to an order's
    /// pickup point.
    MoveToPickup,
    /// Laden travel from an order's pickup point to its delivery point.
    MoveWithLoad,
    /// Travel back to base to recharge.
    MoveToCharge,
    /// Waiting at the pickup point with the order already in hand (used to
    /// fill a gap between pickup and the start of the delivery window).
    IdleWithLoad,
    /// Waiting with no order in hand.
    Idle,
}

impl RecType {
    /// Whether a courier is carrying payload during an item of this kind.
    #[inline]
    pub fn laden(self) -> bool {
        matches!(self, RecType::MoveWithLoad | RecType::IdleWithLoad)
    }

    /// Whether an item of this kind is tied to a specific order.
    #[inline]
    pub fn order_bound(self) -> bool {
        matches!(
            self,
            RecType::MoveToPickup | RecType::MoveWithLoad | RecType::IdleWithLoad
        )
    }
}

impl fmt::Display for RecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecType::MoveToPickup => "MoveToPickup",
            RecType::MoveWithLoad => "MoveWithLoad",
            RecType::MoveToCharge => "MoveToCharge",
            RecType::IdleWithLoad => "IdleWithLoad",
            RecType::Idle => "Idle",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn laden_classification() {
        assert!(RecType::MoveWithLoad.laden());
        assert!(RecType::IdleWithLoad.laden());
        assert!(!RecType::MoveToPickup.laden());
        assert!(!RecType::MoveToCharge.laden());
        assert!(!RecType::Idle.laden());
    }

    #[test]
    fn order_bound_classification() {
        assert!(RecType::MoveToPickup.order_bound());
        assert!(!RecType::MoveToCharge.order_bound());
        assert!(!RecType::Idle.order_bound());
    }
}
