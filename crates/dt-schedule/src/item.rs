//! `ScheduleItem`: one contiguous motion or idle segment on a courier's
//! timeline.

use dt_core::{OrderId, Point, RecType, SimTime};

/// One entry in a courier's schedule.
///
/// Items belonging to the same order share a common `order`; a charging
/// move always has `order = None`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleItem {
    pub order: Option<OrderId>,
    pub rec_type: RecType,
    pub start_time: SimTime,
    pub end_time: SimTime,
    pub point_from: Point,
    pub point_to: Point,
    pub cost: f64,
    /// Payload mass carried during this segment (the one piece of
    /// order-specific data the battery projection needs); zero for unladen
    /// and charging segments.
    pub mass: f64,
}

impl ScheduleItem {
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    #[inline]
    pub fn is_zero_length(&self) -> bool {
        self.duration() <= 0.0
    }

    /// `[start_time, end_time)` half-open interval intersection test, used by
    /// `get_conflicts`.
    #[inline]
    pub fn overlaps(&self, start: SimTime, end: SimTime) -> bool {
        self.start_time < end && start < self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(start: f64, end: f64) -> ScheduleItem {
        ScheduleItem {
            order: None,
            rec_type: RecType::Idle,
            start_time: SimTime(start),
            end_time: SimTime(end),
            point_from: Point::new(0.0, 0.0),
            point_to: Point::new(0.0, 0.0),
            cost: 0.0,
            mass: 0.0,
        }
    }

    #[test]
    fn overlap_detection() {
        let i = item(5.0, 10.0);
        assert!(i.overlaps(SimTime(7.0), SimTime(8.0)));
        assert!(i.overlaps(SimTime(0.0), SimTime(6.0)));
        assert!(!i.overlaps(SimTime(10.0), SimTime(20.0)));
        assert!(!i.overlaps(SimTime(0.0), SimTime(5.0)));
    }

    #[test]
    fn zero_length_detection() {
        assert!(item(5.0, 5.0).is_zero_length());
        assert!(!item(5.0, 6.0).is_zero_length());
    }
}
