//! Core types shared across the negotiation-engine framework.
//!
//! | module    | contents                                              |
//! |-----------|--------------------------------------------------------|
//! | [`geo`]   | `Point`, Euclidean distance                             |
//! | [`time`]  | `SimTime`, `SimClock`                                   |
//! | [`ids`]   | `OrderId`, `CourierId`, `AgentAddress`                  |
//! | [`rng`]   | `AgentRng`, `SimRng`                                    |
//! | [`record`]| `RecType` (schedule item kind)                          |
//! | [`error`] | `DtError`, `DtResult`                                   |
//!
//! Every other crate in the workspace depends on `dt-core`; it must not
//! depend back on any of them.

pub mod error;
pub mod geo;
pub mod ids;
pub mod record;
pub mod rng;
pub mod time;

pub use error::{DtError, DtResult};
pub use geo::{Point, EPS};
pub use ids::{AgentAddress, CourierId, OrderId};
pub use record::RecType;
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, SimTime};
