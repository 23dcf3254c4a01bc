//! `dt-negotiation` — concrete `CourierAgent`/`OrderAgent` implementations
//! of the `dt_behavior::Agent` trait.
//!
//! | module           | contents                                              |
//! |------------------|--------------------------------------------------------|
//! | [`variant`]      | `generate_variants` — the courier's offer generator (§4.E) |
//! | [`courier_agent`]| `CourierAgent` — wraps a live `Courier`, commits variants atomically |
//! | [`order_agent`]  | `OrderAgent` — the Unassigned/AwaitingQuotes/AwaitingCommit/Assigned state machine (§4.F) |

pub mod courier_agent;
pub mod order_agent;
pub mod variant;

pub use courier_agent::CourierAgent;
pub use order_agent::OrderAgent;
pub use variant::generate_variants;
