//! `dt-behavior` — protocol scaffolding for the negotiation-engine framework.
//!
//! This crate defines the generic seams every concrete agent plugs into; it
//! contains no concrete `CourierAgent`/`OrderAgent` implementations (those
//! live in `dt-negotiation`, which depends on this crate).
//!
//! | module     | contents                                                |
//! |------------|----------------------------------------------------------|
//! | [`agent`]  | `Agent` trait, `Export`                                 |
//! | [`context`]| `AgentContext` (read-only per-handler snapshot)         |
//! | [`message`]| `Message`, `Variant`/`VariantKind`, `Recipient`, `Envelope`, `Outgoing` |
//! | [`scoring`]| `decreasing_kpi`/`increasing_kpi`, `ScoringWeights`, `select_best` |
//! | [`error`]  | `BehaviorError`, `BehaviorResult`                        |

pub mod agent;
pub mod context;
pub mod error;
pub mod message;
pub mod scoring;

pub use agent::{Agent, Export};
pub use context::AgentContext;
pub use error::{BehaviorError, BehaviorResult};
pub use message::{Envelope, Message, Outgoing, Recipient, ShiftEntry, Variant, VariantKind};
pub use scoring::{decreasing_kpi, increasing_kpi, select_best, ScoringWeights};
