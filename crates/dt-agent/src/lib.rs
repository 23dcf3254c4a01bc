//! `dt-agent` — dispatcher, reference book, and mailbox substrate for the
//! negotiation-engine framework.
//!
//! | module            | contents                                            |
//! |-------------------|------------------------------------------------------|
//! | [`reference_book`]| `ReferenceBook` (entity → agent lookup, §4.G)       |
//! | [`mailbox`]       | `MailboxSubstrate` (per-address FIFO inboxes, §4.D) |
//! | [`dispatcher`]    | `Dispatcher` (lifecycle + tick-driven message loop) |
//!
//! This crate is generic over concrete agent implementations — it knows
//! nothing about couriers or orders, only the [`dt_behavior::Agent`] trait
//! object. Concrete agents are constructed by `dt-negotiation` and handed
//! to [`Dispatcher::add_entity`] by the host (`dt-sim`).
//!
//! # Cargo features
//!
//! | Flag       | Effect                                                    |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Runs one round's agent handlers on Rayon's thread pool.   |
//! | `fx-hash`  | Swaps `HashMap` for `rustc_hash::FxHashMap` in the book and mailbox. |

pub mod dispatcher;
pub mod mailbox;
pub mod reference_book;

pub use dispatcher::Dispatcher;
pub use mailbox::MailboxSubstrate;
pub use reference_book::ReferenceBook;
