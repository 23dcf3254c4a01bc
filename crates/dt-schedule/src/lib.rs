//! Order/courier records and the per-courier schedule engine.
//!
//! | module      | contents                                              |
//! |-------------|----------------------------------------------------------|
//! | [`order`]   | `Order`, `DeliveryData`                                  |
//! | [`courier`] | `Courier`                                                |
//! | [`item`]    | `ScheduleItem`                                           |
//! | [`engine`]  | queries, insertion, auto-charge, displacement/deletion (methods on `Courier`) |
//! | [`records`] | `OrderRecord`/`CourierRecord` input shapes + validation  |
//! | [`error`]   | `ScheduleError`, `ScheduleResult`                        |

pub mod courier;
pub mod engine;
pub mod error;
pub mod item;
pub mod order;
pub mod records;

pub use courier::Courier;
pub use error::{ScheduleError, ScheduleResult};
pub use item::ScheduleItem;
pub use order::{DeliveryData, Order};
pub use records::{CourierRecord, OrderRecord};
