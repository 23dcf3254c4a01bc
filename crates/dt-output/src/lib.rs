//! `dt-output` — schedule-record output writers for the negotiation-engine
//! framework.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend     | File created        |
//! |-----------|-------------|----------------------|
//! | *(none)*  | CSV         | `schedule.csv`       |
//! | `sqlite`  | SQLite      | `output.db`          |
//! | `parquet` | Parquet     | `schedule.parquet`   |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `dt_sim::SimObserver`. None of
//! this is part of the negotiation engine's core contract (§6 of the
//! interface — structured schedule records in, how they're persisted is a
//! host concern); this crate exists only because the teacher framework
//! keeps the same separation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use dt_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = SimOutputObserver::with_couriers(writer, &couriers);
//! sim.run(&mut obs).unwrap();
//! obs.flush(&mut sim);
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::ScheduleRecordRow;
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;
