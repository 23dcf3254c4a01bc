//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory
//! with one table, `schedule`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::{rec_type_name, OutputWriter};
use crate::{OutputResult, ScheduleRecordRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn: Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS schedule (
                 resource_id       INTEGER NOT NULL,
                 resource_name     TEXT NOT NULL,
                 task_id           INTEGER,
                 task_name         TEXT,
                 type              TEXT NOT NULL,
                 from_x            REAL NOT NULL,
                 from_y            REAL NOT NULL,
                 to_x              REAL NOT NULL,
                 to_y              REAL NOT NULL,
                 start_time        REAL NOT NULL,
                 end_time          REAL NOT NULL,
                 cost              REAL NOT NULL,
                 is_move_to_charge INTEGER NOT NULL,
                 charge_on_end     REAL NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_records(&mut self, rows: &[ScheduleRecordRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO schedule \
                 (resource_id, resource_name, task_id, task_name, type, \
                  from_x, from_y, to_x, to_y, start_time, end_time, cost, \
                  is_move_to_charge, charge_on_end) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.resource_id,
                    row.resource_name,
                    row.task_id,
                    row.task_name,
                    rec_type_name(row.rec_type),
                    row.from.x,
                    row.from.y,
                    row.to.x,
                    row.to.y,
                    row.start_time.0,
                    row.end_time.0,
                    row.cost,
                    row.is_move_to_charge as i64,
                    row.charge_on_end,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
