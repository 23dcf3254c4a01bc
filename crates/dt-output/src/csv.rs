//! CSV output backend.
//!
//! Creates one file in the configured output directory: `schedule.csv`.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::{rec_type_name, OutputWriter};
use crate::{OutputResult, ScheduleRecordRow};

/// Writes simulation output to a single CSV file.
pub struct CsvWriter {
    records: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) `schedule.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut records = Writer::from_path(dir.join("schedule.csv"))?;
        records.write_record([
            "resource_id",
            "resource_name",
            "task_id",
            "task_name",
            "type",
            "from_x",
            "from_y",
            "to_x",
            "to_y",
            "start_time",
            "end_time",
            "cost",
            "is_move_to_charge",
            "charge_on_end",
        ])?;
        Ok(Self { records, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_records(&mut self, rows: &[ScheduleRecordRow]) -> OutputResult<()> {
        for row in rows {
            self.records.write_record(&[
                row.resource_id.to_string(),
                row.resource_name.clone(),
                row.task_id.map(|t| t.to_string()).unwrap_or_default(),
                row.task_name.clone().unwrap_or_default(),
                rec_type_name(row.rec_type).to_string(),
                row.from.x.to_string(),
                row.from.y.to_string(),
                row.to.x.to_string(),
                row.to.y.to_string(),
                row.start_time.0.to_string(),
                row.end_time.0.to_string(),
                row.cost.to_string(),
                (row.is_move_to_charge as u8).to_string(),
                row.charge_on_end.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.records.flush()?;
        Ok(())
    }
}
