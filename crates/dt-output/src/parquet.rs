//! Parquet output backend (feature `parquet`).
//!
//! Creates one file in the configured output directory: `schedule.parquet`.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{BooleanBuilder, Float64Builder, StringBuilder, UInt32Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::{rec_type_name, OutputWriter};
use crate::{OutputResult, ScheduleRecordRow};

fn schedule_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("resource_id", DataType::UInt32, false),
        Field::new("resource_name", DataType::Utf8, false),
        Field::new("task_id", DataType::UInt32, true),
        Field::new("task_name", DataType::Utf8, true),
        Field::new("type", DataType::Utf8, false),
        Field::new("from_x", DataType::Float64, false),
        Field::new("from_y", DataType::Float64, false),
        Field::new("to_x", DataType::Float64, false),
        Field::new("to_y", DataType::Float64, false),
        Field::new("start_time", DataType::Float64, false),
        Field::new("end_time", DataType::Float64, false),
        Field::new("cost", DataType::Float64, false),
        Field::new("is_move_to_charge", DataType::Boolean, false),
        Field::new("charge_on_end", DataType::Float64, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder().set_compression(Compression::SNAPPY).build()
}

/// Writes simulation output to a single Parquet file.
///
/// `finish()` **must** be called to write the Parquet file footer; a file
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    inner: Option<ArrowWriter<File>>,
    schema: Arc<Schema>,
}

impl ParquetWriter {
    /// Create `schedule.parquet` in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let schema = schedule_schema();
        let file = File::create(dir.join("schedule.parquet"))?;
        let inner = ArrowWriter::try_new(file, Arc::clone(&schema), Some(snappy_props()))?;
        Ok(Self { inner: Some(inner), schema })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_records(&mut self, rows: &[ScheduleRecordRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.inner.as_mut() else {
            return Ok(());
        };

        let mut resource_ids = UInt32Builder::new();
        let mut resource_names = StringBuilder::new();
        let mut task_ids = UInt32Builder::new();
        let mut task_names = StringBuilder::new();
        let mut types = StringBuilder::new();
        let mut from_xs = Float64Builder::new();
        let mut from_ys = Float64Builder::new();
        let mut to_xs = Float64Builder::new();
        let mut to_ys = Float64Builder::new();
        let mut start_times = Float64Builder::new();
        let mut end_times = Float64Builder::new();
        let mut costs = Float64Builder::new();
        let mut is_move_to_charges = BooleanBuilder::new();
        let mut charge_on_ends = Float64Builder::new();

        for row in rows {
            resource_ids.append_value(row.resource_id);
            resource_names.append_value(&row.resource_name);
            match row.task_id {
                Some(id) => task_ids.append_value(id),
                None => task_ids.append_null(),
            }
            match &row.task_name {
                Some(name) => task_names.append_value(name),
                None => task_names.append_null(),
            }
            types.append_value(rec_type_name(row.rec_type));
            from_xs.append_value(row.from.x);
            from_ys.append_value(row.from.y);
            to_xs.append_value(row.to.x);
            to_ys.append_value(row.to.y);
            start_times.append_value(row.start_time.0);
            end_times.append_value(row.end_time.0);
            costs.append_value(row.cost);
            is_move_to_charges.append_value(row.is_move_to_charge);
            charge_on_ends.append_value(row.charge_on_end);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.schema),
            vec![
                Arc::new(resource_ids.finish()),
                Arc::new(resource_names.finish()),
                Arc::new(task_ids.finish()),
                Arc::new(task_names.finish()),
                Arc::new(types.finish()),
                Arc::new(from_xs.finish()),
                Arc::new(from_ys.finish()),
                Arc::new(to_xs.finish()),
                Arc::new(to_ys.finish()),
                Arc::new(start_times.finish()),
                Arc::new(end_times.finish()),
                Arc::new(costs.finish()),
                Arc::new(is_move_to_charges.finish()),
                Arc::new(charge_on_ends.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.inner.take() {
            w.close()?;
        }
        Ok(())
    }
}
