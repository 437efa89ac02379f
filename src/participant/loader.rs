//! Participant reference table loading
//!
//! The reference file arrives either as a CSV export of the study
//! spreadsheet or as a Parquet file. Both loaders produce the same
//! `ParticipantTable`; the table is loaded once at startup and never
//! re-read.

use std::path::Path;

use anyhow::Context;
use arrow::array::{Array, Int32Array, Int64Array, StringArray};
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::util::safe_open_file;
use crate::error::{ResolveError, Result};
use crate::participant::{ParticipantRecord, ParticipantTable, extract_year};

/// Reference file columns, in table order
pub const REQUIRED_COLUMNS: [&str; 4] = ["Centro", "CODIGO", "Genero", "FITBIT"];

/// Load the participant table from a CSV file
///
/// The header must carry the reference columns `Centro`, `CODIGO`, `Genero`
/// and `FITBIT`; extra columns are ignored.
pub fn load_csv(path: &Path) -> Result<ParticipantTable> {
    let file = safe_open_file(path, "loading participant CSV table")?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut records = Vec::new();
    for row in reader.deserialize::<ParticipantRecord>() {
        let mut record = row?;
        record.year = extract_year(&record.code);
        records.push(record);
    }

    log::info!(
        "loaded {} participant rows from {}",
        records.len(),
        path.display()
    );
    Ok(ParticipantTable::from_records(records))
}

/// Load the participant table from a Parquet file
///
/// Projects the reference columns and materializes every row; the file is
/// expected to be small (one row per enrolled participant).
pub fn load_parquet(path: &Path) -> Result<ParticipantTable> {
    let file = safe_open_file(path, "loading participant Parquet table")?;
    let reader_builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("failed to read parquet file: {}", path.display()))?;

    // Project just the reference columns; anything missing is fatal here,
    // unlike the resolver's per-file errors
    let file_schema = reader_builder.schema().clone();
    let mut projection = Vec::new();
    for column in REQUIRED_COLUMNS {
        match file_schema.index_of(column) {
            Ok(idx) => projection.push(idx),
            Err(_) => {
                return Err(ResolveError::Table(format!(
                    "column '{column}' not found in {}",
                    path.display()
                )));
            }
        }
    }

    let projection_mask = ProjectionMask::roots(reader_builder.parquet_schema(), projection);
    let reader = reader_builder
        .with_projection(projection_mask)
        .build()
        .with_context(|| format!("failed to build parquet reader for {}", path.display()))?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result
            .with_context(|| format!("failed to read record batch from {}", path.display()))?;

        let centre_idx = batch
            .schema()
            .index_of("Centro")
            .map_err(|e| ResolveError::Table(format!("Centro column missing: {e}")))?;
        let code = string_column(&batch, "CODIGO")?;
        let gender = string_column(&batch, "Genero")?;
        let fitbit = string_column(&batch, "FITBIT")?;

        for row in 0..batch.num_rows() {
            let centre_id = centre_value(batch.column(centre_idx), row)?;
            records.push(ParticipantRecord::new(
                centre_id,
                code.value(row),
                gender.value(row),
                fitbit.value(row),
            ));
        }
    }

    log::info!(
        "loaded {} participant rows from {}",
        records.len(),
        path.display()
    );
    Ok(ParticipantTable::from_records(records))
}

/// Load the participant table, dispatching on the file extension
///
/// `.parquet` files go through the Parquet reader; everything else is read
/// as CSV.
pub fn load_table(path: &Path) -> Result<ParticipantTable> {
    if path.extension().is_some_and(|ext| ext == "parquet") {
        load_parquet(path)
    } else {
        load_csv(path)
    }
}

fn string_column<'a>(
    batch: &'a arrow::record_batch::RecordBatch,
    name: &str,
) -> Result<&'a StringArray> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|e| ResolveError::Table(format!("column '{name}' missing: {e}")))?;
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| ResolveError::Table(format!("column '{name}' is not a string array")))
}

/// Read a centre id cell, tolerating the integer widths spreadsheets export
fn centre_value(column: &dyn Array, row: usize) -> Result<u32> {
    if let Some(array) = column.as_any().downcast_ref::<Int64Array>() {
        return u32::try_from(array.value(row))
            .map_err(|_| ResolveError::Table(format!("centre id out of range: {}", array.value(row))));
    }
    if let Some(array) = column.as_any().downcast_ref::<Int32Array>() {
        return u32::try_from(array.value(row))
            .map_err(|_| ResolveError::Table(format!("centre id out of range: {}", array.value(row))));
    }
    if let Some(array) = column.as_any().downcast_ref::<StringArray>() {
        return array
            .value(row)
            .trim()
            .parse()
            .map_err(|_| ResolveError::Table(format!("centre id not numeric: '{}'", array.value(row))));
    }
    Err(ResolveError::Table(
        "Centro column is neither integer nor string".to_string(),
    ))
}
