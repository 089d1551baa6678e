//! Table file writers and readers
//!
//! Writes Arrow RecordBatches to CSV or Parquet and reads CSV back.

use super::schema::{batch_to_rows, string_schema};
use crate::error::{Error, Result};
use crate::types::FlatRow;
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Write a single RecordBatch to a Snappy-compressed Parquet file
pub fn write_parquet(path: impl AsRef<Path>, batch: &RecordBatch) -> Result<usize> {
    let file = File::create(path.as_ref()).map_err(|e| Error::Output {
        message: format!("Failed to create file: {e}"),
    })?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props)).map_err(|e| {
        Error::Output {
            message: format!("Failed to create Parquet writer: {e}"),
        }
    })?;

    writer.write(batch).map_err(|e| Error::Output {
        message: format!("Failed to write batch: {e}"),
    })?;
    writer.close().map_err(|e| Error::Output {
        message: format!("Failed to close Parquet writer: {e}"),
    })?;

    Ok(batch.num_rows())
}

/// Write a single RecordBatch to a CSV file with a header row
pub fn write_csv(path: impl AsRef<Path>, batch: &RecordBatch) -> Result<usize> {
    let file = File::create(path.as_ref()).map_err(|e| Error::Output {
        message: format!("Failed to create file: {e}"),
    })?;

    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(batch)?;
    Ok(batch.num_rows())
}

/// Read a CSV file with a header row into its column names and rows
pub fn read_csv_rows(path: impl AsRef<Path>) -> Result<(Vec<String>, Vec<FlatRow>)> {
    let path = path.as_ref();
    let open = || {
        File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound {
                path: path.display().to_string(),
            },
            _ => Error::Io(e),
        })
    };

    let format = Format::default().with_header(true);
    let (inferred, _) = format.infer_schema(open()?, None)?;

    // Cells are kept as text regardless of what they look like
    let columns: Vec<String> = inferred.fields().iter().map(|f| f.name().clone()).collect();
    let schema = Arc::new(string_schema(&columns));

    let reader = ReaderBuilder::new(schema)
        .with_format(format)
        .build(open()?)?;

    let mut rows = Vec::new();
    for batch in reader {
        rows.extend(batch_to_rows(&batch?)?);
    }

    Ok((columns, rows))
}
