//! Table layout and record to Arrow conversion
//!
//! Every output column is a Utf8 column. Cell text is written exactly as it
//! was extracted.

use crate::error::{Error, Result};
use crate::types::{FlatRow, PageRecord, CONTEXT_COLUMNS};
use arrow::array::{Array, ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use indexmap::IndexSet;
use std::sync::Arc;

/// Column order for a run's records
///
/// Context columns come first, then the pinned headers, then any other field
/// names in first-seen order.
pub fn column_order(records: &[PageRecord], headers: Option<&[String]>) -> Vec<String> {
    let mut columns: IndexSet<String> = CONTEXT_COLUMNS.iter().map(|c| (*c).to_string()).collect();

    if let Some(headers) = headers {
        columns.extend(headers.iter().cloned());
    }
    for record in records {
        columns.extend(record.fields.keys().cloned());
    }

    columns.into_iter().collect()
}

/// All-Utf8 schema for a column list
pub fn string_schema(columns: &[String]) -> Schema {
    let fields: Vec<Field> = columns
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();
    Schema::new(fields)
}

/// Convert flat rows to a RecordBatch; absent cells become empty strings
pub fn rows_to_batch(columns: &[String], rows: &[FlatRow]) -> Result<RecordBatch> {
    let schema = Arc::new(string_schema(columns));

    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|name| {
            let values: StringArray = rows
                .iter()
                .map(|row| Some(row.get(name).map_or("", String::as_str)))
                .collect();
            Arc::new(values) as ArrayRef
        })
        .collect();

    if arrays.is_empty() {
        return Err(Error::output("cannot build a table without columns"));
    }

    Ok(RecordBatch::try_new(schema, arrays)?)
}

/// Convert a run's records to a RecordBatch
pub fn records_to_batch(records: &[PageRecord], headers: Option<&[String]>) -> Result<RecordBatch> {
    let columns = column_order(records, headers);
    let rows: Vec<FlatRow> = records.iter().map(PageRecord::flatten).collect();
    rows_to_batch(&columns, &rows)
}

/// Read a batch of Utf8 columns back into flat rows; nulls read as empty
pub fn batch_to_rows(batch: &RecordBatch) -> Result<Vec<FlatRow>> {
    let schema = batch.schema();
    let mut columns = Vec::with_capacity(batch.num_columns());

    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        let strings = array
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| Error::Output {
                message: format!("Column '{}' is not a string column", field.name()),
            })?;
        columns.push((field.name().clone(), strings));
    }

    let rows = (0..batch.num_rows())
        .map(|i| {
            columns
                .iter()
                .map(|(name, values)| {
                    let value = if values.is_null(i) {
                        String::new()
                    } else {
                        values.value(i).to_string()
                    };
                    (name.clone(), value)
                })
                .collect()
        })
        .collect();

    Ok(rows)
}
