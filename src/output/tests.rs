//! Tests for output module

use super::*;
use crate::error::Error;
use crate::types::{FlatRow, RecordContext};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pretty_assertions::assert_eq;
use std::fs::File;
use tempfile::tempdir;

fn target() -> Target {
    Target::new("Kentucky", 2024, "University of Louisville")
}

fn record(page: u32, fields: &[(&str, &str)]) -> PageRecord {
    let ctx = RecordContext::for_target(&target(), "OpenTheBooks.com");
    fields
        .iter()
        .fold(PageRecord::new(ctx, page), |r, (k, v)| r.with_field(*k, *v))
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

fn sample() -> (Vec<PageRecord>, Vec<String>) {
    let records = vec![
        record(1, &[("Name", "Doe, Jane"), ("Title", "Professor"), ("Annual Wages", "$98,000")]),
        record(2, &[("Name", "Roe"), ("Title", "Lecturer"), ("Annual Wages", "$51,000"), ("Column_3", "x")]),
    ];
    (records, headers(&["Name", "Title", "Annual Wages"]))
}

// ============================================================================
// Layout Tests
// ============================================================================

#[test]
fn test_column_order() {
    let (records, headers) = sample();
    let columns = column_order(&records, Some(headers.as_slice()));

    assert_eq!(
        columns,
        vec![
            "Year", "State", "Employer", "Source", "Page", "Name", "Title", "Annual Wages",
            "Column_3"
        ]
    );
}

#[test]
fn test_column_order_without_headers() {
    let records = vec![record(1, &[("B", "1"), ("A", "2")])];
    let columns = column_order(&records, None);
    assert_eq!(&columns[5..], &["B".to_string(), "A".to_string()]);
}

#[test]
fn test_records_to_batch() {
    let (records, headers) = sample();
    let batch = records_to_batch(&records, Some(headers.as_slice())).unwrap();

    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 9);
    assert!(batch
        .schema()
        .fields()
        .iter()
        .all(|f| f.data_type() == &DataType::Utf8));

    let rows = batch_to_rows(&batch).unwrap();
    assert_eq!(rows[0]["Year"], "2024");
    assert_eq!(rows[0]["State"], "Kentucky");
    assert_eq!(rows[0]["Page"], "1");
    assert_eq!(rows[0]["Column_3"], "");
    assert_eq!(rows[1]["Column_3"], "x");
}

#[test]
fn test_records_to_batch_empty_run() {
    let batch = records_to_batch(&[], Some(headers(&["Name"]).as_slice())).unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.num_columns(), 6);
}

#[test]
fn test_rows_to_batch_requires_columns() {
    let err = rows_to_batch(&[], &[]).unwrap_err();
    assert!(matches!(err, Error::Output { .. }));
}

// ============================================================================
// File Tests
// ============================================================================

#[test]
fn test_output_path() {
    let path = output_path("out", &target(), OutputFormat::Csv);
    assert_eq!(
        path,
        PathBuf::from("out/University_of_Louisville_2024_salaries.csv")
    );

    let path = output_path("out", &target(), OutputFormat::Parquet);
    assert!(path.to_string_lossy().ends_with("_salaries.parquet"));
}

#[test]
fn test_write_and_read_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("run.csv");
    let (records, headers) = sample();

    let written = write_records(&path, &records, Some(headers.as_slice()), OutputFormat::Csv).unwrap();
    assert_eq!(written, 2);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("Year,State,Employer,Source,Page,Name,Title,Annual Wages,Column_3"));
    assert!(text.contains("\"Doe, Jane\""));

    let (columns, rows) = read_csv_rows(&path).unwrap();
    assert_eq!(columns.len(), 9);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["Name"], "Doe, Jane");
    assert_eq!(rows[0]["Annual Wages"], "$98,000");
    // Numeric-looking cells stay text
    assert_eq!(rows[1]["Year"], "2024");
    assert_eq!(rows[1]["Page"], "2");
}

#[test]
fn test_write_parquet_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.parquet");
    let (records, headers) = sample();

    let written = write_records(&path, &records, Some(headers.as_slice()), OutputFormat::Parquet).unwrap();
    assert_eq!(written, 2);

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
    let rows: Vec<FlatRow> = batches
        .iter()
        .flat_map(|b| batch_to_rows(b).unwrap())
        .collect();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["Title"], "Lecturer");
}

#[test]
fn test_read_missing_csv() {
    let err = read_csv_rows("/no/such/file.csv").unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}

#[test]
fn test_clean_csv_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.csv");
    let (records, pinned) = sample();
    write_records(&path, &records, Some(pinned.as_slice()), OutputFormat::Csv).unwrap();

    let rows = clean_csv_file(&path, &ColumnMapping::default()).unwrap();
    assert_eq!(rows, 2);

    let (columns, rows) = read_csv_rows(&path).unwrap();
    assert_eq!(columns, headers(&["Full Name", "Working Title", "Annualized Salary"]));
    assert_eq!(rows[0]["Full Name"], "Doe, Jane");
    assert_eq!(rows[1]["Annualized Salary"], "$51,000");
}

#[test]
fn test_clean_csv_file_missing_column_leaves_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("other.csv");
    std::fs::write(&path, "Name,Salary\nA,1\n").unwrap();

    let err = clean_csv_file(&path, &ColumnMapping::default()).unwrap_err();
    assert!(matches!(err, Error::MissingColumn { .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "Name,Salary\nA,1\n");
}

#[test]
fn test_clean_csv_file_leaves_no_staging_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.csv");
    std::fs::write(&path, "Name,Title,Annual Wages\nA,Clerk,$10\n").unwrap();

    clean_csv_file(&path, &ColumnMapping::default()).unwrap();

    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("run.csv")]);
}

#[test]
fn test_clean_csv_file_failed_write_keeps_original() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.csv");
    let original = "Name,Title,Annual Wages\nA,Clerk,$10\n";
    std::fs::write(&path, original).unwrap();

    // A directory squatting on the staging name makes the write fail
    std::fs::create_dir(dir.path().join("run.csv.tmp")).unwrap();

    let err = clean_csv_file(&path, &ColumnMapping::default()).unwrap_err();
    assert!(matches!(err, Error::Output { .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    assert!(dir.path().join("run.csv.tmp").is_dir());
}
