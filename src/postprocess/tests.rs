//! Tests for the postprocess module

use super::*;
use crate::error::Error;
use crate::types::{FlatRow, PageRecord, RecordContext, Target};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn record(page: u32, name: &str, wages: &str) -> PageRecord {
    let target = Target::new("Kentucky", 2024, "University of Louisville");
    PageRecord::new(RecordContext::for_target(&target, "OpenTheBooks.com"), page)
        .with_field("Name", name)
        .with_field("Title", "Staff")
        .with_field("Annual Wages", wages)
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

fn row(pairs: &[(&str, &str)]) -> FlatRow {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

// ============================================================================
// Dedup
// ============================================================================

#[test]
fn test_dedup_ignores_page_index() {
    let records = vec![
        record(1, "A", "1"),
        record(1, "B", "2"),
        record(3, "A", "1"),
        record(4, "C", "3"),
    ];

    let (kept, removed) = dedup_records(records);

    assert_eq!(removed, 1);
    let names: Vec<_> = kept.iter().map(|r| r.field("Name").unwrap()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
    assert_eq!(kept[0].page, 1);
}

#[test]
fn test_dedup_keeps_distinct_records() {
    let (kept, removed) = dedup_records(vec![record(1, "A", "1"), record(1, "A", "2")]);
    assert_eq!(removed, 0);
    assert_eq!(kept.len(), 2);
}

// ============================================================================
// Wages
// ============================================================================

#[test_case(&["Name", "Title", "Annual Wages"], Some("Annual Wages"); "annual wages")]
#[test_case(&["Name", "Base SALARY", "Total Pay"], Some("Base SALARY"); "first match wins")]
#[test_case(&["Employee", "Compensation"], Some("Compensation"); "compensation")]
#[test_case(&["Name", "Title"], None; "no wage column")]
#[test_case(&["Annual_Wages", "Annual_Wages_Numeric"], None; "derived columns ignored")]
fn test_find_wage_column(names: &[&str], expected: Option<&str>) {
    assert_eq!(find_wage_column(&headers(names)), expected);
}

#[test_case("$52,000", Some(52000.0); "dollars and commas")]
#[test_case(" 61,250.50 ", Some(61250.5); "whitespace")]
#[test_case("$ 1 000", Some(1000.0); "inner whitespace")]
#[test_case("N/A", None; "not numeric")]
#[test_case("", None; "empty")]
fn test_parse_wage(raw: &str, expected: Option<f64>) {
    assert_eq!(parse_wage(raw), expected);
}

#[test]
fn test_normalize_wages() {
    let mut records = vec![record(1, "A", "$52,000"), record(1, "B", "N/A")];

    let column = normalize_wages(&mut records, &headers(&["Name", "Title", "Annual Wages"]));

    assert_eq!(column.as_deref(), Some("Annual Wages"));
    assert_eq!(records[0].field(COL_ANNUAL_WAGES), Some("$52,000"));
    assert_eq!(records[0].field(COL_ANNUAL_WAGES_NUMERIC), Some("52000"));
    assert_eq!(records[1].field(COL_ANNUAL_WAGES), Some("N/A"));
    assert_eq!(records[1].field(COL_ANNUAL_WAGES_NUMERIC), Some(""));
}

#[test]
fn test_normalize_wages_without_wage_column() {
    let mut records = vec![record(1, "A", "1")];
    assert_eq!(normalize_wages(&mut records, &headers(&["Name"])), None);
    assert_eq!(records[0].field(COL_ANNUAL_WAGES), None);
}

// ============================================================================
// Stats
// ============================================================================

#[test]
fn test_salary_stats_odd_count() {
    let records = vec![
        record(1, "A", "$30,000"),
        record(1, "B", "$10,000"),
        record(2, "C", "$20,000"),
        record(2, "D", "unknown"),
    ];

    let stats = SalaryStats::from_records(&records, "Annual Wages").unwrap();

    assert_eq!(stats.count, 3);
    assert_eq!(stats.min, 10000.0);
    assert_eq!(stats.max, 30000.0);
    assert_eq!(stats.mean, 20000.0);
    assert_eq!(stats.median, 20000.0);
}

#[test]
fn test_salary_stats_even_count_median() {
    let stats = SalaryStats::from_values(vec![4.0, 1.0, 3.0, 2.0]).unwrap();
    assert_eq!(stats.median, 2.5);
    assert_eq!(stats.mean, 2.5);
}

#[test]
fn test_salary_stats_none_without_values() {
    let records = vec![record(1, "A", "n/a")];
    assert_eq!(SalaryStats::from_records(&records, "Annual Wages"), None);
    assert_eq!(SalaryStats::from_records(&records, "Missing"), None);
    assert_eq!(SalaryStats::from_values(Vec::new()), None);
}

#[test]
fn test_salary_stats_from_rows() {
    let rows = vec![
        row(&[("Annualized Salary", "$1,000")]),
        row(&[("Annualized Salary", "3000")]),
    ];
    let stats = SalaryStats::from_rows(&rows, "Annualized Salary").unwrap();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.mean, 2000.0);
}

#[test]
fn test_salary_stats_display() {
    let stats = SalaryStats::from_values(vec![1234.5, 98765.0]).unwrap();
    assert_eq!(
        stats.to_string(),
        "2 salaries, min $1,234.50, max $98,765.00, mean $49,999.75, median $49,999.75"
    );
}

#[test_case(0.0, "$0.00")]
#[test_case(999.999, "$1,000.00")]
#[test_case(1_234_567.8, "$1,234,567.80")]
#[test_case(-52.5, "-$52.50")]
fn test_format_currency(value: f64, expected: &str) {
    assert_eq!(format_currency(value), expected);
}

#[test]
fn test_page_distribution() {
    let records = vec![
        record(1, "A", "1"),
        record(1, "B", "1"),
        record(3, "C", "1"),
    ];

    let distribution = page_distribution(&records);
    assert_eq!(distribution.into_iter().collect::<Vec<_>>(), vec![(1, 2), (3, 1)]);
}

// ============================================================================
// Columns
// ============================================================================

#[test]
fn test_default_mapping_projection() {
    let columns = headers(&["Year", "Name", "Title", "Annual Wages", "Page"]);
    let rows = vec![row(&[
        ("Year", "2024"),
        ("Name", "Jane"),
        ("Title", "Prof"),
        ("Annual Wages", "$1"),
        ("Page", "1"),
    ])];

    let projected = project_rows(&columns, &rows, &ColumnMapping::default(), "a.csv").unwrap();

    assert_eq!(
        projected,
        vec![row(&[
            ("Full Name", "Jane"),
            ("Working Title", "Prof"),
            ("Annualized Salary", "$1"),
        ])]
    );
}

#[test]
fn test_projection_missing_column() {
    let columns = headers(&["Name", "Title"]);
    let err = project_rows(&columns, &[], &ColumnMapping::default(), "a.csv").unwrap_err();

    assert!(matches!(err, Error::MissingColumn { ref column, ref path }
        if column == "Annual Wages" && path == "a.csv"));
}

#[test]
fn test_mapping_parse_args() {
    let mapping = ColumnMapping::parse_args(&["Name=Employee", " Title = Role "]).unwrap();
    assert_eq!(mapping.sources().collect::<Vec<_>>(), vec!["Name", "Title"]);
    assert_eq!(mapping.outputs(), vec!["Employee", "Role"]);

    assert!(ColumnMapping::parse_args(&["Name"]).is_err());
    assert!(ColumnMapping::parse_args(&["=Role"]).is_err());
    assert!(ColumnMapping::parse_args::<&str>(&[]).is_err());
}
