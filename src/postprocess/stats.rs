//! Salary summaries

use super::wages::parse_wage;
use crate::types::{FlatRow, PageRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Summary of the parseable values of a wage column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryStats {
    /// Number of parseable values
    pub count: usize,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Median (mean of the middle pair for even counts)
    pub median: f64,
}

impl SalaryStats {
    /// Summarize raw values; `None` when there are none
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let count = values.len();
        let sum: f64 = values.iter().sum();
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        };

        Some(Self {
            count,
            min: values[0],
            max: values[count - 1],
            mean: sum / count as f64,
            median,
        })
    }

    /// Summarize a column of extracted records
    pub fn from_records(records: &[PageRecord], column: &str) -> Option<Self> {
        Self::from_values(
            records
                .iter()
                .filter_map(|r| r.get(column))
                .filter_map(|v| parse_wage(&v))
                .collect(),
        )
    }

    /// Summarize a column of flat rows read back from a file
    pub fn from_rows(rows: &[FlatRow], column: &str) -> Option<Self> {
        Self::from_values(
            rows.iter()
                .filter_map(|r| r.get(column))
                .filter_map(|v| parse_wage(v))
                .collect(),
        )
    }
}

impl fmt::Display for SalaryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} salaries, min {}, max {}, mean {}, median {}",
            self.count,
            format_currency(self.min),
            format_currency(self.max),
            format_currency(self.mean),
            format_currency(self.median)
        )
    }
}

/// Format a dollar amount with thousands separators ("$1,234.50")
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

/// Records per page
pub fn page_distribution(records: &[PageRecord]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.page).or_insert(0) += 1;
    }
    counts
}
