//! Wage column detection and normalization

use crate::types::PageRecord;

/// Header keywords that mark a wage column, matched case-insensitively
pub const WAGE_KEYWORDS: [&str; 5] = ["wage", "salary", "pay", "compensation", "annual"];

/// Copy of the detected wage column
pub const COL_ANNUAL_WAGES: &str = "Annual_Wages";

/// Numeric form of the detected wage column
pub const COL_ANNUAL_WAGES_NUMERIC: &str = "Annual_Wages_Numeric";

/// First header that looks like a wage column
pub fn find_wage_column(headers: &[String]) -> Option<&str> {
    headers
        .iter()
        .map(String::as_str)
        .filter(|h| *h != COL_ANNUAL_WAGES && *h != COL_ANNUAL_WAGES_NUMERIC)
        .find(|h| {
            let lower = h.to_lowercase();
            WAGE_KEYWORDS.iter().any(|k| lower.contains(k))
        })
}

/// Strip currency formatting ("$1,234.50 " -> "1234.50")
pub fn strip_wage(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect()
}

/// Parse a formatted wage
pub fn parse_wage(raw: &str) -> Option<f64> {
    strip_wage(raw).parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Add `Annual_Wages` and `Annual_Wages_Numeric` to every record
///
/// The numeric column holds the stripped text when it parses, otherwise it is
/// empty. Returns the wage column used, or `None` when no header matched.
pub fn normalize_wages(records: &mut [PageRecord], headers: &[String]) -> Option<String> {
    let column = find_wage_column(headers)?.to_string();

    for record in records.iter_mut() {
        let raw = record.field(&column).unwrap_or_default().to_string();
        let numeric = if parse_wage(&raw).is_some() {
            strip_wage(&raw)
        } else {
            String::new()
        };
        record.insert(COL_ANNUAL_WAGES, raw);
        record.insert(COL_ANNUAL_WAGES_NUMERIC, numeric);
    }

    Some(column)
}
