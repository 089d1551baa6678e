//! Post-processing module
//!
//! Run-level cleanup applied after pagination: wage normalization, duplicate
//! removal, salary summaries and column projection for cleaned files.

mod columns;
mod dedup;
mod stats;
mod wages;

pub use columns::{project_rows, ColumnMapping};
pub use dedup::dedup_records;
pub use stats::{format_currency, page_distribution, SalaryStats};
pub use wages::{
    find_wage_column, normalize_wages, parse_wage, strip_wage, COL_ANNUAL_WAGES,
    COL_ANNUAL_WAGES_NUMERIC, WAGE_KEYWORDS,
};

#[cfg(test)]
mod tests;
