//! Extractor implementations
//!
//! Each extractor handles a specific page layout.

use super::types::{ExtractContext, Extracted, Extractor, ExtractorConfig};
use crate::error::{Error, Result};
use crate::fetch::PageContent;
use crate::types::{ContentFormat, PageRecord};
use serde_json::Value;

/// Build the extractor for a configuration
pub fn build_extractor(config: &ExtractorConfig) -> Box<dyn Extractor> {
    match config.format {
        ContentFormat::Delimited => Box::new(
            DelimitedExtractor::new(config.delimiter)
                .with_source(config.source.clone())
                .with_min_columns(config.min_columns),
        ),
        ContentFormat::Json => Box::new(
            JsonExtractor::new(config.record_path.clone(), config.header_path.clone())
                .with_source(config.source.clone())
                .with_min_columns(config.min_columns),
        ),
    }
}

/// Fill a record from positional cells
///
/// Cells past the end of the header list are keyed `Column_{idx}`.
fn fill_positional(record: &mut PageRecord, headers: &[String], cells: Vec<String>) {
    for (idx, cell) in cells.into_iter().enumerate() {
        match headers.get(idx) {
            Some(header) => record.insert(header.as_str(), cell),
            None => record.insert(format!("Column_{idx}"), cell),
        }
    }
}

// ============================================================================
// Delimited Extractor
// ============================================================================

/// Extractor for delimited text tables (CSV, TSV, pipe-separated)
#[derive(Debug, Clone)]
pub struct DelimitedExtractor {
    source: String,
    delimiter: char,
    min_columns: usize,
}

impl Default for DelimitedExtractor {
    fn default() -> Self {
        let config = ExtractorConfig::default();
        Self {
            source: config.source,
            delimiter: config.delimiter,
            min_columns: config.min_columns,
        }
    }
}

impl DelimitedExtractor {
    /// Create an extractor with the given delimiter
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }

    /// Set the source identifier
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the minimum cell count for a data row
    #[must_use]
    pub fn with_min_columns(mut self, min_columns: usize) -> Self {
        self.min_columns = min_columns;
        self
    }
}

impl Extractor for DelimitedExtractor {
    fn extract(
        &self,
        content: &PageContent,
        ctx: &ExtractContext<'_>,
        known_headers: Option<&[String]>,
    ) -> Result<Extracted> {
        let mut lines = content
            .body
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        // The first row of every page is its header row
        let Some((header_no, header_line)) = lines.next() else {
            return Ok(Extracted::empty(known_headers.map(<[String]>::to_vec)));
        };
        let page_headers = parse_csv_line(header_line, self.delimiter)
            .map_err(|e| Error::extraction(ctx.page, format!("line {}: {e}", header_no + 1)))?;
        let headers = known_headers.map_or(page_headers, <[String]>::to_vec);

        let mut records = Vec::new();
        for (line_no, line) in lines {
            let cells = parse_csv_line(line, self.delimiter)
                .map_err(|e| Error::extraction(ctx.page, format!("line {}: {e}", line_no + 1)))?;

            // Repeated header rows and short rows are not data
            if cells.len() < self.min_columns || cells == headers {
                continue;
            }

            let mut record = ctx.record(&self.source);
            fill_positional(&mut record, &headers, cells);
            records.push(record);
        }

        Ok(Extracted::new(records, Some(headers)))
    }
}

/// Parse a delimited line into trimmed cells
fn parse_csv_line(line: &str, delimiter: char) -> std::result::Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if in_quotes {
                // Check for escaped quote
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                in_quotes = true;
            }
        } else if c == delimiter && !in_quotes {
            fields.push(current.trim().to_string());
            current = String::new();
        } else {
            current.push(c);
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }

    fields.push(current.trim().to_string());
    Ok(fields)
}

// ============================================================================
// JSON Extractor
// ============================================================================

/// Extractor for JSON bodies
///
/// Rows are either arrays of cells or objects keyed by header. Without a
/// `header_path`, the first array row of every page is its header row.
#[derive(Debug, Clone)]
pub struct JsonExtractor {
    source: String,
    record_path: Option<String>,
    header_path: Option<String>,
    min_columns: usize,
}

impl JsonExtractor {
    /// Create a JSON extractor
    pub fn new(record_path: Option<String>, header_path: Option<String>) -> Self {
        let config = ExtractorConfig::default();
        Self {
            source: config.source,
            record_path,
            header_path,
            min_columns: config.min_columns,
        }
    }

    /// Set the source identifier
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the minimum cell count for a data row
    #[must_use]
    pub fn with_min_columns(mut self, min_columns: usize) -> Self {
        self.min_columns = min_columns;
        self
    }

    /// Locate the row values in a parsed body
    fn rows(&self, value: &Value) -> Vec<Value> {
        let located = match &self.record_path {
            Some(path) => extract_simple_path(value, path),
            None => Some(value),
        };
        match located {
            Some(Value::Array(arr)) => arr.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(v) => vec![v.clone()],
        }
    }

    /// Header list supplied by the body itself
    fn body_headers(&self, value: &Value, page: u32) -> Result<Option<Vec<String>>> {
        let Some(path) = &self.header_path else {
            return Ok(None);
        };
        match extract_simple_path(value, path) {
            Some(Value::Array(items)) => Ok(Some(items.iter().map(value_to_cell).collect())),
            Some(_) => Err(Error::extraction(
                page,
                format!("header path '{path}' is not an array"),
            )),
            None => Ok(None),
        }
    }
}

impl Extractor for JsonExtractor {
    fn extract(
        &self,
        content: &PageContent,
        ctx: &ExtractContext<'_>,
        known_headers: Option<&[String]>,
    ) -> Result<Extracted> {
        if content.is_blank() {
            return Ok(Extracted::empty(known_headers.map(<[String]>::to_vec)));
        }

        let value: Value = serde_json::from_str(&content.body)
            .map_err(|e| Error::decode(format!("page {}: {e}", ctx.page)))?;

        let mut rows = self.rows(&value).into_iter().peekable();
        let explicit = self.body_headers(&value, ctx.page)?;
        let has_explicit = explicit.is_some();
        let mut headers = known_headers.map(<[String]>::to_vec).or(explicit);

        // Positional rows carry their own header row unless the body supplies one
        if !has_explicit && matches!(rows.peek(), Some(Value::Array(_))) {
            if let Some(Value::Array(cells)) = rows.next() {
                let page_headers: Vec<String> = cells.iter().map(value_to_cell).collect();
                headers.get_or_insert(page_headers);
            }
        }

        let mut records = Vec::new();
        for row in rows {
            let mut record = ctx.record(&self.source);
            match row {
                Value::Array(cells) => {
                    let cells: Vec<String> = cells.iter().map(value_to_cell).collect();
                    if cells.len() < self.min_columns {
                        continue;
                    }
                    fill_positional(&mut record, headers.as_deref().unwrap_or_default(), cells);
                }
                Value::Object(map) => {
                    if map.len() < self.min_columns {
                        continue;
                    }
                    if headers.is_none() {
                        headers = Some(map.keys().cloned().collect());
                    }
                    for (key, value) in &map {
                        record.insert(key.as_str(), value_to_cell(value));
                    }
                }
                other => {
                    return Err(Error::extraction(
                        ctx.page,
                        format!("expected an array or object row, found {other}"),
                    ));
                }
            }
            records.push(record);
        }

        Ok(Extracted::new(records, headers))
    }
}

/// Stringify a JSON value as a table cell
fn value_to_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => value.to_string(),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Extract a value using simple dot-notation path
fn extract_simple_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        // Handle array indexing like "data[0]" or "items[-1]"
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index_str = part[bracket_pos + 1..].strip_suffix(']')?;

            if !name.is_empty() {
                current = current.get(name)?;
            }

            let index = index_str.parse::<i64>().ok()?;
            let Value::Array(arr) = current else {
                return None;
            };
            #[allow(clippy::cast_possible_wrap)]
            let idx = if index < 0 {
                (arr.len() as i64 + index) as usize
            } else {
                index as usize
            };
            current = arr.get(idx)?;
        } else {
            current = current.get(part)?;
        }
    }

    Some(current)
}
