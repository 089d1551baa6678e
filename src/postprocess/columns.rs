//! Column projection for cleaned output files

use crate::error::{Error, Result};
use crate::types::FlatRow;
use serde::{Deserialize, Serialize};

/// Ordered source -> output column renames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pairs: Vec<(String, String)>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::from_pairs([
            ("Name", "Full Name"),
            ("Title", "Working Title"),
            ("Annual Wages", "Annualized Salary"),
        ])
    }
}

impl ColumnMapping {
    /// Build a mapping from (source, output) pairs
    pub fn from_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .collect(),
        }
    }

    /// Parse `FROM=TO` arguments
    pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let pairs = args
            .iter()
            .map(|arg| {
                let arg = arg.as_ref();
                match arg.split_once('=') {
                    Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
                        Ok((from.trim().to_string(), to.trim().to_string()))
                    }
                    _ => Err(Error::invalid_value(
                        "map",
                        format!("expected FROM=TO, got '{arg}'"),
                    )),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        if pairs.is_empty() {
            return Err(Error::invalid_value("map", "at least one column is required"));
        }
        Ok(Self { pairs })
    }

    /// Source columns, in output order
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(from, _)| from.as_str())
    }

    /// Output column names, in order
    pub fn outputs(&self) -> Vec<String> {
        self.pairs.iter().map(|(_, to)| to.clone()).collect()
    }
}

/// Keep only mapped columns, renamed and in mapping order
///
/// `origin` names the data in the error when a source column is missing.
pub fn project_rows(
    columns: &[String],
    rows: &[FlatRow],
    mapping: &ColumnMapping,
    origin: &str,
) -> Result<Vec<FlatRow>> {
    if let Some(missing) = mapping.sources().find(|s| !columns.iter().any(|c| c == s)) {
        return Err(Error::missing_column(missing, origin));
    }

    Ok(rows
        .iter()
        .map(|row| {
            mapping
                .pairs
                .iter()
                .map(|(from, to)| (to.clone(), row.get(from).cloned().unwrap_or_default()))
                .collect()
        })
        .collect())
}
