//! Logical fields of a visa case record and the column names they may appear
//! under. Older filings (before 2015) and newer ones name the same fields
//! differently; each field carries an ordered list of candidate columns and is
//! resolved on its own, so one row may mix naming eras.

pub mod record;

pub use record::{HeaderIndex, HeaderedRecord, Record};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PipelineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Status,
    Region,
    Occupation,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Status, Field::Region, Field::Occupation];

    pub fn as_str(&self) -> &str {
        match self {
            Field::Status => "status",
            Field::Region => "region",
            Field::Occupation => "occupation",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Naming convention implied by the status column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Era {
    Pre2015,
    Post2015,
    Other,
}

impl Era {
    pub fn from_status_column(column: &str) -> Self {
        match column {
            "STATUS" => Era::Pre2015,
            "CASE_STATUS" => Era::Post2015,
            _ => Era::Other,
        }
    }
}

/// Ordered candidate column names per logical field. Earlier entries win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub status: Vec<String>,
    pub region: Vec<String>,
    pub occupation: Vec<String>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            status: vec!["STATUS".into(), "CASE_STATUS".into()],
            region: vec!["LCA_CASE_WORKLOC1_STATE".into(), "WORKSITE_STATE".into()],
            occupation: vec!["LCA_CASE_SOC_NAME".into(), "SOC_NAME".into()],
        }
    }
}

impl ColumnMap {
    pub fn candidates(&self, field: Field) -> &[String] {
        match field {
            Field::Status => &self.status,
            Field::Region => &self.region,
            Field::Occupation => &self.occupation,
        }
    }

    /// First candidate column present in `row`, with its value.
    pub fn lookup<'r, R: Record>(&self, row: &'r R, field: Field) -> Option<(&str, &'r str)> {
        resolve(row, self.candidates(field))
    }

    /// Value of `field` in `row`, or a schema error naming the row index.
    pub fn resolve<'r, R: Record>(
        &self,
        row: &'r R,
        field: Field,
        row_index: u64,
    ) -> Result<&'r str, PipelineError> {
        self.lookup(row, field)
            .map(|(_, value)| value)
            .ok_or_else(|| PipelineError::Schema {
                row: row_index,
                field,
                candidates: self.candidates(field).to_vec(),
            })
    }
}

/// Shared lookup: the first of `candidates` that `row` has, and its value.
pub fn resolve<'c, 'r, R: Record>(
    row: &'r R,
    candidates: &'c [String],
) -> Option<(&'c str, &'r str)> {
    candidates
        .iter()
        .find_map(|col| row.get(col).map(|value| (col.as_str(), value)))
}
