use std::collections::HashMap;
use tracing::debug;

use crate::error::PipelineError;
use crate::schema::{ColumnMap, Field, Record};

/// Status value that marks a case as approved. Matched exactly.
pub const APPROVED_STATUS: &str = "CERTIFIED";

/// Occurrence counts per category key. Keys are kept as they appear in the
/// input, without case folding or trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyMap {
    counts: HashMap<String, u64>,
}

impl FrequencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: &str) {
        if let Some(count) = self.counts.get_mut(key) {
            *count += 1;
        } else {
            self.counts.insert(key.to_string(), 1);
        }
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, u64)> for FrequencyMap {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub region_counts: FrequencyMap,
    pub occupation_counts: FrequencyMap,
    pub total_approved: u64,
    /// All data rows seen, approved or not.
    pub rows_read: u64,
}

/// Incremental counterpart of [`aggregate`]. Rows are numbered from zero in
/// the order they are pushed.
pub struct Aggregator<'c> {
    columns: &'c ColumnMap,
    acc: Aggregation,
}

impl<'c> Aggregator<'c> {
    pub fn new(columns: &'c ColumnMap) -> Self {
        Self {
            columns,
            acc: Aggregation::default(),
        }
    }

    pub fn push<R: Record>(&mut self, row: &R) -> Result<(), PipelineError> {
        let index = self.acc.rows_read;
        self.acc.rows_read += 1;

        let status = self.columns.resolve(row, Field::Status, index)?;
        if status != APPROVED_STATUS {
            return Ok(());
        }

        let region = self.columns.resolve(row, Field::Region, index)?;
        let occupation = self.columns.resolve(row, Field::Occupation, index)?;

        self.acc.total_approved += 1;
        self.acc.region_counts.increment(region);
        self.acc.occupation_counts.increment(occupation);
        Ok(())
    }

    pub fn finish(self) -> Aggregation {
        debug!(
            rows = self.acc.rows_read,
            approved = self.acc.total_approved,
            regions = self.acc.region_counts.len(),
            occupations = self.acc.occupation_counts.len(),
            "aggregation finished"
        );
        self.acc
    }
}

/// Count approved rows by region and by occupation. The first row missing a
/// required field aborts the whole pass.
pub fn aggregate<I, R>(rows: I, columns: &ColumnMap) -> Result<Aggregation, PipelineError>
where
    I: IntoIterator<Item = R>,
    R: Record,
{
    let mut agg = Aggregator::new(columns);
    for row in rows {
        agg.push(&row)?;
    }
    Ok(agg.finish())
}
