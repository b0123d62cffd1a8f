use crate::error::PipelineError;
use crate::process::aggregate::FrequencyMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub key: String,
    pub count: u64,
}

impl RankedEntry {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// Top `k` entries of `counts`, highest count first, ties in ascending key
/// order. Returns every entry when there are fewer than `k`.
pub fn rank(counts: &FrequencyMap, k: usize) -> Result<Vec<RankedEntry>, PipelineError> {
    if k == 0 {
        return Err(PipelineError::InvalidArgument(
            "rank limit must be at least 1".into(),
        ));
    }

    let mut entries: Vec<RankedEntry> = counts
        .iter()
        .map(|(key, count)| RankedEntry::new(key, count))
        .collect();

    // Two stable passes: key ascending, then count descending. The second
    // pass keeps key order among equal counts.
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    entries.sort_by(|a, b| b.count.cmp(&a.count));

    entries.truncate(k);
    Ok(entries)
}
