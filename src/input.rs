// src/input.rs
use glob::{glob, Pattern};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::PipelineError;

/// Find the input table in `dir`. Matches of `pattern` are sorted and the
/// first one is used. Only `pattern` is interpreted as a glob; `dir` is
/// matched literally.
pub fn discover_input(dir: &Path, pattern: &str) -> Result<PathBuf, PipelineError> {
    let full = format!("{}/{}", Pattern::escape(&dir.to_string_lossy()), pattern);

    let paths = glob(&full).map_err(|e| PipelineError::InvalidPattern {
        pattern: full.clone(),
        source: e,
    })?;
    let mut matches: Vec<PathBuf> = paths
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    matches.sort();

    let mut iter = matches.into_iter();
    let chosen = iter.next().ok_or_else(|| PipelineError::InputNotFound {
        pattern: full.clone(),
    })?;
    let ignored: Vec<PathBuf> = iter.collect();
    if !ignored.is_empty() {
        warn!(
            chosen = %chosen.display(),
            ignored = ?ignored,
            "more than one input file, using the first"
        );
    }

    info!(input = %chosen.display(), "processing");
    Ok(chosen)
}
