// src/report.rs
use std::{
    fmt, fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::PipelineError;
use crate::process::RankedEntry;

/// Which dimension a report ranks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    Region,
    Occupation,
}

impl ReportKind {
    pub fn header(&self) -> &'static str {
        match self {
            ReportKind::Region => "TOP_STATES;NUMBER_CERTIFIED_APPLICATIONS;PERCENTAGE",
            ReportKind::Occupation => "TOP_OCCUPATIONS;NUMBER_CERTIFIED_APPLICATIONS;PERCENTAGE",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Region => f.write_str("region"),
            ReportKind::Occupation => f.write_str("occupation"),
        }
    }
}

/// Header line followed by one line per ranked entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    kind: ReportKind,
    lines: Vec<String>,
}

impl Report {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Every line terminated by `\n`.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// `count / total` as a percentage with one fraction digit, e.g. `33.3%`.
pub fn format_percentage(count: u64, total: u64) -> String {
    let pct = (100 * count) as f64 / total as f64;
    format!("{:.1}%", pct)
}

/// Render `entries` as `key;count;percentage%` lines under the kind's header.
pub fn format_report(
    entries: &[RankedEntry],
    total: u64,
    kind: ReportKind,
) -> Result<Report, PipelineError> {
    if total == 0 {
        return Err(PipelineError::ZeroTotal);
    }

    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(kind.header().to_string());
    for entry in entries {
        lines.push(format!(
            "{};{};{}",
            entry.key,
            entry.count,
            format_percentage(entry.count, total)
        ));
    }
    Ok(Report { kind, lines })
}

/// A report written to a temp file next to its destination, not yet visible
/// under its final name. Dropping it removes the temp file.
#[derive(Debug)]
pub struct StagedReport {
    tmp: NamedTempFile,
    path: PathBuf,
    kind: ReportKind,
    lines: usize,
}

impl StagedReport {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename the temp file over the destination.
    pub fn commit(self) -> Result<(), PipelineError> {
        let StagedReport {
            tmp,
            path,
            kind,
            lines,
        } = self;
        if let Err(e) = tmp.persist(&path) {
            return Err(PipelineError::OutputWrite {
                path,
                source: e.error,
            });
        }
        debug!(kind = %kind, path = %path.display(), lines, "wrote report");
        Ok(())
    }
}

/// Write `report` into a temp file in `path`'s directory, creating the
/// directory if needed.
pub fn stage_report(report: &Report, path: &Path) -> Result<StagedReport, PipelineError> {
    let write_err = |e: std::io::Error| PipelineError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(report.to_text().as_bytes())
        .map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    Ok(StagedReport {
        tmp,
        path: path.to_path_buf(),
        kind: report.kind,
        lines: report.lines.len(),
    })
}
