// src/process/mod.rs
pub mod aggregate;
pub mod rank;

pub use aggregate::{aggregate, Aggregation, Aggregator, FrequencyMap, APPROVED_STATUS};
pub use rank::{rank, RankedEntry};

use csv::{ReaderBuilder, StringRecord};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::schema::{ColumnMap, HeaderIndex, HeaderedRecord};

/// Parse a delimited table from `reader` and aggregate it in one pass.
/// The first record is the header. `source` only labels errors.
///
/// Records may be shorter or longer than the header: missing trailing cells
/// read as absent columns and extra cells are ignored.
pub fn aggregate_reader<R: Read>(
    reader: R,
    delimiter: u8,
    columns: &ColumnMap,
    source: &Path,
) -> Result<Aggregation, PipelineError> {
    let read_err = |e: csv::Error| PipelineError::InputRead {
        path: source.to_path_buf(),
        source: e,
    };

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = HeaderIndex::new(rdr.headers().map_err(read_err)?);
    debug!(columns = headers.column_count(), "read header");

    let mut agg = Aggregator::new(columns);
    let mut record = StringRecord::new();
    while rdr.read_record(&mut record).map_err(read_err)? {
        agg.push(&HeaderedRecord::new(&headers, &record))?;
    }
    Ok(agg.finish())
}

/// Open `path` and aggregate its contents.
#[tracing::instrument(level = "info", skip(path, columns), fields(path = %path.display()))]
pub fn aggregate_file(
    path: &Path,
    delimiter: u8,
    columns: &ColumnMap,
) -> Result<Aggregation, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::InputRead {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    let agg = aggregate_reader(BufReader::new(file), delimiter, columns, path)?;
    info!(
        rows = agg.rows_read,
        approved = agg.total_approved,
        "aggregated input"
    );
    Ok(agg)
}
