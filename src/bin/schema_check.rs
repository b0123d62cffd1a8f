//! Report which columns of the discovered input each logical field resolves
//! to, without aggregating anything. Uses the same configuration as the main
//! binary and prints YAML to stdout.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use h1bstats::{
    input::discover_input,
    schema::{resolve, Era, Field, HeaderIndex},
    Config,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Serialize)]
struct FieldResolution {
    /// Column used, or `null` when none of the candidates is present.
    column: Option<String>,
    candidates: Vec<String>,
}

#[derive(Serialize)]
struct SchemaCheck {
    input: PathBuf,
    header_columns: usize,
    era: Option<Era>,
    fields: BTreeMap<String, FieldResolution>,
}

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(env).with_writer(std::io::stderr).init();

    match check() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("schema_check: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Ok(false) when some field cannot be resolved.
fn check() -> Result<bool> {
    let config = Config::load()?;
    let input = discover_input(&config.input_dir, &config.input_pattern)?;

    let file = File::open(&input).with_context(|| format!("Failed to open {:?}", input))?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(config.delimiter_byte())
        .flexible(true)
        .from_reader(file);
    let headers = HeaderIndex::new(
        rdr.headers()
            .with_context(|| format!("Failed to read header of {:?}", input))?,
    );

    let mut fields = BTreeMap::new();
    let mut era = None;
    let mut complete = true;
    for field in Field::ALL {
        let candidates = config.columns.candidates(field);
        let column = resolve(&headers, candidates).map(|(col, _)| col.to_string());
        if field == Field::Status {
            era = column.as_deref().map(Era::from_status_column);
        }
        complete &= column.is_some();
        fields.insert(
            field.to_string(),
            FieldResolution {
                column,
                candidates: candidates.to_vec(),
            },
        );
    }

    let report = SchemaCheck {
        input,
        header_columns: headers.column_count(),
        era,
        fields,
    };
    print!("{}", serde_yaml::to_string(&report)?);
    Ok(complete)
}
