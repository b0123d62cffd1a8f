// src/pipeline.rs
use std::{
    io::Read,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::info;

use crate::config::Config;
use crate::error::PipelineError;
use crate::input::discover_input;
use crate::process::{aggregate_file, aggregate_reader, rank, Aggregation};
use crate::report::{format_report, stage_report, Report, ReportKind};

/// Both rendered reports, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reports {
    pub states: Report,
    pub occupations: Report,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub input: PathBuf,
    pub rows_read: u64,
    pub total_approved: u64,
    pub distinct_regions: usize,
    pub distinct_occupations: usize,
    pub outputs: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Rank and format both dimensions. Fails before producing anything if
/// either report cannot be built.
pub fn build_reports(agg: &Aggregation, top_k: usize) -> Result<Reports, PipelineError> {
    let top_states = rank(&agg.region_counts, top_k)?;
    let top_occupations = rank(&agg.occupation_counts, top_k)?;
    Ok(Reports {
        states: format_report(&top_states, agg.total_approved, ReportKind::Region)?,
        occupations: format_report(
            &top_occupations,
            agg.total_approved,
            ReportKind::Occupation,
        )?,
    })
}

/// Aggregate and report an in-memory table. Nothing is written.
pub fn reports_from_reader<R: Read>(reader: R, config: &Config) -> Result<Reports, PipelineError> {
    let agg = aggregate_reader(
        reader,
        config.delimiter_byte(),
        &config.columns,
        Path::new("<stream>"),
    )?;
    build_reports(&agg, config.top_k)
}

/// Discover the input, aggregate, rank, format and write both reports.
/// Stops at the first failing stage. Both reports are built and staged in
/// temp files before either is renamed into place, so a failure up to that
/// point leaves the output directory untouched.
#[tracing::instrument(level = "info", skip(config))]
pub fn run(config: &Config) -> Result<RunSummary, PipelineError> {
    let start = Instant::now();

    let input = discover_input(&config.input_dir, &config.input_pattern)?;
    let agg = aggregate_file(&input, config.delimiter_byte(), &config.columns)?;
    let reports = build_reports(&agg, config.top_k)?;

    let states_path = config.states_path();
    let occupations_path = config.occupations_path();
    let staged_states = stage_report(&reports.states, &states_path)?;
    let staged_occupations = stage_report(&reports.occupations, &occupations_path)?;
    staged_states.commit()?;
    staged_occupations.commit()?;

    let summary = RunSummary {
        input,
        rows_read: agg.rows_read,
        total_approved: agg.total_approved,
        distinct_regions: agg.region_counts.len(),
        distinct_occupations: agg.occupation_counts.len(),
        outputs: vec![states_path, occupations_path],
        elapsed: start.elapsed(),
    };
    info!(
        input = %summary.input.display(),
        rows = summary.rows_read,
        approved = summary.total_approved,
        regions = summary.distinct_regions,
        occupations = summary.distinct_occupations,
        outputs = ?summary.outputs,
        elapsed = ?summary.elapsed,
        "process finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use anyhow::Result;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,h1bstats=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const POST_2015: &str = "\
;CASE_NUMBER;CASE_STATUS;EMPLOYER_NAME;SOC_NAME;SOC_CODE;JOB_TITLE;FULL_TIME_POSITION;WORKSITE_CITY;WORKSITE_STATE
0;I-1;CERTIFIED;ACME;SOFTWARE DEVELOPERS, APPLICATIONS;15-1132;DEV;Y;SEATTLE;WA
1;I-2;CERTIFIED;ACME;COMPUTER SYSTEMS ANALYSTS;15-1121;ANALYST;Y;AUSTIN;TX
2;I-3;DENIED;ACME;COMPUTER SYSTEMS ANALYSTS;15-1121;ANALYST;Y;AUSTIN;TX
3;I-4;CERTIFIED;INITECH;SOFTWARE DEVELOPERS, APPLICATIONS;15-1132;DEV;Y;AUSTIN;TX
4;I-5;CERTIFIED-WITHDRAWN;INITECH;ACCOUNTANTS AND AUDITORS;13-2011;ACCT;Y;NEWARK;NJ
5;I-6;CERTIFIED;INITECH;ACCOUNTANTS AND AUDITORS;13-2011;ACCT;Y;NEWARK;NJ
6;I-7;CERTIFIED;GLOBEX;SOFTWARE DEVELOPERS, APPLICATIONS;15-1132;DEV;Y;SAN JOSE;CA
";

    fn config_for(root: &Path) -> Config {
        Config {
            input_dir: root.join("input"),
            output_dir: root.join("output"),
            ..Config::default()
        }
    }

    #[test]
    fn test_three_row_scenario_report() -> Result<()> {
        let input = "STATUS;LCA_CASE_WORKLOC1_STATE;LCA_CASE_SOC_NAME\n\
                     CERTIFIED;CA;ENGINEER\n\
                     CERTIFIED;CA;ANALYST\n\
                     DENIED;NY;ENGINEER\n";
        let config = Config {
            top_k: 1,
            ..Config::default()
        };
        let reports = reports_from_reader(Cursor::new(input), &config)?;
        assert_eq!(reports.states.lines()[1], "CA;2;100.0%");
        // ANALYST and ENGINEER tie at 1; ANALYST sorts first
        assert_eq!(reports.occupations.lines()[1], "ANALYST;1;50.0%");
        assert_eq!(reports.occupations.lines().len(), 2);
        Ok(())
    }

    #[test]
    fn test_empty_input_fails_at_report_stage() {
        let err = reports_from_reader(
            Cursor::new("CASE_STATUS;WORKSITE_STATE;SOC_NAME\n"),
            &Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::ZeroTotal));
        assert_eq!(err.stage(), Stage::Report);
    }

    #[test]
    fn test_run_writes_both_reports() -> Result<()> {
        init_test_logging();
        let tmp = tempdir()?;
        let config = config_for(tmp.path());
        fs::create_dir_all(&config.input_dir)?;
        fs::write(config.input_dir.join("H1B_FY_2016.csv"), POST_2015)?;

        let summary = run(&config)?;
        assert_eq!(summary.rows_read, 7);
        assert_eq!(summary.total_approved, 5);
        assert_eq!(summary.distinct_regions, 4);
        assert_eq!(summary.distinct_occupations, 3);

        assert_eq!(
            fs::read_to_string(config.states_path())?,
            "TOP_STATES;NUMBER_CERTIFIED_APPLICATIONS;PERCENTAGE\n\
             TX;2;40.0%\n\
             CA;1;20.0%\n\
             NJ;1;20.0%\n\
             WA;1;20.0%\n"
        );
        assert_eq!(
            fs::read_to_string(config.occupations_path())?,
            "TOP_OCCUPATIONS;NUMBER_CERTIFIED_APPLICATIONS;PERCENTAGE\n\
             SOFTWARE DEVELOPERS, APPLICATIONS;3;60.0%\n\
             ACCOUNTANTS AND AUDITORS;1;20.0%\n\
             COMPUTER SYSTEMS ANALYSTS;1;20.0%\n"
        );
        Ok(())
    }

    #[test]
    fn test_rerun_is_byte_identical() -> Result<()> {
        let tmp = tempdir()?;
        let config = config_for(tmp.path());
        fs::create_dir_all(&config.input_dir)?;
        fs::write(config.input_dir.join("h1b.csv"), POST_2015)?;

        run(&config)?;
        let first = (
            fs::read(config.states_path())?,
            fs::read(config.occupations_path())?,
        );
        run(&config)?;
        let second = (
            fs::read(config.states_path())?,
            fs::read(config.occupations_path())?,
        );
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_top_k_limits_lines() -> Result<()> {
        let mut input = String::from("STATUS;LCA_CASE_WORKLOC1_STATE;LCA_CASE_SOC_NAME\n");
        for i in 0..15 {
            for _ in 0..=i {
                input.push_str(&format!("CERTIFIED;S{:02};OCC{:02}\n", i, i));
            }
        }
        let reports = reports_from_reader(Cursor::new(input), &Config::default())?;
        assert_eq!(reports.states.lines().len(), 11);
        assert_eq!(reports.states.lines()[1], "S14;15;12.5%");
        assert_eq!(reports.occupations.lines()[10], "OCC05;6;5.0%");
        Ok(())
    }

    #[test]
    fn test_missing_input_writes_nothing() {
        let tmp = tempdir().unwrap();
        let config = config_for(tmp.path());
        let err = run(&config).unwrap_err();
        assert_eq!(err.stage(), Stage::Discover);
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn test_schema_error_writes_nothing() -> Result<()> {
        let tmp = tempdir()?;
        let config = config_for(tmp.path());
        fs::create_dir_all(&config.input_dir)?;
        fs::write(
            config.input_dir.join("h1b.csv"),
            "CASE_STATUS;SOC_NAME\nCERTIFIED;ACTUARIES\n",
        )?;

        let err = run(&config).unwrap_err();
        assert_eq!(err.stage(), Stage::Aggregate);
        assert!(!config.states_path().exists());
        assert!(!config.occupations_path().exists());
        Ok(())
    }

    #[test]
    fn test_failed_occupations_write_leaves_no_states_report() -> Result<()> {
        let tmp = tempdir()?;
        let config = Config {
            occupations_file: "blocked/top_10_occupations.txt".into(),
            ..config_for(tmp.path())
        };
        fs::create_dir_all(&config.input_dir)?;
        fs::write(config.input_dir.join("h1b.csv"), POST_2015)?;
        fs::create_dir_all(&config.output_dir)?;
        // a plain file where the occupations report's directory should be
        fs::write(config.output_dir.join("blocked"), "")?;

        let err = run(&config).unwrap_err();
        assert_eq!(err.stage(), Stage::Write);
        assert!(!config.states_path().exists());
        assert_eq!(fs::read_dir(&config.output_dir)?.count(), 1);
        Ok(())
    }
}
