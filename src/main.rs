use anyhow::Result;
use h1bstats::{pipeline, Config};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // stage-labelled pipeline failures are already logged
            if err.downcast_ref::<h1bstats::PipelineError>().is_none() {
                error!("startup failed: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::load()?;

    // ─── 3) discover → aggregate → rank → report → write ─────────────
    if let Err(err) = pipeline::run(&config) {
        error!(stage = %err.stage(), error = %err, "pipeline failed");
        return Err(err.into());
    }

    info!("all done");
    Ok(())
}
