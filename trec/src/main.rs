use anyhow::Result;
use clap::Parser;
use surf_trec::{run, Args, RunConfig};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();
    let summary = run(RunConfig::from(args))?;
    tracing::debug!(?summary, "run complete");
    Ok(())
}
