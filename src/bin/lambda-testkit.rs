use clap::Parser;
use lambda_testkit::{execute, Cli, RunnerConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Runner diagnostics only; each case's own logs are captured separately.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = RunnerConfig::load()?;

    let stdout = std::io::stdout();
    let passed = execute(cli, config, &mut stdout.lock())?;
    if !passed {
        error!("Some test cases failed");
        std::process::exit(1);
    }
    Ok(())
}
