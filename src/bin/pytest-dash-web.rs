use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;

use pytest_dash::config::Config;
use pytest_dash::server;

#[derive(Parser)]
#[command(
    name = "pytest-dash-web",
    about = "Dashboard server for pytest-dash (spawned by the launcher)",
    version
)]
struct Cli {
    /// Port to serve the dashboard on (1-65535).
    #[arg(long, default_value_t = 8585, value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Path to the folder containing test files.
    #[arg(long)]
    path: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if !cli.path.is_dir() {
        bail!(
            "project path does not exist or is not a directory: {}",
            cli.path.display()
        );
    }

    let config = Config::load(&cli.path);
    server::serve(cli.port, cli.path, config).await
}
