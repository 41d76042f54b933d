use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result, bail};
use clap::Parser;

const WEB_BINARY: &str = "pytest-dash-web";

#[derive(Parser)]
#[command(
    name = "pytest-dash",
    about = "Local browser dashboard for pytest results",
    version
)]
struct Cli {
    /// Port to serve the dashboard on (1-65535).
    #[arg(long, default_value_t = 8585, value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Path to the folder containing test files.
    #[arg(long, default_value = ".")]
    path: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.path.is_dir() {
        bail!(
            "project path does not exist or is not a directory: {}",
            cli.path.display()
        );
    }
    let project = cli
        .path
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", cli.path.display()))?;
    let whereis = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    println!("pytest-dash v{}", env!("CARGO_PKG_VERSION"));
    println!("  launched from : {}", whereis.display());
    println!("  test project  : {}", project.display());
    println!("  dashboard     : http://localhost:{}", cli.port);

    let web = locate_web_binary().unwrap_or_else(|| PathBuf::from(WEB_BINARY));
    let status = Command::new(&web)
        .arg("--port")
        .arg(cli.port.to_string())
        .arg("--path")
        .arg(&project)
        .status();

    let status = match status {
        Ok(status) => status,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            bail!(
                "the `{WEB_BINARY}` executable could not be located; \
                 reinstall pytest-dash or add it to PATH"
            );
        }
        Err(e) => return Err(e).context("failed to launch the dashboard server"),
    };

    if !status.success() {
        bail!(
            "dashboard server exited with code {}",
            status.code().unwrap_or(-1)
        );
    }
    Ok(())
}

/// Prefer the server binary installed next to this executable; fall back to
/// whatever `$PATH` resolves.
fn locate_web_binary() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let sibling = exe
        .parent()?
        .join(format!("{WEB_BINARY}{}", std::env::consts::EXE_SUFFIX));
    sibling.is_file().then_some(sibling)
}
