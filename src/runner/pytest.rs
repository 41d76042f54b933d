use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::RunnerError;
use crate::models::RunResult;
use crate::report;

use super::{DiscoveredFile, TestRunner};

/// Guard that kills the child process (and its entire process group) on drop.
struct ChildGuard {
    child: Option<tokio::process::Child>,
    /// Process group ID saved at spawn time so we can kill the whole group.
    #[cfg(unix)]
    pgid: Option<u32>,
}

impl ChildGuard {
    fn new(child: tokio::process::Child) -> Self {
        #[cfg(unix)]
        let pgid = child.id();
        Self {
            child: Some(child),
            #[cfg(unix)]
            pgid,
        }
    }

    async fn wait(&mut self) -> io::Result<std::process::ExitStatus> {
        match self.child.as_mut() {
            Some(child) => child.wait().await,
            None => Err(io::Error::other("child already reaped")),
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        // Kill the entire process group so pytest-xdist workers don't become orphans.
        #[cfg(unix)]
        if let Some(pgid) = self.pgid {
            unsafe { libc::kill(-(pgid as libc::pid_t), libc::SIGKILL) };
        }
        // Fallback / non-Unix: kill just the direct child.
        if let Some(ref mut child) = self.child {
            let _ = child.start_kill();
        }
    }
}

/// Where the JSON report file lives.
///
/// The temporary variant owns its directory, so every runner gets a
/// collision-free path and the file disappears with the runner.
enum ReportLocation {
    Temp(tempfile::TempDir),
    Fixed(PathBuf),
}

impl ReportLocation {
    fn file(&self) -> PathBuf {
        let dir = match self {
            ReportLocation::Temp(dir) => dir.path(),
            ReportLocation::Fixed(path) => path.as_path(),
        };
        dir.join("report.json")
    }
}

/// Adapter that shells out to pytest with the `pytest-json-report` plugin
/// and loads the report it writes.
pub struct PytestRunner {
    project: PathBuf,
    command: String,
    extra_args: Vec<String>,
    debug: bool,
    ignore: Vec<glob::Pattern>,
    report: ReportLocation,
}

impl PytestRunner {
    pub fn new(project: PathBuf, config: &Config) -> Result<Self> {
        let extra_args = match config.runner.args.as_deref() {
            Some(raw) => shell_words::split(raw)
                .context("invalid `runner.args` in pytest-dash.toml")?,
            None => Vec::new(),
        };

        let ignore = config
            .discovery
            .ignore
            .iter()
            .filter_map(|raw| match glob::Pattern::new(raw) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!(pattern = %raw, error = %e, "skipping invalid ignore pattern");
                    None
                }
            })
            .collect();

        let report = match &config.runner.report_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).with_context(|| {
                    format!("failed to create report directory {}", dir.display())
                })?;
                ReportLocation::Fixed(dir.clone())
            }
            None => ReportLocation::Temp(
                tempfile::Builder::new()
                    .prefix("pytest-dash-")
                    .tempdir()
                    .context("failed to create temp report directory")?,
            ),
        };

        Ok(Self {
            project,
            command: config.runner.command.clone(),
            extra_args,
            debug: config.runner.debug,
            ignore,
            report,
        })
    }

    /// Arguments for one invocation, report flag and keyword filter included.
    fn command_line(&self, keyword: Option<&str>) -> Vec<String> {
        let mut args = vec![
            "-vv".to_string(),
            "-q".to_string(),
            "--json-report".to_string(),
            format!("--json-report-file={}", self.report.file().display()),
        ];
        if let Some(keyword) = keyword {
            args.push("-k".to_string());
            args.push(keyword.to_string());
        }
        if self.debug {
            args.extend(
                ["-s", "--maxfail=1", "--disable-warnings"]
                    .into_iter()
                    .map(String::from),
            );
        }
        args.extend(self.extra_args.iter().cloned());
        args.push(self.project.to_string_lossy().to_string());
        args
    }

    /// Read the report file back and attach it (or the reason it is
    /// unusable) to the run.
    fn load_report(&self, path: &Path, run: &mut RunResult) {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "no report file after run");
                run.report_error = Some(format!(
                    "no JSON report was produced at {} ({e}); is pytest-json-report installed?",
                    path.display(),
                ));
                return;
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "report file is not valid JSON");
                run.report_error =
                    Some(format!("report at {} is not valid JSON: {e}", path.display()));
                return;
            }
        };

        match report::parse_report(&value) {
            Ok(results) => {
                run.results = results;
                run.report = Some(value);
            }
            Err(e) => {
                warn!(error = %e, "failed to parse JSON report");
                run.report = Some(value);
                run.report_error = Some(e.to_string());
            }
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        const SKIP_DIRS: [&str; 5] = [".venv", "__pycache__", ".git", ".tox", "site-packages"];
        let lossy = path.to_string_lossy();
        if SKIP_DIRS.iter().any(|dir| lossy.contains(dir)) {
            return true;
        }
        let relative = path.strip_prefix(&self.project).unwrap_or(path);
        self.ignore.iter().any(|p| p.matches_path(relative))
    }
}

#[async_trait]
impl TestRunner for PytestRunner {
    async fn discover(&self) -> Result<Vec<DiscoveredFile>> {
        let suffixes = ["test_*.py", "*_test.py"];

        let mut files = Vec::new();
        for suffix in &suffixes {
            let pattern = self
                .project
                .join("**")
                .join(suffix)
                .to_string_lossy()
                .to_string();
            for entry in glob::glob(&pattern)?.flatten() {
                if !self.is_ignored(&entry)
                    && !files.iter().any(|f: &DiscoveredFile| f.path == entry)
                {
                    files.push(DiscoveredFile { path: entry });
                }
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    async fn run(&self, keyword: Option<&str>) -> Result<RunResult, RunnerError> {
        if !self.project.exists() {
            return Err(RunnerError::ProjectPathMissing(self.project.clone()));
        }

        // A stale report from an earlier run must not be mistaken for this one's.
        let report_file = self.report.file();
        let _ = std::fs::remove_file(&report_file);

        let mut cmd = Command::new(&self.command);
        cmd.args(self.command_line(keyword))
            .current_dir(&self.project)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Put the child in its own process group so killing it (via ChildGuard)
        // also takes out any worker processes pytest forks.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.as_std_mut().process_group(0);
        }

        info!(
            command = %self.command,
            keyword = keyword.unwrap_or(""),
            project = %self.project.display(),
            "running pytest"
        );

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                RunnerError::PytestNotFound {
                    command: self.command.clone(),
                    source: e,
                }
            } else {
                RunnerError::Io(e)
            }
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("missing stdout pipe"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("missing stderr pipe"))?;

        // The child stays in the guard at all times so it is always killed if
        // this future is dropped mid-run.
        let mut child_guard = ChildGuard::new(child);

        // Read stderr in background while stdout drains.
        let stderr_handle = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut buf = String::new();
            while let Ok(Some(line)) = lines.next_line().await {
                buf.push_str(&line);
                buf.push('\n');
            }
            buf
        });

        let mut stdout_buf = String::new();
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            stdout_buf.push_str(&line);
            stdout_buf.push('\n');
        }

        let stderr_buf = stderr_handle.await.unwrap_or_default();
        let status = child_guard.wait().await?;
        let exit_code = status.code().unwrap_or(-1);

        info!(exit_code, meaning = describe_exit_code(exit_code), "pytest finished");

        let mut run = RunResult {
            stdout: stdout_buf,
            stderr: stderr_buf,
            exit_code,
            ..Default::default()
        };
        self.load_report(&report_file, &mut run);
        Ok(run)
    }

    fn name(&self) -> &str {
        "pytest"
    }
}

/// Human reading of pytest's exit codes.
pub fn describe_exit_code(code: i32) -> &'static str {
    match code {
        0 => "all tests passed",
        1 => "some tests failed",
        2 => "execution interrupted",
        3 => "internal pytest error",
        4 => "pytest usage error",
        5 => "no tests collected",
        _ => "unknown exit code",
    }
}
