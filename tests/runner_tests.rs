//! Integration tests for the pytest runner, using a stub `pytest` script so
//! no real Python environment is required.

use pytest_dash::config::Config;
use pytest_dash::error::{ErrorClass, RunnerError};
use pytest_dash::runner::detect;

#[tokio::test]
async fn nonexistent_project_path_is_environment_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone");

    let runner = detect(missing, &Config::default()).unwrap();
    let err = runner.run(None).await.unwrap_err();

    assert!(matches!(err, RunnerError::ProjectPathMissing(_)));
    assert_eq!(err.class(), ErrorClass::Environment);
}

#[tokio::test]
async fn missing_pytest_binary_is_environment_error() {
    let project = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.runner.command = "definitely-not-a-pytest-binary".to_string();

    let runner = detect(project.path().to_path_buf(), &config).unwrap();
    let err = runner.run(None).await.unwrap_err();

    assert!(matches!(err, RunnerError::PytestNotFound { .. }));
    assert_eq!(err.class(), ErrorClass::Environment);
}

#[tokio::test]
async fn discovers_test_files_skipping_ignored_dirs() {
    let project = tempfile::tempdir().unwrap();
    let root = project.path();
    std::fs::write(root.join("test_alpha.py"), "def test_a(): pass\n").unwrap();
    std::fs::create_dir(root.join("sub")).unwrap();
    std::fs::write(root.join("sub/beta_test.py"), "def test_b(): pass\n").unwrap();
    std::fs::write(root.join("helpers.py"), "").unwrap();
    std::fs::create_dir_all(root.join(".venv/lib")).unwrap();
    std::fs::write(root.join(".venv/lib/test_vendored.py"), "").unwrap();
    std::fs::create_dir(root.join("slow")).unwrap();
    std::fs::write(root.join("slow/test_slow.py"), "").unwrap();

    let mut config = Config::default();
    config.discovery.ignore = vec!["slow/**".to_string()];

    let runner = detect(root.to_path_buf(), &config).unwrap();
    let files = runner.discover().await.unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|f| f.path.strip_prefix(root).unwrap().to_string_lossy().to_string())
        .collect();

    assert_eq!(names, vec!["sub/beta_test.py", "test_alpha.py"]);
}

#[cfg(unix)]
mod with_stub_pytest {
    use super::*;
    use pytest_dash::models::Outcome;
    use std::path::{Path, PathBuf};

    /// Write an executable shell script standing in for pytest.
    fn write_stub(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("fake-pytest");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    /// Shell fragment that extracts the report path from the CLI arguments.
    const FIND_REPORT: &str = r#"out=""
for arg in "$@"; do
  case "$arg" in
    --json-report-file=*) out="${arg#--json-report-file=}" ;;
  esac
done"#;

    fn stub_config(project: &Path, report_json: Option<&serde_json::Value>, exit_code: i32) -> Config {
        let mut script = String::from(FIND_REPORT);
        if let Some(report) = report_json {
            let canned = project.join("canned-report.json");
            std::fs::write(&canned, serde_json::to_string(report).unwrap()).unwrap();
            script.push_str(&format!("\ncp \"{}\" \"$out\"", canned.display()));
        }
        script.push_str(&format!("\necho \"collected items\"\nexit {exit_code}"));

        let stub = write_stub(project, &script);
        let mut config = Config::default();
        config.runner.command = stub.to_string_lossy().to_string();
        config
    }

    #[tokio::test]
    async fn run_captures_output_and_parses_report() {
        let project = tempfile::tempdir().unwrap();
        let report = serde_json::json!({
            "tests": [
                { "nodeid": "test_m.py::test_ok", "outcome": "passed", "duration": 0.01 },
                {
                    "nodeid": "test_m.py::test_bad",
                    "outcome": "failed",
                    "duration": 0.02,
                    "call": { "longrepr": "assert False" }
                },
            ]
        });
        let config = stub_config(project.path(), Some(&report), 1);

        let runner = detect(project.path().to_path_buf(), &config).unwrap();
        let run = runner.run(None).await.unwrap();

        assert_eq!(run.exit_code, 1);
        assert!(run.stdout.contains("collected items"));
        assert!(run.report.is_some());
        assert_eq!(run.report_error, None);
        assert_eq!(run.results.len(), 2);
        assert_eq!(run.results[0].outcome, Outcome::Passed);
        assert_eq!(run.results[1].outcome, Outcome::Failed);
        assert_eq!(run.results[1].message.as_deref(), Some("assert False"));
        assert_eq!(run.summary().failed, 1);
    }

    #[tokio::test]
    async fn missing_report_is_surfaced_not_fatal() {
        let project = tempfile::tempdir().unwrap();
        let config = stub_config(project.path(), None, 0);

        let runner = detect(project.path().to_path_buf(), &config).unwrap();
        let run = runner.run(None).await.unwrap();

        assert_eq!(run.exit_code, 0);
        assert!(run.report.is_none());
        assert!(run.results.is_empty());
        let message = run.report_error.expect("report error should be surfaced");
        assert!(message.contains("pytest-json-report"));
    }

    #[tokio::test]
    async fn zero_collected_tests_is_not_an_error() {
        let project = tempfile::tempdir().unwrap();
        let report = serde_json::json!({ "tests": [] });
        let config = stub_config(project.path(), Some(&report), 5);

        let runner = detect(project.path().to_path_buf(), &config).unwrap();
        let run = runner.run(None).await.unwrap();

        assert_eq!(run.exit_code, 5);
        assert!(run.results.is_empty());
        assert_eq!(run.report_error, None);
        assert_eq!(
            pytest_dash::runner::pytest::describe_exit_code(run.exit_code),
            "no tests collected"
        );
    }

    #[tokio::test]
    async fn keyword_and_extra_args_are_forwarded() {
        let project = tempfile::tempdir().unwrap();
        let argv_file = project.path().join("argv.txt");
        let script = format!("printf '%s\\n' \"$@\" > \"{}\"\nexit 0", argv_file.display());
        let stub = write_stub(project.path(), &script);

        let mut config = Config::default();
        config.runner.command = stub.to_string_lossy().to_string();
        config.runner.args = Some("--maxfail=20".to_string());

        let runner = detect(project.path().to_path_buf(), &config).unwrap();
        runner.run(Some("smoke and not slow")).await.unwrap();

        let argv = std::fs::read_to_string(&argv_file).unwrap();
        let args: Vec<&str> = argv.lines().collect();
        assert!(args.contains(&"--json-report"));
        assert!(args.contains(&"-k"));
        assert!(args.contains(&"smoke and not slow"));
        assert!(args.contains(&"--maxfail=20"));
        // The project path is the final positional argument.
        assert_eq!(args.last().copied(), project.path().to_str());
    }

    #[tokio::test]
    async fn rerun_with_same_inputs_is_identical() {
        let project = tempfile::tempdir().unwrap();
        let report = serde_json::json!({
            "tests": [
                { "nodeid": "test_m.py::test_ok", "outcome": "passed", "duration": 0.01 },
            ]
        });
        let config = stub_config(project.path(), Some(&report), 0);

        let runner = detect(project.path().to_path_buf(), &config).unwrap();
        let first = runner.run(Some("ok")).await.unwrap();
        let second = runner.run(Some("ok")).await.unwrap();

        assert_eq!(first.results, second.results);
        assert_eq!(first.exit_code, second.exit_code);
    }
}
