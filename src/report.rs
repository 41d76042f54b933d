//! Translation of the pytest JSON report into [`TestResult`] records.
//!
//! The report is the document written by the `pytest-json-report` plugin: a
//! top-level object whose `tests` array holds one entry per executed test.
//! Parsing is a pure, single-pass mapping over that array; order is
//! preserved, unknown fields are ignored, and missing optional fields fall
//! back to defaults instead of failing the whole parse.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ReportError;
use crate::models::{Outcome, TestResult};

/// Parse a deserialized report document into an ordered list of results.
///
/// A document without a `tests` array is an explicit error so callers can
/// distinguish "no tests ran" (empty array) from "report is unreadable".
pub fn parse_report(report: &Value) -> Result<Vec<TestResult>, ReportError> {
    let tests = report.get("tests").ok_or(ReportError::MissingTests)?;
    let entries =
        Vec::<ReportTest>::deserialize(tests).map_err(ReportError::MalformedTests)?;
    Ok(entries.into_iter().map(ReportTest::into_result).collect())
}

/// One entry of the report's `tests` array. Everything except the nodeid is
/// optional in practice; the plugin's output varies with pytest options.
#[derive(Debug, Deserialize)]
struct ReportTest {
    nodeid: String,
    #[serde(default)]
    outcome: String,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    setup: Option<Phase>,
    #[serde(default)]
    call: Option<Phase>,
    #[serde(default)]
    teardown: Option<Phase>,
}

/// A setup/call/teardown section of a test entry.
#[derive(Debug, Default, Deserialize)]
struct Phase {
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    longrepr: Option<String>,
}

impl ReportTest {
    fn into_result(self) -> TestResult {
        let outcome = Outcome::from_report(&self.outcome);

        // pytest puts the test's own name first in `keywords`; fall back to
        // the last nodeid segment when the list is absent.
        let name = self
            .keywords
            .first()
            .cloned()
            .unwrap_or_else(|| last_nodeid_segment(&self.nodeid));

        let file = self
            .file
            .clone()
            .unwrap_or_else(|| nodeid_file(&self.nodeid));

        // Failures usually carry their longrepr on the call phase; collection
        // and fixture errors land on setup or teardown instead.
        let message = if outcome.is_failure() {
            [&self.call, &self.setup, &self.teardown]
                .into_iter()
                .flatten()
                .find_map(|phase| phase.longrepr.clone())
                .filter(|text| !text.is_empty())
        } else {
            None
        };

        let duration = self
            .duration
            .unwrap_or_else(|| {
                [&self.setup, &self.call, &self.teardown]
                    .into_iter()
                    .flatten()
                    .filter_map(|phase| phase.duration)
                    .sum()
            })
            .max(0.0);

        TestResult {
            nodeid: self.nodeid,
            name,
            outcome,
            duration,
            message,
            file,
        }
    }
}

/// The path part of a nodeid (`tests/test_x.py::TestFoo::test_bar`).
fn nodeid_file(nodeid: &str) -> String {
    nodeid.split("::").next().unwrap_or(nodeid).to_string()
}

fn last_nodeid_segment(nodeid: &str) -> String {
    nodeid.rsplit("::").next().unwrap_or(nodeid).to_string()
}
