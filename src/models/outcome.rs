use serde::{Deserialize, Serialize};

/// Classification of a single test execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
    #[default]
    Error,
}

impl Outcome {
    /// Map pytest's report vocabulary onto the four dashboard outcomes.
    ///
    /// Expected-failure markers collapse into their effective result
    /// (`xfailed` behaves like a skip, `xpassed` like a pass). Anything
    /// unrecognized is treated as an error so it stays visible.
    pub fn from_report(raw: &str) -> Self {
        match raw {
            "passed" | "xpassed" => Outcome::Passed,
            "failed" => Outcome::Failed,
            "skipped" | "xfailed" => Outcome::Skipped,
            _ => Outcome::Error,
        }
    }

    /// CSS class used by the dashboard page to colour this outcome. Must
    /// stay in lockstep with the serialized (lowercase) variant names.
    pub fn css_class(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Skipped => "skipped",
            Outcome::Error => "error",
        }
    }

    /// Sort weight: failures first, skips last.
    pub fn priority(&self) -> u8 {
        match self {
            Outcome::Error => 3,
            Outcome::Failed => 2,
            Outcome::Passed => 1,
            Outcome::Skipped => 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed | Outcome::Error)
    }
}
