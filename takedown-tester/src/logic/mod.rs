pub mod brackets;
pub mod calibration;
pub mod replay;
pub mod reports;
pub mod seeds;

pub use brackets::run_bracket_sweep;
pub use calibration::run_calibration;
pub use replay::run_replay_checks;
pub use seeds::resolve_seed_inputs;

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Which suite produced a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Calibration,
    Bracket,
    Replay,
}

impl CheckKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Calibration => "calibration",
            Self::Bracket => "bracket",
            Self::Replay => "replay",
        }
    }
}

/// Outcome of one check for one seed.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub kind: CheckKind,
    pub seed: String,
    pub passed: bool,
    pub trials: usize,
    pub failures: Vec<String>,
    /// Named measurements, ordered by name so reports are stable.
    pub metrics: BTreeMap<String, f64>,
    pub elapsed_ms: f64,
}

impl CheckResult {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: CheckKind, seed: &str, trials: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            seed: seed.to_string(),
            passed: true,
            trials,
            failures: Vec::new(),
            metrics: BTreeMap::new(),
            elapsed_ms: 0.0,
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.passed = false;
        self.failures.push(message.into());
    }

    pub fn record(&mut self, metric: &str, value: f64) {
        self.metrics.insert(metric.to_string(), value);
    }

    #[must_use]
    pub fn finish(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = elapsed.as_secs_f64() * 1_000.0;
        self
    }
}
