//! Wall-clock timing for pipeline executions.

use std::time::Duration;

/// Elapsed times for a pipeline that ran one or more times.
///
/// `setup` covers one-time work done before the first query run (relation
/// registration on the SQL side); it is zero for pipelines with no separate
/// setup step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineTimes {
    pub setup: Duration,
    pub runs: Vec<Duration>,
}

impl PipelineTimes {
    pub fn new(setup: Duration, runs: Vec<Duration>) -> Self {
        PipelineTimes { setup, runs }
    }

    pub fn run_avg(&self) -> Duration {
        if self.runs.is_empty() {
            return Duration::ZERO;
        }
        self.runs.iter().sum::<Duration>() / self.runs.len() as u32
    }

    pub fn run_min(&self) -> Duration {
        self.runs.iter().min().copied().unwrap_or(Duration::ZERO)
    }

    pub fn run_max(&self) -> Duration {
        self.runs.iter().max().copied().unwrap_or(Duration::ZERO)
    }
}
