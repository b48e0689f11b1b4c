// src/exec/report.rs

//! Aggregate run results.

use std::fmt;
use std::time::Duration;

use crate::dag::JobState;

/// Aggregate status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every job succeeded.
    Succeeded,
    /// At least one job failed or was blocked by a failure.
    Failed,
    /// Cancellation was requested before the run could complete.
    Cancelled,
}

/// Why a job's last attempt did not succeed.
///
/// `Collaborator` is kept apart from `Job`/`Timeout`: it signals an
/// environment problem (runtime unreachable), not a provisioning failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobFailure {
    Job(String),
    Timeout,
    Collaborator(String),
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobFailure::Job(reason) => write!(f, "job failed: {reason}"),
            JobFailure::Timeout => write!(f, "attempt timed out"),
            JobFailure::Collaborator(reason) => {
                write!(f, "execution collaborator error: {reason}")
            }
        }
    }
}

/// Terminal record for one job.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub name: String,
    pub state: JobState,
    /// Attempts actually made; zero for jobs that were never dispatched.
    pub attempts: u32,
    /// Total time spent in attempts.
    pub elapsed: Duration,
    /// Detail of the last non-success, if any.
    pub failure: Option<JobFailure>,
}

/// Result of one run: every job's terminal record, not just the first
/// failure, so an operator can see the full blast radius.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub status: RunStatus,
    /// One report per job, in declaration order.
    pub reports: Vec<JobReport>,
}

impl RunResult {
    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Succeeded
    }

    pub fn report(&self, job: &str) -> Option<&JobReport> {
        self.reports.iter().find(|r| r.name == job)
    }
}
