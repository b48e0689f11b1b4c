// src/dag/job.rs

//! Job declarations and per-run job state.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::vars::VarValue;

/// Declaration of one named unit of provisioning work.
///
/// Built fluently:
///
/// ```ignore
/// JobSpec::new("eks_cluster")
///     .timeout_secs(3600)
///     .wait_interval_secs(120)
///     .retries(1)
///     .automation_phase("infrastructure")
///     .human_description("Create EKS cluster")
/// ```
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub name: String,
    /// Max wall-clock time for a single attempt.
    pub timeout: Duration,
    /// Pause between a failed attempt and the next one.
    pub wait_interval: Duration,
    /// Max re-attempts after the first failure.
    pub retries: u32,
    pub automation_phase: String,
    pub human_description: String,
    /// Variable tag whose resolved values become this job's inputs.
    pub values_tag: Option<String>,
    /// Resolved variable values scoped to this job, filled at build time.
    pub default_values: BTreeMap<String, VarValue>,
}

impl JobSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            timeout: Duration::from_secs(1800),
            wait_interval: Duration::from_secs(60),
            retries: 0,
            automation_phase: String::new(),
            human_description: String::new(),
            values_tag: None,
            default_values: BTreeMap::new(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout_secs(self, secs: u64) -> Self {
        self.timeout(Duration::from_secs(secs))
    }

    pub fn wait_interval(mut self, interval: Duration) -> Self {
        self.wait_interval = interval;
        self
    }

    pub fn wait_interval_secs(self, secs: u64) -> Self {
        self.wait_interval(Duration::from_secs(secs))
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn automation_phase(mut self, phase: &str) -> Self {
        self.automation_phase = phase.to_string();
        self
    }

    pub fn human_description(mut self, description: &str) -> Self {
        self.human_description = description.to_string();
        self
    }

    pub fn values_tag(mut self, tag: &str) -> Self {
        self.values_tag = Some(tag.to_string());
        self
    }
}

/// Per-run state of a job.
///
/// `Pending -> Ready -> Running -> {Succeeded, Failed, Retrying}`; terminal
/// states are `Succeeded`, `Failed` and `Cancelled`. A job whose
/// predecessor failed stays `Pending` for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Declared; dependencies not yet satisfied.
    Pending,
    /// Dependencies satisfied; eligible for dispatch.
    Ready,
    /// Dispatched to the execution collaborator.
    Running,
    /// Failed with retry budget remaining; waiting out the interval.
    Retrying,
    Succeeded,
    Failed,
    /// Run was cancelled before this job could finish.
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Cancelled
        )
    }
}
