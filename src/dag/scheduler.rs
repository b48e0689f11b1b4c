// src/dag/scheduler.rs

use tracing::{debug, warn};

use crate::dag::graph::JobGraph;
use crate::dag::job::JobState;
use crate::types::FanInPolicy;

/// Pure per-run state machine over an immutable [`JobGraph`].
///
/// It is responsible for:
/// - deciding when a job is ready (dependencies satisfied per the fan-in
///   policy)
/// - recording success/failure and computing what that unblocks or blocks
/// - deciding when no more jobs can become ready (run exhausted)
///
/// It performs no IO and knows nothing about time, retries or handlers;
/// the executor drives it and owns those concerns.
#[derive(Debug)]
pub struct Scheduler<'g> {
    graph: &'g JobGraph,
    fan_in: FanInPolicy,
    states: Vec<JobState>,
    /// Pending jobs that can never become ready in this run. They stay
    /// `Pending` in the public view; this flag only exists so completion
    /// is decidable.
    blocked: Vec<bool>,
}

impl<'g> Scheduler<'g> {
    pub fn new(graph: &'g JobGraph, fan_in: FanInPolicy) -> Self {
        let mut scheduler = Self {
            graph,
            fan_in,
            states: vec![JobState::Pending; graph.len()],
            blocked: vec![false; graph.len()],
        };
        scheduler.refresh();
        scheduler
    }

    /// Lowest-declaration-index job currently ready for dispatch.
    pub fn next_ready(&self) -> Option<usize> {
        self.states.iter().position(|&s| s == JobState::Ready)
    }

    /// All currently-ready jobs, in declaration order.
    pub fn ready_jobs(&self) -> Vec<usize> {
        (0..self.states.len())
            .filter(|&i| self.states[i] == JobState::Ready)
            .collect()
    }

    pub fn state_of(&self, idx: usize) -> JobState {
        self.states[idx]
    }

    pub fn mark_running(&mut self, idx: usize) {
        match self.states[idx] {
            JobState::Ready | JobState::Retrying => {
                debug!(job = %self.graph.job(idx).name, "job running");
                self.states[idx] = JobState::Running;
            }
            state => {
                warn!(
                    job = %self.graph.job(idx).name,
                    ?state,
                    "mark_running on a job that is not dispatchable; ignoring"
                );
            }
        }
    }

    pub fn mark_retrying(&mut self, idx: usize) {
        debug!(job = %self.graph.job(idx).name, "job waiting to retry");
        self.states[idx] = JobState::Retrying;
    }

    /// Record a terminal success and return the jobs that became ready.
    pub fn record_success(&mut self, idx: usize) -> Vec<usize> {
        debug!(job = %self.graph.job(idx).name, "job succeeded");
        self.states[idx] = JobState::Succeeded;
        self.refresh()
    }

    /// Record a terminal failure.
    ///
    /// Dependents that can no longer run stay `Pending`; they are tracked
    /// as blocked so the run can finish. Unrelated branches are untouched.
    pub fn record_failure(&mut self, idx: usize) {
        warn!(job = %self.graph.job(idx).name, "job failed; blocking dependents");
        self.states[idx] = JobState::Failed;
        self.refresh();
    }

    /// Transition every not-yet-dispatched job to `Cancelled`.
    ///
    /// Returns the jobs that were cancelled. A `Running` job is left alone;
    /// the executor records whatever outcome its attempt reports.
    pub fn cancel_remaining(&mut self) -> Vec<usize> {
        let mut cancelled = Vec::new();

        for idx in 0..self.states.len() {
            match self.states[idx] {
                JobState::Pending | JobState::Ready | JobState::Retrying => {
                    self.states[idx] = JobState::Cancelled;
                    cancelled.push(idx);
                }
                _ => {}
            }
        }

        debug!(count = cancelled.len(), "cancelled remaining jobs");
        cancelled
    }

    /// Whether no more jobs can make progress: nothing is ready, running or
    /// retrying, and every remaining `Pending` job is blocked.
    pub fn is_complete(&self) -> bool {
        self.states.iter().enumerate().all(|(idx, &state)| match state {
            JobState::Ready | JobState::Running | JobState::Retrying => false,
            JobState::Pending => self.blocked[idx],
            _ => true,
        })
    }

    /// Sweep pending jobs, promoting satisfied ones to `Ready` and flagging
    /// permanently unsatisfiable ones as blocked. Blocking is transitive
    /// (a blocked predecessor can block its dependents), so the sweep
    /// repeats until a fixpoint.
    fn refresh(&mut self) -> Vec<usize> {
        let mut newly_ready = Vec::new();

        loop {
            let mut changed = false;

            for idx in 0..self.states.len() {
                if self.states[idx] != JobState::Pending || self.blocked[idx] {
                    continue;
                }

                if self.deps_satisfied(idx) {
                    debug!(
                        job = %self.graph.job(idx).name,
                        "dependencies satisfied; marking ready"
                    );
                    self.states[idx] = JobState::Ready;
                    newly_ready.push(idx);
                    changed = true;
                } else if self.deps_unsatisfiable(idx) {
                    debug!(
                        job = %self.graph.job(idx).name,
                        "upstream failure; job will stay pending"
                    );
                    self.blocked[idx] = true;
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        newly_ready.sort_unstable();
        newly_ready
    }

    fn deps_satisfied(&self, idx: usize) -> bool {
        let deps = self.graph.dependencies_of(idx);
        if deps.is_empty() {
            return true;
        }

        match self.fan_in {
            FanInPolicy::All => deps
                .iter()
                .all(|&d| self.states[d] == JobState::Succeeded),
            FanInPolicy::Any => deps
                .iter()
                .any(|&d| self.states[d] == JobState::Succeeded),
        }
    }

    /// Whether the job's dependencies can never be satisfied in this run.
    fn deps_unsatisfiable(&self, idx: usize) -> bool {
        let deps = self.graph.dependencies_of(idx);
        if deps.is_empty() {
            return false;
        }

        let dead = |d: usize| {
            matches!(
                self.states[d],
                JobState::Failed | JobState::Cancelled
            ) || (self.states[d] == JobState::Pending && self.blocked[d])
        };

        match self.fan_in {
            FanInPolicy::All => deps.iter().any(|&d| dead(d)),
            FanInPolicy::Any => deps.iter().all(|&d| dead(d)),
        }
    }
}
