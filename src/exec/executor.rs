// src/exec/executor.rs

//! Sequential dispatch loop over a built job graph.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::dag::{JobGraph, JobSpec, JobState, Scheduler};
use crate::errors::ExecError;
use crate::exec::cancel::CancelHandle;
use crate::exec::handler::{HandlerMap, JobContext, JobHandler, JobOutcome};
use crate::exec::report::{JobFailure, JobReport, RunResult, RunStatus};
use crate::types::FanInPolicy;

/// Executes a [`JobGraph`] against its resolved handlers.
///
/// Dispatch is sequential, single-track: among ready jobs, the lowest
/// declaration index goes first, and the next job is only considered once
/// the current one reached a terminal state. Provisioning jobs mutate
/// shared cloud state, so attempts never overlap.
pub struct Executor {
    graph: JobGraph,
    /// Handler per job, by declaration index, resolved at construction.
    handlers: Vec<Arc<dyn JobHandler>>,
    fan_in: FanInPolicy,
    cancel: CancelHandle,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("jobs", &self.graph.len())
            .field("fan_in", &self.fan_in)
            .finish_non_exhaustive()
    }
}

impl Executor {
    /// Bind a graph to its handlers with the default AND-fan-in policy.
    pub fn new(graph: JobGraph, handlers: &HandlerMap) -> Result<Self, ExecError> {
        Self::with_fan_in(graph, handlers, FanInPolicy::default())
    }

    /// Bind a graph to its handlers.
    ///
    /// Every job must resolve to a handler here, before anything is
    /// dispatched; a gap in the handler map is a wiring error, not a
    /// runtime one.
    pub fn with_fan_in(
        graph: JobGraph,
        handlers: &HandlerMap,
        fan_in: FanInPolicy,
    ) -> Result<Self, ExecError> {
        let resolved: Vec<Arc<dyn JobHandler>> = graph
            .jobs()
            .iter()
            .map(|job| {
                handlers
                    .lookup(&job.name)
                    .ok_or_else(|| ExecError::MissingHandler(job.name.clone()))
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            graph,
            handlers: resolved,
            fan_in,
            cancel: CancelHandle::new(),
        })
    }

    /// Handle for cancelling this run from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Drive the run to completion and report every job's terminal state.
    pub async fn run(self) -> RunResult {
        let n = self.graph.len();
        let mut scheduler = Scheduler::new(&self.graph, self.fan_in);
        let mut attempts = vec![0u32; n];
        let mut elapsed = vec![Duration::ZERO; n];
        let mut failures: Vec<Option<JobFailure>> = vec![None; n];

        info!(jobs = n, "run started");

        'dispatch: loop {
            if self.cancel.is_cancelled() {
                scheduler.cancel_remaining();
                break;
            }

            let Some(idx) = scheduler.next_ready() else {
                break;
            };
            let spec = self.graph.job(idx).clone();

            loop {
                scheduler.mark_running(idx);
                attempts[idx] += 1;

                info!(
                    job = %spec.name,
                    attempt = attempts[idx],
                    phase = %spec.automation_phase,
                    "dispatching job"
                );

                let started = Instant::now();
                let outcome = self.attempt(idx, &spec, attempts[idx]).await;
                elapsed[idx] += started.elapsed();

                let failure = match outcome {
                    Ok(JobOutcome::Succeeded) => {
                        info!(job = %spec.name, attempt = attempts[idx], "job succeeded");
                        failures[idx] = None;
                        scheduler.record_success(idx);
                        break;
                    }
                    Ok(JobOutcome::Failed(reason)) => JobFailure::Job(reason),
                    Ok(JobOutcome::TimedOut) => JobFailure::Timeout,
                    Err(err) => JobFailure::Collaborator(err.to_string()),
                };

                warn!(
                    job = %spec.name,
                    attempt = attempts[idx],
                    %failure,
                    "job attempt did not succeed"
                );
                failures[idx] = Some(failure);

                if attempts[idx] <= spec.retries {
                    scheduler.mark_retrying(idx);
                    info!(
                        job = %spec.name,
                        wait_secs = spec.wait_interval.as_secs_f64(),
                        remaining = spec.retries + 1 - attempts[idx],
                        "waiting before retry"
                    );

                    tokio::select! {
                        _ = tokio::time::sleep(spec.wait_interval) => {}
                        _ = self.cancel.cancelled() => {}
                    }

                    if self.cancel.is_cancelled() {
                        scheduler.cancel_remaining();
                        break 'dispatch;
                    }
                } else {
                    scheduler.record_failure(idx);
                    break;
                }
            }
        }

        let reports: Vec<JobReport> = (0..n)
            .map(|idx| JobReport {
                name: self.graph.job(idx).name.clone(),
                state: scheduler.state_of(idx),
                attempts: attempts[idx],
                elapsed: elapsed[idx],
                failure: failures[idx].clone(),
            })
            .collect();

        let status = if reports.iter().all(|r| r.state == JobState::Succeeded) {
            RunStatus::Succeeded
        } else if self.cancel.is_cancelled() {
            RunStatus::Cancelled
        } else {
            RunStatus::Failed
        };

        info!(?status, "run finished");
        RunResult { status, reports }
    }

    /// One attempt: dispatch to the handler, bounded by the job's timeout.
    ///
    /// Timeout expiry is reported as [`JobOutcome::TimedOut`], identical in
    /// consequence to a collaborator-reported failure.
    async fn attempt(
        &self,
        idx: usize,
        spec: &JobSpec,
        attempt: u32,
    ) -> crate::errors::Result<JobOutcome> {
        let ctx = JobContext::for_attempt(spec, attempt, self.cancel.clone());
        let handler = &self.handlers[idx];

        match tokio::time::timeout(spec.timeout, handler.execute(ctx)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    job = %spec.name,
                    timeout_secs = spec.timeout.as_secs_f64(),
                    "attempt exceeded timeout"
                );
                Ok(JobOutcome::TimedOut)
            }
        }
    }
}
