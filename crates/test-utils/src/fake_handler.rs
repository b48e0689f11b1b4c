use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stackdag::errors::Result;
use stackdag::exec::{JobContext, JobHandler, JobOutcome};

/// One scripted reaction to a dispatch.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Report this outcome immediately.
    Outcome(JobOutcome),
    /// Fail as the collaborator itself (an `Err`, not a job outcome).
    CollaboratorError(String),
    /// Sleep first, then report the outcome. Lets tests exercise the
    /// executor's timeout enforcement.
    SlowOutcome(Duration, JobOutcome),
}

/// A fake job handler that:
/// - records the order jobs were dispatched in
/// - plays back scripted reactions per job, falling back to a per-job
///   default (success unless configured otherwise) when the script is
///   exhausted.
///
/// Clones share state, so a test can hold one clone for assertions and
/// register another with the executor.
#[derive(Clone, Default)]
pub struct FakeHandler {
    executed: Arc<Mutex<Vec<String>>>,
    scripts: Arc<Mutex<HashMap<String, VecDeque<Scripted>>>>,
    defaults: Arc<Mutex<HashMap<String, Scripted>>>,
}

impl FakeHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs dispatched so far, in order, one entry per attempt.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    /// Number of attempts recorded for one job.
    pub fn attempts_of(&self, job: &str) -> usize {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .filter(|name| name.as_str() == job)
            .count()
    }

    /// Queue scripted reactions for a job, consumed one per attempt.
    pub fn script(&self, job: &str, steps: impl IntoIterator<Item = Scripted>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(job.to_string())
            .or_default()
            .extend(steps);
    }

    /// Reaction for every attempt not covered by a script.
    pub fn set_default(&self, job: &str, step: Scripted) {
        self.defaults
            .lock()
            .unwrap()
            .insert(job.to_string(), step);
    }

    /// Convenience: make every attempt of `job` fail.
    pub fn fail_always(&self, job: &str, reason: &str) {
        self.set_default(job, Scripted::Outcome(JobOutcome::Failed(reason.to_string())));
    }

    fn next_step(&self, job: &str) -> Scripted {
        if let Some(queue) = self.scripts.lock().unwrap().get_mut(job) {
            if let Some(step) = queue.pop_front() {
                return step;
            }
        }

        self.defaults
            .lock()
            .unwrap()
            .get(job)
            .cloned()
            .unwrap_or(Scripted::Outcome(JobOutcome::Succeeded))
    }
}

impl JobHandler for FakeHandler {
    fn execute(
        &self,
        ctx: JobContext,
    ) -> Pin<Box<dyn Future<Output = Result<JobOutcome>> + Send + '_>> {
        let executed = Arc::clone(&self.executed);
        let step = self.next_step(&ctx.name);

        Box::pin(async move {
            executed.lock().unwrap().push(ctx.name.clone());

            match step {
                Scripted::Outcome(outcome) => Ok(outcome),
                Scripted::CollaboratorError(reason) => {
                    Err(anyhow::anyhow!(reason).into())
                }
                Scripted::SlowOutcome(delay, outcome) => {
                    tokio::time::sleep(delay).await;
                    Ok(outcome)
                }
            }
        })
    }
}
