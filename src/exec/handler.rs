// src/exec/handler.rs

//! Pluggable job handler abstraction.
//!
//! The executor talks to a [`JobHandler`] per job instead of calling into
//! the external runtime directly. Production handlers submit the job to
//! the orchestration backend; tests register handlers that record calls
//! and play scripted outcomes.
//!
//! Handlers are resolved from the [`HandlerMap`] once, when the executor
//! is constructed, so a job without a handler fails before any dispatch.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::dag::JobSpec;
use crate::errors::Result;
use crate::exec::cancel::CancelHandle;
use crate::vars::VarValue;

/// What the external execution collaborator reported for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    Failed(String),
    TimedOut,
}

/// Everything a handler receives for one attempt.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub name: String,
    pub default_values: BTreeMap<String, VarValue>,
    pub automation_phase: String,
    pub human_description: String,
    /// The attempt's wall-clock budget; the executor enforces it, this is
    /// informational for the collaborator.
    pub timeout: Duration,
    /// 1-based attempt counter.
    pub attempt: u32,
    /// Observed by handlers that can abort an in-flight submission.
    pub cancel: CancelHandle,
}

impl JobContext {
    pub(crate) fn for_attempt(spec: &JobSpec, attempt: u32, cancel: CancelHandle) -> Self {
        Self {
            name: spec.name.clone(),
            default_values: spec.default_values.clone(),
            automation_phase: spec.automation_phase.clone(),
            human_description: spec.human_description.clone(),
            timeout: spec.timeout,
            attempt,
            cancel,
        }
    }
}

/// Trait abstracting how a job attempt is executed.
///
/// `Ok(outcome)` is what the collaborator reported; `Err` means the
/// collaborator itself misbehaved (unreachable, protocol error) and is
/// recorded as a distinct failure kind.
pub trait JobHandler: Send + Sync {
    fn execute(
        &self,
        ctx: JobContext,
    ) -> Pin<Box<dyn Future<Output = Result<JobOutcome>> + Send + '_>>;
}

/// Maps job names to handlers.
///
/// A fallback handler, if set, covers every job without a specific entry;
/// the CLI uses this to run whole stacks through one submitter.
#[derive(Clone, Default)]
pub struct HandlerMap {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
    fallback: Option<Arc<dyn JobHandler>>,
}

impl HandlerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one job name. Last registration wins.
    pub fn register(&mut self, job: &str, handler: impl JobHandler + 'static) -> &mut Self {
        self.handlers.insert(job.to_string(), Arc::new(handler));
        self
    }

    /// Handler for every job without a specific registration.
    pub fn with_fallback(mut self, handler: impl JobHandler + 'static) -> Self {
        self.fallback = Some(Arc::new(handler));
        self
    }

    /// A map that routes every job to the same handler.
    pub fn uniform(handler: impl JobHandler + 'static) -> Self {
        Self::new().with_fallback(handler)
    }

    pub(crate) fn lookup(&self, job: &str) -> Option<Arc<dyn JobHandler>> {
        self.handlers
            .get(job)
            .cloned()
            .or_else(|| self.fallback.clone())
    }
}

impl std::fmt::Debug for HandlerMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerMap")
            .field("jobs", &self.handlers.keys().collect::<Vec<_>>())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}
