// src/stack/facade.rs

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::dag::{GraphBuilder, JobGraph, JobSpec};
use crate::errors::{GraphError, Result, StackdagError};
use crate::exec::{Executor, HandlerMap, RunResult};
use crate::vars::{VarRegistry, VarSpec, VarValue};

/// The thin layer a concrete stack definition talks to.
///
/// A `Stack` accumulates variable declarations, job declarations and
/// success edges, resolves inputs, and finally turns into an immutable
/// [`JobGraph`]. All state lives on this one explicit object; once
/// [`build`](Stack::build) consumes it, nothing can mutate the run.
#[derive(Debug)]
pub struct Stack {
    name: String,
    vars: VarRegistry,
    builder: GraphBuilder,
}

impl Stack {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vars: VarRegistry::new(),
            builder: GraphBuilder::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a variable.
    pub fn declare(&mut self, spec: VarSpec) -> Result<()> {
        self.vars.declare(spec).map_err(StackdagError::from)
    }

    /// Give a declared variable a concrete value programmatically (e.g. a
    /// fallback derived from another variable).
    pub fn set_variable(&mut self, key: &str, value: impl Into<VarValue>) -> Result<()> {
        self.vars
            .resolve(key, value.into())
            .map_err(StackdagError::from)
    }

    /// Apply a raw key -> value input mapping.
    ///
    /// Values are coerced and checked per declaration; keys that were never
    /// declared are skipped with a warning rather than rejected, so one
    /// input file can feed several stacks.
    pub fn resolve_inputs(&mut self, inputs: &BTreeMap<String, VarValue>) -> Result<()> {
        for (key, value) in inputs {
            if !self.vars.is_declared(key) {
                warn!(stack = %self.name, key = %key, "input for undeclared variable; ignoring");
                continue;
            }
            self.vars.resolve(key, value.clone())?;
        }
        Ok(())
    }

    /// Effective value of a variable, treating null as absent.
    ///
    /// This is the shape fallback logic wants: "is there actually a value
    /// here" rather than "was something, possibly null, provided".
    pub fn get_attr(&self, key: &str) -> Option<&VarValue> {
        self.vars.value_of(key).filter(|v| !v.is_null())
    }

    /// Check that every required variable has a value; reports all missing
    /// keys at once.
    pub fn verify_variables(&self) -> Result<()> {
        self.vars.verify_all().map_err(StackdagError::from)
    }

    /// Resolved values for every variable carrying `tag`.
    pub fn tagged_values(&self, tag: &str) -> BTreeMap<String, VarValue> {
        self.vars.values_for_tag(tag)
    }

    /// Declare a job.
    pub fn add_job(&mut self, spec: JobSpec) -> Result<()> {
        self.builder.add_job(spec).map_err(StackdagError::from)
    }

    /// Declare a success edge between two declared jobs.
    pub fn on_success(&mut self, from: &str, to: &str) -> Result<()> {
        self.builder.add_edge(from, to).map_err(StackdagError::from)
    }

    /// Replace a declared job's human description (used once inputs are
    /// resolved and the description can name the actual resource).
    pub fn describe_job(&mut self, job: &str, description: &str) -> Result<()> {
        let spec = self
            .builder
            .job_mut(job)
            .ok_or_else(|| GraphError::UnknownJob(job.to_string()))?;
        spec.human_description = description.to_string();
        Ok(())
    }

    /// Declared variables, for dry-run output.
    pub fn var_specs(&self) -> impl Iterator<Item = &VarSpec> {
        self.vars.specs()
    }

    /// Declared jobs, for dry-run output.
    pub fn job_specs(&self) -> &[JobSpec] {
        self.builder.jobs()
    }

    /// Declared edges, for dry-run output.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.builder.edges()
    }

    /// Verify variables and produce the immutable, run-ready graph.
    ///
    /// Each job's `default_values` are materialized here from the variables
    /// carrying the job's tag; after this point neither the registry nor
    /// the graph can change.
    pub fn build(mut self) -> Result<JobGraph> {
        self.vars.verify_all()?;

        for job in self.builder.jobs_mut() {
            if let Some(tag) = job.values_tag.clone() {
                job.default_values = self.vars.values_for_tag(&tag);
                debug!(
                    stack = %self.name,
                    job = %job.name,
                    tag = %tag,
                    values = job.default_values.len(),
                    "materialized job values"
                );
            }
        }

        self.builder.build().map_err(StackdagError::from)
    }

    /// Build and hand the run to the execution layer.
    pub async fn submit(self, handlers: &HandlerMap) -> Result<RunResult> {
        let graph = self.build()?;
        let executor = Executor::new(graph, handlers)?;
        Ok(executor.run().await)
    }
}
