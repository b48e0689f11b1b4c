// src/dag/builder.rs

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::graph::JobGraph;
use crate::dag::job::JobSpec;
use crate::errors::GraphError;

/// Accumulates job declarations and success edges, then produces an
/// immutable [`JobGraph`].
///
/// Validation happens as declarations arrive: duplicate names and unknown
/// edge endpoints are rejected immediately, and every edge insertion is
/// checked against the DAG invariant, so a graph handed to execution can
/// never be cyclic. Building before executing also means a malformed stack
/// fails before any side-effecting work starts.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    jobs: Vec<JobSpec>,
    index: HashMap<String, usize>,
    edges: Vec<(usize, usize)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a job. Declaration order is the dispatch tie-break.
    pub fn add_job(&mut self, spec: JobSpec) -> Result<(), GraphError> {
        if self.index.contains_key(&spec.name) {
            return Err(GraphError::DuplicateJob(spec.name));
        }

        debug!(job = %spec.name, "declared job");
        self.index.insert(spec.name.clone(), self.jobs.len());
        self.jobs.push(spec);
        Ok(())
    }

    /// Declare a success edge: schedule `to` only after `from` succeeds.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<(), GraphError> {
        let from_idx = *self
            .index
            .get(from)
            .ok_or_else(|| GraphError::UnknownJob(from.to_string()))?;
        let to_idx = *self
            .index
            .get(to)
            .ok_or_else(|| GraphError::UnknownJob(to.to_string()))?;

        if from_idx == to_idx {
            return Err(GraphError::Cycle {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        if self.edges.contains(&(from_idx, to_idx)) {
            debug!(from, to, "edge already declared; ignoring");
            return Ok(());
        }

        self.edges.push((from_idx, to_idx));
        if self.has_cycle() {
            self.edges.pop();
            return Err(GraphError::Cycle {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        debug!(from, to, "declared success edge");
        Ok(())
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Declared jobs, in declaration order.
    pub fn jobs(&self) -> &[JobSpec] {
        &self.jobs
    }

    /// Declared edges as name pairs, in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges
            .iter()
            .map(|&(from, to)| (self.jobs[from].name.as_str(), self.jobs[to].name.as_str()))
    }

    pub(crate) fn job_mut(&mut self, name: &str) -> Option<&mut JobSpec> {
        let idx = *self.index.get(name)?;
        Some(&mut self.jobs[idx])
    }

    pub(crate) fn jobs_mut(&mut self) -> &mut [JobSpec] {
        &mut self.jobs
    }

    /// Finish the graph.
    ///
    /// Entry jobs are all jobs with in-degree zero; a non-empty job set
    /// where every job has an incoming edge is malformed.
    pub fn build(self) -> Result<JobGraph, GraphError> {
        let graph = JobGraph::new(self.jobs, &self.edges);

        if !graph.is_empty() && graph.entry_jobs().is_empty() {
            return Err(GraphError::NoEntryJob);
        }

        Ok(graph)
    }

    /// A topological sort fails exactly when the edge set has a cycle.
    fn has_cycle(&self) -> bool {
        let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();

        for idx in 0..self.jobs.len() {
            graph.add_node(idx);
        }
        for &(from, to) in &self.edges {
            graph.add_edge(from, to, ());
        }

        toposort(&graph, None).is_err()
    }
}
