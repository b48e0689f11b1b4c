// src/dag/graph.rs

use std::collections::HashMap;

use crate::dag::job::JobSpec;

/// Immutable, run-ready job graph.
///
/// Jobs keep their declaration order, which doubles as the dispatch
/// tie-break among ready jobs. Acyclicity is validated in
/// [`builder`](crate::dag::builder); here we just keep adjacency
/// information both ways for scheduling and diagnostics.
#[derive(Debug, Clone)]
pub struct JobGraph {
    jobs: Vec<JobSpec>,
    index: HashMap<String, usize>,
    /// Direct predecessors per job (success edges pointing in).
    deps: Vec<Vec<usize>>,
    /// Direct successors per job (success edges pointing out).
    dependents: Vec<Vec<usize>>,
    /// Jobs with no incoming edge, in declaration order.
    entry_jobs: Vec<usize>,
}

impl JobGraph {
    /// Assemble from validated parts.
    ///
    /// Assumes the builder has already checked name uniqueness, edge
    /// endpoints and acyclicity.
    pub(crate) fn new(jobs: Vec<JobSpec>, edges: &[(usize, usize)]) -> Self {
        let index: HashMap<String, usize> = jobs
            .iter()
            .enumerate()
            .map(|(i, job)| (job.name.clone(), i))
            .collect();

        let mut deps = vec![Vec::new(); jobs.len()];
        let mut dependents = vec![Vec::new(); jobs.len()];
        for &(from, to) in edges {
            dependents[from].push(to);
            deps[to].push(from);
        }

        let entry_jobs: Vec<usize> = (0..jobs.len()).filter(|&i| deps[i].is_empty()).collect();

        Self {
            jobs,
            index,
            deps,
            dependents,
            entry_jobs,
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Jobs in declaration order.
    pub fn jobs(&self) -> &[JobSpec] {
        &self.jobs
    }

    pub fn job(&self, idx: usize) -> &JobSpec {
        &self.jobs[idx]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Direct predecessors of a job.
    pub fn dependencies_of(&self, idx: usize) -> &[usize] {
        &self.deps[idx]
    }

    /// Direct successors of a job.
    pub fn dependents_of(&self, idx: usize) -> &[usize] {
        &self.dependents[idx]
    }

    /// Jobs with in-degree zero, where a run starts.
    pub fn entry_jobs(&self) -> &[usize] {
        &self.entry_jobs
    }
}
