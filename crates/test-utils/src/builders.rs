#![allow(dead_code)]

use std::time::Duration;

use stackdag::dag::{GraphBuilder, JobGraph, JobSpec};

/// A job spec with test-friendly timings: short timeout, near-zero retry
/// wait, no retries.
pub fn quick_job(name: &str) -> JobSpec {
    JobSpec::new(name)
        .timeout(Duration::from_secs(5))
        .wait_interval(Duration::from_millis(10))
        .automation_phase("test")
        .human_description(name)
}

/// Build a graph from job names and success edges.
///
/// Jobs are declared in slice order (which fixes the dispatch tie-break).
pub fn graph(jobs: &[&str], edges: &[(&str, &str)]) -> JobGraph {
    try_graph(jobs, edges).expect("test graph should be valid")
}

/// Fallible variant of [`graph`], for tests asserting on builder errors.
pub fn try_graph(
    jobs: &[&str],
    edges: &[(&str, &str)],
) -> Result<JobGraph, stackdag::errors::GraphError> {
    let mut builder = GraphBuilder::new();
    for name in jobs {
        builder.add_job(quick_job(name))?;
    }
    for (from, to) in edges {
        builder.add_edge(from, to)?;
    }
    builder.build()
}

/// Linear chain: each job depends on the previous one.
pub fn chain(jobs: &[&str]) -> JobGraph {
    let edges: Vec<(&str, &str)> = jobs.windows(2).map(|w| (w[0], w[1])).collect();
    graph(jobs, &edges)
}
