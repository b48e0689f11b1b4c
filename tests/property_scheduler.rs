// tests/property_scheduler.rs

//! Property tests over randomly generated DAGs, driving the pure
//! scheduler the way the executor does (sequential, lowest index first).

use std::collections::HashSet;

use proptest::prelude::*;

use stackdag::dag::{GraphBuilder, JobGraph, JobState, Scheduler};
use stackdag::types::FanInPolicy;
use stackdag_test_utils::builders::quick_job;

/// Random DAG: job N may only depend on jobs 0..N, which guarantees
/// acyclicity by construction.
fn dag_strategy(max_jobs: usize) -> impl Strategy<Value = JobGraph> {
    (1..=max_jobs).prop_flat_map(|num_jobs| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_jobs),
            num_jobs,
        )
        .prop_map(move |raw_deps| {
            let mut builder = GraphBuilder::new();
            for i in 0..num_jobs {
                builder
                    .add_job(quick_job(&format!("job_{i}")))
                    .expect("unique names");
            }

            for (i, potential_deps) in raw_deps.into_iter().enumerate() {
                let mut deps = HashSet::new();
                for dep in potential_deps {
                    if i > 0 {
                        deps.insert(dep % i);
                    }
                }
                for dep in deps {
                    builder
                        .add_edge(&format!("job_{dep}"), &format!("job_{i}"))
                        .expect("forward edges cannot form a cycle");
                }
            }

            builder.build().expect("generated DAG is valid")
        })
    })
}

proptest! {
    /// Entry jobs are exactly the zero-in-degree set.
    #[test]
    fn entry_jobs_match_in_degrees(graph in dag_strategy(8)) {
        let expected: Vec<usize> = (0..graph.len())
            .filter(|&i| graph.dependencies_of(i).is_empty())
            .collect();
        prop_assert_eq!(graph.entry_jobs(), expected.as_slice());
    }

    /// With an all-success walk, every job runs exactly once, dispatch
    /// order is a topological order, and the run terminates.
    #[test]
    fn all_success_walk_is_a_topological_order(graph in dag_strategy(8)) {
        let mut scheduler = Scheduler::new(&graph, FanInPolicy::All);
        let mut dispatched = Vec::new();

        while let Some(idx) = scheduler.next_ready() {
            for &dep in graph.dependencies_of(idx) {
                prop_assert_eq!(scheduler.state_of(dep), JobState::Succeeded);
            }
            scheduler.mark_running(idx);
            scheduler.record_success(idx);
            dispatched.push(idx);
        }

        prop_assert!(scheduler.is_complete());
        prop_assert_eq!(dispatched.len(), graph.len());

        let mut seen = HashSet::new();
        for idx in dispatched {
            for &dep in graph.dependencies_of(idx) {
                prop_assert!(seen.contains(&dep));
            }
            seen.insert(idx);
        }
    }

    /// With a random failing set, the run still terminates, no job with a
    /// failed ancestor is ever dispatched, and every job ends in a
    /// coherent state.
    #[test]
    fn failures_never_reach_descendants(
        graph in dag_strategy(8),
        failing in proptest::collection::vec(any::<usize>(), 0..4),
    ) {
        let failing: HashSet<usize> = failing
            .into_iter()
            .map(|i| i % graph.len().max(1))
            .collect();

        let mut scheduler = Scheduler::new(&graph, FanInPolicy::All);
        let mut steps = 0;

        while let Some(idx) = scheduler.next_ready() {
            steps += 1;
            prop_assert!(steps <= graph.len(), "scheduler dispatched a job twice");

            for &dep in graph.dependencies_of(idx) {
                prop_assert_eq!(scheduler.state_of(dep), JobState::Succeeded);
            }

            scheduler.mark_running(idx);
            if failing.contains(&idx) {
                scheduler.record_failure(idx);
            } else {
                scheduler.record_success(idx);
            }
        }

        prop_assert!(scheduler.is_complete());

        for idx in 0..graph.len() {
            match scheduler.state_of(idx) {
                JobState::Succeeded => prop_assert!(!failing.contains(&idx)),
                JobState::Failed => prop_assert!(failing.contains(&idx)),
                // Blocked by an upstream failure; must have one.
                JobState::Pending => {
                    let has_dead_ancestor = graph
                        .dependencies_of(idx)
                        .iter()
                        .any(|&d| !matches!(scheduler.state_of(d), JobState::Succeeded));
                    prop_assert!(has_dead_ancestor);
                }
                other => prop_assert!(false, "unexpected terminal state {:?}", other),
            }
        }
    }
}
