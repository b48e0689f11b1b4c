// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod stack;
pub mod stacks;
pub mod types;
pub mod vars;

use std::str::FromStr;

use anyhow::anyhow;
use tracing::info;

use crate::cli::CliArgs;
use crate::errors::{Result, StackdagError};
use crate::exec::{ConsoleSubmitter, Executor, HandlerMap, RunResult};
use crate::stack::{NoPriorResources, Stack};
use crate::types::FanInPolicy;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the shipped stack definitions
/// - variable input loading
/// - graph building and validation
/// - the executor, submitting through the console renderer
pub async fn run(args: CliArgs) -> Result<()> {
    if args.dry_run {
        let stack = stacks::declare(&args.stack)?;
        print_dry_run(&stack);
        return Ok(());
    }

    let fan_in = FanInPolicy::from_str(&args.fan_in).map_err(StackdagError::ConfigError)?;

    let inputs = config::load_from_path(&args.vars)?;
    info!(stack = %args.stack, inputs = inputs.len(), "building stack");

    let graph = stacks::build(&args.stack, &inputs, &NoPriorResources)?;

    let handlers = HandlerMap::uniform(ConsoleSubmitter);
    let executor = Executor::with_fan_in(graph, &handlers, fan_in)?;
    let result = executor.run().await;

    print_run_result(&result);

    if !result.succeeded() {
        return Err(anyhow!("run finished with status {:?}", result.status).into());
    }
    Ok(())
}

/// Simple dry-run output: print variables, jobs and edges.
fn print_dry_run(stack: &Stack) {
    println!("stackdag dry-run: {}", stack.name());
    println!();

    let vars: Vec<_> = stack.var_specs().collect();
    println!("variables ({}):", vars.len());
    for spec in vars {
        let requirement = if spec.required { "required" } else { "optional" };
        print!("  - {} ({requirement}, {})", spec.key, spec.types.describe());
        if let Some(ref default) = spec.default {
            print!(", default: {default}");
        }
        println!();
        if let Some(ref choices) = spec.choices {
            let rendered: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
            println!("      choices: {rendered:?}");
        }
        if !spec.tags.is_empty() {
            println!("      tags: {:?}", spec.tags);
        }
    }
    println!();

    println!("jobs ({}):", stack.job_specs().len());
    for job in stack.job_specs() {
        println!("  - {}", job.name);
        println!("      description: {}", job.human_description);
        println!("      phase: {}", job.automation_phase);
        println!(
            "      timeout: {}s, wait_interval: {}s, retries: {}",
            job.timeout.as_secs(),
            job.wait_interval.as_secs(),
            job.retries
        );
        if let Some(ref tag) = job.values_tag {
            println!("      values_tag: {tag}");
        }
    }
    println!();

    println!("edges:");
    for (from, to) in stack.edges() {
        println!("  - {from} -> {to}");
    }
}

/// Render the aggregate run report, one line per job.
fn print_run_result(result: &RunResult) {
    println!();
    println!("run status: {:?}", result.status);
    for report in &result.reports {
        print!(
            "  {:<16} {:?} (attempts: {}, elapsed: {:.1}s)",
            report.name,
            report.state,
            report.attempts,
            report.elapsed.as_secs_f64()
        );
        if let Some(ref failure) = report.failure {
            print!(" - {failure}");
        }
        println!();
    }
}
