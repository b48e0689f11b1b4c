// src/exec/console.rs

use std::future::Future;
use std::pin::Pin;

use tracing::info;

use crate::errors::Result;
use crate::exec::handler::{JobContext, JobHandler, JobOutcome};

/// Handler that renders each submission in human-readable form on stdout
/// and reports success.
///
/// This is what the CLI runs stacks through when no orchestration backend
/// is wired in: the submission surface is exercised end to end and the
/// operator sees exactly what each job would hand to the runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSubmitter;

impl JobHandler for ConsoleSubmitter {
    fn execute(
        &self,
        ctx: JobContext,
    ) -> Pin<Box<dyn Future<Output = Result<JobOutcome>> + Send + '_>> {
        Box::pin(async move {
            println!("=> {} [{}]", ctx.human_description, ctx.automation_phase);
            println!("   job: {} (attempt {})", ctx.name, ctx.attempt);
            for (key, value) in &ctx.default_values {
                println!("   {key} = {value}");
            }

            info!(job = %ctx.name, "submission rendered");
            Ok(JobOutcome::Succeeded)
        })
    }
}
