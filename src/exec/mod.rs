// src/exec/mod.rs

//! Job execution layer.
//!
//! This module dispatches built job graphs to the external execution
//! collaborator and reports aggregate results.
//!
//! - [`handler`] provides the [`JobHandler`] boundary trait and the
//!   [`HandlerMap`] that resolves job names to handlers at build time.
//! - [`executor`] owns the sequential dispatch loop: readiness, timeout,
//!   retry and cancellation policy.
//! - [`cancel`] provides the cloneable cancellation handle.
//! - [`report`] defines the per-job and aggregate result types.
//! - [`console`] contains the handler the CLI uses, which renders each
//!   submission in human-readable form.

pub mod cancel;
pub mod console;
pub mod executor;
pub mod handler;
pub mod report;

pub use cancel::CancelHandle;
pub use console::ConsoleSubmitter;
pub use executor::Executor;
pub use handler::{HandlerMap, JobContext, JobHandler, JobOutcome};
pub use report::{JobFailure, JobReport, RunResult, RunStatus};
