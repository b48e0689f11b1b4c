// src/stacks/mod.rs

//! Shipped stack definitions.
//!
//! Each stack module exposes:
//! - `NAME`: the stack's registry name
//! - `declare()`: variables, jobs and edges, with nothing resolved
//! - `build(inputs, lookup)`: declare + resolve + stack-specific fallbacks
//!   + verify, producing a run-ready [`JobGraph`]

pub mod aws_eks;
pub mod aws_eks2;

use std::collections::BTreeMap;

use crate::dag::JobGraph;
use crate::errors::{Result, StackdagError};
use crate::stack::{ResourceLookup, Stack};
use crate::vars::VarValue;

/// Names of every shipped stack.
pub const STACK_NAMES: &[&str] = &[aws_eks::NAME, aws_eks2::NAME];

/// Declare a shipped stack by name.
pub fn declare(name: &str) -> Result<Stack> {
    match name {
        aws_eks::NAME => aws_eks::declare(),
        aws_eks2::NAME => aws_eks2::declare(),
        other => Err(StackdagError::UnknownStack(other.to_string())),
    }
}

/// Build a shipped stack by name against the given inputs.
pub fn build(
    name: &str,
    inputs: &BTreeMap<String, VarValue>,
    lookup: &dyn ResourceLookup,
) -> Result<JobGraph> {
    match name {
        aws_eks::NAME => aws_eks::build(inputs, lookup),
        aws_eks2::NAME => aws_eks2::build(inputs, lookup),
        other => Err(StackdagError::UnknownStack(other.to_string())),
    }
}
