// src/stack/resource.rs

//! Prior-run resource lookup boundary.

use std::collections::BTreeMap;

use crate::errors::LookupError;
use crate::vars::VarValue;

/// Attributes of a resource created by a previous run, e.g. a cluster's
/// role ARN.
pub type ResourceAttrs = BTreeMap<String, VarValue>;

/// Collaborator that can answer "what did the run that created resource X
/// record about it?".
///
/// `NotFound` is an expected answer: stacks use it to fall back or, when
/// the value is required downstream, to surface a configuration error.
/// It is never a scheduling error.
pub trait ResourceLookup {
    fn lookup(&self, name: &str, resource_type: &str) -> Result<ResourceAttrs, LookupError>;
}

/// Lookup with no backend behind it; every query is `NotFound`.
///
/// Used by the CLI, which runs without orchestrator state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPriorResources;

impl ResourceLookup for NoPriorResources {
    fn lookup(&self, name: &str, resource_type: &str) -> Result<ResourceAttrs, LookupError> {
        Err(LookupError::NotFound {
            name: name.to_string(),
            resource_type: resource_type.to_string(),
        })
    }
}
