// src/stack/mod.rs

//! Stack façade.
//!
//! - [`facade`] provides the [`Stack`] builder object that concrete stack
//!   definitions talk to: variable declarations, job/edge declarations,
//!   input resolution and submission.
//! - [`resource`] is the boundary to the prior-run resource lookup
//!   collaborator.

pub mod facade;
pub mod resource;

pub use facade::Stack;
pub use resource::{NoPriorResources, ResourceAttrs, ResourceLookup};
