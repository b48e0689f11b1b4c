// src/config/mod.rs

//! Variable input loading.

pub mod loader;

pub use loader::{InputValues, load_from_path};
