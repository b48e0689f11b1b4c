// src/config/loader.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::vars::VarValue;

/// Raw key -> value inputs for a stack, as read from a TOML file.
///
/// The file is a flat table:
///
/// ```toml
/// eks_cluster = "dev-cluster"
/// vpc_id = "vpc-0a1b2c"
/// eks_node_max_capacity = 4
/// domain_filters = ["dev.example.com"]
/// ```
pub type InputValues = BTreeMap<String, VarValue>;

/// Load variable inputs from a TOML file.
///
/// This only performs deserialization; type checking against the stack's
/// declarations happens when the values are resolved into the registry.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<InputValues> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let inputs: InputValues = toml::from_str(&contents)?;

    Ok(inputs)
}

/// Default inputs path: `Stackvars.toml` in the current working directory.
pub fn default_vars_path() -> PathBuf {
    PathBuf::from("Stackvars.toml")
}
