// src/vars/registry.rs

//! Variable declaration and resolution.

use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::VarError;
use crate::vars::value::{TypeSpec, VarKind, VarValue};

/// Declaration of a single stack variable.
///
/// Built fluently:
///
/// ```ignore
/// VarSpec::required("eks_cluster")
///     .types(&[VarKind::Str])
///     .tags(&["cluster", "nodegroups"])
/// ```
#[derive(Debug, Clone)]
pub struct VarSpec {
    pub key: String,
    pub required: bool,
    pub types: TypeSpec,
    pub default: Option<VarValue>,
    pub choices: Option<Vec<VarValue>>,
    pub tags: Vec<String>,
}

impl VarSpec {
    pub fn required(key: &str) -> Self {
        Self::new(key, true)
    }

    pub fn optional(key: &str) -> Self {
        Self::new(key, false)
    }

    fn new(key: &str, required: bool) -> Self {
        Self {
            key: key.to_string(),
            required,
            types: TypeSpec::any(),
            default: None,
            choices: None,
            tags: Vec::new(),
        }
    }

    pub fn types(mut self, kinds: &[VarKind]) -> Self {
        self.types = TypeSpec::of(kinds);
        self
    }

    pub fn default(mut self, value: impl Into<VarValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn choices(mut self, choices: &[&str]) -> Self {
        self.choices = Some(choices.iter().map(|c| VarValue::from(*c)).collect());
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// One declared variable plus its resolution state.
#[derive(Debug, Clone)]
struct Declared {
    spec: VarSpec,
    resolved: Option<VarValue>,
}

/// Holds declared variables and resolves final values per tag.
///
/// Purely in-memory; declaration happens while the stack is being
/// constructed, resolution during initialization. The registry is consumed
/// when the job graph is built, so values cannot drift mid-run.
#[derive(Debug, Clone, Default)]
pub struct VarRegistry {
    vars: BTreeMap<String, Declared>,
}

impl VarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable.
    ///
    /// Fails if the key is already declared, or if the default value does
    /// not satisfy the declared type set or choices.
    pub fn declare(&mut self, mut spec: VarSpec) -> Result<(), VarError> {
        if self.vars.contains_key(&spec.key) {
            return Err(VarError::DuplicateKey(spec.key));
        }

        if let Some(default) = spec.default.take() {
            let coerced =
                check_value(&spec, default).map_err(|err| VarError::InvalidDefault {
                    key: spec.key.clone(),
                    reason: err.to_string(),
                })?;
            spec.default = Some(coerced);
        }

        debug!(key = %spec.key, required = spec.required, "declared variable");
        self.vars.insert(
            spec.key.clone(),
            Declared {
                spec,
                resolved: None,
            },
        );
        Ok(())
    }

    /// Give a declared variable a concrete value.
    ///
    /// The value is coerced against the declared type set and checked
    /// against choices. Resolving an already-resolved key overwrites the
    /// previous value; the registry only freezes once the graph is built.
    pub fn resolve(&mut self, key: &str, value: VarValue) -> Result<(), VarError> {
        let declared = self
            .vars
            .get_mut(key)
            .ok_or_else(|| VarError::UnknownKey(key.to_string()))?;

        let coerced = check_value(&declared.spec, value)?;

        debug!(key = %key, value = %coerced, "resolved variable");
        declared.resolved = Some(coerced);
        Ok(())
    }

    /// Whether the key is declared.
    pub fn is_declared(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Whether the key has been given a concrete (non-default) value.
    pub fn is_resolved(&self, key: &str) -> bool {
        self.vars
            .get(key)
            .is_some_and(|d| d.resolved.is_some())
    }

    /// The effective value of a variable: resolved value, else default.
    pub fn value_of(&self, key: &str) -> Option<&VarValue> {
        let declared = self.vars.get(key)?;
        declared.resolved.as_ref().or(declared.spec.default.as_ref())
    }

    /// Check that every required variable has a value.
    ///
    /// Reports every missing key at once so the caller can fix the whole
    /// input set in one pass. Calling this twice without intervening
    /// resolution yields the identical list.
    pub fn verify_all(&self) -> Result<(), VarError> {
        let missing: Vec<String> = self
            .vars
            .values()
            .filter(|d| d.spec.required && d.resolved.is_none() && d.spec.default.is_none())
            .map(|d| d.spec.key.clone())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(VarError::MissingRequired(missing))
        }
    }

    /// Effective values of every variable carrying `tag`.
    ///
    /// Resolved values win; unresolved variables fall back to their default,
    /// and variables with neither are skipped (verification has already
    /// ensured no required variable is in that position).
    pub fn values_for_tag(&self, tag: &str) -> BTreeMap<String, VarValue> {
        self.vars
            .values()
            .filter(|d| d.spec.has_tag(tag))
            .filter_map(|d| {
                let value = d.resolved.as_ref().or(d.spec.default.as_ref())?;
                Some((d.spec.key.clone(), value.clone()))
            })
            .collect()
    }

    /// Declared specs, in key order (for dry-run output).
    pub fn specs(&self) -> impl Iterator<Item = &VarSpec> {
        self.vars.values().map(|d| &d.spec)
    }
}

/// Coerce a value against a declaration and check its choices.
fn check_value(spec: &VarSpec, value: VarValue) -> Result<VarValue, VarError> {
    let coerced = spec
        .types
        .coerce(value.clone())
        .ok_or_else(|| VarError::TypeMismatch {
            key: spec.key.clone(),
            expected: spec.types.describe(),
            got: format!("{} ({})", value, value.kind()),
        })?;

    if let Some(choices) = &spec.choices {
        if !choices.contains(&coerced) {
            return Err(VarError::ChoiceViolation {
                key: spec.key.clone(),
                got: coerced.to_string(),
            });
        }
    }

    Ok(coerced)
}
