// src/vars/value.rs

//! The closed value union for stack variables and its coercion rules.
//!
//! Raw inputs arrive as loosely typed TOML values (or programmatic
//! defaults); every value is coerced against the variable's declared type
//! set exactly once, at resolution time. After that, a `VarValue` is what
//! it says it is.

use std::fmt;

use serde::Deserialize;

/// A resolved variable value.
///
/// The string `"null"` is accepted as a null sentinel for variables whose
/// type set includes [`VarKind::Null`]; provisioning inputs have used that
/// convention for optional values since before this tool existed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<VarValue>),
    Null,
}

impl VarValue {
    pub fn kind(&self) -> VarKind {
        match self {
            VarValue::Str(_) => VarKind::Str,
            VarValue::Int(_) => VarKind::Int,
            VarValue::Float(_) => VarKind::Float,
            VarValue::Bool(_) => VarKind::Bool,
            VarValue::List(_) => VarKind::List,
            VarValue::Null => VarKind::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, VarValue::Null)
    }

    /// String slice if this is a `Str` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            VarValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Str(s) => write!(f, "{s}"),
            VarValue::Int(i) => write!(f, "{i}"),
            VarValue::Float(x) => write!(f, "{x}"),
            VarValue::Bool(b) => write!(f, "{b}"),
            VarValue::Null => write!(f, "null"),
            VarValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for VarValue {
    fn from(s: &str) -> Self {
        VarValue::Str(s.to_string())
    }
}

impl From<String> for VarValue {
    fn from(s: String) -> Self {
        VarValue::Str(s)
    }
}

impl From<i64> for VarValue {
    fn from(i: i64) -> Self {
        VarValue::Int(i)
    }
}

impl From<i32> for VarValue {
    fn from(i: i32) -> Self {
        VarValue::Int(i64::from(i))
    }
}

impl From<f64> for VarValue {
    fn from(x: f64) -> Self {
        VarValue::Float(x)
    }
}

impl From<bool> for VarValue {
    fn from(b: bool) -> Self {
        VarValue::Bool(b)
    }
}

impl From<Vec<VarValue>> for VarValue {
    fn from(items: Vec<VarValue>) -> Self {
        VarValue::List(items)
    }
}

impl From<Vec<&str>> for VarValue {
    fn from(items: Vec<&str>) -> Self {
        VarValue::List(items.into_iter().map(VarValue::from).collect())
    }
}

/// One member of a variable's type set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Str,
    Int,
    Float,
    Bool,
    List,
    Null,
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VarKind::Str => "str",
            VarKind::Int => "int",
            VarKind::Float => "float",
            VarKind::Bool => "bool",
            VarKind::List => "list",
            VarKind::Null => "null",
        };
        write!(f, "{s}")
    }
}

/// A variable's declared type: a union of [`VarKind`]s.
///
/// An empty set means "any type" (a declaration that never constrained its
/// type).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeSpec {
    kinds: Vec<VarKind>,
}

impl TypeSpec {
    /// Unconstrained type.
    pub fn any() -> Self {
        Self { kinds: Vec::new() }
    }

    pub fn of(kinds: &[VarKind]) -> Self {
        Self {
            kinds: kinds.to_vec(),
        }
    }

    pub fn is_any(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn allows(&self, kind: VarKind) -> bool {
        self.is_any() || self.kinds.contains(&kind)
    }

    /// Human-readable form for error messages, e.g. `str,null`.
    pub fn describe(&self) -> String {
        if self.is_any() {
            return "any".to_string();
        }
        self.kinds
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Coerce a raw value against this type set.
    ///
    /// Returns the (possibly converted) value, or `None` if the value cannot
    /// satisfy the type. Rules, applied in order:
    /// - a value whose kind is already allowed passes through unchanged
    /// - the string `"null"` becomes [`VarValue::Null`] when null is allowed
    /// - strings parse to int / float / bool when the target kind is allowed
    /// - an int widens to float when float is allowed but int is not
    pub fn coerce(&self, value: VarValue) -> Option<VarValue> {
        if self.allows(value.kind()) {
            return Some(value);
        }

        match value {
            VarValue::Str(s) => {
                if s == "null" && self.allows(VarKind::Null) {
                    return Some(VarValue::Null);
                }
                if self.allows(VarKind::Int) {
                    if let Ok(i) = s.parse::<i64>() {
                        return Some(VarValue::Int(i));
                    }
                }
                if self.allows(VarKind::Float) {
                    if let Ok(x) = s.parse::<f64>() {
                        return Some(VarValue::Float(x));
                    }
                }
                if self.allows(VarKind::Bool) {
                    match s.as_str() {
                        "true" => return Some(VarValue::Bool(true)),
                        "false" => return Some(VarValue::Bool(false)),
                        _ => {}
                    }
                }
                None
            }
            VarValue::Int(i) if self.allows(VarKind::Float) => Some(VarValue::Float(i as f64)),
            _ => None,
        }
    }
}
