use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A concrete value assigned to one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Float(f64),
    Int(i64),
    Choice(String),
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Choice(s) => write!(f, "{s}"),
        }
    }
}

/// A concrete assignment of values to dimensions.
/// Uses BTreeMap for deterministic ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    /// Dimension name -> assigned value (sorted for determinism).
    pub assignments: BTreeMap<String, ParamValue>,
}

impl Point {
    pub fn new() -> Self {
        Self {
            assignments: BTreeMap::new(),
        }
    }

    /// Insert an assignment, replacing any previous value for the dimension.
    pub fn set(&mut self, name: impl Into<String>, value: ParamValue) {
        self.assignments.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.assignments.get(name)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        write!(f, "}}")
    }
}
