//! Score explanations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A tree describing how a score was computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// The value this node contributes.
    pub value: f64,
    /// Human-readable description.
    pub message: String,
    /// Contributing sub-explanations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Explanation>,
}

impl Explanation {
    /// Create a leaf explanation.
    pub fn new<S: Into<String>>(value: f64, message: S) -> Self {
        Explanation {
            value,
            message: message.into(),
            children: Vec::new(),
        }
    }

    /// Create an explanation with children.
    pub fn with_children<S: Into<String>>(value: f64, message: S, children: Vec<Explanation>) -> Self {
        Explanation {
            value,
            message: message.into(),
            children,
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{} = {}", "", self.message, self.value, indent = depth * 2)?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
