//! Score explanations.

use std::fmt;

use serde::Serialize;

/// Describes how a score was computed, as a tree of factors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    value: f32,
    description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<Explanation>,
}

impl Explanation {
    /// Create a leaf explanation.
    pub fn new<S: Into<String>>(value: f32, description: S) -> Self {
        Explanation {
            value,
            description: description.into(),
            details: Vec::new(),
        }
    }

    /// Explanation for a document the query does not match.
    pub fn no_match<S: Into<String>>(description: S) -> Self {
        Explanation::new(0.0, description)
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_value(&mut self, value: f32) {
        self.value = value;
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn details(&self) -> &[Explanation] {
        &self.details
    }

    /// Whether the explained document matched.
    pub fn is_match(&self) -> bool {
        self.value > 0.0
    }

    pub fn add_detail(&mut self, detail: Explanation) {
        self.details.push(detail);
    }

    /// Builder form of [`add_detail`](Self::add_detail).
    pub fn with_detail(mut self, detail: Explanation) -> Self {
        self.details.push(detail);
        self
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{} = {}", "", self.value, self.description, indent = depth * 2)?;
        for detail in &self.details {
            detail.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
