//! Per-operator execution profile.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Records produced and time spent by one operator and its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorProfile {
    /// Operator display name.
    pub name: &'static str,
    /// Records produced across all passes.
    pub records_produced: u64,
    /// Wall time spent in `consume`; zero unless profiling was enabled.
    pub elapsed: Duration,
    /// Profiles of the child operators, in child order.
    pub children: Vec<OperatorProfile>,
}

impl OperatorProfile {
    /// Finds the first operator with `name` in pre-order.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&OperatorProfile> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{} | Records produced: {}, Execution time: {:.6} ms",
            "",
            self.name,
            self.records_produced,
            self.elapsed.as_secs_f64() * 1000.0,
            indent = depth * 4
        )?;
        for child in &self.children {
            child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for OperatorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
