//! Error types for plan construction and execution.
//!
//! Depletion is not an error: operators signal it with `Ok(None)`. Every
//! variant here is a contract violation that aborts the plan.

use thiserror::Error;

/// Errors raised by the execution runtime.
#[derive(Debug, Error)]
pub enum ExecError {
    /// A batch was installed into an argument list that still holds one.
    #[error("tried to insert into a populated argument list")]
    ArgumentListPopulated,

    /// A correlated operator's inner branch contains no argument tap.
    #[error("{operator}: inner branch has no argument list tap")]
    MissingArgumentTap {
        /// The operator that required the tap.
        operator: &'static str,
    },

    /// Two records with different column layouts were merged.
    #[error("cannot merge records with different layouts: [{left}] and [{right}]")]
    LayoutMismatch {
        /// Columns of the receiving record.
        left: String,
        /// Columns of the merged-in record.
        right: String,
    },

    /// `consume` was called on an operator after `free`.
    #[error("{operator}: operator consumed after free")]
    OperatorFreed {
        /// The operator name.
        operator: &'static str,
    },

    /// A variable was registered after the plan layout was sealed.
    #[error("cannot register variable '{variable}': plan layout is sealed")]
    PlanSealed {
        /// The variable being registered.
        variable: String,
    },

    /// The plan's variable registry lock was poisoned.
    #[error("plan registry lock poisoned")]
    LockPoisoned,
}

impl ExecError {
    /// Builds a [`ExecError::LayoutMismatch`] from two column lists.
    #[must_use]
    pub fn layout_mismatch(left: &[&str], right: &[&str]) -> Self {
        Self::LayoutMismatch { left: left.join(", "), right: right.join(", ") }
    }
}

/// Result type for execution operations.
pub type ExecResult<T> = Result<T, ExecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ExecError::MissingArgumentTap { operator: "Apply" };
        assert_eq!(err.to_string(), "Apply: inner branch has no argument list tap");

        let err = ExecError::layout_mismatch(&["a", "b"], &["c"]);
        assert!(err.to_string().contains("[a, b] and [c]"));
    }
}
