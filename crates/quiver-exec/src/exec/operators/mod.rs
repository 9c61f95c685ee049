//! Concrete operator implementations.
//!
//! # Operator Categories
//!
//! - **Argument taps**: [`argument_list`] - Replays records injected by an enclosing scope
//! - **Inline data**: [`values`] - Records from literal rows
//! - **Stream concatenation**: [`join`] - `UNION ALL` over several streams
//! - **Correlated joins**: [`apply`] - Drives a parameterized branch per outer record

pub mod apply;
pub mod argument_list;
pub mod join;
pub mod values;

// Re-exports for convenience
pub use apply::{ApplyOp, ApplyState};
pub use argument_list::ArgumentListOp;
pub use join::JoinOp;
pub use values::ValuesOp;
