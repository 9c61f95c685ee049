//! Query execution runtime.
//!
//! This module provides the operator contract and the operators that run
//! compiled graph-query plans.
//!
//! # Architecture
//!
//! The runtime uses a **pull-based iterator model**: each operator
//! implements the [`Operator`] trait and hands out one [`Record`] per
//! `consume()` call, or `None` once depleted. Data flows from the leaves of
//! the plan tree to the root. Operators are built against an
//! [`ExecutionPlan`], which assigns every variable a fixed column index.
//!
//! # Modules
//!
//! - [`context`] - Execution context (cancellation, stats, configuration)
//! - [`plan`] - Plan handle and variable registry
//! - [`record`] - Record and layout types
//! - [`operator`] - Operator trait and base types
//! - [`operators`] - Concrete operator implementations
//! - [`profile`] - Per-operator profiling output
//! - [`result`] - Query result types
//! - [`executor`] - Executor that drives an operator tree
//!
//! # Example
//!
//! ```
//! use quiver_core::Value;
//! use quiver_exec::exec::operators::{JoinOp, ValuesOp};
//! use quiver_exec::exec::{BoxedOperator, ExecutionContext, ExecutionPlan, Executor};
//!
//! let plan = ExecutionPlan::new("union");
//! let left = ValuesOp::new(&plan, &["x"], vec![vec![Value::Int(1)]])?;
//! let right = ValuesOp::new(&plan, &["x"], vec![vec![Value::Int(2)]])?;
//! let streams: Vec<BoxedOperator> = vec![Box::new(left), Box::new(right)];
//! let join = JoinOp::new(&plan, &["x"], streams)?;
//!
//! let mut executor = Executor::new(plan, Box::new(join), ExecutionContext::new())?;
//! while let Some(record) = executor.next()? {
//!     println!("{:?}", record.get_by_name("x"));
//! }
//! # Ok::<(), quiver_exec::ExecError>(())
//! ```

pub mod context;
pub mod executor;
pub mod operator;
pub mod operators;
pub mod plan;
pub mod profile;
pub mod record;
pub mod result;

// Re-exports
pub use context::{CancellationToken, ExecutionConfig, ExecutionContext, ExecutionStats};
pub use executor::Executor;
pub use operator::{BoxedOperator, OpType, Operator, OperatorBase, OperatorResult, OperatorState};
pub use plan::{ExecutionPlan, PlanId};
pub use profile::OperatorProfile;
pub use record::{ColumnMap, Record, Schema};
pub use result::ResultSet;
