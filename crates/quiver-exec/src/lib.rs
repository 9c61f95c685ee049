//! Quiver Exec
//!
//! This crate provides the pull-based operator runtime that executes
//! compiled graph-query plans.
//!
//! # Overview
//!
//! A plan is a tree of operators. Each call to `consume()` on the root pulls
//! records up from the leaves; an operator returns `None` once it has no
//! more records for the current pass, and stays depleted until reset.
//!
//! The crate provides:
//!
//! - **Argument List**: the injection point through which records from an
//!   enclosing scope enter a parameterized sub-plan
//! - **Join**: concatenation of several streams, optionally remapped into a
//!   single layout
//! - **Apply**: a correlated nested-loop join that drives an argument list
//!   once per outer record
//!
//! # Modules
//!
//! - [`exec`] - Operator contract, operators and executor
//! - [`error`] - Error types for execution

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod exec;

pub use error::{ExecError, ExecResult};
pub use exec::{
    BoxedOperator, ExecutionConfig, ExecutionContext, ExecutionPlan, Executor, Operator, Record,
};
