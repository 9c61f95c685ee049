//! Operator trait and base types.
//!
//! This module defines the [`Operator`] trait that all execution operators
//! implement, and the [`OperatorBase`] every operator embeds.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{ExecError, ExecResult};

use super::context::ExecutionContext;
use super::operators::argument_list::ArgumentListOp;
use super::plan::ExecutionPlan;
use super::profile::OperatorProfile;
use super::record::Record;

/// Result type for operator operations.
pub type OperatorResult<T> = ExecResult<T>;

/// A boxed operator for dynamic dispatch.
pub type BoxedOperator = Box<dyn Operator>;

/// Operator type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpType {
    /// Replays a pre-materialized batch of records.
    ArgumentList,
    /// Produces records from inline values.
    Values,
    /// Concatenates several streams.
    Join,
    /// Correlated nested-loop join.
    Apply,
    /// An operator defined outside this crate, such as a storage-backed
    /// scan or expand, tagged with its own display name.
    Custom(&'static str),
}

impl OpType {
    /// Display name used in profiles and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ArgumentList => "Argument List",
            Self::Values => "Values",
            Self::Join => "Join",
            Self::Apply => "Apply",
            Self::Custom(name) => name,
        }
    }
}

/// The lifecycle state of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorState {
    /// Constructed or reset; nothing consumed yet.
    Created,
    /// At least one record has been produced in the current pass.
    Streaming,
    /// `consume` returned the depletion sentinel.
    Depleted,
    /// `free` has released the operator's resources.
    Freed,
}

impl OperatorState {
    /// Returns true if the operator has depleted.
    #[must_use]
    pub const fn is_depleted(self) -> bool {
        matches!(self, Self::Depleted)
    }

    /// Returns true if the operator has been freed.
    #[must_use]
    pub const fn is_freed(self) -> bool {
        matches!(self, Self::Freed)
    }
}

/// The operator trait for pull-based query execution.
///
/// Operators are organized in a tree. The root's `consume()` recursively
/// pulls from its children until a record reaches the caller; records flow
/// from the leaves up, gaining bindings in the operators that produce them.
///
/// # Lifecycle
///
/// 1. **Construct**: the constructor registers the operator's variables with
///    the plan, in order, fixing their column indices.
/// 2. **Consume**: returns one record, or `None` once depleted. Depletion is
///    sticky until `reset()`.
/// 3. **Reset**: rewinds runtime state so a new pass starts from the
///    beginning. Configuration and registrations are untouched.
/// 4. **Clone**: `clone_op` yields an independent instance with identical
///    configuration and fresh runtime state.
/// 5. **Free**: releases held records and frees children exactly once.
///    Dropping the operator has the same effect.
///
/// # Thread Safety
///
/// Operators are `Send` so clones can be driven on worker threads. They are
/// not `Sync`: runtime state is never shared between an operator and its
/// clone.
pub trait Operator: Send {
    /// Returns the next record, or `None` when depleted.
    fn consume(&mut self, ctx: &ExecutionContext) -> OperatorResult<Option<Record>>;

    /// Rewinds the operator (and its children) to the start of a pass.
    ///
    /// Must be safe to call repeatedly, including before any `consume`.
    fn reset(&mut self) -> OperatorResult<()>;

    /// Returns a fresh instance bound to `plan` with the same configuration.
    fn clone_op(&self, plan: &ExecutionPlan) -> OperatorResult<BoxedOperator>;

    /// Releases held records and frees children. Idempotent.
    fn free(&mut self);

    /// Returns the shared base state.
    fn base(&self) -> &OperatorBase;

    /// Number of child operators.
    fn child_count(&self) -> usize {
        0
    }

    /// Returns the child at `index`.
    fn child(&self, _index: usize) -> Option<&BoxedOperator> {
        None
    }

    /// Returns the child at `index` mutably.
    fn child_mut(&mut self, _index: usize) -> Option<&mut BoxedOperator> {
        None
    }

    /// Returns true if argument taps under child `index` are bound by this
    /// operator rather than by an enclosing one.
    fn binds_arguments_of(&self, _index: usize) -> bool {
        false
    }

    /// Downcasts to an argument list.
    fn as_argument_list(&self) -> Option<&ArgumentListOp> {
        None
    }

    /// Downcasts to an argument list mutably.
    fn as_argument_list_mut(&mut self) -> Option<&mut ArgumentListOp> {
        None
    }

    /// Returns the operator type tag.
    fn op_type(&self) -> OpType {
        self.base().op_type()
    }

    /// Returns the display name.
    fn name(&self) -> &'static str {
        self.base().name()
    }

    /// Variables this operator binds, in column registration order.
    fn modifies(&self) -> &[Arc<str>] {
        self.base().modifies()
    }

    /// Returns the current lifecycle state.
    fn state(&self) -> OperatorState {
        self.base().state()
    }

    /// Builds the profile tree rooted at this operator.
    fn profile(&self) -> OperatorProfile {
        let children = (0..self.child_count())
            .filter_map(|i| self.child(i))
            .map(|child| child.profile())
            .collect();
        OperatorProfile {
            name: self.name(),
            records_produced: self.base().records_produced(),
            elapsed: self.base().elapsed(),
            children,
        }
    }
}

/// State shared by every operator.
#[derive(Debug)]
pub struct OperatorBase {
    op_type: OpType,
    /// The plan this operator is bound to.
    plan: ExecutionPlan,
    /// Variables bound by this operator, in registration order.
    modifies: Vec<Arc<str>>,
    /// Column index of each entry in `modifies`.
    columns: Vec<usize>,
    state: OperatorState,
    /// Records produced across all passes.
    records_produced: u64,
    /// Wall time spent in `consume`, when profiling.
    elapsed: Duration,
}

impl OperatorBase {
    /// Creates the base state, registering each variable with the plan in
    /// the given order.
    pub fn new<S: AsRef<str>>(
        op_type: OpType,
        plan: &ExecutionPlan,
        variables: &[S],
    ) -> ExecResult<Self> {
        let mut modifies = Vec::with_capacity(variables.len());
        let mut columns = Vec::with_capacity(variables.len());
        for variable in variables {
            let variable = variable.as_ref();
            columns.push(plan.register(variable)?);
            modifies.push(Arc::from(variable));
        }
        Ok(Self {
            op_type,
            plan: plan.clone(),
            modifies,
            columns,
            state: OperatorState::Created,
            records_produced: 0,
            elapsed: Duration::ZERO,
        })
    }

    /// Returns the operator type tag.
    #[must_use]
    pub const fn op_type(&self) -> OpType {
        self.op_type
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.op_type.name()
    }

    /// Returns the plan this operator is bound to.
    #[must_use]
    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    /// Variables bound by this operator.
    #[must_use]
    pub fn modifies(&self) -> &[Arc<str>] {
        &self.modifies
    }

    /// Column indices of the bound variables, parallel to `modifies`.
    #[must_use]
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// Column index of a variable this operator binds.
    #[must_use]
    pub fn column_of(&self, variable: &str) -> Option<usize> {
        self.modifies.iter().position(|v| v.as_ref() == variable).map(|i| self.columns[i])
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> OperatorState {
        self.state
    }

    /// Errors if the operator has been freed.
    pub fn ensure_live(&self) -> ExecResult<()> {
        if self.state.is_freed() {
            return Err(ExecError::OperatorFreed { operator: self.name() });
        }
        Ok(())
    }

    /// Counts a produced record and hands it back.
    pub fn emit(&mut self, record: Record) -> Option<Record> {
        self.state = OperatorState::Streaming;
        self.records_produced += 1;
        Some(record)
    }

    /// Marks the operator depleted and returns the depletion sentinel.
    pub fn deplete(&mut self) -> Option<Record> {
        self.state = OperatorState::Depleted;
        None
    }

    /// Returns to the start-of-pass state. Freed operators stay freed.
    pub fn rewind(&mut self) {
        if !self.state.is_freed() {
            self.state = OperatorState::Created;
        }
    }

    /// Marks the operator freed.
    pub fn set_freed(&mut self) {
        self.state = OperatorState::Freed;
    }

    /// Number of records produced across all passes.
    #[must_use]
    pub const fn records_produced(&self) -> u64 {
        self.records_produced
    }

    /// Starts a consume timer when the context has profiling enabled.
    #[must_use]
    pub fn start_timer(&self, ctx: &ExecutionContext) -> Option<Instant> {
        ctx.profiling().then(Instant::now)
    }

    /// Accumulates the time since `started`.
    pub fn stop_timer(&mut self, started: Option<Instant>) {
        if let Some(started) = started {
            self.elapsed += started.elapsed();
        }
    }

    /// Wall time accumulated in `consume`.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
