//! Argument list operator for parameterized sub-plans.
//!
//! The argument list is the injection point through which rows from an
//! enclosing scope enter a sub-plan. A caller installs a pre-materialized
//! batch with [`ArgumentListOp::add_record_list`]; the operator then hands
//! the records out one per `consume()` call.
//!
//! # Usage
//!
//! For a correlated subquery like:
//!
//! ```cypher
//! MATCH (p:Person)
//! CALL {
//!   WITH p
//!   MATCH (p)-[:KNOWS]->(friend)
//!   RETURN friend
//! }
//! RETURN p, friend
//! ```
//!
//! the inner branch has an `ArgumentListOp` at its leaf. For each outer row
//! the enclosing [`ApplyOp`](super::apply::ApplyOp) resets the inner branch
//! and installs the row, and the expand above the tap sees `p` as though it
//! came from a scan.
//!
//! # Replay order
//!
//! The batch is a stack: records are popped from the end, so they are
//! replayed in the reverse of insertion order.

use tracing::trace;

use crate::error::ExecError;
use crate::exec::context::ExecutionContext;
use crate::exec::operator::{BoxedOperator, OpType, Operator, OperatorBase, OperatorResult};
use crate::exec::plan::ExecutionPlan;
use crate::exec::record::Record;

/// Argument list operator.
///
/// Holds at most one installed batch at a time. Installing a batch while
/// another is still installed is a contract violation; `reset()` drops any
/// remaining records and returns to the empty state.
pub struct ArgumentListOp {
    /// Base operator state.
    base: OperatorBase,
    /// The installed batch, consumed from the end.
    record_list: Option<Vec<Record>>,
}

impl ArgumentListOp {
    /// Creates a new argument list operator.
    ///
    /// # Arguments
    ///
    /// * `plan` - The plan to bind the operator to
    /// * `variables` - The variables carried by injected records, registered
    ///   with the plan in order
    pub fn new<S: AsRef<str>>(plan: &ExecutionPlan, variables: &[S]) -> OperatorResult<Self> {
        Ok(Self {
            base: OperatorBase::new(OpType::ArgumentList, plan, variables)?,
            record_list: None,
        })
    }

    /// Installs a batch of records to replay.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::ArgumentListPopulated`] if a batch is already
    /// installed and has not been cleared by `reset()`.
    pub fn add_record_list(&mut self, record_list: Vec<Record>) -> OperatorResult<()> {
        self.base.ensure_live()?;
        if self.record_list.is_some() {
            return Err(ExecError::ArgumentListPopulated);
        }
        trace!(records = record_list.len(), "argument list batch installed");
        self.record_list = Some(record_list);
        Ok(())
    }

    /// Installs a single-record batch.
    pub fn add_record(&mut self, record: Record) -> OperatorResult<()> {
        self.add_record_list(vec![record])
    }

    /// Returns true while a batch is installed, even an exhausted one.
    #[must_use]
    pub fn has_batch(&self) -> bool {
        self.record_list.is_some()
    }

    /// Number of records still waiting to be consumed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.record_list.as_ref().map_or(0, Vec::len)
    }
}

impl Operator for ArgumentListOp {
    fn consume(&mut self, ctx: &ExecutionContext) -> OperatorResult<Option<Record>> {
        self.base.ensure_live()?;
        let started = self.base.start_timer(ctx);
        let record = match self.record_list.as_mut().and_then(Vec::pop) {
            Some(record) => self.base.emit(record),
            None => self.base.deplete(),
        };
        self.base.stop_timer(started);
        Ok(record)
    }

    fn reset(&mut self) -> OperatorResult<()> {
        self.record_list = None;
        self.base.rewind();
        Ok(())
    }

    fn clone_op(&self, plan: &ExecutionPlan) -> OperatorResult<BoxedOperator> {
        Ok(Box::new(Self::new(plan, self.base.modifies())?))
    }

    fn free(&mut self) {
        self.record_list = None;
        self.base.set_freed();
    }

    fn base(&self) -> &OperatorBase {
        &self.base
    }

    fn as_argument_list(&self) -> Option<&ArgumentListOp> {
        Some(self)
    }

    fn as_argument_list_mut(&mut self) -> Option<&mut ArgumentListOp> {
        Some(self)
    }
}
