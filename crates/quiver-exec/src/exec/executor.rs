//! Main query executor.
//!
//! This module provides the [`Executor`] that drives an operator tree and
//! hands its records to the caller.

use std::sync::Arc;

use tracing::debug;

use super::context::ExecutionContext;
use super::operator::{BoxedOperator, OperatorResult, OperatorState};
use super::plan::ExecutionPlan;
use super::profile::OperatorProfile;
use super::record::{Record, Schema};
use super::result::ResultSet;

/// The main query executor.
///
/// Owns the root operator of a plan together with the context every
/// `consume()` call receives. Building the executor seals the plan, so the
/// layout is fixed before the first record is produced.
pub struct Executor {
    /// The plan the operator tree was built against.
    plan: ExecutionPlan,
    /// The root operator of the tree.
    root: BoxedOperator,
    /// Execution context.
    ctx: ExecutionContext,
    /// The sealed plan layout.
    layout: Arc<Schema>,
}

impl Executor {
    /// Creates a new executor, sealing `plan`.
    pub fn new(
        plan: ExecutionPlan,
        root: BoxedOperator,
        ctx: ExecutionContext,
    ) -> OperatorResult<Self> {
        let layout = plan.seal()?;
        Ok(Self { plan, root, ctx, layout })
    }

    /// Returns the output layout.
    #[must_use]
    pub fn schema(&self) -> Arc<Schema> {
        Arc::clone(&self.layout)
    }

    /// Returns the plan.
    #[must_use]
    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    /// Returns the next record, or `None` if there are no more records.
    pub fn next(&mut self) -> OperatorResult<Option<Record>> {
        // Check for cancellation
        if self.ctx.is_cancelled() {
            return Ok(None);
        }

        let record = self.root.consume(&self.ctx)?;

        // Update stats
        if record.is_some() {
            self.ctx.record_records_produced(1);
        }

        Ok(record)
    }

    /// Rewinds the tree so the next call to [`next`](Self::next) starts a
    /// new pass.
    pub fn reset(&mut self) -> OperatorResult<()> {
        self.root.reset()
    }

    /// Releases the operator tree.
    pub fn free(&mut self) {
        self.root.free();
    }

    /// Returns the execution context.
    #[must_use]
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// Returns the current state of the root operator.
    #[must_use]
    pub fn state(&self) -> OperatorState {
        self.root.state()
    }

    /// Returns the root operator.
    #[must_use]
    pub fn root(&self) -> &BoxedOperator {
        &self.root
    }

    /// Returns the per-operator profile of the tree.
    #[must_use]
    pub fn profile(&self) -> OperatorProfile {
        self.root.profile()
    }

    /// Creates an independent executor over a clone of the operator tree.
    ///
    /// The fork shares the plan layout and the cancellation token; runtime
    /// state and statistics are its own.
    pub fn fork(&self) -> OperatorResult<Self> {
        let root = self.root.clone_op(&self.plan)?;
        debug!(plan = self.plan.name(), "executor forked");
        Self::new(self.plan.clone(), root, self.ctx.fork())
    }

    /// Executes the plan and collects all records.
    pub fn execute(&mut self) -> OperatorResult<ResultSet> {
        let mut result = ResultSet::new(self.schema());
        while let Some(record) = self.next()? {
            result.push(record);
        }
        debug!(records = result.len(), "execution finished");
        Ok(result)
    }

    /// Counts the records without keeping them.
    pub fn count(&mut self) -> OperatorResult<usize> {
        let mut count = 0;
        while self.next()?.is_some() {
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use quiver_core::Value;

    use super::*;
    use crate::exec::context::ExecutionConfig;
    use crate::exec::operators::{JoinOp, ValuesOp};

    fn union_executor(ctx: ExecutionContext) -> Executor {
        let plan = ExecutionPlan::new("union");
        let left = ValuesOp::new(&plan, &["v"], vec![vec![Value::Int(1)], vec![Value::Int(2)]])
            .unwrap();
        let right = ValuesOp::new(&plan, &["v"], vec![vec![Value::Int(3)]]).unwrap();
        let streams: Vec<BoxedOperator> = vec![Box::new(left), Box::new(right)];
        let join = JoinOp::new(&plan, &["v"], streams).unwrap();
        Executor::new(plan, Box::new(join), ctx).unwrap()
    }

    #[test]
    fn execute_collects_and_counts() {
        let mut executor = union_executor(ExecutionContext::new());
        assert!(executor.plan().is_sealed());

        let result = executor.execute().unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result.columns(), vec!["v"]);
        assert_eq!(executor.context().stats().records_produced(), 3);
        assert!(executor.state().is_depleted());
    }

    #[test]
    fn reset_starts_a_new_pass() {
        let mut executor = union_executor(ExecutionContext::new());
        assert_eq!(executor.count().unwrap(), 3);
        assert_eq!(executor.count().unwrap(), 0);
        executor.reset().unwrap();
        assert_eq!(executor.count().unwrap(), 3);
    }

    #[test]
    fn stats_can_be_disabled() {
        let ctx = ExecutionContext::new().with_config(ExecutionConfig::new().without_stats());
        let mut executor = union_executor(ctx);
        assert_eq!(executor.count().unwrap(), 3);
        assert_eq!(executor.context().stats().records_produced(), 0);
    }

    #[test]
    fn cancelled_executor_stops() {
        let mut executor = union_executor(ExecutionContext::new());
        assert!(executor.next().unwrap().is_some());
        executor.context().cancel();
        assert!(executor.next().unwrap().is_none());
    }

    #[test]
    fn fork_is_independent_but_shares_cancellation() {
        let mut executor = union_executor(ExecutionContext::new());
        assert!(executor.next().unwrap().is_some());

        let mut fork = executor.fork().unwrap();
        assert_eq!(fork.count().unwrap(), 3);
        assert_eq!(executor.count().unwrap(), 2);
        assert_eq!(fork.context().stats().records_produced(), 3);

        fork.reset().unwrap();
        executor.context().cancel();
        assert!(fork.next().unwrap().is_none());
    }

    #[test]
    fn profile_reports_tree() {
        let ctx = ExecutionContext::new().with_config(ExecutionConfig::new().with_profiling());
        let mut executor = union_executor(ctx);
        executor.execute().unwrap();

        let profile = executor.profile();
        assert_eq!(profile.name, "Join");
        assert_eq!(profile.records_produced, 3);
        assert_eq!(profile.children.len(), 2);
        assert_eq!(profile.children[0].records_produced, 2);
        assert_eq!(profile.children[1].records_produced, 1);
    }

    #[test]
    fn free_blocks_further_consumption() {
        let mut executor = union_executor(ExecutionContext::new());
        executor.free();
        executor.free();
        assert!(executor.next().is_err());
    }
}
