//! Values operator.
//!
//! Produces records from inline data without reading from storage. Each row
//! binds the operator's variables, in registration order.

use quiver_core::Value;

use crate::exec::context::ExecutionContext;
use crate::exec::operator::{BoxedOperator, OpType, Operator, OperatorBase, OperatorResult};
use crate::exec::plan::ExecutionPlan;
use crate::exec::record::Record;

/// Values operator - produces records from inline rows.
pub struct ValuesOp {
    /// Base operator state.
    base: OperatorBase,
    /// The rows to produce, one value per bound variable.
    rows: Vec<Vec<Value>>,
    /// Current row index.
    current: usize,
}

impl ValuesOp {
    /// Creates a new values operator.
    pub fn new<S: AsRef<str>>(
        plan: &ExecutionPlan,
        variables: &[S],
        rows: Vec<Vec<Value>>,
    ) -> OperatorResult<Self> {
        debug_assert!(
            rows.iter().all(|row| row.len() == variables.len()),
            "every row must bind each variable"
        );
        Ok(Self { base: OperatorBase::new(OpType::Values, plan, variables)?, rows, current: 0 })
    }

    /// Creates a values operator that produces nothing.
    pub fn empty<S: AsRef<str>>(plan: &ExecutionPlan, variables: &[S]) -> OperatorResult<Self> {
        Self::new(plan, variables, Vec::new())
    }

    fn next_row(&mut self) -> OperatorResult<Option<Record>> {
        let Some(row) = self.rows.get(self.current) else {
            return Ok(self.base.deplete());
        };
        self.current += 1;

        let mut record = self.base.plan().new_record()?;
        for (column, value) in self.base.columns().iter().zip(row) {
            record.set(*column, value.clone());
        }
        Ok(self.base.emit(record))
    }
}

impl Operator for ValuesOp {
    fn consume(&mut self, ctx: &ExecutionContext) -> OperatorResult<Option<Record>> {
        self.base.ensure_live()?;
        let started = self.base.start_timer(ctx);
        let result = self.next_row();
        self.base.stop_timer(started);
        result
    }

    fn reset(&mut self) -> OperatorResult<()> {
        self.current = 0;
        self.base.rewind();
        Ok(())
    }

    fn clone_op(&self, plan: &ExecutionPlan) -> OperatorResult<BoxedOperator> {
        Ok(Box::new(Self::new(plan, self.base.modifies(), self.rows.clone())?))
    }

    fn free(&mut self) {
        self.rows = Vec::new();
        self.base.set_freed();
    }

    fn base(&self) -> &OperatorBase {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::exec::context::ExecutionConfig;
    use crate::exec::operator::OperatorState;

    #[test]
    fn values_op_basic() {
        let plan = ExecutionPlan::new("q");
        let mut op = ValuesOp::new(
            &plan,
            &["x", "y"],
            vec![vec![Value::Int(1), Value::Int(2)], vec![Value::Int(3), Value::Int(4)]],
        )
        .unwrap();
        plan.seal().unwrap();

        let ctx = ExecutionContext::new();
        let row1 = op.consume(&ctx).unwrap().unwrap();
        assert_eq!(row1.get_by_name("x"), Some(&Value::Int(1)));
        assert_eq!(row1.get_by_name("y"), Some(&Value::Int(2)));

        let row2 = op.consume(&ctx).unwrap().unwrap();
        assert_eq!(row2.get(0), Some(&Value::Int(3)));

        assert!(op.consume(&ctx).unwrap().is_none());
        assert_eq!(op.state(), OperatorState::Depleted);
    }

    #[test]
    fn binds_only_its_columns() {
        let plan = ExecutionPlan::new("q");
        plan.register("other").unwrap();
        let mut op = ValuesOp::new(&plan, &["x"], vec![vec![Value::from("a")]]).unwrap();
        plan.seal().unwrap();

        let record = op.consume(&ExecutionContext::new()).unwrap().unwrap();
        assert_eq!(record.len(), 2);
        assert!(!record.is_bound(0));
        assert_eq!(record.get(1), Some(&Value::from("a")));
    }

    #[test]
    fn reset_replays() {
        let plan = ExecutionPlan::new("q");
        let mut op = ValuesOp::new(&plan, &["x"], vec![vec![Value::Int(1)]]).unwrap();
        let ctx = ExecutionContext::new();
        assert!(op.consume(&ctx).unwrap().is_some());
        assert!(op.consume(&ctx).unwrap().is_none());

        op.reset().unwrap();
        op.reset().unwrap();
        assert!(op.consume(&ctx).unwrap().is_some());
    }

    #[test]
    fn profiling_accumulates_consume_time() {
        let plan = ExecutionPlan::new("q");
        let rows = (0..50_000).map(|i| vec![Value::Int(i)]).collect();
        let mut op = ValuesOp::new(&plan, &["x"], rows).unwrap();
        plan.seal().unwrap();

        let ctx = ExecutionContext::new().with_config(ExecutionConfig::new().with_profiling());
        while op.consume(&ctx).unwrap().is_some() {}

        let profile = op.profile();
        assert_eq!(profile.records_produced, 50_000);
        assert!(profile.elapsed > Duration::ZERO);
    }

    #[test]
    fn no_time_recorded_without_profiling() {
        let plan = ExecutionPlan::new("q");
        let mut op = ValuesOp::new(&plan, &["x"], vec![vec![Value::Int(1)]]).unwrap();
        while op.consume(&ExecutionContext::new()).unwrap().is_some() {}
        assert_eq!(op.profile().elapsed, Duration::ZERO);
    }

    #[test]
    fn empty_produces_nothing() {
        let plan = ExecutionPlan::new("q");
        let mut op = ValuesOp::empty(&plan, &["x"]).unwrap();
        assert!(op.consume(&ExecutionContext::new()).unwrap().is_none());
    }
}
