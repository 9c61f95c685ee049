//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use quiver_core::Value;
use quiver_exec::exec::operators::{ArgumentListOp, ValuesOp};
use quiver_exec::exec::{
    BoxedOperator, ExecutionContext, ExecutionPlan, OpType, Operator, OperatorBase,
    OperatorResult, Record,
};

/// Adjacency used by [`ExpandOp`]: key value to the values reachable from it.
pub type Adjacency = Arc<HashMap<i64, Vec<i64>>>;

/// Builds an adjacency table from literal entries.
pub fn adjacency(entries: &[(i64, &[i64])]) -> Adjacency {
    Arc::new(entries.iter().map(|(k, v)| (*k, v.to_vec())).collect())
}

/// Expands every input record into one record per neighbour of its key
/// column, binding the neighbour into the output column.
///
/// Stands in for a storage-backed expand so inner branches can produce a
/// different number of records for each bound outer record.
pub struct ExpandOp {
    base: OperatorBase,
    input: BoxedOperator,
    key: String,
    key_column: usize,
    adjacency: Adjacency,
    pending: Vec<Record>,
}

impl ExpandOp {
    pub fn boxed(
        plan: &ExecutionPlan,
        input: BoxedOperator,
        key: &str,
        out: &str,
        adjacency: Adjacency,
    ) -> BoxedOperator {
        let key_column = plan.register(key).unwrap();
        let base = OperatorBase::new(OpType::Custom("Expand"), plan, &[out]).unwrap();
        Box::new(Self {
            base,
            input,
            key: key.to_string(),
            key_column,
            adjacency,
            pending: Vec::new(),
        })
    }

    fn expand(&mut self, ctx: &ExecutionContext) -> OperatorResult<Option<Record>> {
        loop {
            if let Some(record) = self.pending.pop() {
                return Ok(self.base.emit(record));
            }
            let Some(input) = self.input.consume(ctx)? else {
                return Ok(self.base.deplete());
            };
            let out = self.base.columns()[0];
            let key = input.get(self.key_column).and_then(Value::as_int);
            let neighbours = key.and_then(|k| self.adjacency.get(&k)).into_iter().flatten();
            for neighbour in neighbours.rev() {
                let mut record = input.clone();
                record.set(out, Value::Int(*neighbour));
                self.pending.push(record);
            }
        }
    }
}

impl Operator for ExpandOp {
    fn consume(&mut self, ctx: &ExecutionContext) -> OperatorResult<Option<Record>> {
        self.base.ensure_live()?;
        let started = self.base.start_timer(ctx);
        let result = self.expand(ctx);
        self.base.stop_timer(started);
        result
    }

    fn reset(&mut self) -> OperatorResult<()> {
        self.pending.clear();
        self.base.rewind();
        self.input.reset()
    }

    fn clone_op(&self, plan: &ExecutionPlan) -> OperatorResult<BoxedOperator> {
        let out = self.base.modifies()[0].to_string();
        let input = self.input.clone_op(plan)?;
        Ok(Self::boxed(plan, input, &self.key, &out, Arc::clone(&self.adjacency)))
    }

    fn free(&mut self) {
        self.pending.clear();
        self.input.free();
        self.base.set_freed();
    }

    fn base(&self) -> &OperatorBase {
        &self.base
    }

    fn child_count(&self) -> usize {
        1
    }

    fn child(&self, index: usize) -> Option<&BoxedOperator> {
        (index == 0).then_some(&self.input)
    }

    fn child_mut(&mut self, index: usize) -> Option<&mut BoxedOperator> {
        (index == 0).then_some(&mut self.input)
    }
}

/// A values operator binding `var` to each integer in `items`.
pub fn ints(plan: &ExecutionPlan, var: &str, items: &[i64]) -> BoxedOperator {
    let rows = items.iter().map(|i| vec![Value::Int(*i)]).collect();
    Box::new(ValuesOp::new(plan, &[var], rows).unwrap())
}

/// A values operator binding `var` to each string in `items`.
pub fn strings(plan: &ExecutionPlan, var: &str, items: &[&str]) -> BoxedOperator {
    let rows = items.iter().map(|s| vec![Value::from(*s)]).collect();
    Box::new(ValuesOp::new(plan, &[var], rows).unwrap())
}

/// An argument tap carrying `vars`.
pub fn tap(plan: &ExecutionPlan, vars: &[&str]) -> BoxedOperator {
    Box::new(ArgumentListOp::new(plan, vars).unwrap())
}

/// Drains `op`, reading `var` from each record as an integer.
pub fn drain_ints(op: &mut dyn Operator, ctx: &ExecutionContext, var: &str) -> Vec<i64> {
    let mut out = Vec::new();
    while let Some(record) = op.consume(ctx).unwrap() {
        out.push(record.get_by_name(var).and_then(Value::as_int).unwrap());
    }
    out
}

/// Drains `op`, reading `var` from each record as a string.
pub fn drain_strings(op: &mut dyn Operator, ctx: &ExecutionContext, var: &str) -> Vec<String> {
    let mut out = Vec::new();
    while let Some(record) = op.consume(ctx).unwrap() {
        out.push(record.get_by_name(var).and_then(Value::as_str).unwrap().to_string());
    }
    out
}
