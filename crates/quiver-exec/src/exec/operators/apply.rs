//! Apply operator - correlated nested-loop join.
//!
//! Apply drives a parameterized inner branch once per record of its bound
//! branch, similar to a SQL `LATERAL` join or a Cypher `CALL { WITH ... }`.
//!
//! # Semantics
//!
//! For each record from the bound (outer) branch:
//! 1. Reset the inner branch
//! 2. Install the outer record into the inner branch's argument tap
//! 3. Merge the outer record with each inner result and return it
//!
//! If the inner branch yields nothing for an outer record, that record does
//! not appear in the output (INNER JOIN semantics).
//!
//! # Argument tap
//!
//! The tap is the [`ArgumentListOp`] leaf of the inner branch. Apply finds it
//! at construction by walking the inner tree, and stores the child-index path
//! to it rather than a reference. The walk never enters the inner branch of
//! a nested Apply, whose tap belongs to that Apply.

use tracing::{debug, trace};

use crate::error::ExecError;
use crate::exec::context::ExecutionContext;
use crate::exec::operator::{BoxedOperator, OpType, Operator, OperatorBase, OperatorResult};
use crate::exec::operators::argument_list::ArgumentListOp;
use crate::exec::plan::ExecutionPlan;
use crate::exec::record::Record;

/// Child index of the bound branch.
const BOUND: usize = 0;
/// Child index of the inner branch.
const INNER: usize = 1;

/// Where an Apply is in its nested loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyState {
    /// No outer record is held; the next consume pulls one.
    AwaitingOuter,
    /// An outer record is bound into the tap and the inner branch is live.
    DrivingInner,
    /// The bound branch is exhausted.
    Depleted,
}

/// Apply operator.
pub struct ApplyOp {
    /// Base operator state.
    base: OperatorBase,
    /// Outer branch.
    bound: BoxedOperator,
    /// Inner branch, parameterized by the tap.
    rhs: BoxedOperator,
    /// Child indices leading from `rhs` to its argument tap.
    tap_path: Vec<usize>,
    /// The outer record currently driving the inner branch.
    record: Option<Record>,
    state: ApplyState,
}

impl ApplyOp {
    /// Creates a new apply operator.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::MissingArgumentTap`] if `rhs` contains no
    /// argument list outside of nested Apply inner branches.
    pub fn new(
        plan: &ExecutionPlan,
        bound: BoxedOperator,
        rhs: BoxedOperator,
    ) -> OperatorResult<Self> {
        let tap_path = find_tap_path(&*rhs).ok_or(ExecError::MissingArgumentTap {
            operator: OpType::Apply.name(),
        })?;
        debug!(depth = tap_path.len(), "apply located argument tap");
        Ok(Self {
            base: OperatorBase::new::<&str>(OpType::Apply, plan, &[])?,
            bound,
            rhs,
            tap_path,
            record: None,
            state: ApplyState::AwaitingOuter,
        })
    }

    /// Returns the nested-loop state.
    #[must_use]
    pub fn apply_state(&self) -> ApplyState {
        self.state
    }

    /// Child indices from the inner branch root to the tap.
    #[must_use]
    pub fn tap_path(&self) -> &[usize] {
        &self.tap_path
    }

    /// The argument tap of the inner branch.
    #[must_use]
    pub fn argument_tap(&self) -> Option<&ArgumentListOp> {
        let mut op = &self.rhs;
        for &index in &self.tap_path {
            op = op.child(index)?;
        }
        op.as_argument_list()
    }

    /// The argument tap of the inner branch, mutably.
    pub fn argument_tap_mut(&mut self) -> Option<&mut ArgumentListOp> {
        locate_tap(&mut self.rhs, &self.tap_path)
    }

    /// Starts the inner branch over for `outer`.
    fn bind_outer(&mut self, outer: Record) -> OperatorResult<()> {
        // Reset before installing: resetting the tap drops its batch.
        self.rhs.reset()?;
        let tap = locate_tap(&mut self.rhs, &self.tap_path)
            .ok_or(ExecError::MissingArgumentTap { operator: OpType::Apply.name() })?;
        tap.add_record(outer.clone())?;
        trace!("apply bound outer record");
        self.record = Some(outer);
        self.state = ApplyState::DrivingInner;
        Ok(())
    }

    fn pull(&mut self, ctx: &ExecutionContext) -> OperatorResult<Option<Record>> {
        loop {
            if ctx.is_cancelled() {
                debug!("apply observed cancellation");
                ctx.record_cancelled_consume();
                self.record = None;
                self.state = ApplyState::Depleted;
                return Ok(self.base.deplete());
            }

            match self.state {
                ApplyState::Depleted => return Ok(self.base.deplete()),
                ApplyState::AwaitingOuter => match self.bound.consume(ctx)? {
                    Some(outer) => self.bind_outer(outer)?,
                    None => {
                        debug!("apply bound branch depleted");
                        self.state = ApplyState::Depleted;
                        return Ok(self.base.deplete());
                    }
                },
                ApplyState::DrivingInner => match self.rhs.consume(ctx)? {
                    Some(inner) => {
                        if ctx.is_cancelled() {
                            continue;
                        }
                        let Some(outer) = &self.record else {
                            self.state = ApplyState::AwaitingOuter;
                            continue;
                        };
                        let mut merged = outer.clone();
                        merged.merge(inner)?;
                        return Ok(self.base.emit(merged));
                    }
                    None => {
                        trace!("apply inner branch depleted for outer record");
                        self.record = None;
                        self.state = ApplyState::AwaitingOuter;
                    }
                },
            }
        }
    }
}

impl Operator for ApplyOp {
    fn consume(&mut self, ctx: &ExecutionContext) -> OperatorResult<Option<Record>> {
        self.base.ensure_live()?;
        let started = self.base.start_timer(ctx);
        let result = self.pull(ctx);
        self.base.stop_timer(started);
        result
    }

    fn reset(&mut self) -> OperatorResult<()> {
        self.record = None;
        self.state = ApplyState::AwaitingOuter;
        self.bound.reset()?;
        self.rhs.reset()?;
        self.base.rewind();
        Ok(())
    }

    fn clone_op(&self, plan: &ExecutionPlan) -> OperatorResult<BoxedOperator> {
        let bound = self.bound.clone_op(plan)?;
        let rhs = self.rhs.clone_op(plan)?;
        Ok(Box::new(Self::new(plan, bound, rhs)?))
    }

    fn free(&mut self) {
        self.record = None;
        self.bound.free();
        self.rhs.free();
        self.base.set_freed();
    }

    fn base(&self) -> &OperatorBase {
        &self.base
    }

    fn child_count(&self) -> usize {
        2
    }

    fn child(&self, index: usize) -> Option<&BoxedOperator> {
        match index {
            BOUND => Some(&self.bound),
            INNER => Some(&self.rhs),
            _ => None,
        }
    }

    fn child_mut(&mut self, index: usize) -> Option<&mut BoxedOperator> {
        match index {
            BOUND => Some(&mut self.bound),
            INNER => Some(&mut self.rhs),
            _ => None,
        }
    }

    fn binds_arguments_of(&self, index: usize) -> bool {
        index == INNER
    }
}

/// Depth-first search for the argument tap owned by an enclosing Apply.
fn find_tap_path(op: &dyn Operator) -> Option<Vec<usize>> {
    if op.as_argument_list().is_some() {
        return Some(Vec::new());
    }
    (0..op.child_count()).filter(|&i| !op.binds_arguments_of(i)).find_map(|i| {
        let mut path = find_tap_path(&**op.child(i)?)?;
        path.insert(0, i);
        Some(path)
    })
}

fn locate_tap<'a>(
    mut op: &'a mut BoxedOperator,
    path: &[usize],
) -> Option<&'a mut ArgumentListOp> {
    for &index in path {
        op = op.child_mut(index)?;
    }
    op.as_argument_list_mut()
}
