//! Join operator - presents several streams as one.
//!
//! The join drains its streams strictly in registration order: every record
//! of stream 0, then every record of stream 1, and so on, with no
//! interleaving. This is the runtime half of `UNION ALL`, where each branch
//! may have been planned against its own layout.
//!
//! When [`JoinOp::update_column_map`] is set, each record is translated by
//! variable name into the join plan's layout before it is returned, so
//! consumers above the join see one unified layout whatever stream the record
//! came from.

use std::sync::Arc;

use tracing::debug;

use crate::exec::context::ExecutionContext;
use crate::exec::operator::{BoxedOperator, OpType, Operator, OperatorBase, OperatorResult};
use crate::exec::plan::ExecutionPlan;
use crate::exec::record::{ColumnMap, Record};

/// Join operator - concatenates the output of its streams.
pub struct JoinOp {
    /// Base operator state.
    base: OperatorBase,
    /// Upstream operators, drained in order.
    streams: Vec<BoxedOperator>,
    /// Index of the stream currently being drained.
    stream_idx: usize,
    /// Whether records are translated into the join plan's layout.
    update_column_map: bool,
    /// Last column map computed for each stream.
    column_maps: Vec<Option<ColumnMap>>,
}

impl JoinOp {
    /// Creates a new join operator over `streams`.
    ///
    /// `variables` are the columns the join exposes, registered with `plan`
    /// in order.
    pub fn new<S: AsRef<str>>(
        plan: &ExecutionPlan,
        variables: &[S],
        streams: Vec<BoxedOperator>,
    ) -> OperatorResult<Self> {
        let column_maps = streams.iter().map(|_| None).collect();
        Ok(Self {
            base: OperatorBase::new(OpType::Join, plan, variables)?,
            streams,
            stream_idx: 0,
            update_column_map: false,
            column_maps,
        })
    }

    /// Appends a stream after the existing ones.
    pub fn add_stream(&mut self, stream: BoxedOperator) {
        self.streams.push(stream);
        self.column_maps.push(None);
    }

    /// Number of streams.
    #[must_use]
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Index of the stream currently being drained.
    #[must_use]
    pub fn current_stream(&self) -> usize {
        self.stream_idx
    }

    /// Returns true if records are remapped into the join layout.
    #[must_use]
    pub fn update_column_map(&self) -> bool {
        self.update_column_map
    }

    /// Sets whether records are remapped into the join layout.
    pub fn set_update_column_map(&mut self, update_column_map: bool) {
        self.update_column_map = update_column_map;
    }

    /// Builder form of [`set_update_column_map`](Self::set_update_column_map).
    #[must_use]
    pub fn with_update_column_map(mut self, update_column_map: bool) -> Self {
        self.update_column_map = update_column_map;
        self
    }

    /// Translates a record from the current stream into the join layout.
    fn remap(&mut self, record: Record) -> OperatorResult<Record> {
        let target = self.base.plan().layout()?;
        let source = record.schema_arc();
        if Arc::ptr_eq(&source, &target) {
            return Ok(record);
        }

        let cached = &mut self.column_maps[self.stream_idx];
        // An unsealed plan hands out a fresh snapshot per call, so targets
        // are compared by value.
        let reusable = cached.as_ref().is_some_and(|map| {
            map.applies_to(&source)
                && (Arc::ptr_eq(map.target(), &target) || *map.target() == target)
        });
        if !reusable {
            *cached = Some(ColumnMap::new(source, target));
        }
        Ok(match cached {
            Some(map) => record.remap(map),
            None => record,
        })
    }

    fn pull(&mut self, ctx: &ExecutionContext) -> OperatorResult<Option<Record>> {
        loop {
            if ctx.is_cancelled() {
                debug!(stream = self.stream_idx, "join observed cancellation");
                ctx.record_cancelled_consume();
                return Ok(self.base.deplete());
            }

            let Some(stream) = self.streams.get_mut(self.stream_idx) else {
                return Ok(self.base.deplete());
            };

            match stream.consume(ctx)? {
                Some(record) => {
                    // A record produced while cancellation landed is discarded.
                    if ctx.is_cancelled() {
                        continue;
                    }
                    let record =
                        if self.update_column_map { self.remap(record)? } else { record };
                    return Ok(self.base.emit(record));
                }
                None => {
                    self.stream_idx += 1;
                    debug!(stream = self.stream_idx, of = self.streams.len(), "join advanced stream");
                }
            }
        }
    }
}

impl Operator for JoinOp {
    fn consume(&mut self, ctx: &ExecutionContext) -> OperatorResult<Option<Record>> {
        self.base.ensure_live()?;
        let started = self.base.start_timer(ctx);
        let result = self.pull(ctx);
        self.base.stop_timer(started);
        result
    }

    fn reset(&mut self) -> OperatorResult<()> {
        self.stream_idx = 0;
        for stream in &mut self.streams {
            stream.reset()?;
        }
        self.base.rewind();
        Ok(())
    }

    fn clone_op(&self, plan: &ExecutionPlan) -> OperatorResult<BoxedOperator> {
        let streams =
            self.streams.iter().map(|s| s.clone_op(plan)).collect::<OperatorResult<Vec<_>>>()?;
        let join = Self::new(plan, self.base.modifies(), streams)?
            .with_update_column_map(self.update_column_map);
        Ok(Box::new(join))
    }

    fn free(&mut self) {
        for stream in &mut self.streams {
            stream.free();
        }
        self.streams.clear();
        self.column_maps.clear();
        self.base.set_freed();
    }

    fn base(&self) -> &OperatorBase {
        &self.base
    }

    fn child_count(&self) -> usize {
        self.streams.len()
    }

    fn child(&self, index: usize) -> Option<&BoxedOperator> {
        self.streams.get(index)
    }

    fn child_mut(&mut self, index: usize) -> Option<&mut BoxedOperator> {
        self.streams.get_mut(index)
    }
}
