//! Execution plan handle and variable registry.
//!
//! Operators are constructed against an [`ExecutionPlan`]. Each registered
//! variable receives the next column index, in registration order, and keeps
//! it for the life of the plan. Once the plan is sealed its layout is frozen
//! into an `Arc<Schema>` that every operator and clone reads without locking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

use tracing::debug;

use crate::error::{ExecError, ExecResult};

use super::record::{Record, Schema};

static NEXT_PLAN_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an execution plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlanId(u64);

impl PlanId {
    /// Get the raw u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// A shared handle to an execution plan.
///
/// Cloning the handle is cheap and refers to the same plan.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    inner: Arc<PlanInner>,
}

#[derive(Debug)]
struct PlanInner {
    id: PlanId,
    name: String,
    /// Variables in column order.
    registry: RwLock<Vec<Arc<str>>>,
    /// Frozen layout, set by `seal`.
    sealed: OnceLock<Arc<Schema>>,
}

impl ExecutionPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let id = PlanId(NEXT_PLAN_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            inner: Arc::new(PlanInner {
                id,
                name: name.into(),
                registry: RwLock::new(Vec::new()),
                sealed: OnceLock::new(),
            }),
        }
    }

    /// Returns the plan identity.
    #[must_use]
    pub fn id(&self) -> PlanId {
        self.inner.id
    }

    /// Returns the plan name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns true if both handles refer to the same plan.
    #[must_use]
    pub fn same_plan(&self, other: &ExecutionPlan) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Registers a variable and returns its column index.
    ///
    /// Registering a variable that is already known returns its existing
    /// index, including after the plan is sealed. New variables are rejected
    /// once the layout is sealed.
    pub fn register(&self, variable: &str) -> ExecResult<usize> {
        let mut registry = self.inner.registry.write().map_err(|_| ExecError::LockPoisoned)?;
        if let Some(index) = registry.iter().position(|v| v.as_ref() == variable) {
            return Ok(index);
        }
        if self.inner.sealed.get().is_some() {
            return Err(ExecError::PlanSealed { variable: variable.to_string() });
        }
        registry.push(Arc::from(variable));
        Ok(registry.len() - 1)
    }

    /// Returns the column index of a registered variable.
    pub fn column_of(&self, variable: &str) -> ExecResult<Option<usize>> {
        if let Some(layout) = self.inner.sealed.get() {
            return Ok(layout.index_of(variable));
        }
        let registry = self.inner.registry.read().map_err(|_| ExecError::LockPoisoned)?;
        Ok(registry.iter().position(|v| v.as_ref() == variable))
    }

    /// Freezes the layout. Idempotent.
    pub fn seal(&self) -> ExecResult<Arc<Schema>> {
        if let Some(layout) = self.inner.sealed.get() {
            return Ok(Arc::clone(layout));
        }
        // Hold the write lock so no registration races the snapshot.
        let registry = self.inner.registry.write().map_err(|_| ExecError::LockPoisoned)?;
        let layout = self
            .inner
            .sealed
            .get_or_init(|| Arc::new(Schema::from_arcs(registry.clone())));
        debug!(plan = %self.inner.name, columns = layout.len(), "plan layout sealed");
        Ok(Arc::clone(layout))
    }

    /// Returns true once [`seal`](Self::seal) has been called.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.inner.sealed.get().is_some()
    }

    /// Returns the current layout.
    ///
    /// After sealing this is the shared frozen layout; before, a snapshot of
    /// the variables registered so far.
    pub fn layout(&self) -> ExecResult<Arc<Schema>> {
        if let Some(layout) = self.inner.sealed.get() {
            return Ok(Arc::clone(layout));
        }
        let registry = self.inner.registry.read().map_err(|_| ExecError::LockPoisoned)?;
        Ok(Arc::new(Schema::from_arcs(registry.clone())))
    }

    /// Creates an unbound record shaped by this plan's layout.
    pub fn new_record(&self) -> ExecResult<Record> {
        Ok(Record::new(self.layout()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_order_fixes_columns() {
        let plan = ExecutionPlan::new("q");
        assert_eq!(plan.register("a").unwrap(), 0);
        assert_eq!(plan.register("b").unwrap(), 1);
        assert_eq!(plan.register("a").unwrap(), 0);
        assert_eq!(plan.column_of("b").unwrap(), Some(1));
        assert_eq!(plan.column_of("c").unwrap(), None);
    }

    #[test]
    fn seal_freezes_layout() {
        let plan = ExecutionPlan::new("q");
        plan.register("a").unwrap();
        let first = plan.seal().unwrap();
        let second = plan.seal().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &plan.layout().unwrap()));

        // Known variables resolve, new ones are rejected.
        assert_eq!(plan.register("a").unwrap(), 0);
        let err = plan.register("b").unwrap_err();
        assert!(matches!(err, ExecError::PlanSealed { .. }));
    }

    #[test]
    fn plans_have_distinct_ids() {
        let a = ExecutionPlan::new("a");
        let b = ExecutionPlan::new("b");
        assert_ne!(a.id(), b.id());
        assert!(a.same_plan(&a.clone()));
        assert!(!a.same_plan(&b));
    }

    #[test]
    fn new_record_uses_layout() {
        let plan = ExecutionPlan::new("q");
        plan.register("n").unwrap();
        plan.register("m").unwrap();
        plan.seal().unwrap();
        let record = plan.new_record().unwrap();
        assert_eq!(record.schema().columns(), vec!["n", "m"]);
        assert_eq!(record.bound_count(), 0);
    }
}
