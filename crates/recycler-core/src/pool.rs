//! Resource pool collaborator.
//!
//! The executor never holds quantities itself. It queries a [`ResourcePool`]
//! for what is stored on an entity and requests signed deltas against it.
//! [`ResourceCache`] is a plain in-memory pool for hosts without one of their
//! own, and for tests.

use std::collections::HashMap;

use crate::id::EntityId;

// ---------------------------------------------------------------------------
// ResourcePool trait
// ---------------------------------------------------------------------------

/// Stores named resource quantities per entity scope.
///
/// Queries must be consistent for the duration of one device tick. Requests
/// are treated as atomic and immediately settled; the pool reports no partial
/// fulfilment back to the caller.
pub trait ResourcePool {
    /// Current stored amount of `resource` on `scope`. Unknown resources read
    /// as zero.
    fn amount(&self, scope: EntityId, resource: &str) -> f64;

    /// Apply a signed change: positive withdraws, negative deposits.
    fn request(&mut self, scope: EntityId, resource: &str, delta: f64);
}

// ---------------------------------------------------------------------------
// In-memory cache
// ---------------------------------------------------------------------------

/// Stored amount and capacity of one resource on one entity.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResourceLevel {
    pub amount: f64,
    pub capacity: f64,
}

/// In-memory [`ResourcePool`] keyed by entity and resource name.
///
/// Behaves like a set of tanks: withdrawals stop at empty, deposits stop at
/// capacity, and requests against resources the entity has no tank for are
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct ResourceCache {
    levels: HashMap<(EntityId, String), ResourceLevel>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a tank of `resource` on `scope`. The amount is
    /// clamped to `[0, capacity]`.
    pub fn set(&mut self, scope: EntityId, resource: &str, amount: f64, capacity: f64) {
        let capacity = capacity.max(0.0);
        self.levels.insert(
            (scope, resource.to_string()),
            ResourceLevel {
                amount: amount.clamp(0.0, capacity),
                capacity,
            },
        );
    }

    pub fn level(&self, scope: EntityId, resource: &str) -> Option<ResourceLevel> {
        self.levels.get(&(scope, resource.to_string())).copied()
    }

    /// Drop every tank belonging to `scope`.
    pub fn remove_scope(&mut self, scope: EntityId) {
        self.levels.retain(|(s, _), _| *s != scope);
    }
}

impl ResourcePool for ResourceCache {
    fn amount(&self, scope: EntityId, resource: &str) -> f64 {
        self.level(scope, resource).map_or(0.0, |l| l.amount)
    }

    fn request(&mut self, scope: EntityId, resource: &str, delta: f64) {
        if !delta.is_finite() {
            tracing::warn!(?scope, resource, delta, "non-finite request ignored");
            return;
        }
        match self.levels.get_mut(&(scope, resource.to_string())) {
            Some(level) => {
                level.amount = (level.amount - delta).clamp(0.0, level.capacity);
            }
            None => {
                tracing::trace!(
                    ?scope,
                    resource,
                    delta,
                    "request against missing tank dropped"
                );
            }
        }
    }
}
