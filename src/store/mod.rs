//! Shared expected-differential state.
//!
//! The expected absolute goal difference is the only value that outlives a
//! single inference. Readers take a snapshot under a read lock; the learning
//! path replaces the snapshot under the write lock, so a reader observes either
//! the previous or the next committed value, never a mix.

pub mod learning;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

pub use learning::{DifferentialLearner, LearningOutcome};

/// Value used until the first settled match has been learned from.
pub const DEFAULT_EXPECTED_DIFFERENTIAL: f64 = 2.0;

/// A committed expected-differential value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifferentialSnapshot {
    pub value: f64,
    /// Number of writes committed since creation
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
}

/// Thread-safe handle; clones share the same value.
#[derive(Debug, Clone)]
pub struct ExpectedDifferentialStore {
    inner: Arc<RwLock<DifferentialSnapshot>>,
}

impl Default for ExpectedDifferentialStore {
    fn default() -> Self {
        Self::new(DEFAULT_EXPECTED_DIFFERENTIAL)
    }
}

impl ExpectedDifferentialStore {
    pub fn new(initial: f64) -> Self {
        ExpectedDifferentialStore {
            inner: Arc::new(RwLock::new(DifferentialSnapshot {
                value: initial,
                revision: 0,
                updated_at: Utc::now(),
            })),
        }
    }

    pub fn get(&self) -> f64 {
        self.snapshot().value
    }

    pub fn snapshot(&self) -> DifferentialSnapshot {
        // The snapshot is Copy and replaced whole, so a poisoned lock still
        // holds a fully committed value.
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, value: f64) -> DifferentialSnapshot {
        self.update(|_| value)
    }

    /// Atomically replace the value with `f(current)`.
    pub fn update<F>(&self, f: F) -> DifferentialSnapshot
    where
        F: FnOnce(f64) -> f64,
    {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let next = DifferentialSnapshot {
            value: f(guard.value),
            revision: guard.revision + 1,
            updated_at: Utc::now(),
        };
        *guard = next;
        debug!(
            "Expected differential committed: {:.4} (revision {})",
            next.value, next.revision
        );
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::thread;

    #[test]
    fn defaults_to_two_goals() {
        let store = ExpectedDifferentialStore::default();
        assert_relative_eq!(store.get(), 2.0);
        assert_eq!(store.snapshot().revision, 0);
    }

    #[test]
    fn set_is_visible_through_clones() {
        let store = ExpectedDifferentialStore::default();
        let reader = store.clone();
        let snap = store.set(1.25);
        assert_eq!(snap.revision, 1);
        assert_relative_eq!(reader.get(), 1.25);
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let store = ExpectedDifferentialStore::new(0.0);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let s = store.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        s.update(|v| v + 1.0);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let snap = store.snapshot();
        assert_relative_eq!(snap.value, 800.0);
        assert_eq!(snap.revision, 800);
    }

    #[test]
    fn readers_only_see_committed_values() {
        let store = ExpectedDifferentialStore::new(1.0);
        let writer = {
            let s = store.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    s.set(if i % 2 == 0 { 3.0 } else { 1.0 });
                }
            })
        };
        for _ in 0..500 {
            let v = store.get();
            assert!(v == 1.0 || v == 3.0, "observed uncommitted value {}", v);
        }
        writer.join().unwrap();
    }
}
