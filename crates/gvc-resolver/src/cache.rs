//! Candidate search caches.
//!
//! Both caches only remember search state: which external candidates are
//! known missing, which requests already failed, and which default-import
//! packages served a simple name before. A lost race means repeated work,
//! never a different answer, so plain concurrent sets are enough.

use crate::store::ClassId;
use crate::target::Mode;
use dashmap::{DashMap, DashSet};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::trace;

/// Monotonic failure cache.
#[derive(Default)]
pub struct NegativeCache {
    /// External lookups that returned nothing.
    missing: DashSet<String>,
    /// Whole-chain failures per requesting class, best-effort mode.
    best_effort: DashSet<(ClassId, String)>,
    /// Whole-chain failures per requesting class, including forward registration.
    full: DashSet<(ClassId, String)>,
}

impl NegativeCache {
    pub fn is_missing(&self, candidate: &str) -> bool {
        self.missing.contains(candidate)
    }

    pub fn record_missing(&self, candidate: &str) {
        if self.missing.insert(candidate.to_string()) {
            trace!(candidate, "negative cache: missing candidate");
        }
    }

    /// A request failed before. Best-effort requests also accept full failures,
    /// since the full chain is a superset of the best-effort one.
    pub fn has_failed(&self, scope: ClassId, name: &str, mode: Mode) -> bool {
        let key = (scope, name.to_string());
        match mode {
            Mode::OrFail => self.full.contains(&key),
            Mode::BestEffort => self.best_effort.contains(&key) || self.full.contains(&key),
        }
    }

    pub fn record_failure(&self, scope: ClassId, name: &str, mode: Mode) {
        let key = (scope, name.to_string());
        match mode {
            Mode::OrFail => self.full.insert(key),
            Mode::BestEffort => self.best_effort.insert(key),
        };
    }

    /// Forget request failures. Candidate misses stay: they only guard
    /// external lookups, and program classes are found in the registry first.
    pub fn clear_requests(&self) {
        self.best_effort.clear();
        self.full.clear();
    }

    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }
}

/// Simple name -> default-import package prefixes that resolved it.
#[derive(Default)]
pub struct PositiveCache {
    prefixes: DashMap<String, SmallVec<[Arc<str>; 2]>>,
}

impl PositiveCache {
    pub fn prefixes(&self, name: &str) -> Option<SmallVec<[Arc<str>; 2]>> {
        self.prefixes.get(name).map(|r| r.value().clone())
    }

    pub fn record(&self, name: &str, prefix: &Arc<str>) {
        let mut entry = self.prefixes.entry(name.to_string()).or_default();
        if !entry.iter().any(|p| p == prefix) {
            trace!(name, prefix = %prefix, "positive cache: default import");
            entry.push(Arc::clone(prefix));
        }
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

/// The caches of one session.
#[derive(Default)]
pub struct ResolverCaches {
    pub negative: NegativeCache,
    pub positive: PositiveCache,
}

impl ResolverCaches {
    /// Called at stage barriers: shapes published or units registered since
    /// may let a failed request succeed.
    pub fn begin_round(&self) {
        self.negative.clear_requests();
    }
}
