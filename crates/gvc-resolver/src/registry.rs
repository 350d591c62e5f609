//! Whole-program class registry and the deferred resolution queue.
//!
//! The registry maps binary names of every class compiled in this program to
//! their descriptors. It also owns the pending map: placeholders for
//! references that wait on a class another unit has not registered or
//! finished yet. Entries settle when that class is registered
//! ([`PendingEntry::AwaitingName`]) or when its outer class completes
//! ([`PendingEntry::OuterNested`]).
//!
//! All maps are concurrent; registration and settlement may race with
//! lookups from other units. Settlement is idempotent, so a race can only
//! settle an entry twice with the same answer.

use crate::store::ClassId;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, trace};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PendingId(pub u32);

/// What a pending placeholder waits for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PendingEntry {
    /// Nested class `nested` of `outer`, settled once `outer` completes.
    OuterNested { outer: String, nested: String },
    /// A class another unit will declare once loaded.
    AwaitingName(String),
}

impl PendingEntry {
    /// The binary name this entry settles to.
    pub fn target_name(&self) -> &str {
        match self {
            Self::OuterNested { nested, .. } => nested,
            Self::AwaitingName(name) => name,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingState {
    Waiting,
    Settled(ClassId),
    /// The awaited outer class completed without declaring the nested class.
    Failed,
}

#[derive(Default)]
pub struct ProgramRegistry {
    classes: DashMap<String, ClassId>,
    /// Top-level names reported as declared by a unit that is not loaded yet.
    compile_targets: DashMap<String, String>,
    /// Units registered or scheduled so far.
    known_units: DashSet<String>,
    registered_units: DashSet<String>,
    scheduled: DashSet<String>,
    completed: DashSet<ClassId>,
    entries: DashMap<PendingId, PendingEntry>,
    by_entry: DashMap<PendingEntry, PendingId>,
    waiting: DashSet<PendingId>,
    settled: DashMap<PendingId, ClassId>,
    failed: DashSet<PendingId>,
    next_pending: AtomicU32,
}

impl ProgramRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Classes and units
    // -------------------------------------------------------------------------

    /// Register a source class. Settles entries awaiting this name.
    pub fn register_class(&self, name: &str, id: ClassId) {
        trace!(name, class_id = id.0, "ProgramRegistry::register_class");
        self.classes.insert(name.to_string(), id);
        self.compile_targets.remove(name);
        let awaiting = PendingEntry::AwaitingName(name.to_string());
        let pending = self.by_entry.get(&awaiting).map(|r| *r.value());
        if let Some(pid) = pending {
            self.settle(pid, id);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.classes.get(name).map(|r| *r.value())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn register_unit(&self, file: &str) {
        self.known_units.insert(file.to_string());
        self.registered_units.insert(file.to_string());
        self.scheduled.remove(file);
    }

    pub fn has_unit(&self, file: &str) -> bool {
        self.registered_units.contains(file)
    }

    /// Queue `file` for loading. Returns `false` if it is already known.
    pub fn schedule_unit(&self, file: &str) -> bool {
        if !self.known_units.insert(file.to_string()) {
            return false;
        }
        debug!(file, "scheduling source unit");
        self.scheduled.insert(file.to_string());
        true
    }

    /// Drain the scheduled units, sorted for deterministic loading order.
    pub fn take_scheduled(&self) -> Vec<String> {
        let mut files: Vec<String> = self.scheduled.iter().map(|f| f.key().clone()).collect();
        for file in &files {
            self.scheduled.remove(file);
        }
        files.sort();
        files
    }

    /// Record that `name` will be declared by `file` once loaded.
    pub fn add_compile_target(&self, name: &str, file: &str) {
        if !self.contains(name) {
            self.compile_targets
                .insert(name.to_string(), file.to_string());
        }
    }

    pub fn is_compile_target(&self, name: &str) -> bool {
        self.compile_targets.contains_key(name)
    }

    /// Snapshot of the compile-target names, sorted.
    pub fn compile_targets(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .compile_targets
            .iter()
            .map(|e| e.key().clone())
            .collect();
        names.sort();
        names
    }

    // -------------------------------------------------------------------------
    // Deferred queue
    // -------------------------------------------------------------------------

    /// Register a placeholder, reusing an existing one for the same entry.
    ///
    /// The entry is checked against current state right after insertion, so a
    /// completion that raced ahead of the registration still settles it.
    pub fn register_pending(&self, entry: PendingEntry) -> PendingId {
        let existing = self.by_entry.get(&entry).map(|r| *r.value());
        let pid = match existing {
            Some(pid) => pid,
            None => {
                let fresh = PendingId(self.next_pending.fetch_add(1, Ordering::SeqCst));
                let pid = *self.by_entry.entry(entry.clone()).or_insert(fresh);
                if pid == fresh {
                    debug!(pending_id = pid.0, entry = ?entry, "registered pending reference");
                    self.entries.insert(pid, entry.clone());
                    self.waiting.insert(pid);
                }
                pid
            }
        };

        match &entry {
            PendingEntry::AwaitingName(name) => {
                if let Some(id) = self.lookup(name) {
                    self.settle(pid, id);
                }
            }
            PendingEntry::OuterNested { outer, nested } => {
                let outer_done = self
                    .lookup(outer)
                    .is_some_and(|id| self.completed.contains(&id));
                if outer_done {
                    match self.lookup(nested) {
                        Some(id) => self.settle(pid, id),
                        None => self.fail(pid),
                    }
                }
            }
        }
        pid
    }

    /// Mark a class as fully resolved and settle entries waiting on it.
    pub fn mark_complete(&self, id: ClassId, name: &str) {
        self.completed.insert(id);
        let ready: Vec<(PendingId, String)> = self
            .entries
            .iter()
            .filter(|e| self.waiting.contains(e.key()))
            .filter_map(|e| match e.value() {
                PendingEntry::OuterNested { outer, nested } if outer == name => {
                    Some((*e.key(), nested.clone()))
                }
                _ => None,
            })
            .collect();
        for (pid, nested) in ready {
            match self.lookup(&nested) {
                Some(nested_id) => self.settle(pid, nested_id),
                None => self.fail(pid),
            }
        }
    }

    pub fn is_complete(&self, id: ClassId) -> bool {
        self.completed.contains(&id)
    }

    fn settle(&self, pid: PendingId, id: ClassId) {
        debug!(pending_id = pid.0, class_id = id.0, "settled pending reference");
        self.settled.insert(pid, id);
        self.waiting.remove(&pid);
    }

    fn fail(&self, pid: PendingId) {
        if self.settled.contains_key(&pid) {
            return;
        }
        debug!(pending_id = pid.0, "pending reference has no target");
        self.failed.insert(pid);
        self.waiting.remove(&pid);
    }

    pub fn pending_state(&self, pid: PendingId) -> PendingState {
        if let Some(id) = self.settled.get(&pid).map(|r| *r.value()) {
            PendingState::Settled(id)
        } else if self.failed.contains(&pid) {
            PendingState::Failed
        } else {
            PendingState::Waiting
        }
    }

    pub fn pending_entry(&self, pid: PendingId) -> Option<PendingEntry> {
        self.entries.get(&pid).map(|r| r.value().clone())
    }

    /// Number of placeholders still waiting.
    pub fn pending_count(&self) -> usize {
        self.waiting.len()
    }
}
