//! Resolution counters.
//!
//! Relaxed atomics shared by every unit of a session. `snapshot` gives a
//! plain copy to compare in tests and benches.

use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! define_stats {
    ($($(#[$doc:meta])* $field:ident => $variant:ident),+ $(,)?) => {
        #[derive(Debug, Default)]
        pub struct ResolveStats {
            $($field: AtomicU64,)+
        }

        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct StatsSnapshot {
            $($(#[$doc])* pub $field: u64,)+
        }

        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub(crate) enum Counter {
            $($variant,)+
        }

        impl ResolveStats {
            pub fn snapshot(&self) -> StatsSnapshot {
                StatsSnapshot {
                    $($field: self.$field.load(Ordering::Relaxed),)+
                }
            }

            pub fn reset(&self) {
                $(self.$field.store(0, Ordering::Relaxed);)+
            }

            #[inline]
            pub(crate) fn bump(&self, counter: Counter) {
                let slot = match counter {
                    $(Counter::$variant => &self.$field,)+
                };
                slot.fetch_add(1, Ordering::Relaxed);
            }
        }
    };
}

define_stats! {
    /// References that named the class being resolved.
    identity_hits => IdentityHits,
    /// References served by the generic-parameter environment.
    generics_hits => GenericsHits,
    /// Nested-class-of-hierarchy strategy runs.
    nested_probes => NestedProbes,
    /// Local module scans.
    module_scans => ModuleScans,
    /// Import strategy runs.
    import_lookups => ImportLookups,
    /// Program registry lookups.
    registry_lookups => RegistryLookups,
    /// Default-import scans.
    default_import_scans => DefaultImportScans,
    /// Static-inner mangling runs.
    static_inner_probes => StaticInnerProbes,
    /// Outer-nested forward registration attempts.
    outer_nested_probes => OuterNestedProbes,
    /// Calls into the external resolver.
    external_lookups => ExternalLookups,
    /// Negative or positive cache consultations.
    cache_lookups => CacheLookups,
    negative_cache_hits => NegativeCacheHits,
    positive_cache_hits => PositiveCacheHits,
    /// Mangled candidate names constructed and probed.
    candidates_built => CandidatesBuilt,
    /// Lowercase vanilla names that skipped the gated strategies.
    lowercase_skips => LowercaseSkips,
    /// Placeholders registered in the deferred queue.
    deferred_registrations => DeferredRegistrations,
}

impl StatsSnapshot {
    /// Registry plus cache accesses.
    pub fn shared_state_accesses(&self) -> u64 {
        self.registry_lookups + self.cache_lookups
    }
}
