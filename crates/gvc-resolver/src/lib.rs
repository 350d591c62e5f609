//! Type-name resolution for gvc programs.
//!
//! Given parsed modules, the resolver turns every written type name into a
//! resolved target: a class descriptor, a type parameter, or an array of a
//! resolved component. The moving parts:
//!
//! - `store` - immutable class descriptors and published hierarchy shapes
//! - `registry` - whole-program name table plus the deferred (pending) queue
//! - `cache` - negative and positive candidate caches
//! - `external` - the black-box resolver for classes outside the program
//! - `unit` - the per-unit driver: collection, staged drain, finalization
//! - `chain` / `chain_imports` - the ordered candidate strategies
//! - `generics` - type-parameter header resolution (F-bounds)
//! - `hierarchy` - cyclic inheritance detection
//! - `program` - multi-unit staging, scheduling rounds and parallelism
//!
//! All shared state lives in a [`ResolveSession`]; nothing is process-global.

pub mod builtins;
pub mod cache;
mod chain;
mod chain_imports;
mod construction;
pub mod diagnostics;
mod env;
mod expressions;
pub mod external;
mod generics;
mod hierarchy;
pub mod options;
pub mod program;
pub mod registry;
pub mod session;
pub mod stats;
pub mod store;
pub mod target;
pub mod unit;
mod unit_collect;
mod visibility;

pub use cache::{NegativeCache, PositiveCache, ResolverCaches};
pub use diagnostics::DiagnosticKind;
pub use env::{EnvId, ResolveCtx};
pub use external::{
    ClassTable, ExternalClass, ExternalResolver, Lookup, MemoryLoader, NullResolver, SourceLoader,
};
pub use options::ResolverOptions;
pub use program::{Program, ProgramResolution};
pub use registry::{PendingEntry, PendingId, PendingState, ProgramRegistry};
pub use session::ResolveSession;
pub use stats::{ResolveStats, StatsSnapshot};
pub use store::{ClassId, ClassInfo, ClassOrigin, ClassShape, ClassStore};
pub use target::{Mode, ResolvedRef, Target};
pub use unit::{UnitResolution, UnitResolver};

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod store_tests;

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod registry_tests;

#[cfg(test)]
#[path = "tests/cache_tests.rs"]
mod cache_tests;

#[cfg(test)]
#[path = "tests/chain_tests.rs"]
mod chain_tests;
