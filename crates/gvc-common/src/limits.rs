//! Centralized limits and thresholds for the resolver.
//!
//! Recursion and iteration bounds shared by the strategy chain, the generics
//! header resolver, the hierarchy walks and the program driver.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting of mangled-candidate probes for one reference.
///
/// Static-inner mangling and nested-class probes recurse back into the chain.
/// Each level strips or rewrites one dot, so real names never get close; the
/// bound only matters for pathological inputs.
///
/// ```groovy
/// def x = new a.b.c.d.e.f.g.h.i.j.k.l.m.n.o.p.Q()
/// ```
pub const MAX_CANDIDATE_DEPTH: u32 = 64;

/// Maximum depth when resolving the generics of a type-parameter bound.
///
/// F-bounded parameters are skipped by name, but bounds can still nest
/// arbitrarily (`T extends Map<K, List<Set<V>>>`).
pub const MAX_GENERICS_HEADER_DEPTH: u32 = 32;

/// Maximum number of ancestors visited in a single superclass or interface walk.
///
/// Cycles are caught with a visited set; this bounds walks through external
/// hierarchies that are deep but acyclic.
pub const MAX_HIERARCHY_DEPTH: usize = 4096;

// =============================================================================
// Operation Counts
// =============================================================================

/// Default number of scheduling rounds the program driver runs.
///
/// Each round loads the units the external resolver reported as
/// "belongs to another source unit" during the previous round.
pub const MAX_SCHEDULING_ROUNDS: u32 = 16;
