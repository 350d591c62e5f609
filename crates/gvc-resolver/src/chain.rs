//! The candidate strategy chain.
//!
//! `resolve_type_ref` is the single entry point for a written reference.
//! Names run through the strategies in fixed priority order and the first
//! success wins:
//!
//! 1. identity (the class being resolved)
//! 2. generic parameters of the current environment
//! 3. nested classes of the current hierarchy and enclosing classes
//! 4. classes declared in this module
//! 5. imports (see `chain_imports`)
//! 6. exact program registry lookup
//! 7. default imports
//! 8. static-inner mangling (`a.B.C` -> `a.B$C`)
//! 9. outer-nested forward registration
//! 10. the external resolver
//!
//! A vanilla lowercase name with no explicit import is not expected to be a
//! class: strategies 3, 7, 8 and 10 and the non-alias import lookups skip it.

use crate::builtins::{BIG_DECIMAL, BIG_INTEGER};
use crate::env::ResolveCtx;
use crate::external::Lookup;
use crate::registry::{PendingEntry, PendingState};
use crate::stats::Counter;
use crate::store::ClassId;
use crate::target::{Candidate, Mode, ResolvedRef, Switches, Target};
use crate::unit::UnitResolver;
use gvc_ast::{GenericsKind, TypeRefId, TypeRefKind};
use gvc_common::diagnostic_codes;
use gvc_common::limits::MAX_CANDIDATE_DEPTH;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, trace};

/// `true` when `written` spells `binary` with `.` standing for `$`.
fn spells_binary_name(written: &str, binary: &str) -> bool {
    written.len() == binary.len()
        && written
            .bytes()
            .zip(binary.bytes())
            .all(|(w, b)| w == b || (w == b'.' && b == b'$'))
}

/// Replace the rightmost dot with the nested-class separator.
pub(crate) fn mangle_last_dot(name: &str) -> Option<String> {
    let dot = name.rfind('.')?;
    Some(format!("{}${}", &name[..dot], &name[dot + 1..]))
}

impl UnitResolver<'_> {
    // -------------------------------------------------------------------------
    // Driver
    // -------------------------------------------------------------------------

    /// Resolve one reference and its type arguments.
    ///
    /// A reference that already has a target returns immediately without
    /// touching the registry or the caches.
    pub(crate) fn resolve_type_ref(
        &mut self,
        type_ref: TypeRefId,
        ctx: &ResolveCtx,
        mode: Mode,
        prefer_imports: bool,
    ) -> bool {
        if self.target(type_ref).is_some() {
            return true;
        }
        let resolved = self.resolve_head(type_ref, ctx, mode, prefer_imports);
        self.resolve_type_args(type_ref, ctx, mode);
        resolved
    }

    /// Resolve the reference itself, leaving its type arguments alone.
    pub(crate) fn resolve_head(
        &mut self,
        type_ref: TypeRefId,
        ctx: &ResolveCtx,
        mode: Mode,
        prefer_imports: bool,
    ) -> bool {
        if self.target(type_ref).is_some() {
            return true;
        }
        let module = Arc::clone(&self.module);
        let node = module.type_ref(type_ref);
        self.current_span = node.span;

        if let TypeRefKind::Array { component } = node.kind {
            let resolved = self.resolve_type_ref(component, ctx, mode, prefer_imports);
            if resolved {
                self.set_target(type_ref, Target::Array(component), false);
            }
            return resolved;
        }

        let name = node.name.as_str();
        let found = if let Some(id) = self.builtin_class(name) {
            Some(ResolvedRef {
                target: Target::Class(id),
                placeholder: false,
            })
        } else {
            let aliased = if prefer_imports {
                self.session.stats().bump(Counter::ImportLookups);
                self.resolve_alias_from_module(name, ctx, mode)
                    .map(|target| ResolvedRef {
                        target,
                        placeholder: false,
                    })
            } else {
                None
            };
            aliased.or_else(|| self.resolve_name(name, ctx, mode, Switches::for_mode(mode)))
        };

        match found {
            Some(resolved) => {
                self.set_target(type_ref, resolved.target, resolved.placeholder);
                if let Target::Class(id) = resolved.target
                    && let Some(from) = ctx.class
                    && !self.is_accessible_nested(id, from)
                {
                    let target_name = self.session.store().name(id);
                    let from_name = self.module.class(from).name.clone();
                    self.error(
                        node.span,
                        diagnostic_codes::NESTED_TYPE_NOT_VISIBLE,
                        &[&target_name, &from_name],
                    );
                }
                true
            }
            None => {
                if mode == Mode::OrFail {
                    let code = if ctx.annotation {
                        diagnostic_codes::UNABLE_TO_RESOLVE_ANNOTATION_CLASS
                    } else {
                        diagnostic_codes::UNABLE_TO_RESOLVE_CLASS
                    };
                    self.error(node.span, code, &[name]);
                }
                false
            }
        }
    }

    pub(crate) fn resolve_type_args(&mut self, type_ref: TypeRefId, ctx: &ResolveCtx, mode: Mode) {
        let module = Arc::clone(&self.module);
        for &arg in &module.type_ref(type_ref).generics {
            match &module.generics_type(arg).kind {
                GenericsKind::Type(arg_ref) => {
                    self.resolve_type_ref(*arg_ref, ctx, mode, false);
                }
                GenericsKind::Wildcard {
                    upper_bound,
                    lower_bound,
                } => {
                    for bound in upper_bound.iter().chain(lower_bound.iter()) {
                        self.resolve_type_ref(*bound, ctx, mode, false);
                    }
                }
                GenericsKind::Param { .. } => {}
            }
        }
    }

    /// Resolve a written name: identity, generics environment, then the
    /// candidate chain.
    pub(crate) fn resolve_name(
        &mut self,
        name: &str,
        ctx: &ResolveCtx,
        mode: Mode,
        switches: Switches,
    ) -> Option<ResolvedRef> {
        let stats = self.session.stats();
        if let Some(decl) = ctx.class {
            let class = self.module.class(decl);
            if spells_binary_name(name, &class.name)
                || spells_binary_name(name, class.name_without_package())
            {
                stats.bump(Counter::IdentityHits);
                trace!(name, "identity");
                return Some(ResolvedRef {
                    target: Target::Class(self.class_ids[decl.index()]),
                    placeholder: false,
                });
            }
        }
        if let Some(param) = self.envs.lookup(ctx.env, name) {
            stats.bump(Counter::GenericsHits);
            trace!(name, "generic parameter");
            return Some(ResolvedRef {
                target: Target::TypeParam(param),
                placeholder: true,
            });
        }

        let candidate = if self.is_gated(name) {
            Candidate::LowerCase(name)
        } else {
            Candidate::Plain(name)
        };
        self.resolve_candidate(candidate, ctx, mode, switches)
            .map(|target| ResolvedRef {
                target,
                placeholder: false,
            })
    }

    /// Vanilla lowercase name without an explicit import.
    pub(crate) fn is_gated(&self, name: &str) -> bool {
        !name.contains('.')
            && name.chars().next().is_some_and(char::is_lowercase)
            && !self.plain_aliases.contains_key(name)
            && !self.static_aliases.contains_key(name)
    }

    // -------------------------------------------------------------------------
    // Candidates
    // -------------------------------------------------------------------------

    pub(crate) fn resolve_candidate(
        &mut self,
        candidate: Candidate<'_>,
        ctx: &ResolveCtx,
        mode: Mode,
        switches: Switches,
    ) -> Option<Target> {
        if self.depth >= MAX_CANDIDATE_DEPTH {
            debug!(?candidate, "candidate depth limit reached");
            return None;
        }
        self.depth += 1;
        let found = match candidate {
            Candidate::Plain(name) => self.run_chain(name, false, ctx, mode, switches),
            Candidate::LowerCase(name) => self.run_chain(name, true, ctx, mode, switches),
            Candidate::WithPackage { prefix, class_name } => {
                self.resolve_with_package(prefix, class_name, ctx, mode, switches)
            }
            Candidate::Nested { outer, name } => self.lookup_nested(outer, name),
        };
        self.depth -= 1;
        found
    }

    fn run_chain(
        &mut self,
        name: &str,
        gated: bool,
        ctx: &ResolveCtx,
        mode: Mode,
        switches: Switches,
    ) -> Option<Target> {
        let session = self.session;
        let stats = session.stats();
        // Request failures are only remembered for full top-level requests.
        let scope = ctx
            .class
            .filter(|_| switches.contains(Switches::MODULE_IMPORTS | Switches::DEFAULT_IMPORTS))
            .map(|decl| self.class_ids[decl.index()]);
        if let Some(scope) = scope {
            stats.bump(Counter::CacheLookups);
            if session.caches().negative.has_failed(scope, name, mode) {
                stats.bump(Counter::NegativeCacheHits);
                trace!(name, "negative cache: request failed before");
                return None;
            }
        }
        if gated {
            stats.bump(Counter::LowercaseSkips);
        }

        let found = self.run_strategies(name, gated, ctx, mode, switches);
        match found {
            Some(target) => trace!(name, ?target, "resolved"),
            None => {
                if let Some(scope) = scope {
                    session.caches().negative.record_failure(scope, name, mode);
                }
            }
        }
        found
    }

    fn run_strategies(
        &mut self,
        name: &str,
        gated: bool,
        ctx: &ResolveCtx,
        mode: Mode,
        switches: Switches,
    ) -> Option<Target> {
        let session = self.session;
        let stats = session.stats();

        if !gated {
            if let Some(target) = self.resolve_nested_of_hierarchy(name, ctx) {
                return Some(target);
            }
        }

        stats.bump(Counter::ModuleScans);
        if let Some(id) = self.resolve_from_module_decls(name) {
            return Some(Target::Class(id));
        }

        if switches.contains(Switches::MODULE_IMPORTS) {
            stats.bump(Counter::ImportLookups);
            if let Some(target) = self.resolve_from_imports(name, gated, ctx, mode) {
                return Some(target);
            }
        }

        stats.bump(Counter::RegistryLookups);
        if let Some(id) = session.registry().lookup(name) {
            return Some(Target::Class(id));
        }

        if !gated && switches.contains(Switches::DEFAULT_IMPORTS) && !name.contains('.') {
            if let Some(target) = self.resolve_from_default_imports(name, ctx, mode) {
                return Some(target);
            }
        }

        if !gated
            && switches.contains(Switches::STATIC_INNER)
            && let Some(mangled) = mangle_last_dot(name)
        {
            stats.bump(Counter::StaticInnerProbes);
            let inner_switches = Switches::DEFAULT_IMPORTS | Switches::STATIC_INNER;
            if let Some(target) =
                self.resolve_candidate(Candidate::Plain(&mangled), ctx, mode, inner_switches)
            {
                return Some(target);
            }
        }

        if mode == Mode::OrFail && switches.contains(Switches::FORWARD) {
            if let Some(target) = self.resolve_outer_nested(name) {
                return Some(target);
            }
        }

        self.resolve_to_outer(name, gated)
    }

    /// Strategy 3: `X$name` for the current class, its superclasses and its
    /// enclosing classes, plus nested types of their interfaces.
    fn resolve_nested_of_hierarchy(&mut self, name: &str, ctx: &ResolveCtx) -> Option<Target> {
        let decl = ctx.class?;
        let session = self.session;
        session.stats().bump(Counter::NestedProbes);
        let current = self.class_ids[decl.index()];
        let object = self.object_id();
        let mut hierarchy: SmallVec<[ClassId; 8]> = SmallVec::new();
        hierarchy.push(current);
        hierarchy.extend(
            session
                .superclass_chain(current)
                .into_iter()
                .filter(|&c| c != object),
        );
        for &class in &hierarchy {
            if let Some(found) = self.resolve_nested(class, name, ctx)
                && (class == current || self.nested_found_visible(found, current))
            {
                return Some(found);
            }
            if let Some(found) = self.probe_interfaces(class, name, ctx) {
                return Some(found);
            }
        }

        if let Some(hints) = self.ctor_hints.get(name).cloned() {
            for hint in hints {
                if let Some(outer) = self.class_target(hint)
                    && let Some(found) = self.resolve_nested(outer, name, ctx)
                {
                    return Some(found);
                }
            }
        }

        // Enclosing classes, outermost first: from A$B$C, E is tried as
        // A$E, then A$B$E.
        if !name.contains('.') {
            let module = Arc::clone(&self.module);
            let mut outers: SmallVec<[ClassId; 4]> = module
                .outer_chain(decl)
                .map(|o| self.class_ids[o.index()])
                .collect();
            outers.reverse();
            for outer in outers {
                if let Some(found) = self.resolve_nested(outer, name, ctx) {
                    return Some(found);
                }
                if let Some(found) = self.probe_interfaces(outer, name, ctx) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn nested_found_visible(&self, found: Target, from: ClassId) -> bool {
        match found {
            Target::Class(id) => self.is_visible_nested_class(id, from),
            _ => true,
        }
    }

    fn probe_interfaces(&mut self, class: ClassId, name: &str, ctx: &ResolveCtx) -> Option<Target> {
        let session = self.session;
        for interface in session.all_interfaces(class) {
            let interface_name = session.store().name(interface);
            if name.contains(interface_name.as_str()) {
                continue;
            }
            if let Some(found) = self.resolve_nested(interface, name, ctx) {
                return Some(found);
            }
        }
        None
    }

    /// Strategy 4: a declaration of this module, package-qualified when the
    /// name carries no dot.
    fn resolve_from_module_decls(&self, name: &str) -> Option<ClassId> {
        let qualified;
        let wanted = if !name.contains('.') && !self.package_prefix.is_empty() {
            qualified = format!("{}{name}", self.package_prefix);
            qualified.as_str()
        } else {
            name
        };
        self.module
            .classes
            .iter()
            .find(|&&decl| self.module.class(decl).name == wanted)
            .map(|decl| self.class_ids[decl.index()])
    }

    /// Strategy 7: implicit packages, previously successful ones first.
    fn resolve_from_default_imports(
        &mut self,
        name: &str,
        ctx: &ResolveCtx,
        mode: Mode,
    ) -> Option<Target> {
        let session = self.session;
        let stats = session.stats();
        stats.bump(Counter::DefaultImportScans);

        stats.bump(Counter::CacheLookups);
        if let Some(prefixes) = session.caches().positive.prefixes(name) {
            for prefix in &prefixes {
                let candidate = Candidate::WithPackage {
                    prefix,
                    class_name: name,
                };
                if let Some(found) = self.resolve_candidate(candidate, ctx, mode, Switches::empty()) {
                    stats.bump(Counter::PositiveCacheHits);
                    return Some(found);
                }
            }
        }

        for prefix in session.default_imports() {
            let candidate = Candidate::WithPackage {
                prefix,
                class_name: name,
            };
            if let Some(found) = self.resolve_candidate(candidate, ctx, mode, Switches::empty()) {
                session.caches().positive.record(name, prefix);
                return Some(found);
            }
        }

        let fallback = match name {
            "BigInteger" => Some(BIG_INTEGER),
            "BigDecimal" => Some(BIG_DECIMAL),
            _ => None,
        };
        fallback
            .and_then(|n| session.store().lookup(n))
            .map(Target::Class)
    }

    /// Strategy 9: the name may be a nested class of an outer class that
    /// another unit has not finished yet. Registers a placeholder instead of
    /// failing.
    fn resolve_outer_nested(&mut self, name: &str) -> Option<Target> {
        let session = self.session;
        let registry = session.registry();
        session.stats().bump(Counter::OuterNestedProbes);
        let known = |owner: &str| registry.contains(owner) || registry.is_compile_target(owner);

        let mut entries: SmallVec<[PendingEntry; 2]> = SmallVec::new();
        if let Some(&index) = self.static_aliases.get(name) {
            let import = &self.module.imports[index];
            if let (Some(owner), Some(field)) = (import.type_ref, import.field_name.as_deref()) {
                let owner = &self.module.type_ref(owner).name;
                if known(owner.as_str()) {
                    entries.push(PendingEntry::OuterNested {
                        outer: owner.clone(),
                        nested: format!("{owner}${}", field.replace('.', "$")),
                    });
                }
            }
        }

        if entries.is_empty() {
            'targets: for outer in registry.compile_targets() {
                let mut ident = name;
                while let Some(dot) = ident.rfind('.') {
                    ident = &ident[..dot];
                    if outer.ends_with(ident) {
                        let nested = format!("{outer}{}", name[ident.len()..].replace('.', "$"));
                        entries.push(PendingEntry::OuterNested { outer, nested });
                        break 'targets;
                    }
                }
            }
        }

        if entries.is_empty() {
            for import in &self.module.imports {
                if import.kind != gvc_ast::ImportKind::StaticStar {
                    continue;
                }
                let Some(owner) = import.type_ref else { continue };
                let owner = &self.module.type_ref(owner).name;
                if known(owner.as_str()) {
                    entries.push(PendingEntry::OuterNested {
                        outer: owner.clone(),
                        nested: format!("{owner}${}", name.replace('.', "$")),
                    });
                }
            }
        }

        for entry in entries {
            if let Some(target) = self.register_deferred(entry) {
                return Some(target);
            }
        }
        None
    }

    /// Register a placeholder; an entry that already settled yields its
    /// class and one that failed yields nothing.
    pub(crate) fn register_deferred(&mut self, entry: PendingEntry) -> Option<Target> {
        let registry = self.session.registry();
        self.session.stats().bump(Counter::DeferredRegistrations);
        let pid = registry.register_pending(entry);
        match registry.pending_state(pid) {
            PendingState::Settled(id) => Some(Target::Class(id)),
            PendingState::Failed => None,
            PendingState::Waiting => Some(Target::Pending(pid)),
        }
    }

    /// Strategy 10: ask the external resolver. Undotted names in a packaged
    /// module are left alone; gated names are remembered as missing.
    fn resolve_to_outer(&mut self, name: &str, gated: bool) -> Option<Target> {
        if gated {
            self.session.caches().negative.record_missing(name);
            return None;
        }
        if !self.package_prefix.is_empty() && !name.contains('.') {
            return None;
        }
        if let Some(id) = self.session.store().lookup(name) {
            return Some(Target::Class(id));
        }
        self.lookup_external(name)
    }

    // -------------------------------------------------------------------------
    // Probes
    // -------------------------------------------------------------------------

    /// Look up one constructed binary name: registry, store, then the
    /// external resolver.
    pub(crate) fn probe(&mut self, candidate: &str) -> Option<Target> {
        let session = self.session;
        let stats = session.stats();
        stats.bump(Counter::CandidatesBuilt);
        stats.bump(Counter::RegistryLookups);
        if let Some(id) = session.registry().lookup(candidate) {
            return Some(Target::Class(id));
        }
        if let Some(id) = session.store().lookup(candidate) {
            return Some(Target::Class(id));
        }
        self.lookup_external(candidate)
    }

    /// External lookup guarded by the negative cache. A class owned by an
    /// unloaded unit schedules that unit and yields a placeholder.
    pub(crate) fn lookup_external(&mut self, name: &str) -> Option<Target> {
        let session = self.session;
        let stats = session.stats();
        let caches = session.caches();
        stats.bump(Counter::CacheLookups);
        if caches.negative.is_missing(name) {
            stats.bump(Counter::NegativeCacheHits);
            return None;
        }
        match session.external_lookup(name) {
            Lookup::Class(class) => Some(Target::Class(session.intern_external(class))),
            Lookup::SourceUnit(file) => {
                let registry = session.registry();
                registry.schedule_unit(&file);
                registry.add_compile_target(name, &file);
                self.register_deferred(PendingEntry::AwaitingName(name.to_string()))
            }
            Lookup::NotFound => {
                caches.negative.record_missing(name);
                None
            }
        }
    }

    /// `prefix` is a package; only the class part may be mangled.
    fn resolve_with_package(
        &mut self,
        prefix: &str,
        class_name: &str,
        ctx: &ResolveCtx,
        mode: Mode,
        switches: Switches,
    ) -> Option<Target> {
        if let Some(found) = self.probe(&format!("{prefix}{class_name}")) {
            return Some(found);
        }
        if switches.contains(Switches::STATIC_INNER)
            && let Some(mangled) = mangle_last_dot(class_name)
        {
            self.session.stats().bump(Counter::StaticInnerProbes);
            let candidate = Candidate::WithPackage {
                prefix,
                class_name: &mangled,
            };
            return self.resolve_candidate(candidate, ctx, mode, switches);
        }
        None
    }

    /// `name` (dots allowed) nested in `outer`. Never reports.
    pub(crate) fn resolve_nested(
        &mut self,
        outer: ClassId,
        name: &str,
        ctx: &ResolveCtx,
    ) -> Option<Target> {
        let candidate = Candidate::Nested { outer, name };
        self.resolve_candidate(candidate, ctx, Mode::BestEffort, Switches::empty())
    }

    fn lookup_nested(&mut self, outer: ClassId, name: &str) -> Option<Target> {
        let outer_name = self.session.store().name(outer);
        self.probe(&format!("{outer_name}${}", name.replace('.', "$")))
    }
}
