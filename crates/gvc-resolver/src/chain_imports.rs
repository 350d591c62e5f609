//! Import strategies and lazy import resolution.

use crate::env::ResolveCtx;
use crate::registry::{PendingEntry, PendingState};
use crate::target::{Candidate, Mode, Switches, Target};
use crate::unit::UnitResolver;
use gvc_ast::ImportKind;
use gvc_common::diagnostic_codes;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, trace};

impl UnitResolver<'_> {
    /// Strategy 5: aliases first, then (for names that are not gated) the
    /// same package, static imports, star and static-star imports.
    pub(crate) fn resolve_from_imports(
        &mut self,
        name: &str,
        gated: bool,
        ctx: &ResolveCtx,
        mode: Mode,
    ) -> Option<Target> {
        if let Some(found) = self.resolve_alias_from_module(name, ctx, mode) {
            return Some(found);
        }
        if gated {
            return None;
        }

        if !self.package_prefix.is_empty() {
            let prefix = self.package_prefix.clone();
            let candidate = Candidate::WithPackage {
                prefix: &prefix,
                class_name: name,
            };
            if let Some(found) = self.resolve_candidate(candidate, ctx, mode, Switches::STATIC_INNER)
            {
                return Some(found);
            }
        }

        let module = Arc::clone(&self.module);
        for (index, import) in module.imports.iter().enumerate() {
            if import.kind != ImportKind::Static || import.field_name.as_deref() != Some(name) {
                continue;
            }
            if let Some(Target::Class(owner)) = self.import_target(index)
                && let Some(found) = self.resolve_nested(owner, name, ctx)
                && self.is_static_class(found)
            {
                return Some(found);
            }
        }

        // Distinct targets with the import that produced each.
        let mut matches: SmallVec<[(Target, usize); 2]> = SmallVec::new();
        for (index, import) in module.imports.iter().enumerate() {
            let found = match import.kind {
                ImportKind::Star => {
                    let Some(prefix) = import.package_name.as_deref() else {
                        continue;
                    };
                    let candidate = Candidate::WithPackage {
                        prefix,
                        class_name: name,
                    };
                    match self.resolve_candidate(candidate, ctx, mode, Switches::STATIC_INNER) {
                        Some(found) => Some(found),
                        None => match self.import_target(index) {
                            Some(Target::Class(owner)) => self.resolve_nested(owner, name, ctx),
                            _ => None,
                        },
                    }
                }
                ImportKind::StaticStar => match self.import_target(index) {
                    Some(Target::Class(owner)) => self
                        .resolve_nested(owner, name, ctx)
                        .filter(|&found| self.is_static_class(found)),
                    _ => None,
                },
                ImportKind::Plain | ImportKind::Static => None,
            };
            if let Some(found) = found
                && !matches.iter().any(|&(m, _)| m == found)
            {
                matches.push((found, index));
            }
        }

        let (first, _) = *matches.first()?;
        if let Target::Class(first_id) = first
            && let Some((other_id, other_import)) = matches
                .iter()
                .skip(1)
                .find_map(|&(m, index)| m.class().map(|id| (id, index)))
            && other_id != first_id
        {
            let store = self.session.store();
            let first_name = store.name(first_id);
            let other_name = store.name(other_id);
            self.error_with_related(
                self.current_span,
                diagnostic_codes::AMBIGUOUS_CLASS_REFERENCE,
                &[name, &first_name, &other_name],
                module.imports[other_import].span,
                format!("class {other_name} is imported here"),
            );
        }
        Some(first)
    }

    /// Import aliases, walking from the whole name to its first segment.
    ///
    /// A full match yields the imported class. A partial match of a plain
    /// import (`Map.Entry` with `import java.util.Map`) makes the rest of the
    /// name a nested class of the imported one. A static import alias only
    /// names a static nested class, and only as the whole name. The import
    /// currently being resolved never matches.
    pub(crate) fn resolve_alias_from_module(
        &mut self,
        name: &str,
        ctx: &ResolveCtx,
        mode: Mode,
    ) -> Option<Target> {
        let mut end = name.len();
        loop {
            let prefix = &name[..end];
            let whole = end == name.len();
            let excluded = |index: &usize| ctx.current_import != Some(*index);

            if let Some(index) = self.plain_aliases.get(prefix).copied().filter(excluded) {
                match self.import_target(index) {
                    Some(Target::Class(aliased)) if whole => return Some(Target::Class(aliased)),
                    Some(Target::Class(aliased)) => {
                        if let Some(info) = self.session.store().get(aliased) {
                            let class_name = format!(
                                "{}${}",
                                info.name_without_package(),
                                name[end + 1..].replace('.', "$")
                            );
                            let candidate = Candidate::WithPackage {
                                prefix: info.package_prefix(),
                                class_name: &class_name,
                            };
                            let switches = Switches::MODULE_IMPORTS | Switches::DEFAULT_IMPORTS;
                            if let Some(found) = self.resolve_candidate(candidate, ctx, mode, switches)
                            {
                                return Some(found);
                            }
                        }
                    }
                    Some(Target::Pending(pid)) if whole => return Some(Target::Pending(pid)),
                    Some(Target::Pending(pid)) if mode == Mode::OrFail => {
                        if let Some(entry) = self.session.registry().pending_entry(pid) {
                            let outer = entry.target_name().to_string();
                            let nested = format!("{outer}${}", name[end + 1..].replace('.', "$"));
                            trace!(name, %outer, "alias names a class of an unloaded unit");
                            if let Some(found) =
                                self.register_deferred(PendingEntry::OuterNested { outer, nested })
                            {
                                return Some(found);
                            }
                        }
                    }
                    _ => {}
                }
            } else if whole
                && let Some(index) = self.static_aliases.get(prefix).copied().filter(excluded)
                && let Some(Target::Class(owner)) = self.import_target(index)
                && let Some(field) = self.module.imports[index].field_name.clone()
                && let Some(found) = self.resolve_nested(owner, &field, ctx)
                && self.is_static_class(found)
            {
                return Some(found);
            }

            match prefix.rfind('.') {
                Some(dot) => end = dot,
                None => return None,
            }
        }
    }

    /// Target of import `index`, resolved on first use.
    ///
    /// Plain imports resolve with module and default imports off; static
    /// imports use every strategy but forward registration; a star import
    /// checks whether its package is really a class.
    pub(crate) fn import_target(&mut self, index: usize) -> Option<Target> {
        match self.import_targets.get(index).copied() {
            None => return None,
            Some(Some(memo)) => {
                let target = self.settled(memo?);
                return Some(target);
            }
            Some(None) => {}
        }
        self.import_targets[index] = Some(None);

        let module = Arc::clone(&self.module);
        let import = &module.imports[index];
        let ctx = ResolveCtx::module().for_import(index);
        let found = match (import.kind, import.type_ref) {
            (ImportKind::Plain, Some(type_ref)) => {
                let name = module.type_ref(type_ref).name.as_str();
                self.resolve_candidate(
                    Candidate::Plain(name),
                    &ctx,
                    Mode::BestEffort,
                    Switches::STATIC_INNER,
                )
            }
            (ImportKind::Static | ImportKind::StaticStar, Some(type_ref)) => {
                let name = module.type_ref(type_ref).name.as_str();
                let switches = Switches::for_mode(Mode::BestEffort);
                let found =
                    self.resolve_candidate(Candidate::Plain(name), &ctx, Mode::BestEffort, switches);
                if found.is_none()
                    && import.kind == ImportKind::StaticStar
                    && !self.package_prefix.is_empty()
                {
                    let qualified = format!("{}{name}", self.package_prefix);
                    self.resolve_candidate(
                        Candidate::Plain(&qualified),
                        &ctx,
                        Mode::BestEffort,
                        switches,
                    )
                } else {
                    found
                }
            }
            (ImportKind::Star, _) => {
                let package = import
                    .package_name
                    .as_deref()
                    .map(|p| p.trim_end_matches('.'))
                    .unwrap_or_default();
                if package.is_empty() {
                    None
                } else {
                    self.resolve_candidate(
                        Candidate::Plain(package),
                        &ctx,
                        Mode::BestEffort,
                        Switches::STATIC_INNER,
                    )
                }
            }
            _ => None,
        };
        self.import_targets[index] = Some(found);
        found
    }

    /// Resolve every import of the module once, reporting failures.
    pub(crate) fn resolve_imports(&mut self) {
        if self.imports_resolved {
            return;
        }
        self.imports_resolved = true;
        let module = Arc::clone(&self.module);
        for (index, import) in module.imports.iter().enumerate() {
            let found = self.import_target(index);
            let Some(type_ref) = import.type_ref else {
                continue;
            };
            match found {
                Some(target) => self.set_target(type_ref, target, false),
                None => {
                    let node = module.type_ref(type_ref);
                    self.error(
                        node.span,
                        diagnostic_codes::UNABLE_TO_RESOLVE_CLASS,
                        &[&node.name],
                    );
                }
            }
        }
        debug!(file = %self.file, imports = module.imports.len(), "imports resolved");
    }

    /// A pending target whose entry settled since is replaced by its class.
    pub(crate) fn settled(&self, target: Target) -> Target {
        match target {
            Target::Pending(pid) => match self.session.registry().pending_state(pid) {
                PendingState::Settled(id) => Target::Class(id),
                PendingState::Waiting | PendingState::Failed => target,
            },
            _ => target,
        }
    }

    /// Static nested class, or a nested interface, enum or annotation.
    pub(crate) fn is_static_class(&self, target: Target) -> bool {
        match target {
            Target::Class(id) => self
                .session
                .store()
                .get(id)
                .is_some_and(|info| info.is_static()),
            _ => false,
        }
    }
}
