//! Per-compilation shared state.

use crate::cache::ResolverCaches;
use crate::external::{ExternalClass, ExternalResolver, Lookup};
use crate::options::ResolverOptions;
use crate::registry::ProgramRegistry;
use crate::stats::{Counter, ResolveStats};
use crate::store::{ClassId, ClassInfo, ClassOrigin, ClassShape, ClassStore};
use fixedbitset::FixedBitSet;
use gvc_ast::{ClassDeclId, ModuleAst};
use gvc_common::limits::MAX_HIERARCHY_DEPTH;
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything units of one program compile share: class store, registry,
/// caches, counters and the external resolver.
///
/// A session is created per compilation and dropped with it. Units borrow it;
/// every member is safe to use from several worker threads at once.
pub struct ResolveSession {
    options: ResolverOptions,
    default_imports: Vec<Arc<str>>,
    store: ClassStore,
    registry: ProgramRegistry,
    caches: ResolverCaches,
    stats: ResolveStats,
    external: Arc<dyn ExternalResolver>,
}

impl ResolveSession {
    pub fn new(options: ResolverOptions, external: Arc<dyn ExternalResolver>) -> Self {
        let options = options.normalized();
        let default_imports = options
            .default_imports
            .iter()
            .map(|p| Arc::from(p.as_str()))
            .collect();
        Self {
            options,
            default_imports,
            store: ClassStore::new(),
            registry: ProgramRegistry::new(),
            caches: ResolverCaches::default(),
            stats: ResolveStats::default(),
            external,
        }
    }

    /// Session with default options.
    pub fn with_resolver(external: Arc<dyn ExternalResolver>) -> Self {
        Self::new(ResolverOptions::default(), external)
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn default_imports(&self) -> &[Arc<str>] {
        &self.default_imports
    }

    pub fn store(&self) -> &ClassStore {
        &self.store
    }

    pub fn registry(&self) -> &ProgramRegistry {
        &self.registry
    }

    pub fn caches(&self) -> &ResolverCaches {
        &self.caches
    }

    pub fn stats(&self) -> &ResolveStats {
        &self.stats
    }

    pub(crate) fn external_lookup(&self, name: &str) -> Lookup {
        self.stats.bump(Counter::ExternalLookups);
        self.external.lookup(name, &self.registry)
    }

    /// Register every class of `module` and the unit itself.
    pub fn register_module(&self, module: &ModuleAst) -> Vec<ClassId> {
        let file: Arc<str> = Arc::from(module.file.as_str());
        let mut ids = Vec::with_capacity(module.class_count());
        for index in 0..module.class_count() {
            let decl_id = ClassDeclId(u32::try_from(index).unwrap_or(u32::MAX));
            let decl = module.class(decl_id);
            let type_params = decl
                .generics
                .iter()
                .filter_map(|&g| module.generics_type(g).param_name())
                .map(str::to_string)
                .collect();
            let info = ClassInfo {
                name: decl.name.clone(),
                modifiers: decl.modifiers,
                kind: decl.kind,
                origin: ClassOrigin::Source {
                    file: Arc::clone(&file),
                    decl: decl_id,
                },
                outer: decl.outer.map(|o| module.class(o).name.clone()),
                type_params,
                super_name: None,
                interface_names: Vec::new(),
                type_param_bound_names: Vec::new(),
            };
            let id = self.store.intern(info);
            if self.store.get(id).is_some_and(|existing| {
                !matches!(&existing.origin, ClassOrigin::Source { file: f, .. } if *f == file)
            }) {
                warn!(name = %decl.name, file = %file, "class already declared elsewhere");
            }
            self.registry.register_class(&decl.name, id);
            ids.push(id);
        }
        self.registry.register_unit(&module.file);
        debug!(file = %module.file, classes = ids.len(), "registered unit");
        ids
    }

    /// Intern a class supplied by the external resolver.
    pub fn intern_external(&self, class: ExternalClass) -> ClassId {
        let outer = class.outer_name();
        let info = ClassInfo {
            name: class.name,
            modifiers: class.modifiers,
            kind: class.kind,
            origin: ClassOrigin::External,
            outer,
            type_params: class.type_params.into_iter().collect(),
            super_name: class.superclass,
            interface_names: class.interfaces,
            type_param_bound_names: class.type_param_bounds,
        };
        self.store.intern(info)
    }

    /// Find a class by exact binary name: registry, store, then the external
    /// resolver. Never schedules units.
    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        if let Some(id) = self.registry.lookup(name) {
            return Some(id);
        }
        if let Some(id) = self.store.lookup(name) {
            return Some(id);
        }
        if self.caches.negative.is_missing(name) {
            return None;
        }
        match self.external_lookup(name) {
            Lookup::Class(class) => Some(self.intern_external(class)),
            Lookup::NotFound => {
                self.caches.negative.record_missing(name);
                None
            }
            Lookup::SourceUnit(_) => None,
        }
    }

    /// Published shape of `id`. External classes get theirs computed on first
    /// request; source classes have none until their header stage ran.
    pub fn shape_of(&self, id: ClassId) -> Option<Arc<ClassShape>> {
        if let Some(shape) = self.store.shape(id) {
            return Some(shape);
        }
        let info = self.store.get(id)?;
        if info.origin != ClassOrigin::External {
            return None;
        }
        let superclass = match &info.super_name {
            Some(name) => Some(self.class_by_name(name)?),
            None if info.is_interface() => None,
            None => Some(self.store.object()),
        };
        let mut interfaces = SmallVec::new();
        for name in &info.interface_names {
            interfaces.push(self.class_by_name(name)?);
        }
        let type_param_bounds = info
            .type_param_bound_names
            .iter()
            .map(|bounds| {
                bounds
                    .iter()
                    .filter_map(|b| self.class_by_name(b))
                    .collect()
            })
            .collect();
        let shape = ClassShape {
            superclass,
            interfaces,
            type_param_bounds,
        };
        self.store.publish_shape(id, shape);
        self.store.shape(id)
    }

    /// Whether `sub` is `sup` or inherits from it. `None` when part of the
    /// hierarchy is unknown or inconsistent.
    pub fn is_subtype(&self, sub: ClassId, sup: ClassId) -> Option<bool> {
        if sub == sup || sup == self.store.object() {
            return Some(true);
        }
        let mut visited = FixedBitSet::with_capacity(self.store.len());
        let mut queue = VecDeque::from([sub]);
        let mut steps = 0usize;
        while let Some(current) = queue.pop_front() {
            steps += 1;
            if steps > MAX_HIERARCHY_DEPTH {
                return None;
            }
            visited.grow(current.index() + 1);
            if visited.put(current.index()) {
                continue;
            }
            if current == sup {
                return Some(true);
            }
            if self.store.is_inconsistent(current) {
                return None;
            }
            let shape = self.shape_of(current)?;
            queue.extend(shape.superclass);
            queue.extend(shape.interfaces.iter().copied());
        }
        Some(false)
    }

    /// Every interface `id` implements, directly or through its superclasses
    /// and superinterfaces, in breadth-first order.
    pub fn all_interfaces(&self, id: ClassId) -> SmallVec<[ClassId; 4]> {
        let mut found = SmallVec::new();
        let mut visited = FixedBitSet::with_capacity(self.store.len());
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            visited.grow(current.index() + 1);
            if visited.put(current.index()) || visited.count_ones(..) > MAX_HIERARCHY_DEPTH {
                continue;
            }
            let Some(shape) = self.shape_of(current) else {
                continue;
            };
            for &interface in &shape.interfaces {
                if !found.contains(&interface) {
                    found.push(interface);
                }
                queue.push_back(interface);
            }
            queue.extend(shape.superclass);
        }
        found
    }

    /// Superclass chain of `id` (excluding `id`), stopping at unknown shapes,
    /// cycles or inconsistent classes.
    pub fn superclass_chain(&self, id: ClassId) -> SmallVec<[ClassId; 8]> {
        let mut chain = SmallVec::new();
        let mut visited = FixedBitSet::with_capacity(self.store.len());
        visited.grow(id.index() + 1);
        visited.insert(id.index());
        let mut cursor = self.shape_of(id).and_then(|s| s.superclass);
        while let Some(current) = cursor {
            visited.grow(current.index() + 1);
            if visited.put(current.index()) || chain.len() >= MAX_HIERARCHY_DEPTH {
                break;
            }
            chain.push(current);
            if self.store.is_inconsistent(current) {
                break;
            }
            cursor = self.shape_of(current).and_then(|s| s.superclass);
        }
        chain
    }
}
