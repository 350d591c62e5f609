//! Class descriptors and their published hierarchy shapes.
//!
//! The store is the arena every resolution target points into. A `ClassInfo`
//! is immutable once interned; hierarchy facts that only become known during
//! resolution (superclass, interfaces, type-parameter bounds) are published
//! separately as a `ClassShape`, and may be republished once deferred
//! supertypes settle.

use crate::builtins::{self, BIG_DECIMAL, BIG_INTEGER, OBJECT};
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use gvc_ast::{ClassDeclId, ClassKind, Modifiers};
use smallvec::SmallVec;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::trace;

/// Identifier of an interned class descriptor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl ClassId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a descriptor came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassOrigin {
    /// Primitives, `java.lang.Object` and the big-number fallbacks.
    Builtin,
    /// Declared in a unit of the program.
    Source { file: Arc<str>, decl: ClassDeclId },
    /// Supplied by the external resolver.
    External,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassInfo {
    /// Fully-qualified binary name (`p.Outer$Inner`).
    pub name: String,
    pub modifiers: Modifiers,
    pub kind: ClassKind,
    pub origin: ClassOrigin,
    /// Binary name of the enclosing class.
    pub outer: Option<String>,
    pub type_params: SmallVec<[String; 2]>,
    /// Supertype names of external classes, resolved when the shape is first needed.
    pub super_name: Option<String>,
    pub interface_names: Vec<String>,
    pub type_param_bound_names: Vec<Vec<String>>,
}

impl ClassInfo {
    pub fn builtin(name: &str) -> Self {
        Self {
            name: name.to_string(),
            modifiers: Modifiers::PUBLIC | Modifiers::FINAL,
            kind: ClassKind::Class,
            origin: ClassOrigin::Builtin,
            outer: None,
            type_params: SmallVec::new(),
            super_name: None,
            interface_names: Vec::new(),
            type_param_bound_names: Vec::new(),
        }
    }

    /// Name without the package: `Outer$Inner`.
    pub fn name_without_package(&self) -> &str {
        match self.name.rfind('.') {
            Some(dot) => &self.name[dot + 1..],
            None => &self.name,
        }
    }

    /// Package prefix with trailing dot, or `""`.
    pub fn package_prefix(&self) -> &str {
        match self.name.rfind('.') {
            Some(dot) => &self.name[..=dot],
            None => "",
        }
    }

    /// Binary name of the outermost enclosing class.
    pub fn top_level_name(&self) -> &str {
        let start = self.package_prefix().len();
        match self.name[start..].find('$') {
            Some(sep) => &self.name[..start + sep],
            None => &self.name,
        }
    }

    #[inline]
    pub fn is_nested(&self) -> bool {
        self.outer.is_some()
    }

    /// Static nested classes, plus nested interfaces, enums and annotations
    /// which are implicitly static.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
            || matches!(
                self.kind,
                ClassKind::Interface | ClassKind::Enum | ClassKind::Annotation
            )
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        self.kind.is_interface_like()
    }
}

/// Resolved hierarchy facts of one class.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassShape {
    pub superclass: Option<ClassId>,
    pub interfaces: SmallVec<[ClassId; 2]>,
    /// Resolved upper bounds per type parameter, in declaration order.
    pub type_param_bounds: Vec<SmallVec<[ClassId; 1]>>,
}

pub struct ClassStore {
    classes: DashMap<ClassId, Arc<ClassInfo>>,
    by_name: DashMap<String, ClassId>,
    shapes: DashMap<ClassId, Arc<ClassShape>>,
    /// Classes whose hierarchy was found cyclic.
    inconsistent: DashSet<ClassId>,
    next_id: AtomicU32,
    object: ClassId,
}

impl Default for ClassStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassStore {
    /// Create a store pre-populated with the builtin descriptors.
    pub fn new() -> Self {
        let mut store = Self {
            classes: DashMap::new(),
            by_name: DashMap::new(),
            shapes: DashMap::new(),
            inconsistent: DashSet::new(),
            next_id: AtomicU32::new(0),
            object: ClassId(0),
        };
        let mut object_info = ClassInfo::builtin(OBJECT);
        object_info.modifiers = Modifiers::PUBLIC;
        store.object = store.intern(object_info);
        store.publish_shape(store.object, ClassShape::default());

        for primitive in builtins::PRIMITIVES.iter() {
            let id = store.intern(ClassInfo::builtin(primitive));
            store.publish_shape(id, ClassShape::default());
        }
        for name in [BIG_INTEGER, BIG_DECIMAL] {
            let id = store.intern(ClassInfo::builtin(name));
            store.publish_shape(
                id,
                ClassShape {
                    superclass: Some(store.object),
                    ..ClassShape::default()
                },
            );
        }
        store
    }

    fn allocate(&self) -> ClassId {
        ClassId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Intern a descriptor, returning the existing id if the name is known.
    pub fn intern(&self, info: ClassInfo) -> ClassId {
        match self.by_name.entry(info.name.clone()) {
            Entry::Occupied(existing) => *existing.get(),
            Entry::Vacant(slot) => {
                let id = self.allocate();
                trace!(class_id = id.0, name = %info.name, origin = ?info.origin, "ClassStore::intern");
                self.classes.insert(id, Arc::new(info));
                slot.insert(id);
                id
            }
        }
    }

    #[inline]
    pub fn object(&self) -> ClassId {
        self.object
    }

    pub fn get(&self, id: ClassId) -> Option<Arc<ClassInfo>> {
        self.classes.get(&id).map(|r| Arc::clone(r.value()))
    }

    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).map(|r| *r.value())
    }

    /// Binary name of `id`, or `"<unknown>"`.
    pub fn name(&self, id: ClassId) -> String {
        self.get(id)
            .map_or_else(|| "<unknown>".to_string(), |info| info.name.clone())
    }

    /// Upper bound on ids handed out so far (for bitset sizing).
    pub fn len(&self) -> usize {
        self.next_id.load(Ordering::SeqCst) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn publish_shape(&self, id: ClassId, shape: ClassShape) {
        trace!(class_id = id.0, superclass = ?shape.superclass, "ClassStore::publish_shape");
        self.shapes.insert(id, Arc::new(shape));
    }

    pub fn shape(&self, id: ClassId) -> Option<Arc<ClassShape>> {
        self.shapes.get(&id).map(|r| Arc::clone(r.value()))
    }

    /// Flag a cyclic hierarchy. Returns `true` the first time.
    pub fn mark_inconsistent(&self, id: ClassId) -> bool {
        self.inconsistent.insert(id)
    }

    pub fn is_inconsistent(&self, id: ClassId) -> bool {
        self.inconsistent.contains(&id)
    }
}
