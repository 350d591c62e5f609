//! Shape publication and cyclic inheritance detection.

use crate::store::{ClassId, ClassShape};
use crate::target::Target;
use crate::unit::UnitResolver;
use fixedbitset::FixedBitSet;
use gvc_ast::{ClassDeclId, GenericsKind};
use gvc_common::diagnostic_codes;
use gvc_common::limits::MAX_HIERARCHY_DEPTH;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, trace};

impl UnitResolver<'_> {
    /// Publish the resolved supertypes and bounds of `decl`.
    ///
    /// A superclass still pending leaves the shape without one; the class is
    /// remembered and republished during finalization.
    pub(crate) fn publish_shape(&mut self, decl: ClassDeclId) {
        let module = Arc::clone(&self.module);
        let class = module.class(decl);
        let id = self.class_ids[decl.index()];

        let superclass = match class.superclass.and_then(|tr| self.target_of(tr)) {
            Some(Target::Class(super_id)) => Some(super_id),
            Some(Target::Pending(_)) => {
                if !self.pending_shapes.contains(&decl) {
                    self.pending_shapes.push(decl);
                }
                None
            }
            _ if class.is_interface() => None,
            _ => Some(self.object_id()),
        };
        let mut interfaces: SmallVec<[ClassId; 2]> = SmallVec::new();
        for &type_ref in &class.interfaces {
            match self.target_of(type_ref) {
                Some(Target::Class(interface)) => interfaces.push(interface),
                Some(Target::Pending(_)) if !self.pending_shapes.contains(&decl) => {
                    self.pending_shapes.push(decl);
                }
                _ => {}
            }
        }
        let type_param_bounds = class
            .generics
            .iter()
            .filter_map(|&g| match &module.generics_type(g).kind {
                GenericsKind::Param { upper_bounds, .. } => Some(
                    upper_bounds
                        .iter()
                        .filter_map(|&b| self.class_target(b))
                        .collect(),
                ),
                _ => None,
            })
            .collect();

        trace!(class = %class.name, ?superclass, interfaces = interfaces.len(), "publishing shape");
        self.session.store().publish_shape(
            id,
            ClassShape {
                superclass,
                interfaces,
                type_param_bounds,
            },
        );
    }

    /// Report a class that inherits from itself, once, and mark its
    /// hierarchy inconsistent.
    pub(crate) fn check_hierarchy(&mut self, decl: ClassDeclId) {
        let session = self.session;
        let store = session.store();
        let id = self.class_ids[decl.index()];
        if store.is_inconsistent(id) {
            return;
        }
        let Some(shape) = store.shape(id) else {
            return;
        };
        let module = Arc::clone(&self.module);
        let class = module.class(decl);

        let found = if class.is_interface() {
            self.interface_cycle(id, &shape).map(|via| {
                (
                    diagnostic_codes::CYCLIC_INHERITANCE_IN_INTERFACE,
                    vec![store.name(via), class.name.clone()],
                )
            })
        } else if let Some(direct) = self.superclass_cycle(id, &shape) {
            Some((
                diagnostic_codes::CYCLIC_INHERITANCE_IN_CLASS,
                vec![store.name(direct), class.name.clone()],
            ))
        } else if shape.interfaces.contains(&id) {
            Some((
                diagnostic_codes::TYPE_CANNOT_IMPLEMENT_ITSELF,
                vec![class.name.clone()],
            ))
        } else {
            None
        };

        if let Some((code, args)) = found {
            store.mark_inconsistent(id);
            debug!(class = %class.name, code, "cyclic hierarchy");
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            self.error(class.span, code, &args);
        }
    }

    /// Direct superclass of `origin` when following superclasses leads back
    /// to `origin`.
    fn superclass_cycle(&self, origin: ClassId, shape: &ClassShape) -> Option<ClassId> {
        let session = self.session;
        let direct = shape.superclass?;
        let mut visited = FixedBitSet::with_capacity(session.store().len());
        let mut cursor = Some(direct);
        let mut steps = 0usize;
        while let Some(current) = cursor {
            if current == origin {
                return Some(direct);
            }
            steps += 1;
            visited.grow(current.index() + 1);
            if visited.put(current.index()) || steps > MAX_HIERARCHY_DEPTH {
                return None;
            }
            cursor = session.shape_of(current).and_then(|s| s.superclass);
        }
        None
    }

    /// First-level superinterface of `origin` through which the interface
    /// lattice leads back to `origin`.
    fn interface_cycle(&self, origin: ClassId, shape: &ClassShape) -> Option<ClassId> {
        let session = self.session;
        let mut visited = FixedBitSet::with_capacity(session.store().len());
        for &first in &shape.interfaces {
            let mut stack = vec![first];
            let mut steps = 0usize;
            while let Some(current) = stack.pop() {
                if current == origin {
                    return Some(first);
                }
                steps += 1;
                visited.grow(current.index() + 1);
                if visited.put(current.index()) || steps > MAX_HIERARCHY_DEPTH {
                    continue;
                }
                if let Some(next) = session.shape_of(current) {
                    stack.extend(next.interfaces.iter().copied());
                }
            }
        }
        None
    }
}
