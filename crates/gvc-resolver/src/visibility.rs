//! Access rules for nested classes.

use crate::store::{ClassId, ClassInfo};
use crate::unit::UnitResolver;
use gvc_ast::{ClassDeclId, Modifiers};

impl UnitResolver<'_> {
    /// Whether code in `from` may name the class `id`.
    ///
    /// Only nested classes are restricted. Private ones are visible inside
    /// their top-level class, package-private ones inside their package, and
    /// protected ones also from subclasses of their outer class.
    pub(crate) fn is_accessible_nested(&self, id: ClassId, from: ClassDeclId) -> bool {
        let session = self.session;
        let store = session.store();
        let Some(info) = store.get(id) else {
            return true;
        };
        if !info.is_nested() || info.modifiers.contains(Modifiers::PUBLIC) {
            return true;
        }
        let from_class = self.module.class(from);
        let from_top = self.module.class(self.module.top_level_of(from));
        if info.top_level_name() == from_top.name {
            return true;
        }
        if info.modifiers.contains(Modifiers::PRIVATE) {
            return false;
        }
        if info.package_prefix() == from_class.package_prefix() {
            return true;
        }
        if !info.modifiers.contains(Modifiers::PROTECTED) {
            return false;
        }
        let Some(outer) = info.outer.as_deref().and_then(|o| store.lookup(o)) else {
            return false;
        };
        std::iter::once(from)
            .chain(self.module.outer_chain(from))
            .any(|decl| session.is_subtype(self.class_ids[decl.index()], outer) == Some(true))
    }

    /// Whether a nested class of one of its superclasses is inherited by
    /// the class `from`.
    pub(crate) fn is_visible_nested_class(&self, id: ClassId, from: ClassId) -> bool {
        let store = self.session.store();
        let (Some(info), Some(from_info)) = (store.get(id), store.get(from)) else {
            return false;
        };
        is_inherited(&info, &from_info)
    }
}

fn is_inherited(nested: &ClassInfo, from: &ClassInfo) -> bool {
    let modifiers = nested.modifiers;
    if modifiers.intersects(Modifiers::PUBLIC | Modifiers::PROTECTED) {
        return true;
    }
    modifiers.is_package_private() && nested.package_prefix() == from.package_prefix()
}
