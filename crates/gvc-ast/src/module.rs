//! The per-unit module and its node pools.

use crate::base::{
    AnnotationId, ClassDeclId, ExprId, FieldId, GenericsTypeId, MethodId, PropertyId, StmtId,
    TypeRefId,
};
use crate::node::{
    AnnotationUse, ClassDecl, Expr, FieldDecl, GenericsType, ImportDecl, ImportKind, MethodDecl,
    PropertyDecl, Stmt, TypeRef,
};
use indexmap::IndexMap;

/// One parsed source unit.
///
/// Pools are append-only while building and read-only afterwards. `classes`
/// lists every declaration in the unit, nested ones included, in source order.
#[derive(Clone, Debug, Default)]
pub struct ModuleAst {
    pub file: String,
    /// Dotted package name without trailing dot (`a.b`), if declared.
    pub package: Option<String>,
    pub imports: Vec<ImportDecl>,
    pub classes: Vec<ClassDeclId>,

    pub(crate) type_refs: Vec<TypeRef>,
    pub(crate) generics: Vec<GenericsType>,
    pub(crate) class_decls: Vec<ClassDecl>,
    pub(crate) fields: Vec<FieldDecl>,
    pub(crate) properties: Vec<PropertyDecl>,
    pub(crate) methods: Vec<MethodDecl>,
    pub(crate) exprs: Vec<Expr>,
    pub(crate) stmts: Vec<Stmt>,
    pub(crate) annotations: Vec<AnnotationUse>,
}

impl ModuleAst {
    /// Package prefix with trailing dot, or `""`.
    pub fn package_prefix(&self) -> String {
        match &self.package {
            Some(pkg) if !pkg.is_empty() => format!("{pkg}."),
            _ => String::new(),
        }
    }

    #[inline]
    pub fn has_package(&self) -> bool {
        self.package.as_deref().is_some_and(|p| !p.is_empty())
    }

    #[inline]
    pub fn type_ref(&self, id: TypeRefId) -> &TypeRef {
        &self.type_refs[id.index()]
    }

    #[inline]
    pub fn generics_type(&self, id: GenericsTypeId) -> &GenericsType {
        &self.generics[id.index()]
    }

    #[inline]
    pub fn class(&self, id: ClassDeclId) -> &ClassDecl {
        &self.class_decls[id.index()]
    }

    #[inline]
    pub fn field(&self, id: FieldId) -> &FieldDecl {
        &self.fields[id.index()]
    }

    #[inline]
    pub fn property(&self, id: PropertyId) -> &PropertyDecl {
        &self.properties[id.index()]
    }

    #[inline]
    pub fn method(&self, id: MethodId) -> &MethodDecl {
        &self.methods[id.index()]
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn annotation(&self, id: AnnotationId) -> &AnnotationUse {
        &self.annotations[id.index()]
    }

    pub fn type_ref_count(&self) -> usize {
        self.type_refs.len()
    }

    pub fn class_count(&self) -> usize {
        self.class_decls.len()
    }

    /// All type reference ids in allocation order.
    pub fn type_ref_ids(&self) -> impl Iterator<Item = TypeRefId> + '_ {
        (0..self.type_refs.len()).map(|i| TypeRefId(crate::base::next_index(i)))
    }

    /// Declarations with no enclosing class.
    pub fn top_level_classes(&self) -> impl Iterator<Item = ClassDeclId> + '_ {
        self.classes
            .iter()
            .copied()
            .filter(|&id| self.class(id).outer.is_none())
    }

    /// Find a declaration of this unit by fully-qualified binary name.
    pub fn find_class(&self, name: &str) -> Option<ClassDeclId> {
        self.classes
            .iter()
            .copied()
            .find(|&id| self.class(id).name == name)
    }

    /// Outer classes of `id`, innermost first.
    pub fn outer_chain(&self, id: ClassDeclId) -> impl Iterator<Item = ClassDeclId> + '_ {
        std::iter::successors(self.class(id).outer, move |&c| self.class(c).outer)
    }

    /// The outermost declaration enclosing `id` (or `id` itself).
    pub fn top_level_of(&self, id: ClassDeclId) -> ClassDeclId {
        self.outer_chain(id).last().unwrap_or(id)
    }

    /// Plain and static imports keyed by the name they introduce.
    ///
    /// Later imports of the same alias replace earlier ones, as the last
    /// declaration wins in source.
    pub fn alias_table(&self, kind: ImportKind) -> IndexMap<String, usize> {
        let mut table = IndexMap::new();
        for (index, import) in self.imports.iter().enumerate() {
            if import.kind != kind {
                continue;
            }
            if let Some(alias) = self.import_alias(import) {
                table.insert(alias, index);
            }
        }
        table
    }

    /// The name an import introduces: its alias, the simple class name for plain
    /// imports, or the member name for static imports.
    pub fn import_alias(&self, import: &ImportDecl) -> Option<String> {
        if let Some(alias) = &import.alias {
            return Some(alias.clone());
        }
        match import.kind {
            ImportKind::Plain => import.type_ref.map(|tr| {
                let name = &self.type_ref(tr).name;
                name.rsplit('.').next().unwrap_or(name).to_string()
            }),
            ImportKind::Static => import.field_name.clone(),
            ImportKind::Star | ImportKind::StaticStar => None,
        }
    }
}
