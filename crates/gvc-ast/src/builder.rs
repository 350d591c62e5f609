//! Programmatic construction of [`ModuleAst`] trees.
//!
//! Front ends that already own a syntax tree lower it through this builder;
//! tests use it directly. Every node gets a synthetic, strictly increasing
//! span so diagnostics stay distinguishable.

use crate::base::{
    AnnotationId, ClassDeclId, ExprId, FieldId, GenericsTypeId, MethodId, PropertyId, StmtId,
    TypeRefId, next_index,
};
use crate::module::ModuleAst;
use crate::node::{
    AnnotationUse, ClassDecl, ClassKind, Expr, ExprKind, FieldDecl, GenericsKind, GenericsType,
    ImportDecl, ImportKind, MethodDecl, Modifiers, Parameter, PropertyDecl, Stmt, StmtKind,
    TypeRef, TypeRefKind,
};
use gvc_common::Span;
use smallvec::SmallVec;

pub struct ModuleBuilder {
    module: ModuleAst,
    cursor: u32,
    anonymous_count: u32,
}

impl ModuleBuilder {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            module: ModuleAst {
                file: file.into(),
                ..ModuleAst::default()
            },
            cursor: 1,
            anonymous_count: 0,
        }
    }

    /// Set the package (`a.b`, no trailing dot).
    #[must_use]
    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.module.package = Some(package.into());
        self
    }

    pub fn finish(self) -> ModuleAst {
        self.module
    }

    /// Read access to the module under construction.
    pub fn module(&self) -> &ModuleAst {
        &self.module
    }

    fn next_span(&mut self, len: usize) -> Span {
        let len = u32::try_from(len.max(1)).unwrap_or(1);
        let start = self.cursor;
        self.cursor = start.saturating_add(len + 1);
        Span::new(start, start + len)
    }

    // -------------------------------------------------------------------------
    // Type references and generics
    // -------------------------------------------------------------------------

    pub fn type_ref(&mut self, name: &str) -> TypeRefId {
        self.type_ref_with(name, &[])
    }

    /// A reference with explicit generics entries.
    pub fn type_ref_with(&mut self, name: &str, generics: &[GenericsTypeId]) -> TypeRefId {
        let span = self.next_span(name.len());
        let id = TypeRefId(next_index(self.module.type_refs.len()));
        self.module.type_refs.push(TypeRef {
            name: name.to_string(),
            kind: TypeRefKind::Named,
            generics: SmallVec::from_slice(generics),
            span,
        });
        id
    }

    /// `Name<A, B>` where each argument is a plain type.
    pub fn generic_ref(&mut self, name: &str, args: &[TypeRefId]) -> TypeRefId {
        let generics: SmallVec<[GenericsTypeId; 2]> =
            args.iter().map(|&arg| self.type_arg(arg)).collect();
        self.type_ref_with(name, &generics)
    }

    pub fn array_ref(&mut self, component: TypeRefId) -> TypeRefId {
        let name = format!("{}[]", self.module.type_ref(component).name);
        let span = self.next_span(name.len());
        let id = TypeRefId(next_index(self.module.type_refs.len()));
        self.module.type_refs.push(TypeRef {
            name,
            kind: TypeRefKind::Array { component },
            generics: SmallVec::new(),
            span,
        });
        id
    }

    fn push_generics(&mut self, kind: GenericsKind, len: usize) -> GenericsTypeId {
        let span = self.next_span(len);
        let id = GenericsTypeId(next_index(self.module.generics.len()));
        self.module.generics.push(GenericsType { kind, span });
        id
    }

    pub fn type_arg(&mut self, type_ref: TypeRefId) -> GenericsTypeId {
        self.push_generics(GenericsKind::Type(type_ref), 1)
    }

    pub fn wildcard(
        &mut self,
        upper_bound: Option<TypeRefId>,
        lower_bound: Option<TypeRefId>,
    ) -> GenericsTypeId {
        self.push_generics(
            GenericsKind::Wildcard {
                upper_bound,
                lower_bound,
            },
            1,
        )
    }

    /// Declared type parameter `name extends bounds...`.
    pub fn type_param(&mut self, name: &str, upper_bounds: &[TypeRefId]) -> GenericsTypeId {
        self.push_generics(
            GenericsKind::Param {
                name: name.to_string(),
                upper_bounds: SmallVec::from_slice(upper_bounds),
                lower_bound: None,
            },
            name.len(),
        )
    }

    // -------------------------------------------------------------------------
    // Imports
    // -------------------------------------------------------------------------

    fn push_import(&mut self, import: ImportDecl) -> usize {
        self.module.imports.push(import);
        self.module.imports.len() - 1
    }

    /// `import a.b.C`
    pub fn import(&mut self, class_name: &str) -> usize {
        self.import_as_opt(class_name, None)
    }

    /// `import a.b.C as D`
    pub fn import_as(&mut self, class_name: &str, alias: &str) -> usize {
        self.import_as_opt(class_name, Some(alias))
    }

    fn import_as_opt(&mut self, class_name: &str, alias: Option<&str>) -> usize {
        let type_ref = self.type_ref(class_name);
        let span = self.module.type_ref(type_ref).span;
        self.push_import(ImportDecl {
            kind: ImportKind::Plain,
            type_ref: Some(type_ref),
            alias: alias.map(str::to_string),
            field_name: None,
            package_name: None,
            span,
        })
    }

    /// `import a.b.*` (pass `a.b`).
    pub fn import_star(&mut self, package: &str) -> usize {
        let span = self.next_span(package.len() + 2);
        self.push_import(ImportDecl {
            kind: ImportKind::Star,
            type_ref: None,
            alias: None,
            field_name: None,
            package_name: Some(format!("{package}.")),
            span,
        })
    }

    /// `import static a.b.C.member [as alias]`
    pub fn import_static(&mut self, class_name: &str, member: &str, alias: Option<&str>) -> usize {
        let type_ref = self.type_ref(class_name);
        let span = self.module.type_ref(type_ref).span;
        self.push_import(ImportDecl {
            kind: ImportKind::Static,
            type_ref: Some(type_ref),
            alias: alias.map(str::to_string),
            field_name: Some(member.to_string()),
            package_name: None,
            span,
        })
    }

    /// `import static a.b.C.*`
    pub fn import_static_star(&mut self, class_name: &str) -> usize {
        let type_ref = self.type_ref(class_name);
        let span = self.module.type_ref(type_ref).span;
        self.push_import(ImportDecl {
            kind: ImportKind::StaticStar,
            type_ref: Some(type_ref),
            alias: None,
            field_name: None,
            package_name: None,
            span,
        })
    }

    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------

    fn push_class(&mut self, name: String, kind: ClassKind, outer: Option<ClassDeclId>) -> ClassDeclId {
        let span = self.next_span(name.len());
        let id = ClassDeclId(next_index(self.module.class_decls.len()));
        self.module.class_decls.push(ClassDecl {
            name,
            modifiers: Modifiers::PUBLIC,
            kind,
            generics: SmallVec::new(),
            superclass: None,
            interfaces: SmallVec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            initializers: Vec::new(),
            inner: Vec::new(),
            outer,
            enclosing_method: None,
            anonymous: false,
            annotations: Vec::new(),
            span,
        });
        self.module.classes.push(id);
        if let Some(outer) = outer {
            self.module.class_decls[outer.index()].inner.push(id);
        }
        id
    }

    /// Top-level class in the module's package.
    pub fn class(&mut self, simple_name: &str) -> ClassDeclId {
        let name = format!("{}{simple_name}", self.module.package_prefix());
        self.push_class(name, ClassKind::Class, None)
    }

    /// Top-level interface in the module's package.
    pub fn interface(&mut self, simple_name: &str) -> ClassDeclId {
        let name = format!("{}{simple_name}", self.module.package_prefix());
        self.push_class(name, ClassKind::Interface, None)
    }

    /// Member class `Outer$simple_name`.
    pub fn nested_class(&mut self, outer: ClassDeclId, simple_name: &str) -> ClassDeclId {
        let name = format!("{}${simple_name}", self.module.class(outer).name);
        self.push_class(name, ClassKind::Class, Some(outer))
    }

    /// Class declared inside `method` of `outer`.
    pub fn local_class(&mut self, outer: ClassDeclId, method: MethodId, simple_name: &str) -> ClassDeclId {
        let id = self.nested_class(outer, simple_name);
        let decl = self.class_mut(id);
        decl.enclosing_method = Some(method);
        decl.modifiers = Modifiers::empty();
        id
    }

    /// Anonymous class `Outer$N`.
    pub fn anonymous_class(&mut self, outer: ClassDeclId, method: Option<MethodId>) -> ClassDeclId {
        self.anonymous_count += 1;
        let name = format!("{}${}", self.module.class(outer).name, self.anonymous_count);
        let id = self.push_class(name, ClassKind::Class, Some(outer));
        let decl = self.class_mut(id);
        decl.enclosing_method = method;
        decl.anonymous = true;
        decl.modifiers = Modifiers::empty();
        id
    }

    pub fn class_mut(&mut self, id: ClassDeclId) -> &mut ClassDecl {
        &mut self.module.class_decls[id.index()]
    }

    pub fn set_modifiers(&mut self, class: ClassDeclId, modifiers: Modifiers) {
        self.class_mut(class).modifiers = modifiers;
    }

    pub fn set_kind(&mut self, class: ClassDeclId, kind: ClassKind) {
        self.class_mut(class).kind = kind;
    }

    /// `extends name`; returns the new reference.
    pub fn extends(&mut self, class: ClassDeclId, name: &str) -> TypeRefId {
        let tr = self.type_ref(name);
        self.class_mut(class).superclass = Some(tr);
        tr
    }

    pub fn set_superclass(&mut self, class: ClassDeclId, type_ref: TypeRefId) {
        self.class_mut(class).superclass = Some(type_ref);
    }

    /// `implements name`; returns the new reference.
    pub fn implements(&mut self, class: ClassDeclId, name: &str) -> TypeRefId {
        let tr = self.type_ref(name);
        self.class_mut(class).interfaces.push(tr);
        tr
    }

    pub fn add_interface(&mut self, class: ClassDeclId, type_ref: TypeRefId) {
        self.class_mut(class).interfaces.push(type_ref);
    }

    pub fn add_type_param(&mut self, class: ClassDeclId, param: GenericsTypeId) {
        self.class_mut(class).generics.push(param);
    }

    pub fn add_field(&mut self, class: ClassDeclId, field: FieldDecl) -> FieldId {
        let id = FieldId(next_index(self.module.fields.len()));
        self.module.fields.push(field);
        self.class_mut(class).fields.push(id);
        id
    }

    /// Field `type_name name`; `None` declares an untyped field.
    pub fn field(&mut self, class: ClassDeclId, name: &str, type_name: Option<&str>) -> FieldId {
        let type_ref = type_name.map(|t| self.type_ref(t));
        let span = self.next_span(name.len());
        self.add_field(
            class,
            FieldDecl {
                name: name.to_string(),
                modifiers: Modifiers::PRIVATE,
                type_ref,
                initializer: None,
                annotations: Vec::new(),
                span,
            },
        )
    }

    pub fn field_mut(&mut self, id: FieldId) -> &mut FieldDecl {
        &mut self.module.fields[id.index()]
    }

    /// Property with a backing field sharing its type reference.
    pub fn property(&mut self, class: ClassDeclId, name: &str, type_name: Option<&str>) -> PropertyId {
        let field = self.field(class, name, type_name);
        let type_ref = self.module.field(field).type_ref;
        let span = self.next_span(name.len());
        let id = PropertyId(next_index(self.module.properties.len()));
        self.module.properties.push(PropertyDecl {
            name: name.to_string(),
            modifiers: Modifiers::PUBLIC,
            type_ref,
            field: Some(field),
            span,
        });
        self.class_mut(class).properties.push(id);
        id
    }

    pub fn add_method(&mut self, class: ClassDeclId, mut method: MethodDecl) -> MethodId {
        if !method.span.is_known() {
            method.span = self.next_span(method.name.len());
        }
        let id = MethodId(next_index(self.module.methods.len()));
        self.module.methods.push(method);
        self.class_mut(class).methods.push(id);
        id
    }

    pub fn method_mut(&mut self, id: MethodId) -> &mut MethodDecl {
        &mut self.module.methods[id.index()]
    }

    pub fn param(&mut self, name: &str, type_name: Option<&str>) -> Parameter {
        let type_ref = type_name.map(|t| self.type_ref(t));
        Parameter {
            name: name.to_string(),
            type_ref,
            default_value: None,
            span: self.next_span(name.len()),
        }
    }

    pub fn add_initializer(&mut self, class: ClassDeclId, block: StmtId) {
        self.class_mut(class).initializers.push(block);
    }

    /// `@name` usage.
    pub fn annotation(&mut self, name: &str) -> AnnotationId {
        let type_ref = self.type_ref(name);
        let span = self.module.type_ref(type_ref).span;
        let id = AnnotationId(next_index(self.module.annotations.len()));
        self.module.annotations.push(AnnotationUse {
            type_ref,
            members: Vec::new(),
            span,
        });
        id
    }

    pub fn annotate_class(&mut self, class: ClassDeclId, annotation: AnnotationId) {
        self.class_mut(class).annotations.push(annotation);
    }

    // -------------------------------------------------------------------------
    // Expressions and statements
    // -------------------------------------------------------------------------

    pub fn expr(&mut self, kind: ExprKind) -> ExprId {
        let span = self.next_span(1);
        let id = ExprId(next_index(self.module.exprs.len()));
        self.module.exprs.push(Expr { kind, span });
        id
    }

    pub fn var(&mut self, name: &str) -> ExprId {
        self.expr(ExprKind::Variable {
            name: name.to_string(),
        })
    }

    pub fn prop(&mut self, object: ExprId, property: &str) -> ExprId {
        self.expr(ExprKind::Property {
            object,
            property: property.to_string(),
        })
    }

    /// `new type_name(args)`
    pub fn new_object(&mut self, type_name: &str, args: Vec<ExprId>) -> ExprId {
        let type_ref = self.type_ref(type_name);
        self.expr(ExprKind::ConstructorCall { type_ref, args })
    }

    /// Local declaration `type_name name = init`.
    pub fn declare(&mut self, type_name: Option<&str>, name: &str, init: Option<ExprId>) -> ExprId {
        let type_ref = type_name.map(|t| self.type_ref(t));
        self.expr(ExprKind::Declaration {
            type_ref,
            name: name.to_string(),
            init,
        })
    }

    pub fn stmt(&mut self, kind: StmtKind) -> StmtId {
        let span = self.next_span(1);
        let id = StmtId(next_index(self.module.stmts.len()));
        self.module.stmts.push(Stmt { kind, span });
        id
    }

    /// Block of expression statements.
    pub fn block_of(&mut self, exprs: &[ExprId]) -> StmtId {
        let stmts: Vec<StmtId> = exprs
            .iter()
            .map(|&e| self.stmt(StmtKind::Expr(e)))
            .collect();
        self.stmt(StmtKind::Block(stmts))
    }

    /// Method `name` whose body evaluates `exprs` in order.
    pub fn method_with_body(&mut self, class: ClassDeclId, name: &str, exprs: &[ExprId]) -> MethodId {
        let body = self.block_of(exprs);
        let mut method = MethodDecl::new(name);
        method.body = Some(body);
        self.add_method(class, method)
    }
}
