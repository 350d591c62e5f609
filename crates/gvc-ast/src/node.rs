//! Node definitions for the module pools.

use crate::base::{
    AnnotationId, ClassDeclId, ExprId, FieldId, GenericsTypeId, MethodId, PropertyId, StmtId,
    TypeRefId,
};
use bitflags::bitflags;
use gvc_common::Span;
use smallvec::SmallVec;

// =============================================================================
// Type references and generics
// =============================================================================

/// A type reference as written in source.
///
/// `name` is the dotted name exactly as written (`Map.Entry`, `a.b.C`). For
/// array references the name is the component name followed by `[]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub kind: TypeRefKind,
    /// Type arguments (`GenericsKind::Type` or `GenericsKind::Wildcard`).
    pub generics: SmallVec<[GenericsTypeId; 2]>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeRefKind {
    Named,
    Array { component: TypeRefId },
}

impl TypeRef {
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeRefKind::Array { .. })
    }

    /// True when the name carries at least one dot.
    #[inline]
    pub fn has_package_or_outer(&self) -> bool {
        self.name.contains('.')
    }
}

/// A generics entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericsType {
    pub kind: GenericsKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenericsKind {
    /// Declared type parameter: `T extends A & B` or `T super C`.
    Param {
        name: String,
        upper_bounds: SmallVec<[TypeRefId; 1]>,
        lower_bound: Option<TypeRefId>,
    },
    /// Type argument naming a type: the `String` in `List<String>`.
    Type(TypeRefId),
    /// Wildcard type argument: `?`, `? extends A`, `? super B`.
    Wildcard {
        upper_bound: Option<TypeRefId>,
        lower_bound: Option<TypeRefId>,
    },
}

impl GenericsType {
    /// Name of a declared type parameter.
    pub fn param_name(&self) -> Option<&str> {
        match &self.kind {
            GenericsKind::Param { name, .. } => Some(name),
            _ => None,
        }
    }
}

// =============================================================================
// Modifiers and declarations
// =============================================================================

bitflags! {
    /// Declaration modifiers relevant to resolution.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const ABSTRACT = 1 << 4;
        const FINAL = 1 << 5;
    }
}

impl Modifiers {
    /// No access modifier: package-private.
    #[inline]
    pub fn is_package_private(self) -> bool {
        !self.intersects(Self::PUBLIC | Self::PROTECTED | Self::PRIVATE)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    Trait,
    Annotation,
}

impl ClassKind {
    /// Interfaces, traits and annotation types follow interface inheritance.
    #[inline]
    pub const fn is_interface_like(self) -> bool {
        matches!(self, Self::Interface | Self::Trait | Self::Annotation)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportKind {
    /// `import a.b.C` / `import a.b.C as D`
    Plain,
    /// `import static a.b.C.member` / `... as alias`
    Static,
    /// `import a.b.*`
    Star,
    /// `import static a.b.C.*`
    StaticStar,
}

/// An import directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportDecl {
    pub kind: ImportKind,
    /// The imported class. `None` for star imports.
    pub type_ref: Option<TypeRefId>,
    /// Explicit alias (`as X`).
    pub alias: Option<String>,
    /// Member name for static imports.
    pub field_name: Option<String>,
    /// Package prefix with trailing dot for star imports (`a.b.`).
    pub package_name: Option<String>,
    pub span: Span,
}

/// A class-like declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDecl {
    /// Fully-qualified binary name: `p.Outer$Inner`.
    pub name: String,
    pub modifiers: Modifiers,
    pub kind: ClassKind,
    pub generics: SmallVec<[GenericsTypeId; 2]>,
    pub superclass: Option<TypeRefId>,
    pub interfaces: SmallVec<[TypeRefId; 2]>,
    pub fields: Vec<FieldId>,
    pub properties: Vec<PropertyId>,
    pub methods: Vec<MethodId>,
    /// Instance and static initializer blocks.
    pub initializers: Vec<StmtId>,
    pub inner: Vec<ClassDeclId>,
    pub outer: Option<ClassDeclId>,
    /// Set for local and anonymous classes declared inside a method body.
    pub enclosing_method: Option<MethodId>,
    pub anonymous: bool,
    pub annotations: Vec<AnnotationId>,
    pub span: Span,
}

impl ClassDecl {
    /// Name without the package: `Outer$Inner`.
    pub fn name_without_package(&self) -> &str {
        match self.name.rfind('.') {
            Some(dot) => &self.name[dot + 1..],
            None => &self.name,
        }
    }

    /// Innermost simple name: `Inner`.
    pub fn simple_name(&self) -> &str {
        let base = self.name_without_package();
        match base.rfind('$') {
            Some(sep) => &base[sep + 1..],
            None => base,
        }
    }

    /// Package prefix with trailing dot, or `""` for the default package.
    pub fn package_prefix(&self) -> &str {
        match self.name.rfind('.') {
            Some(dot) => &self.name[..=dot],
            None => "",
        }
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        self.kind.is_interface_like()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub modifiers: Modifiers,
    /// `None` for untyped (`def`) fields.
    pub type_ref: Option<TypeRefId>,
    pub initializer: Option<ExprId>,
    pub annotations: Vec<AnnotationId>,
    pub span: Span,
}

/// A property. When backed by a field, the field's type reference is shared
/// and the property is not resolved twice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub type_ref: Option<TypeRefId>,
    pub field: Option<FieldId>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_ref: Option<TypeRefId>,
    pub default_value: Option<ExprId>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub generics: SmallVec<[GenericsTypeId; 1]>,
    pub params: Vec<Parameter>,
    /// `None` for constructors and untyped methods.
    pub return_type: Option<TypeRefId>,
    pub exceptions: SmallVec<[TypeRefId; 1]>,
    pub body: Option<StmtId>,
    pub is_constructor: bool,
    pub annotations: Vec<AnnotationId>,
    pub span: Span,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::PUBLIC,
            generics: SmallVec::new(),
            params: Vec::new(),
            return_type: None,
            exceptions: SmallVec::new(),
            body: None,
            is_constructor: false,
            annotations: Vec::new(),
            span: Span::dummy(),
        }
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }
}

/// An annotation usage: `@Type(member = value)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationUse {
    pub type_ref: TypeRefId,
    pub members: Vec<(String, ExprId)>,
    pub span: Span,
}

// =============================================================================
// Expressions and statements
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    /// A bare name: local, parameter, field, or possibly a class.
    Variable { name: String },
    /// `object.property`
    Property { object: ExprId, property: String },
    /// `Foo` used as a value, or `Foo.class`.
    ClassLit { type_ref: TypeRefId },
    /// `new Foo(args)`
    ConstructorCall { type_ref: TypeRefId, args: Vec<ExprId> },
    /// `(Foo) expr` / `expr as Foo`
    Cast { type_ref: TypeRefId, expr: ExprId },
    /// `Foo x = init` / `def x = init`
    Declaration {
        type_ref: Option<TypeRefId>,
        name: String,
        init: Option<ExprId>,
    },
    /// `object.<T>method(args)` / `method(args)`
    MethodCall {
        object: Option<ExprId>,
        method: String,
        generics: SmallVec<[GenericsTypeId; 1]>,
        args: Vec<ExprId>,
    },
    /// `{ A a, b -> body }`. An empty parameter list binds `it`.
    Closure { params: Vec<Parameter>, body: StmtId },
    Binary {
        left: ExprId,
        op: String,
        right: ExprId,
    },
    Constant { value: String },
    List { items: Vec<ExprId> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatchClause {
    pub param: Parameter,
    pub body: StmtId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StmtKind {
    Block(Vec<StmtId>),
    Expr(ExprId),
    Return(Option<ExprId>),
    If {
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    ForIn {
        var: Parameter,
        iterable: ExprId,
        body: StmtId,
    },
    Try {
        body: StmtId,
        catches: Vec<CatchClause>,
        finally: Option<StmtId>,
    },
}
