//! Program model for the gvc resolver.
//!
//! A [`ModuleAst`] is one parsed source unit. Every node lives in a typed pool
//! owned by the module and is addressed by a `u32` index newtype, the same
//! arena layout the parser hands over. Nodes are read-only once the module is
//! built; resolution results are kept on the side, keyed by these indices.
//!
//! [`ModuleBuilder`] constructs modules for embedders and tests.

pub mod base;
pub use base::{
    AnnotationId, ClassDeclId, ExprId, FieldId, GenericsTypeId, MethodId, PropertyId, StmtId,
    TypeRefId,
};

pub mod node;
pub use node::{
    AnnotationUse, CatchClause, ClassDecl, ClassKind, Expr, ExprKind, FieldDecl, GenericsKind,
    GenericsType, ImportDecl, ImportKind, MethodDecl, Modifiers, Parameter, PropertyDecl, Stmt,
    StmtKind, TypeRef, TypeRefKind,
};

pub mod module;
pub use module::ModuleAst;

pub mod builder;
pub use builder::ModuleBuilder;

#[cfg(test)]
#[path = "tests/builder_tests.rs"]
mod builder_tests;
