//! Expression and statement collection.
//!
//! Walks method bodies, initializers and closures post-order, recording the
//! references they contain and the dynamic names that may denote classes.
//! A lexical scope stack separates declared variables from such names.

use crate::env::ResolveCtx;
use crate::target::Mode;
use crate::unit::{UnitResolver, WorkItem};
use gvc_ast::{
    ClassDeclId, ExprId, ExprKind, GenericsKind, GenericsTypeId, ModuleAst, Parameter, StmtId,
    StmtKind,
};
use rustc_hash::FxHashSet;

/// Names implicitly in scope in every body.
const IMPLICIT_NAMES: [&str; 2] = ["this", "super"];

/// Lexical scope stack of declared variable names.
#[derive(Debug, Default)]
pub(crate) struct Scopes {
    frames: Vec<FxHashSet<String>>,
}

impl Scopes {
    /// Scopes seeded with the fields and properties of `decl` and every
    /// class enclosing it.
    pub(crate) fn for_class(module: &ModuleAst, decl: ClassDeclId) -> Self {
        let mut frame = FxHashSet::default();
        for class_id in std::iter::once(decl).chain(module.outer_chain(decl)) {
            let class = module.class(class_id);
            for &field in &class.fields {
                frame.insert(module.field(field).name.clone());
            }
            for &property in &class.properties {
                frame.insert(module.property(property).name.clone());
            }
        }
        Self {
            frames: vec![frame],
        }
    }

    pub(crate) fn push(&mut self) {
        self.frames.push(FxHashSet::default());
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    pub(crate) fn declare(&mut self, name: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string());
        }
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        IMPLICIT_NAMES.contains(&name) || self.frames.iter().rev().any(|f| f.contains(name))
    }
}

impl UnitResolver<'_> {
    pub(crate) fn collect_stmt(
        &mut self,
        module: &ModuleAst,
        stmt: StmtId,
        ctx: ResolveCtx,
        scopes: &mut Scopes,
    ) {
        match &module.stmt(stmt).kind {
            StmtKind::Block(stmts) => {
                scopes.push();
                for &inner in stmts {
                    self.collect_stmt(module, inner, ctx, scopes);
                }
                scopes.pop();
            }
            StmtKind::Expr(expr) => self.collect_expr(module, *expr, ctx, scopes),
            StmtKind::Return(value) => {
                if let Some(expr) = value {
                    self.collect_expr(module, *expr, ctx, scopes);
                }
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.collect_expr(module, *cond, ctx, scopes);
                self.collect_stmt(module, *then_branch, ctx, scopes);
                if let Some(branch) = else_branch {
                    self.collect_stmt(module, *branch, ctx, scopes);
                }
            }
            StmtKind::ForIn {
                var,
                iterable,
                body,
            } => {
                self.collect_expr(module, *iterable, ctx, scopes);
                scopes.push();
                self.collect_param(module, var, ctx, scopes);
                self.collect_stmt(module, *body, ctx, scopes);
                scopes.pop();
            }
            StmtKind::Try {
                body,
                catches,
                finally,
            } => {
                self.collect_stmt(module, *body, ctx, scopes);
                for catch in catches {
                    scopes.push();
                    self.collect_param(module, &catch.param, ctx, scopes);
                    self.collect_stmt(module, catch.body, ctx, scopes);
                    scopes.pop();
                }
                if let Some(block) = finally {
                    self.collect_stmt(module, *block, ctx, scopes);
                }
            }
        }
    }

    /// Resolve a parameter's type and default, then declare its name.
    fn collect_param(
        &mut self,
        module: &ModuleAst,
        param: &Parameter,
        ctx: ResolveCtx,
        scopes: &mut Scopes,
    ) {
        if let Some(type_ref) = param.type_ref {
            self.push_resolve(type_ref, ctx);
        }
        if let Some(default) = param.default_value {
            self.collect_expr(module, default, ctx, scopes);
        }
        scopes.declare(&param.name);
    }

    pub(crate) fn collect_expr(
        &mut self,
        module: &ModuleAst,
        expr: ExprId,
        ctx: ResolveCtx,
        scopes: &mut Scopes,
    ) {
        match &module.expr(expr).kind {
            ExprKind::Variable { name } => {
                if !scopes.contains(name) {
                    self.body_work.push(WorkItem::ProbeVariable { expr, ctx });
                }
            }
            ExprKind::Property { object, .. } => {
                self.collect_expr(module, *object, ctx, scopes);
                self.body_work.push(WorkItem::ProbeProperty { expr, ctx });
            }
            ExprKind::ClassLit { type_ref } => {
                self.body_work.push(WorkItem::ClassLiteral {
                    expr,
                    type_ref: *type_ref,
                    ctx,
                });
            }
            ExprKind::ConstructorCall { type_ref, args } => {
                for &arg in args {
                    self.collect_expr(module, arg, ctx, scopes);
                }
                if let Some(&first) = args.first()
                    && let ExprKind::ConstructorCall {
                        type_ref: outer, ..
                    } = &module.expr(first).kind
                {
                    let constructed = module.type_ref(*type_ref).name.clone();
                    self.ctor_hints.entry(constructed).or_default().push(*outer);
                }
                self.push_resolve(*type_ref, ctx);
            }
            ExprKind::Cast { type_ref, expr: inner } => {
                self.collect_expr(module, *inner, ctx, scopes);
                self.push_resolve(*type_ref, ctx);
            }
            ExprKind::Declaration {
                type_ref,
                name,
                init,
            } => {
                if let Some(init) = init {
                    self.collect_expr(module, *init, ctx, scopes);
                }
                if let Some(type_ref) = type_ref {
                    self.body_work.push(WorkItem::Resolve {
                        type_ref: *type_ref,
                        ctx,
                        mode: Mode::OrFail,
                        prefer_imports: false,
                    });
                }
                scopes.declare(name);
            }
            ExprKind::MethodCall {
                object,
                generics,
                args,
                ..
            } => {
                if let Some(object) = object {
                    self.collect_expr(module, *object, ctx, scopes);
                }
                for &g in generics {
                    self.collect_type_arg(module, g, ctx);
                }
                for &arg in args {
                    self.collect_expr(module, arg, ctx, scopes);
                }
            }
            ExprKind::Closure { params, body } => {
                scopes.push();
                if params.is_empty() {
                    scopes.declare("it");
                }
                for param in params {
                    self.collect_param(module, param, ctx, scopes);
                }
                self.collect_stmt(module, *body, ctx, scopes);
                scopes.pop();
            }
            ExprKind::Binary { left, right, .. } => {
                self.collect_expr(module, *left, ctx, scopes);
                self.collect_expr(module, *right, ctx, scopes);
            }
            ExprKind::List { items } => {
                for &item in items {
                    self.collect_expr(module, item, ctx, scopes);
                }
            }
            ExprKind::Constant { .. } => {}
        }
    }

    fn collect_type_arg(&mut self, module: &ModuleAst, arg: GenericsTypeId, ctx: ResolveCtx) {
        match &module.generics_type(arg).kind {
            GenericsKind::Type(type_ref) => self.push_resolve(*type_ref, ctx),
            GenericsKind::Wildcard {
                upper_bound,
                lower_bound,
            } => {
                for bound in upper_bound.iter().chain(lower_bound.iter()) {
                    self.push_resolve(*bound, ctx);
                }
            }
            GenericsKind::Param { .. } => {}
        }
    }
}
