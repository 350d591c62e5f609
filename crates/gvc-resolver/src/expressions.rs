//! Class names hiding in expressions.
//!
//! In a dynamic language `Foo.bar()` and `a.b.Foo.bar()` look like property
//! access on variables. Names not declared in scope are probed best-effort
//! as classes; a hit turns the expression into a class expression.

use crate::builtins;
use crate::env::ResolveCtx;
use crate::target::{Mode, Switches, Target};
use crate::unit::UnitResolver;
use gvc_ast::{ExprId, ExprKind, ModuleAst};
use gvc_common::diagnostic_codes;
use std::sync::Arc;
use tracing::trace;

/// Dotted class name spelled by a property chain, or `None` when some part
/// cannot be a class name.
fn lookup_class_name(
    module: &ModuleAst,
    is_class_expr: impl Fn(ExprId) -> bool,
    expr: ExprId,
) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    let mut cursor = expr;
    loop {
        if is_class_expr(cursor) {
            return None;
        }
        match &module.expr(cursor).kind {
            ExprKind::Property { object, property } => {
                if property == "class" {
                    return None;
                }
                parts.push(property);
                cursor = *object;
            }
            ExprKind::Variable { name } => {
                if name == "this" || name == "super" {
                    return None;
                }
                parts.push(name);
                break;
            }
            _ => return None,
        }
    }
    if parts
        .first()
        .and_then(|last| last.chars().next())
        .is_none_or(char::is_lowercase)
    {
        return None;
    }
    parts.reverse();
    Some(parts.join("."))
}

impl UnitResolver<'_> {
    /// A bare name not declared in scope.
    pub(crate) fn probe_variable(&mut self, expr: ExprId, ctx: &ResolveCtx) {
        let module = Arc::clone(&self.module);
        let node = module.expr(expr);
        let ExprKind::Variable { name } = &node.kind else {
            return;
        };
        self.current_span = node.span;
        if builtins::is_primitive(name) {
            if let Some(id) = self.builtin_class(name) {
                self.class_exprs.insert(expr, id);
            }
            return;
        }
        let switches = Switches::for_mode(Mode::BestEffort);
        // A pending target stays dynamic.
        if let Some(Target::Class(id)) = self
            .resolve_name(name, ctx, Mode::BestEffort, switches)
            .map(|r| r.target)
        {
            trace!(name, "variable denotes a class");
            self.class_exprs.insert(expr, id);
        }
    }

    /// `object.property`: either a dotted class name, or a nested class of
    /// the class `object` denotes.
    pub(crate) fn probe_property(&mut self, expr: ExprId, ctx: &ResolveCtx) {
        let module = Arc::clone(&self.module);
        let node = module.expr(expr);
        let ExprKind::Property { object, property } = &node.kind else {
            return;
        };
        self.current_span = node.span;

        let class_name = lookup_class_name(&module, |e| self.class_exprs.contains_key(&e), expr);
        if let Some(name) = class_name {
            let found =
                self.resolve_name(&name, ctx, Mode::BestEffort, Switches::for_mode(Mode::BestEffort));
            if let Some(Target::Class(id)) = found.map(|r| r.target) {
                trace!(name = %name, "property chain denotes a class");
                self.class_exprs.insert(expr, id);
                return;
            }
        }

        let Some(owner) = self.class_exprs.get(object).copied() else {
            return;
        };
        if property.chars().next().is_none_or(char::is_lowercase) {
            return;
        }
        let session = self.session;
        let requester = ctx.class.map_or(owner, |decl| self.class_ids[decl.index()]);
        let mut hierarchy = vec![owner];
        hierarchy.extend(session.superclass_chain(owner));
        for class in hierarchy {
            let Some(Target::Class(nested)) = self.resolve_nested(class, property, ctx) else {
                continue;
            };
            if class == owner || self.is_visible_nested_class(nested, requester) {
                self.class_exprs.insert(expr, nested);
            } else {
                let from = self.context_name(ctx);
                self.error(
                    node.span,
                    diagnostic_codes::NESTED_TYPE_NOT_VISIBLE,
                    &[&session.store().name(nested), &from],
                );
            }
            return;
        }
    }
}
