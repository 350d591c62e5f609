//! Generics header resolution.
//!
//! Resolves the bounds of declared type parameters. Bounds may mention the
//! parameter being declared (`T extends Comparable<T>`); such a mention is
//! bound to the parameter itself instead of being resolved again.

use crate::env::ResolveCtx;
use crate::target::{Mode, Target};
use crate::unit::UnitResolver;
use gvc_ast::{GenericsKind, GenericsTypeId, TypeRefId};
use gvc_common::limits::MAX_GENERICS_HEADER_DEPTH;
use std::sync::Arc;
use tracing::{debug, trace};

impl UnitResolver<'_> {
    pub(crate) fn resolve_generics_header(&mut self, params: &[GenericsTypeId], ctx: &ResolveCtx) {
        let module = Arc::clone(&self.module);
        for &param in params {
            let GenericsKind::Param {
                name,
                upper_bounds,
                lower_bound,
            } = &module.generics_type(param).kind
            else {
                continue;
            };
            for &bound in upper_bounds {
                self.resolve_bound(bound, param, name, 0, ctx);
            }
            if let Some(bound) = lower_bound {
                self.resolve_type_ref(*bound, ctx, Mode::OrFail, false);
            }
        }
    }

    /// Resolve one bound and its arguments. `root` is the parameter whose
    /// bound this is; `level` counts the argument lists descended into.
    fn resolve_bound(
        &mut self,
        type_ref: TypeRefId,
        root: GenericsTypeId,
        root_name: &str,
        level: u32,
        ctx: &ResolveCtx,
    ) {
        if level > MAX_GENERICS_HEADER_DEPTH {
            debug!(root_name, level, "generics header too deep");
            return;
        }
        if self.target(type_ref).is_some() {
            return;
        }
        let module = Arc::clone(&self.module);
        let node = module.type_ref(type_ref);
        if level > 0 && node.name == root_name {
            trace!(root_name, level, "self-referential bound");
            self.set_target(type_ref, Target::TypeParam(root), true);
            return;
        }

        self.resolve_head(type_ref, ctx, Mode::OrFail, false);
        for &arg in &node.generics {
            match &module.generics_type(arg).kind {
                GenericsKind::Type(arg_ref) => {
                    self.resolve_bound(*arg_ref, root, root_name, level + 1, ctx);
                }
                GenericsKind::Wildcard {
                    upper_bound,
                    lower_bound,
                } => {
                    for bound in upper_bound.iter().chain(lower_bound.iter()) {
                        self.resolve_bound(*bound, root, root_name, level + 1, ctx);
                    }
                }
                GenericsKind::Param { .. } => {}
            }
        }
    }
}
