//! Finalization: deferred references and generic construction checks.

use crate::registry::PendingState;
use crate::target::Target;
use crate::unit::UnitResolver;
use gvc_ast::{GenericsKind, TypeRefId};
use gvc_common::diagnostic_codes;
use std::sync::Arc;
use tracing::debug;

impl UnitResolver<'_> {
    /// Settle placeholders, republish shapes that waited on them, and check
    /// generic arity and bounds. Runs after every unit of the program
    /// finished its body stage.
    pub(crate) fn finalize(&mut self) {
        self.settle_pending();

        let pending_shapes = std::mem::take(&mut self.pending_shapes);
        for &decl in &pending_shapes {
            self.publish_shape(decl);
        }
        for decl in pending_shapes {
            self.check_hierarchy(decl);
        }

        let module = Arc::clone(&self.module);
        for type_ref in module.type_ref_ids() {
            self.check_construction(type_ref);
        }
        debug!(file = %self.file, errors = self.diagnostics.len(), "unit finalized");
    }

    fn settle_pending(&mut self) {
        let session = self.session;
        let module = Arc::clone(&self.module);
        for type_ref in module.type_ref_ids() {
            let Some(Target::Pending(pid)) = self.target_of(type_ref) else {
                continue;
            };
            match session.registry().pending_state(pid) {
                PendingState::Settled(id) => {
                    let placeholder = self.target(type_ref).is_some_and(|r| r.placeholder);
                    self.set_target(type_ref, Target::Class(id), placeholder);
                }
                PendingState::Waiting | PendingState::Failed => {
                    let node = module.type_ref(type_ref);
                    self.clear_target(type_ref);
                    self.error(
                        node.span,
                        diagnostic_codes::UNABLE_TO_RESOLVE_CLASS,
                        &[&node.name],
                    );
                }
            }
        }
        for memo in self.import_targets.iter_mut().flatten() {
            if let Some(Target::Pending(pid)) = *memo
                && let PendingState::Settled(id) = session.registry().pending_state(pid)
            {
                *memo = Some(Target::Class(id));
            }
        }
    }

    /// Arity and bound check of one parameterized class reference.
    fn check_construction(&mut self, type_ref: TypeRefId) {
        let Some(id) = self.class_target(type_ref) else {
            return;
        };
        let module = Arc::clone(&self.module);
        let node = module.type_ref(type_ref);
        if node.generics.is_empty() {
            return;
        }
        let session = self.session;
        let Some(info) = session.store().get(id) else {
            return;
        };

        let expected = info.type_params.len();
        let got = node.generics.len();
        if expected != got {
            self.error(
                node.span,
                diagnostic_codes::WRONG_NUMBER_OF_TYPE_ARGUMENTS,
                &[&info.name, &expected.to_string(), &got.to_string()],
            );
            return;
        }

        let Some(shape) = session.shape_of(id) else {
            return;
        };
        for (index, &arg) in node.generics.iter().enumerate() {
            let GenericsKind::Type(arg_ref) = module.generics_type(arg).kind else {
                continue;
            };
            let Some(arg_id) = self.class_target(arg_ref) else {
                continue;
            };
            let Some(bounds) = shape.type_param_bounds.get(index) else {
                continue;
            };
            for &bound in bounds {
                if session.is_subtype(arg_id, bound) == Some(false) {
                    let arg_name = &module.type_ref(arg_ref).name;
                    self.error(
                        module.type_ref(arg_ref).span,
                        diagnostic_codes::TYPE_ARGUMENT_NOT_WITHIN_BOUND,
                        &[arg_name, &session.store().name(bound), &info.name],
                    );
                }
            }
        }
    }
}
