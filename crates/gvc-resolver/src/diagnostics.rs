//! Resolver failure taxonomy.
//!
//! Every diagnostic the resolver emits carries one of the codes in
//! [`gvc_common::diagnostic_codes`]; `DiagnosticKind` groups those codes into
//! the five failure kinds callers act on.

use gvc_common::{Diagnostic, diagnostic_codes};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// No strategy produced a class for the name.
    UnresolvedName,
    /// Two different classes match one simple name.
    AmbiguousName,
    /// A class or interface inherits from itself.
    CyclicHierarchy,
    /// A nested class resolved but is not visible from the requesting class.
    InvalidNestedAccess,
    /// Generic arity or bound mismatch.
    ConstructionError,
}

impl DiagnosticKind {
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            diagnostic_codes::UNABLE_TO_RESOLVE_CLASS
            | diagnostic_codes::UNABLE_TO_RESOLVE_ANNOTATION_CLASS => Some(Self::UnresolvedName),
            diagnostic_codes::AMBIGUOUS_CLASS_REFERENCE => Some(Self::AmbiguousName),
            diagnostic_codes::CYCLIC_INHERITANCE_IN_CLASS
            | diagnostic_codes::TYPE_CANNOT_IMPLEMENT_ITSELF
            | diagnostic_codes::CYCLIC_INHERITANCE_IN_INTERFACE => Some(Self::CyclicHierarchy),
            diagnostic_codes::NESTED_TYPE_NOT_VISIBLE => Some(Self::InvalidNestedAccess),
            diagnostic_codes::WRONG_NUMBER_OF_TYPE_ARGUMENTS
            | diagnostic_codes::TYPE_ARGUMENT_NOT_WITHIN_BOUND => Some(Self::ConstructionError),
            _ => None,
        }
    }

    #[must_use]
    pub const fn of(diagnostic: &Diagnostic) -> Option<Self> {
        Self::from_code(diagnostic.code)
    }
}

/// Count diagnostics of one kind.
pub fn count_kind<'a>(
    diagnostics: impl IntoIterator<Item = &'a Diagnostic>,
    kind: DiagnosticKind,
) -> usize {
    diagnostics
        .into_iter()
        .filter(|d| DiagnosticKind::of(d) == Some(kind))
        .count()
}
