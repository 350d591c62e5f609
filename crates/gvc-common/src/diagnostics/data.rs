//! Diagnostic message table.
//!
//! Codes are grouped in the 5000 range; each resolver failure kind owns one
//! or more codes.

use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const UNABLE_TO_RESOLVE_CLASS: u32 = 5001;
    pub const AMBIGUOUS_CLASS_REFERENCE: u32 = 5002;
    pub const CYCLIC_INHERITANCE_IN_CLASS: u32 = 5003;
    pub const TYPE_CANNOT_IMPLEMENT_ITSELF: u32 = 5004;
    pub const CYCLIC_INHERITANCE_IN_INTERFACE: u32 = 5005;
    pub const NESTED_TYPE_NOT_VISIBLE: u32 = 5006;
    pub const WRONG_NUMBER_OF_TYPE_ARGUMENTS: u32 = 5007;
    pub const TYPE_ARGUMENT_NOT_WITHIN_BOUND: u32 = 5008;
    pub const UNABLE_TO_RESOLVE_ANNOTATION_CLASS: u32 = 5009;
}

pub mod diagnostic_messages {
    pub const UNABLE_TO_RESOLVE_CLASS: &str = "unable to resolve class {0}";
    pub const AMBIGUOUS_CLASS_REFERENCE: &str =
        "reference to {0} is ambiguous, both class {1} and {2} match";
    pub const CYCLIC_INHERITANCE_IN_CLASS: &str = "Cyclic inheritance involving {0} in class {1}";
    pub const TYPE_CANNOT_IMPLEMENT_ITSELF: &str =
        "Cycle detected: the type {0} cannot implement itself";
    pub const CYCLIC_INHERITANCE_IN_INTERFACE: &str =
        "Cyclic inheritance involving {0} in interface {1}";
    pub const NESTED_TYPE_NOT_VISIBLE: &str = "nested type {0} is not visible from {1}";
    pub const WRONG_NUMBER_OF_TYPE_ARGUMENTS: &str =
        "wrong number of type arguments for {0}: expected {1} but got {2}";
    pub const TYPE_ARGUMENT_NOT_WITHIN_BOUND: &str =
        "type argument {0} is not within the bound {1} of {2}";
    pub const UNABLE_TO_RESOLVE_ANNOTATION_CLASS: &str = "unable to resolve class {0} for annotation";
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::UNABLE_TO_RESOLVE_CLASS,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::UNABLE_TO_RESOLVE_CLASS,
    },
    DiagnosticMessage {
        code: diagnostic_codes::AMBIGUOUS_CLASS_REFERENCE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::AMBIGUOUS_CLASS_REFERENCE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::CYCLIC_INHERITANCE_IN_CLASS,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::CYCLIC_INHERITANCE_IN_CLASS,
    },
    DiagnosticMessage {
        code: diagnostic_codes::TYPE_CANNOT_IMPLEMENT_ITSELF,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::TYPE_CANNOT_IMPLEMENT_ITSELF,
    },
    DiagnosticMessage {
        code: diagnostic_codes::CYCLIC_INHERITANCE_IN_INTERFACE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::CYCLIC_INHERITANCE_IN_INTERFACE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::NESTED_TYPE_NOT_VISIBLE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::NESTED_TYPE_NOT_VISIBLE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::WRONG_NUMBER_OF_TYPE_ARGUMENTS,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::WRONG_NUMBER_OF_TYPE_ARGUMENTS,
    },
    DiagnosticMessage {
        code: diagnostic_codes::TYPE_ARGUMENT_NOT_WITHIN_BOUND,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::TYPE_ARGUMENT_NOT_WITHIN_BOUND,
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNABLE_TO_RESOLVE_ANNOTATION_CLASS,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::UNABLE_TO_RESOLVE_ANNOTATION_CLASS,
    },
];
