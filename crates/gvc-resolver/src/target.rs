//! Resolution results and candidate descriptions.

use crate::registry::PendingId;
use crate::store::ClassId;
use bitflags::bitflags;
use gvc_ast::{GenericsTypeId, TypeRefId};

/// What a type reference resolved to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Class(ClassId),
    /// A declared type parameter in scope.
    TypeParam(GenericsTypeId),
    /// Array whose component is the given (resolved) reference.
    Array(TypeRefId),
    /// Deferred until another unit registers or completes a class.
    Pending(PendingId),
}

impl Target {
    pub fn class(self) -> Option<ClassId> {
        match self {
            Self::Class(id) => Some(id),
            _ => None,
        }
    }
}

/// Entry of a unit's resolution map.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRef {
    pub target: Target,
    /// The reference names a type parameter rather than a class.
    pub placeholder: bool,
}

/// Failure handling of a resolution request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Try the chain; failing leaves no trace beyond caches.
    BestEffort,
    /// Also try forward registration; failing reports UnresolvedName.
    OrFail,
}

bitflags! {
    /// Which optional strategies a candidate may use.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) struct Switches: u8 {
        /// Import aliases, same-package, static and star imports.
        const MODULE_IMPORTS = 1 << 0;
        const DEFAULT_IMPORTS = 1 << 1;
        /// Rightmost-dot to `$` mangling.
        const STATIC_INNER = 1 << 2;
        /// Outer-nested forward registration (top-level requests only).
        const FORWARD = 1 << 3;
    }
}

/// One candidate the chain is asked to resolve.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Candidate<'n> {
    /// A name as written.
    Plain(&'n str),
    /// A vanilla lowercase name with no explicit import; gated strategies skip it.
    LowerCase(&'n str),
    /// `prefix` is a package (with trailing dot) and only `class_name` may be mangled.
    WithPackage { prefix: &'n str, class_name: &'n str },
    /// `name` nested in `outer`; skips nested, module and import lookups.
    Nested { outer: ClassId, name: &'n str },
}

impl Switches {
    /// Every strategy the mode allows.
    pub(crate) fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::OrFail => Self::all(),
            Mode::BestEffort => Self::all().difference(Self::FORWARD),
        }
    }
}
