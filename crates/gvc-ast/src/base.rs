//! Index newtypes for the module pools.

macro_rules! define_index {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub u32);

            impl $name {
                #[inline]
                pub const fn index(self) -> usize {
                    self.0 as usize
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )+
    };
}

define_index!(
    /// A type reference (`List<String>`, `a.b.C`, `int[]`).
    TypeRefId,
    /// A class, interface, enum, trait or annotation declaration.
    ClassDeclId,
    MethodId,
    FieldId,
    PropertyId,
    ExprId,
    StmtId,
    /// A generics entry: a declared type parameter or a type argument.
    GenericsTypeId,
    AnnotationId,
);

/// Convert a pool length into the next index.
#[inline]
pub(crate) fn next_index(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
