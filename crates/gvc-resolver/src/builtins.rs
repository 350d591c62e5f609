//! Names that resolve without running the candidate chain.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

pub const OBJECT: &str = "java.lang.Object";
pub const BIG_INTEGER: &str = "java.math.BigInteger";
pub const BIG_DECIMAL: &str = "java.math.BigDecimal";

/// Primitive type names.
pub static PRIMITIVES: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
    ]
    .into_iter()
    .collect()
});

#[inline]
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(name)
}

/// Builtin descriptor name a written name maps to, if any.
///
/// `def` is the dynamic type and maps to `java.lang.Object`.
pub fn builtin_name(name: &str) -> Option<&str> {
    if is_primitive(name) {
        Some(name)
    } else if name == "def" {
        Some(OBJECT)
    } else {
        None
    }
}
