//! Decorator vocabulary registry.
//!
//! Decorators are how source authors select native-interop behavior per declaration:
//!
//! - `@extern_c(name?)` binds a declaration to a native symbol name (no mangling).
//! - `@struct()` gives a class value semantics instead of shared-heap semantics.
//! - `@cpp_namespace(name)` marks an ambient module as a C++ namespace.

use super::registry::{self, LangItemInfo, Stability};

/// Stable identifier for supported decorators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoratorId {
    ExternC,
    Struct,
    CppNamespace,
}

/// Metadata entry for a decorator.
pub type DecoratorInfo = LangItemInfo<DecoratorId>;

/// Registry of supported decorators.
pub const DECORATORS: &[DecoratorInfo] = &[
    info(
        DecoratorId::ExternC,
        "extern_c",
        "Bind the declaration to a native symbol; the optional literal overrides the emitted name.",
    ),
    info(
        DecoratorId::Struct,
        "struct",
        "Give a class value semantics (constructed in place, accessed with `.`).",
    ),
    info(
        DecoratorId::CppNamespace,
        "cpp_namespace",
        "Map an ambient module onto a C++ namespace (members accessed with `::`).",
    ),
];

/// Resolve a decorator name to its stable id.
pub fn from_str(name: &str) -> Option<DecoratorId> {
    registry::lookup(DECORATORS, name)
}

/// Return the canonical spelling for a decorator.
pub fn as_str(id: DecoratorId) -> &'static str {
    match registry::entry(DECORATORS, id) {
        Some(info) => info.canonical,
        None => "",
    }
}

const fn info(id: DecoratorId, canonical: &'static str, description: &'static str) -> DecoratorInfo {
    LangItemInfo {
        id,
        canonical,
        aliases: &[],
        description,
        stability: Stability::Stable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_decorator_round_trips_through_its_spelling() {
        for info in DECORATORS {
            assert_eq!(from_str(info.canonical), Some(info.id));
            assert_eq!(as_str(info.id), info.canonical);
        }
    }

    #[test]
    fn test_unknown_decorator_is_none() {
        assert_eq!(from_str("route"), None);
        assert_eq!(from_str("Struct"), None);
    }
}
