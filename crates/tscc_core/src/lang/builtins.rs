//! Built-in binding vocabulary.
//!
//! These are the names the lowering engine intercepts or requires from the native prelude (a declaration
//! file such as `libc.d.ts`). They are ordinary declared functions to the semantic model; the compiler gives
//! them special lowering.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//!
//! ## Examples
//! ```rust
//! use tscc_core::lang::builtins::{self, BuiltinFnId};
//!
//! assert_eq!(builtins::from_str("sizeof"), Some(BuiltinFnId::SizeOf));
//! assert!(builtins::is_numeric_constructor(BuiltinFnId::I32));
//! ```

use super::registry::{self, LangItemInfo, Stability};

/// Stable identifier for a built-in function binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFnId {
    AddressOf,
    SizeOf,
    AllocatorAlloc,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    Float,
    Double,
}

/// Metadata for a built-in function.
pub type BuiltinFnInfo = LangItemInfo<BuiltinFnId>;

/// Registry of all built-in functions.
pub const BUILTIN_FUNCTIONS: &[BuiltinFnInfo] = &[
    info(BuiltinFnId::AddressOf, "addressof", "Take the address of an addressable operand."),
    info(BuiltinFnId::SizeOf, "sizeof", "Query the size of a type or of a value."),
    info(
        BuiltinFnId::AllocatorAlloc,
        "tscc_allocator_alloc",
        "Native allocation entry point required by constructors.",
    ),
    info(BuiltinFnId::U8, "u8", "Convert to an unsigned 8-bit integer."),
    info(BuiltinFnId::U16, "u16", "Convert to an unsigned 16-bit integer."),
    info(BuiltinFnId::U32, "u32", "Convert to an unsigned 32-bit integer."),
    info(BuiltinFnId::U64, "u64", "Convert to an unsigned 64-bit integer."),
    info(BuiltinFnId::I8, "i8", "Convert to a signed 8-bit integer."),
    info(BuiltinFnId::I16, "i16", "Convert to a signed 16-bit integer."),
    info(BuiltinFnId::I32, "i32", "Convert to a signed 32-bit integer."),
    info(BuiltinFnId::I64, "i64", "Convert to a signed 64-bit integer."),
    info(BuiltinFnId::Float, "float", "Convert to a 32-bit float."),
    info(BuiltinFnId::Double, "double", "Convert to a 64-bit float."),
];

/// Resolve a built-in function name to its stable id.
pub fn from_str(name: &str) -> Option<BuiltinFnId> {
    registry::lookup(BUILTIN_FUNCTIONS, name)
}

/// Return the canonical spelling for a built-in function.
pub fn as_str(id: BuiltinFnId) -> &'static str {
    match registry::entry(BUILTIN_FUNCTIONS, id) {
        Some(info) => info.canonical,
        None => "",
    }
}

/// Whether `id` is one of the sized numeric constructors (`u8(..)` … `double(..)`).
pub fn is_numeric_constructor(id: BuiltinFnId) -> bool {
    !matches!(
        id,
        BuiltinFnId::AddressOf | BuiltinFnId::SizeOf | BuiltinFnId::AllocatorAlloc
    )
}

/// Stable identifier for a built-in type constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTypeId {
    Ptr,
}

/// Registry of built-in type constructors.
pub const BUILTIN_TYPES: &[LangItemInfo<BuiltinTypeId>] = &[LangItemInfo {
    id: BuiltinTypeId::Ptr,
    canonical: "Ptr",
    aliases: &[],
    description: "Raw native pointer; bypasses ownership wrapping.",
    stability: Stability::Stable,
}];

/// Resolve a built-in type name to its stable id.
pub fn type_from_str(name: &str) -> Option<BuiltinTypeId> {
    registry::lookup(BUILTIN_TYPES, name)
}

/// Return the canonical spelling for a built-in type.
pub fn type_as_str(id: BuiltinTypeId) -> &'static str {
    match registry::entry(BUILTIN_TYPES, id) {
        Some(info) => info.canonical,
        None => "",
    }
}

const fn info(id: BuiltinFnId, canonical: &'static str, description: &'static str) -> BuiltinFnInfo {
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
    fn test_required_bindings_resolve() {
        assert_eq!(from_str("addressof"), Some(BuiltinFnId::AddressOf));
        assert_eq!(from_str("tscc_allocator_alloc"), Some(BuiltinFnId::AllocatorAlloc));
        assert_eq!(type_from_str("Ptr"), Some(BuiltinTypeId::Ptr));
        assert_eq!(type_as_str(BuiltinTypeId::Ptr), "Ptr");
    }

    #[test]
    fn test_numeric_constructors_cover_all_widths() {
        let numeric: Vec<_> = BUILTIN_FUNCTIONS
            .iter()
            .filter(|info| is_numeric_constructor(info.id))
            .map(|info| info.canonical)
            .collect();
        assert_eq!(
            numeric,
            ["u8", "u16", "u32", "u64", "i8", "i16", "i32", "i64", "float", "double"]
        );
    }
}
