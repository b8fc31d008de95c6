//! Emitted identifiers.
//!
//! | Declaration | Emitted name |
//! |---|---|
//! | `@extern_c("n")` | `n` |
//! | `@extern_c()` | declared name, unmangled |
//! | otherwise | prefix + declared name |
//!
//! Methods and constructors are additionally qualified with `Class::` in out-of-class definitions.

use crate::semantics::{LoweringTraits, Symbol, SymbolKind};

/// Prefix + declared name.
pub fn mangle(prefix: &str, declared: &str) -> String {
    format!("{prefix}{declared}")
}

/// Emitted name of a class or free function.
pub fn emitted_name(traits: &LoweringTraits, declared: &str, prefix: &str) -> String {
    match &traits.native_name {
        Some(native) => native.clone(),
        None => mangle(prefix, declared),
    }
}

/// Emitted name of a resolved class or function; other symbols keep their declared name.
pub fn symbol_name(symbol: &Symbol, prefix: &str) -> String {
    match &symbol.kind {
        SymbolKind::Class(class) => emitted_name(&class.traits, &symbol.name, prefix),
        SymbolKind::Function(function) => emitted_name(&function.traits, &symbol.name, prefix),
        SymbolKind::Module(_) | SymbolKind::Interface(_) | SymbolKind::TypeAlias => symbol.name.clone(),
    }
}

/// `Class::` qualifier of out-of-class member definitions.
pub fn member_qualifier(class_emitted: &str) -> String {
    format!("{class_emitted}::")
}

/// `~Class`
pub fn destructor_name(class_emitted: &str) -> String {
    format!("~{class_emitted}")
}

/// Plain function taking an explicit receiver, for `Class.method`.
pub fn receiver_function_name(class_emitted: &str, method: &str) -> String {
    format!("{class_emitted}_{method}")
}

/// `ns::name`
pub fn namespace_qualified(namespace: &str, name: &str) -> String {
    format!("{namespace}::{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names_are_mangled() {
        assert_eq!(emitted_name(&LoweringTraits::default(), "Vec2", "tscc_"), "tscc_Vec2");
    }

    #[test]
    fn test_native_names_are_verbatim() {
        let traits = LoweringTraits {
            native_name: Some("main".into()),
            ..LoweringTraits::default()
        };
        assert_eq!(emitted_name(&traits, "main", "tscc_"), "main");
    }

    #[test]
    fn test_member_spellings() {
        assert_eq!(member_qualifier("tscc_Vec2"), "tscc_Vec2::");
        assert_eq!(destructor_name("tscc_Vec2"), "~tscc_Vec2");
        assert_eq!(receiver_function_name("tscc_Vec2", "add"), "tscc_Vec2_add");
        assert_eq!(namespace_qualified("std", "printf"), "std::printf");
    }
}
