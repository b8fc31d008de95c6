//! Symbol table entries.
//!
//! A symbol is created once per top-level (or ambient module) declaration. Decorator-driven behavior is folded into a
//! [`LoweringTraits`] value at that point, so emitters never re-inspect decorators.

use std::collections::HashMap;

use tscc_core::lang::builtins::BuiltinFnId;
use tscc_core::lang::conventions::DESTRUCTOR_METHOD;
use tscc_syntax::ast::{Span, Spanned, TypeNode, Visibility};

/// Native memory category of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Ownership {
    /// `@struct()`: constructed in place, accessed with `.`
    Value,
    /// Reference-counted heap object behind `std::shared_ptr`, accessed with `->`
    #[default]
    SharedHeap,
}

/// Decorator-derived lowering decisions for one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoweringTraits {
    pub ownership: Ownership,
    /// Emitted name when the declaration is bound to a native symbol (`@extern_c`)
    pub native_name: Option<String>,
    /// C++ namespace (`@cpp_namespace`)
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Declared name (module specifier for ambient modules)
    pub name: String,
    pub span: Span,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Class(ClassSymbol),
    Function(FunctionSymbol),
    Module(ModuleSymbol),
    Interface(InterfaceSymbol),
    TypeAlias,
}

impl SymbolKind {
    /// Short description used in diagnostics ("a class", "a function", ...).
    pub fn describe(&self) -> &'static str {
        match self {
            SymbolKind::Class(_) => "a class",
            SymbolKind::Function(_) => "a function",
            SymbolKind::Module(_) => "a module",
            SymbolKind::Interface(_) => "an interface",
            SymbolKind::TypeAlias => "a type alias",
        }
    }

    /// Whether the symbol lives in the type space.
    pub fn is_type(&self) -> bool {
        matches!(self, SymbolKind::Class(_) | SymbolKind::Interface(_) | SymbolKind::TypeAlias)
    }

    /// Whether the symbol lives in the value space.
    pub fn is_value(&self) -> bool {
        matches!(self, SymbolKind::Class(_) | SymbolKind::Function(_) | SymbolKind::Module(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassSymbol {
    pub traits: LoweringTraits,
    pub declare: bool,
    pub fields: Vec<FieldSymbol>,
    pub methods: Vec<MethodSymbol>,
    pub has_constructor: bool,
}

impl ClassSymbol {
    pub fn field(&self, name: &str) -> Option<&FieldSymbol> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodSymbol> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Whether the class declares a method literally named `destructor`.
    pub fn has_destructor(&self) -> bool {
        self.method(DESTRUCTOR_METHOD).is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSymbol {
    pub name: String,
    pub visibility: Visibility,
    pub ty: Option<Spanned<TypeNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSymbol {
    pub name: String,
    pub visibility: Visibility,
    pub return_type: Option<Spanned<TypeNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSymbol {
    pub traits: LoweringTraits,
    pub declare: bool,
    pub return_type: Option<Spanned<TypeNode>>,
    /// Set for declared functions the lowering intercepts (`sizeof`, `addressof`, `i32`, ...)
    pub builtin: Option<BuiltinFnId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSymbol {
    pub traits: LoweringTraits,
    /// Exported members by name
    pub members: HashMap<String, Symbol>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceSymbol {
    pub methods: Vec<MethodSymbol>,
}

impl InterfaceSymbol {
    pub fn method(&self, name: &str) -> Option<&MethodSymbol> {
        self.methods.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str) -> MethodSymbol {
        MethodSymbol {
            name: name.to_string(),
            visibility: Visibility::Public,
            return_type: None,
        }
    }

    #[test]
    fn test_destructor_detection() {
        let mut class = ClassSymbol {
            traits: LoweringTraits::default(),
            declare: false,
            fields: vec![],
            methods: vec![method("add")],
            has_constructor: false,
        };
        assert!(!class.has_destructor());

        class.methods.push(method("destructor"));
        assert!(class.has_destructor());
    }

    #[test]
    fn test_default_ownership_is_shared_heap() {
        assert_eq!(LoweringTraits::default().ownership, Ownership::SharedHeap);
    }
}
