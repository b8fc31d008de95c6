//! Semantic model consumed by the lowering engine.
//!
//! Parsing and type checking happen in an external frontend; this module is the query surface the backend needs on
//! top of the typed AST: name resolution in the value and type spaces, decorator-derived lowering traits, and the
//! type of an expression at a given point in a body.
//!
//! ## Module Organization
//!
//! - `symbols` - Symbol table entries and the per-declaration lowering traits
//! - `traits` - Decorator introspection (`extern_c`, `struct`, `cpp_namespace`)
//! - `model` - [`ProgramModel`], the reference implementation built from typed ASTs
//! - `locals` - Lexical frames of typed local bindings
//! - `typing` - Expression typing (`type_of`)

pub mod locals;
pub mod model;
pub mod symbols;
pub mod traits;
pub mod typing;

pub use locals::{FrameKind, Locals};
pub use model::ProgramModel;
pub use symbols::{
    ClassSymbol, FieldSymbol, FunctionSymbol, InterfaceSymbol, LoweringTraits, MethodSymbol, ModuleSymbol, Ownership,
    Symbol, SymbolKind,
};

use tscc_core::lang::builtins::{self, BuiltinFnId, BuiltinTypeId};
use tscc_syntax::ast::{Expr, KeywordType, Span, Spanned, TypeNode, TypeReference};

/// Semantic type of an expression or declaration, as far as lowering cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// A class, by the name it is visible under in the type space
    Class(String),
    Interface(String),
    /// Type alias or a name the model does not know; lowered verbatim
    Named(String),
    /// `Ptr<T>`
    Pointer(Box<Type>),
    Primitive(Primitive),
    /// An ambient module, keyed by its specifier
    Module(String),
    /// A free function or method used as a value
    Function,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Void,
    Boolean,
    Number,
    String,
}

impl Type {
    /// Rebuild a type annotation that denotes this type, for synthesized declarations.
    pub fn to_type_node(&self, span: Span) -> Option<Spanned<TypeNode>> {
        let node = match self {
            Type::Class(name) | Type::Interface(name) | Type::Named(name) => TypeNode::Reference(TypeReference {
                name: name.split('.').map(str::to_string).collect(),
                type_args: vec![],
            }),
            Type::Pointer(inner) => TypeNode::Reference(TypeReference {
                name: vec![builtins::type_as_str(BuiltinTypeId::Ptr).to_string()],
                type_args: vec![inner.to_type_node(span)?],
            }),
            Type::Primitive(p) => TypeNode::Keyword(match p {
                Primitive::Void => KeywordType::Void,
                Primitive::Boolean => KeywordType::Boolean,
                Primitive::Number => KeywordType::Number,
                Primitive::String => KeywordType::String,
            }),
            Type::Module(_) | Type::Function | Type::Unknown => return None,
        };
        Some(Spanned::new(node, span))
    }
}

/// Queries the lowering engine makes against the typed program.
///
/// Emitters and rewrite passes only see this trait, so a frontend can provide its own model instead of
/// [`ProgramModel`].
pub trait SemanticModel {
    /// Resolve an identifier in the value space (functions, classes, imports, namespace aliases).
    fn resolve(&self, name: &str) -> Option<&Symbol>;

    /// Resolve an identifier in the type space (classes, interfaces, type aliases).
    fn resolve_type(&self, name: &str) -> Option<&Symbol>;

    /// Look up an ambient module by its specifier (`"cstdio"`).
    fn module(&self, specifier: &str) -> Option<&Symbol>;

    /// Look up an exported member of an ambient module.
    fn member<'m>(&'m self, module: &'m ModuleSymbol, name: &str) -> Option<&'m Symbol>;

    /// Semantic type denoted by a type annotation.
    fn type_from_node(&self, node: &TypeNode) -> Type;

    /// Semantic type of an expression, with `locals` describing the enclosing body.
    fn type_of(&self, expr: &Spanned<Expr>, locals: &Locals) -> Type;

    /// Resolve a class by its type-space name.
    fn class(&self, name: &str) -> Option<(&Symbol, &ClassSymbol)> {
        let symbol = self.resolve_type(name)?;
        match &symbol.kind {
            SymbolKind::Class(class) => Some((symbol, class)),
            _ => None,
        }
    }

    /// The declaration bound to the built-in `id`, if the program (or a prelude) declares it.
    fn builtin(&self, id: BuiltinFnId) -> Option<&Symbol> {
        let symbol = self.resolve(builtins::as_str(id))?;
        match &symbol.kind {
            SymbolKind::Function(function) if function.builtin == Some(id) => Some(symbol),
            _ => None,
        }
    }
}
