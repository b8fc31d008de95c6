//! Type annotations to C++ type names.
//!
//! | Annotation | C++ |
//! |---|---|
//! | `void` / `boolean` / `number` / `string` | `void` / `bool` / `double` / `const char*` |
//! | `Ptr<T>` | `T*`, bypassing ownership wrapping |
//! | class | by ownership (see [`ownership`](super::ownership)) |
//! | type alias or native name (`i32`) | verbatim, type arguments lowered recursively |
//! | `ns.Name` through a `cpp_namespace` module | `ns::Name` |

use tscc_core::lang::builtins::{self, BuiltinTypeId};
use tscc_syntax::ast::{KeywordType, Span, Spanned, TypeNode, TypeReference};

use super::names::{emitted_name, namespace_qualified};
use super::ownership::type_reference;
use crate::errors::{CodegenError, CodegenResult};
use crate::semantics::{SemanticModel, Symbol, SymbolKind};

/// Whether class references get their ownership wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wrapping {
    Owned,
    /// Pointee of `Ptr<T>`: the bare class name
    Bare,
}

/// Lower a type annotation.
pub fn lower_type(model: &dyn SemanticModel, prefix: &str, node: &Spanned<TypeNode>) -> CodegenResult<String> {
    lower_with(model, prefix, node, Wrapping::Owned)
}

fn lower_with(
    model: &dyn SemanticModel,
    prefix: &str,
    node: &Spanned<TypeNode>,
    wrapping: Wrapping,
) -> CodegenResult<String> {
    match &node.node {
        TypeNode::Keyword(keyword) => Ok(keyword_type(*keyword).to_string()),
        TypeNode::Reference(reference) => match reference.name.as_slice() {
            [name] => lower_simple(model, prefix, name, reference, wrapping, node.span),
            [qualifier, name] => lower_qualified(model, prefix, qualifier, name, reference, wrapping, node.span),
            _ => Err(CodegenError::unsupported(
                format!("type reference `{}`", reference.name.join(".")),
                node.span,
            )),
        },
    }
}

fn keyword_type(keyword: KeywordType) -> &'static str {
    match keyword {
        KeywordType::Void => "void",
        KeywordType::Boolean => "bool",
        KeywordType::Number => "double",
        KeywordType::String => "const char*",
    }
}

fn lower_simple(
    model: &dyn SemanticModel,
    prefix: &str,
    name: &str,
    reference: &TypeReference,
    wrapping: Wrapping,
    span: Span,
) -> CodegenResult<String> {
    if builtins::type_from_str(name) == Some(BuiltinTypeId::Ptr) {
        let [inner] = reference.type_args.as_slice() else {
            return Err(CodegenError::structural("`Ptr` takes exactly one type argument", span));
        };
        return Ok(format!("{}*", lower_with(model, prefix, inner, Wrapping::Bare)?));
    }
    match model.resolve_type(name) {
        Some(symbol) => lower_symbol(model, prefix, symbol, None, reference, wrapping, span),
        None => with_type_args(model, prefix, name.to_string(), reference),
    }
}

fn lower_qualified(
    model: &dyn SemanticModel,
    prefix: &str,
    qualifier: &str,
    name: &str,
    reference: &TypeReference,
    wrapping: Wrapping,
    span: Span,
) -> CodegenResult<String> {
    let Some(SymbolKind::Module(module)) = model.resolve(qualifier).map(|symbol| &symbol.kind) else {
        return Err(CodegenError::semantic(
            format!("`{qualifier}` in `{qualifier}.{name}` is not a module"),
            span,
        ));
    };
    let Some(member) = model.member(module, name) else {
        return Err(CodegenError::semantic(
            format!("module `{qualifier}` has no exported type `{name}`"),
            span,
        ));
    };
    lower_symbol(model, prefix, member, module.traits.namespace.as_deref(), reference, wrapping, span)
}

fn lower_symbol(
    model: &dyn SemanticModel,
    prefix: &str,
    symbol: &Symbol,
    namespace: Option<&str>,
    reference: &TypeReference,
    wrapping: Wrapping,
    span: Span,
) -> CodegenResult<String> {
    let qualify = |name: String| match namespace {
        Some(namespace) => namespace_qualified(namespace, &name),
        None => name,
    };
    let written = &symbol.name;
    match &symbol.kind {
        SymbolKind::Class(class) => {
            if !reference.type_args.is_empty() {
                return Err(CodegenError::unsupported(
                    format!("type arguments on class type `{written}`"),
                    span,
                ));
            }
            let emitted = qualify(emitted_name(&class.traits, &symbol.name, prefix));
            Ok(match wrapping {
                Wrapping::Owned => type_reference(class.traits.ownership, &emitted),
                Wrapping::Bare => emitted,
            })
        }
        SymbolKind::Interface(_) => Err(CodegenError::unsupported(
            format!("interface `{written}` used as a type; only classes and native types can be lowered"),
            span,
        )),
        SymbolKind::TypeAlias => with_type_args(model, prefix, qualify(symbol.name.clone()), reference),
        SymbolKind::Function(_) | SymbolKind::Module(_) => Err(CodegenError::semantic(
            format!("`{written}` is {}, not a type", symbol.kind.describe()),
            span,
        )),
    }
}

fn with_type_args(
    model: &dyn SemanticModel,
    prefix: &str,
    name: String,
    reference: &TypeReference,
) -> CodegenResult<String> {
    if reference.type_args.is_empty() {
        return Ok(name);
    }
    let args = reference
        .type_args
        .iter()
        .map(|arg| lower_type(model, prefix, arg))
        .collect::<CodegenResult<Vec<_>>>()?;
    Ok(format!("{name}<{}>", args.join(", ")))
}
