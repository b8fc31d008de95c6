//! Decorator introspection.
//!
//! Turns the decorators attached to a declaration into a [`LoweringTraits`] value. Decorator arguments must be string
//! literals; the vocabulary itself lives in `tscc_core::lang::decorators`.

use tscc_core::lang::decorators::{self, DecoratorId};
use tscc_syntax::ast::{Decorator, Expr, Literal, Spanned};

use super::symbols::{LoweringTraits, Ownership};
use crate::errors::{CodegenError, CodegenResult};

/// Arguments of the decorator `id`, if the declaration carries it.
pub fn decorator_args(decorators: &[Spanned<Decorator>], id: DecoratorId) -> Option<&[Spanned<Expr>]> {
    decorators
        .iter()
        .find(|d| decorators::from_str(&d.node.name) == Some(id))
        .map(|d| d.node.args.as_slice())
}

/// First argument of a decorator as a string literal. Absent arguments give `None`.
fn literal_arg<'a>(decorator: DecoratorId, args: &'a [Spanned<Expr>]) -> CodegenResult<Option<&'a str>> {
    match args.first() {
        None => Ok(None),
        Some(Spanned {
            node: Expr::Literal(Literal::String(text)),
            ..
        }) => Ok(Some(text.as_str())),
        Some(other) => Err(CodegenError::structural(
            format!("`@{}` expects a string literal argument", decorators::as_str(decorator)),
            other.span,
        )),
    }
}

/// Compute the lowering traits of a declaration named `declared_name`.
///
/// - `@struct()` selects [`Ownership::Value`]; everything else is [`Ownership::SharedHeap`].
/// - `@extern_c("n")` binds to `n`; `@extern_c()` binds to the declared name, unmangled.
/// - `@cpp_namespace("ns")` records the namespace.
pub fn lowering_traits(decorators: &[Spanned<Decorator>], declared_name: &str) -> CodegenResult<LoweringTraits> {
    for decorator in decorators {
        if decorators::from_str(&decorator.node.name).is_none() {
            return Err(CodegenError::unsupported(
                format!("unknown decorator `@{}`", decorator.node.name),
                decorator.span,
            ));
        }
    }

    let ownership = if decorator_args(decorators, DecoratorId::Struct).is_some() {
        Ownership::Value
    } else {
        Ownership::SharedHeap
    };

    let native_name = match decorator_args(decorators, DecoratorId::ExternC) {
        Some(args) => Some(
            literal_arg(DecoratorId::ExternC, args)?
                .unwrap_or(declared_name)
                .to_string(),
        ),
        None => None,
    };

    let namespace = match decorator_args(decorators, DecoratorId::CppNamespace) {
        Some(args) => literal_arg(DecoratorId::CppNamespace, args)?.map(str::to_string),
        None => None,
    };

    Ok(LoweringTraits {
        ownership,
        native_name,
        namespace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tscc_syntax::build::{decorator, ident, string};

    #[test]
    fn test_no_decorators_is_shared_heap_and_mangled() {
        let traits = lowering_traits(&[], "Managed").unwrap();
        assert_eq!(traits.ownership, Ownership::SharedHeap);
        assert_eq!(traits.native_name, None);
        assert_eq!(traits.namespace, None);
    }

    #[test]
    fn test_struct_is_value() {
        let traits = lowering_traits(&[decorator("struct", vec![])], "Vec2").unwrap();
        assert_eq!(traits.ownership, Ownership::Value);
    }

    #[test]
    fn test_extern_c_literal_and_bare() {
        let with_literal = lowering_traits(&[decorator("extern_c", vec![string("puts")])], "print").unwrap();
        assert_eq!(with_literal.native_name.as_deref(), Some("puts"));

        let bare = lowering_traits(&[decorator("extern_c", vec![])], "main").unwrap();
        assert_eq!(bare.native_name.as_deref(), Some("main"));
    }

    #[test]
    fn test_cpp_namespace_literal() {
        let traits = lowering_traits(&[decorator("cpp_namespace", vec![string("std")])], "cstdio").unwrap();
        assert_eq!(traits.namespace.as_deref(), Some("std"));
    }

    #[test]
    fn test_non_literal_argument_is_structural() {
        let err = lowering_traits(&[decorator("extern_c", vec![ident("name")])], "f").unwrap_err();
        assert!(matches!(err, CodegenError::Structural { .. }));
    }

    #[test]
    fn test_unknown_decorator_is_rejected() {
        let err = lowering_traits(&[decorator("route", vec![])], "f").unwrap_err();
        assert!(matches!(err, CodegenError::Unsupported { .. }));
    }
}
