//! Built-ins with dedicated lowering.
//!
//! | Call | Emitted |
//! |---|---|
//! | `addressof(v)` | `&v` |
//! | `sizeof<T>()` | `sizeof(T)` |
//! | `sizeof(v)` | `sizeof v` (`sizeof(a + b)` for operands that are not variables or fields) |
//! | `i32(v)`, `u8(v)`, ... | `i32(v)` |

use tscc_core::lang::builtins::{self, BuiltinFnId};
use tscc_syntax::ast::{CallExpr, Span};

use super::emit_expr;
use crate::backend::emit::buffer::AppendMode;
use crate::backend::emit::session::EmitSession;
use crate::backend::lowering::types::lower_type;
use crate::errors::{CodegenError, CodegenResult};

pub(super) fn emit_address_of(session: &mut EmitSession<'_>, call: &CallExpr, span: Span) -> CodegenResult<()> {
    let [operand] = call.args.as_slice() else {
        return Err(CodegenError::structural(
            format!("`addressof` takes exactly one argument, found {}", call.args.len()),
            span,
        ));
    };
    if !operand.node.is_addressable() {
        return Err(CodegenError::unsupported(
            "`addressof` of an expression that is not a variable or field; enable the `materialize` pass",
            operand.span,
        ));
    }
    session.append("&", AppendMode::INLINE)?;
    emit_expr(session, operand)
}

pub(super) fn emit_sizeof(session: &mut EmitSession<'_>, call: &CallExpr, span: Span) -> CodegenResult<()> {
    let type_args = call.type_args.as_deref().unwrap_or_default();
    match (type_args, call.args.as_slice()) {
        ([ty], []) => {
            let text = lower_type(session.model(), session.prefix(), ty)?;
            session.append(&format!("sizeof({text})"), AppendMode::INLINE)
        }
        ([], [value]) if value.node.is_addressable() => {
            session.append("sizeof ", AppendMode::INLINE)?;
            emit_expr(session, value)
        }
        ([], [value]) => {
            session.append("sizeof(", AppendMode::INLINE)?;
            emit_expr(session, value)?;
            session.append(")", AppendMode::INLINE)
        }
        _ => Err(CodegenError::structural(
            "`sizeof` takes either exactly one type argument or exactly one value argument",
            span,
        )),
    }
}

/// Sized numeric constructors lower to functional casts.
pub(super) fn emit_numeric_cast(
    session: &mut EmitSession<'_>,
    id: BuiltinFnId,
    call: &CallExpr,
    span: Span,
) -> CodegenResult<()> {
    let name = builtins::as_str(id);
    let [value] = call.args.as_slice() else {
        return Err(CodegenError::structural(
            format!("`{name}` takes exactly one argument, found {}", call.args.len()),
            span,
        ));
    };
    session.append(&format!("{name}("), AppendMode::INLINE)?;
    emit_expr(session, value)?;
    session.append(")", AppendMode::INLINE)
}

#[cfg(test)]
mod tests {
    use crate::backend::emit::expressions::emit_expr;
    use crate::backend::emit::records::FunctionRecord;
    use crate::backend::emit::session::EmitSession;
    use crate::backend::options::{CodegenOptions, LineEnding};
    use crate::errors::{CodegenError, CodegenResult};
    use crate::semantics::{Locals, ProgramModel, Type};
    use tscc_syntax::ast::{BinaryOp, Expr, KeywordType, Span, Spanned};
    use tscc_syntax::build::*;

    fn emit(expr: Spanned<Expr>) -> CodegenResult<String> {
        let number = || keyword(KeywordType::Number);
        let prelude = program(vec![
            type_alias("i32"),
            declare_function("i32", vec![param("v", number())], ty("i32")),
            declare_function("sizeof", vec![], number()),
            declare_function("addressof", vec![param("v", number())], number()),
        ]);
        let input = program(vec![struct_class("Vec2", vec![field("x", ty("i32"))])]);
        let model = ProgramModel::build(&input, &[&prelude]).unwrap();
        let options = CodegenOptions::default().with_line_ending(LineEnding::Lf);
        let mut session = EmitSession::new(&model, &options);
        let record = FunctionRecord::new(session.layout(), Some("void".into()), None, "f".into());
        let mut locals = Locals::new(None);
        locals.declare("x", Type::Named("i32".into()));
        locals.declare("v", Type::Class("Vec2".into()));
        session.begin_function(record, locals, None, Span::default())?;
        session.fragment(|s| emit_expr(s, &expr))
    }

    #[test]
    fn test_sizeof_of_value_has_no_parentheses() {
        assert_eq!(emit(call(ident("sizeof"), vec![ident("x")])).unwrap(), "sizeof x");
    }

    #[test]
    fn test_sizeof_of_compound_operand_is_parenthesized() {
        let sum = bin(BinaryOp::Add, ident("x"), ident("x"));
        assert_eq!(emit(call(ident("sizeof"), vec![sum])).unwrap(), "sizeof(x + x)");
        let field = prop(ident("v"), "x");
        assert_eq!(emit(call(ident("sizeof"), vec![field])).unwrap(), "sizeof v.x");
    }

    #[test]
    fn test_sizeof_of_type() {
        assert_eq!(emit(call_generic(ident("sizeof"), vec![ty("Vec2")], vec![])).unwrap(), "sizeof(tscc_Vec2)");
    }

    #[test]
    fn test_sizeof_with_both_or_neither_is_structural_error() {
        let both = call_generic(ident("sizeof"), vec![ty("Vec2")], vec![ident("x")]);
        assert!(matches!(emit(both), Err(CodegenError::Structural { .. })));
        let neither = call(ident("sizeof"), vec![]);
        assert!(matches!(emit(neither), Err(CodegenError::Structural { .. })));
    }

    #[test]
    fn test_addressof_of_identifier_and_field() {
        assert_eq!(emit(call(ident("addressof"), vec![ident("x")])).unwrap(), "&x");
        assert_eq!(emit(call(ident("addressof"), vec![prop(ident("v"), "x")])).unwrap(), "&v.x");
    }

    #[test]
    fn test_addressof_arity_and_operand_shape() {
        let two = call(ident("addressof"), vec![ident("x"), ident("x")]);
        assert!(matches!(emit(two), Err(CodegenError::Structural { .. })));
        let literal = call(ident("addressof"), vec![num("1")]);
        assert!(matches!(emit(literal), Err(CodegenError::Unsupported { .. })));
    }

    #[test]
    fn test_numeric_constructor_is_functional_cast() {
        assert_eq!(emit(call(ident("i32"), vec![num("3.5")])).unwrap(), "i32(3.5)");
    }
}
