//! Call expressions.
//!
//! Free-function callees are resolved through the semantic model first, so built-ins can be intercepted before the
//! ordinary `name(args)` lowering. Method calls defer the callee to member-access lowering.

use tscc_core::lang::builtins::BuiltinFnId;
use tscc_core::lang::conventions::DESTRUCTOR_METHOD;
use tscc_syntax::ast::{CallExpr, Expr, PropertyAccess, Span};

use super::{builtins, emit_args, emit_expr, emit_member, emit_property, is_local, type_of};
use crate::backend::emit::buffer::AppendMode;
use crate::backend::emit::session::EmitSession;
use crate::backend::lowering::names::{destructor_name, symbol_name};
use crate::errors::{CodegenError, CodegenResult};
use crate::semantics::{SymbolKind, Type};

pub(super) fn emit_call(session: &mut EmitSession<'_>, call: &CallExpr, span: Span) -> CodegenResult<()> {
    if !session.in_function() {
        return Err(CodegenError::scope_discipline("call outside a function", span));
    }
    match &call.callee.node {
        Expr::Ident(name) if !is_local(session, name) => emit_function_call(session, name, call, span),
        Expr::Property(access) => emit_method_call(session, access, call, span),
        _ => {
            emit_expr(session, &call.callee)?;
            emit_args(session, &call.args)
        }
    }
}

fn emit_function_call(session: &mut EmitSession<'_>, name: &str, call: &CallExpr, span: Span) -> CodegenResult<()> {
    let Some(symbol) = session.model().resolve(name) else {
        return Err(CodegenError::semantic(format!("cannot resolve function `{name}`"), span));
    };
    let SymbolKind::Function(function) = &symbol.kind else {
        return Err(CodegenError::semantic(
            format!("`{name}` is {}, not a function", symbol.kind.describe()),
            span,
        ));
    };

    match function.builtin {
        Some(BuiltinFnId::AddressOf) => return builtins::emit_address_of(session, call, span),
        Some(BuiltinFnId::SizeOf) => return builtins::emit_sizeof(session, call, span),
        Some(BuiltinFnId::AllocatorAlloc) | None => {}
        Some(id) => return builtins::emit_numeric_cast(session, id, call, span),
    }

    if call.type_args.as_ref().is_some_and(|args| !args.is_empty()) {
        return Err(CodegenError::unsupported(
            format!("explicit type arguments in the call to `{name}`"),
            span,
        ));
    }
    let callee = symbol_name(symbol, session.prefix());
    session.append(&callee, AppendMode::INLINE)?;
    emit_args(session, &call.args)
}

fn emit_method_call(
    session: &mut EmitSession<'_>,
    access: &PropertyAccess,
    call: &CallExpr,
    span: Span,
) -> CodegenResult<()> {
    let owner = type_of(session, &access.object);
    match &owner {
        Type::Class(class_name) => {
            let Some((symbol, class)) = session.model().class(class_name) else {
                return Err(CodegenError::semantic(
                    format!("class `{class_name}` is not in the symbol table"),
                    span,
                ));
            };
            if access.name == DESTRUCTOR_METHOD && class.has_destructor() {
                let name = destructor_name(&symbol_name(symbol, session.prefix()));
                emit_member(session, &access.object, &owner, &name, span)?;
                return session.append("()", AppendMode::INLINE);
            }
            if class.method(&access.name).is_none() && class.field(&access.name).is_none() {
                return Err(CodegenError::semantic(
                    format!("class `{class_name}` has no member `{}`", access.name),
                    span,
                ));
            }
        }
        Type::Module(specifier) => {
            let model = session.model();
            let member = match model.module(specifier).map(|symbol| &symbol.kind) {
                Some(SymbolKind::Module(module)) => model.member(module, &access.name),
                _ => None,
            };
            if !matches!(member.map(|symbol| &symbol.kind), Some(SymbolKind::Function(_))) {
                return Err(CodegenError::semantic(
                    format!("`{}` is not a function exported by \"{specifier}\"", access.name),
                    span,
                ));
            }
        }
        Type::Interface(name) => {
            return Err(CodegenError::semantic(
                format!(
                    "cannot call `{}` through interface `{name}`; interface methods have no native implementation",
                    access.name
                ),
                span,
            ));
        }
        _ => {}
    }
    emit_property(session, access, span)?;
    emit_args(session, &call.args)
}
