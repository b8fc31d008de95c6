//! Expression emission.
//!
//! Expressions are appended inline to the current scope. Member access follows the owner's lowering traits:
//!
//! | Owner | Access |
//! |---|---|
//! | `this` | `this->x` |
//! | ambient module | `ns::x` (or the member's emitted name) |
//! | `@cpp_namespace` class | `v::x` |
//! | `@struct` class | `v.x` |
//! | shared-heap class, `Ptr<T>` | `v->x` |
//!
//! ## Module Organization
//!
//! - `calls` - Call expressions and method calls
//! - `builtins` - Intercepted built-ins (`addressof`, `sizeof`, numeric constructors)

mod builtins;
mod calls;

use tscc_core::lang::operators;
use tscc_syntax::ast::{Expr, Literal, NewExpr, PropertyAccess, ReceiverCall, Span, Spanned};

use super::buffer::AppendMode;
use super::session::EmitSession;
use crate::backend::lowering::names::{namespace_qualified, receiver_function_name, symbol_name};
use crate::backend::lowering::ownership::{
    NAMESPACE_ACCESS, POINTER_ACCESS, SHARED_RAW, THIS_ACCESS, VALUE_ACCESS, constructor_callee, member_access,
};
use crate::errors::{CodegenError, CodegenResult};
use crate::semantics::{Locals, Ownership, SymbolKind, Type};

pub(super) fn emit_expr(session: &mut EmitSession<'_>, expr: &Spanned<Expr>) -> CodegenResult<()> {
    let span = expr.span;
    match &expr.node {
        Expr::Ident(name) => emit_ident(session, name, span),
        Expr::This => {
            require_this(session, span)?;
            session.append("this", AppendMode::INLINE)
        }
        Expr::Literal(literal) => session.append(&literal_text(literal), AppendMode::INLINE),
        Expr::Property(access) => emit_property(session, access, span),
        Expr::Call(call) => calls::emit_call(session, call, span),
        Expr::New(new) => emit_new(session, new, span),
        Expr::Binary(binary) => {
            emit_expr(session, &binary.left)?;
            session.append(&format!(" {} ", operators::as_str(binary.op.id())), AppendMode::INLINE)?;
            emit_expr(session, &binary.right)
        }
        Expr::Unary(unary) => {
            session.append(operators::as_str(unary.op.id()), AppendMode::INLINE)?;
            emit_expr(session, &unary.operand)
        }
        Expr::Paren(inner) => {
            session.append("(", AppendMode::INLINE)?;
            emit_expr(session, inner)?;
            session.append(")", AppendMode::INLINE)
        }
        Expr::Comma(items) => emit_list(session, items),
        Expr::ReceiverCall(call) => emit_receiver_call(session, call, span),
    }
}

/// `a, b, c`
fn emit_list(session: &mut EmitSession<'_>, items: &[Spanned<Expr>]) -> CodegenResult<()> {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            session.append(", ", AppendMode::INLINE)?;
        }
        emit_expr(session, item)?;
    }
    Ok(())
}

/// `(a, b, c)`
fn emit_args(session: &mut EmitSession<'_>, args: &[Spanned<Expr>]) -> CodegenResult<()> {
    session.append("(", AppendMode::INLINE)?;
    emit_list(session, args)?;
    session.append(")", AppendMode::INLINE)
}

/// Type of `expr` at the current point of the open body.
fn type_of(session: &EmitSession<'_>, expr: &Spanned<Expr>) -> Type {
    let model = session.model();
    match session.locals(expr.span) {
        Ok(locals) => model.type_of(expr, locals),
        Err(_) => model.type_of(expr, &Locals::new(None)),
    }
}

fn is_local(session: &EmitSession<'_>, name: &str) -> bool {
    session
        .locals(Span::default())
        .is_ok_and(|locals| locals.lookup(name).is_some())
}

fn require_this(session: &EmitSession<'_>, span: Span) -> CodegenResult<()> {
    match session.locals(span)?.this_class() {
        Some(_) => Ok(()),
        None => Err(CodegenError::scope_discipline("`this` used outside a class member", span)),
    }
}

fn emit_ident(session: &mut EmitSession<'_>, name: &str, span: Span) -> CodegenResult<()> {
    if is_local(session, name) {
        return session.append(name, AppendMode::INLINE);
    }
    let text = match session.model().resolve(name) {
        Some(symbol) => match &symbol.kind {
            SymbolKind::Function(_) | SymbolKind::Class(_) => symbol_name(symbol, session.prefix()),
            kind => {
                return Err(CodegenError::semantic(
                    format!("`{name}` is {} and cannot be used as a value", kind.describe()),
                    span,
                ));
            }
        },
        None => return Err(CodegenError::semantic(format!("cannot resolve `{name}`"), span)),
    };
    session.append(&text, AppendMode::INLINE)
}

fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::Number(raw) => raw.clone(),
        Literal::String(value) => format!("\"{}\"", escape(value)),
        Literal::Bool(value) => value.to_string(),
        Literal::Null => "nullptr".to_string(),
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

// ============================================================================
// Member access
// ============================================================================

fn emit_property(session: &mut EmitSession<'_>, access: &PropertyAccess, span: Span) -> CodegenResult<()> {
    if let Expr::This = access.object.node {
        require_this(session, span)?;
        return session.append(&format!("{THIS_ACCESS}{}", access.name), AppendMode::INLINE);
    }
    match type_of(session, &access.object) {
        Type::Module(specifier) => {
            let text = module_member(session, &specifier, &access.name, span)?;
            session.append(&text, AppendMode::INLINE)
        }
        owner => emit_member(session, &access.object, &owner, &access.name, span),
    }
}

/// `object<sep>member`, with the separator chosen by the owner's type.
fn emit_member(
    session: &mut EmitSession<'_>,
    object: &Spanned<Expr>,
    owner: &Type,
    member: &str,
    span: Span,
) -> CodegenResult<()> {
    if let Expr::This = object.node {
        require_this(session, span)?;
        return session.append(&format!("{THIS_ACCESS}{member}"), AppendMode::INLINE);
    }
    let separator = match owner {
        Type::Class(name) => match session.model().class(name) {
            Some((_, class)) if class.traits.namespace.is_some() => NAMESPACE_ACCESS,
            Some((_, class)) => member_access(class.traits.ownership),
            None => return Err(CodegenError::semantic(format!("class `{name}` is not in the symbol table"), span)),
        },
        Type::Pointer(_) => POINTER_ACCESS,
        Type::Named(_) | Type::Primitive(_) => VALUE_ACCESS,
        Type::Interface(name) => {
            return Err(CodegenError::semantic(
                format!("cannot access `{member}` through interface `{name}`; interfaces have no native layout"),
                span,
            ));
        }
        Type::Module(_) | Type::Function | Type::Unknown => {
            return Err(CodegenError::semantic(
                format!("cannot determine the owner type of `{member}`"),
                span,
            ));
        }
    };
    emit_expr(session, object)?;
    session.append(&format!("{separator}{member}"), AppendMode::INLINE)
}

/// Emitted text of `module.member`.
fn module_member(session: &EmitSession<'_>, specifier: &str, member: &str, span: Span) -> CodegenResult<String> {
    let model = session.model();
    let Some(SymbolKind::Module(module)) = model.module(specifier).map(|symbol| &symbol.kind) else {
        return Err(CodegenError::semantic(format!("module \"{specifier}\" is not declared"), span));
    };
    let Some(symbol) = model.member(module, member) else {
        return Err(CodegenError::semantic(
            format!("module \"{specifier}\" has no member `{member}`"),
            span,
        ));
    };
    let name = symbol_name(symbol, session.prefix());
    Ok(match &module.traits.namespace {
        Some(namespace) => namespace_qualified(namespace, &name),
        None => name,
    })
}

// ============================================================================
// Construction
// ============================================================================

/// `Class(args)` for `@struct` classes, `std::make_shared<Class>(args)` otherwise.
fn emit_new(session: &mut EmitSession<'_>, new: &NewExpr, span: Span) -> CodegenResult<()> {
    let Expr::Ident(name) = &new.class.node else {
        return Err(CodegenError::unsupported("`new` of a computed class expression", span));
    };
    let Some((symbol, class)) = session.model().class(name) else {
        return Err(CodegenError::semantic(format!("`{name}` is not a class"), span));
    };
    let callee = constructor_callee(class.traits.ownership, &symbol_name(symbol, session.prefix()));
    session.append(&callee, AppendMode::INLINE)?;
    emit_args(session, &new.args)
}

/// `Class_method(receiver, args)`
fn emit_receiver_call(session: &mut EmitSession<'_>, call: &ReceiverCall, span: Span) -> CodegenResult<()> {
    let Some((symbol, _)) = session.model().class(&call.class) else {
        return Err(CodegenError::semantic(
            format!("class `{}` is not in the symbol table", call.class),
            span,
        ));
    };
    let name = receiver_function_name(&symbol_name(symbol, session.prefix()), &call.method);
    session.append(&name, AppendMode::INLINE)?;
    let Some((receiver, rest)) = call.args.split_first() else {
        return Err(CodegenError::structural(
            format!("receiver call `{}` has no receiver", call.method),
            span,
        ));
    };
    session.append("(", AppendMode::INLINE)?;
    emit_expr(session, receiver)?;
    if is_shared_handle(session, receiver) {
        session.append(SHARED_RAW, AppendMode::INLINE)?;
    }
    for arg in rest {
        session.append(", ", AppendMode::INLINE)?;
        emit_expr(session, arg)?;
    }
    session.append(")", AppendMode::INLINE)
}

fn is_shared_handle(session: &EmitSession<'_>, expr: &Spanned<Expr>) -> bool {
    match type_of(session, expr) {
        Type::Class(name) => matches!(
            session.model().class(&name),
            Some((_, class)) if class.traits.ownership == Ownership::SharedHeap
        ),
        _ => false,
    }
}
