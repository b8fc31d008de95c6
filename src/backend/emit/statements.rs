//! Statement emission.
//!
//! Each statement is staged (see [`EmitSession::push_statement`]) so that synthesized preludes land right above it.
//! Nested blocks are emitted in Allman style; lone `if`/`while` branches are wrapped in braces.

use tscc_syntax::ast::{Block, BindingName, Spanned, Statement, VariableDecl, VariableKind, VariableStatement};

use super::buffer::AppendMode;
use super::decls::type_text;
use super::expressions::emit_expr;
use super::session::EmitSession;
use crate::errors::{CodegenError, CodegenResult};
use crate::semantics::FrameKind;

pub(super) fn emit_statement(session: &mut EmitSession<'_>, stmt: &Spanned<Statement>) -> CodegenResult<()> {
    session.push_statement();
    let result = emit_statement_content(session, stmt);
    let popped = session.pop_statement();
    result.and(popped)
}

fn emit_statement_content(session: &mut EmitSession<'_>, stmt: &Spanned<Statement>) -> CodegenResult<()> {
    match &stmt.node {
        Statement::Variable(variable) => emit_variable(session, variable),
        Statement::Expr(expr) => {
            emit_expr(session, expr)?;
            session.append(";", AppendMode::INLINE)
        }
        Statement::Return(None) => session.append("return;", AppendMode::INLINE),
        Statement::Return(Some(value)) => {
            session.append("return ", AppendMode::INLINE)?;
            emit_expr(session, value)?;
            session.append(";", AppendMode::INLINE)
        }
        Statement::If(stmt) => {
            session.append("if (", AppendMode::INLINE)?;
            emit_expr(session, &stmt.condition)?;
            session.append(")", AppendMode::END)?;
            emit_branch(session, &stmt.then_branch, FrameKind::Block)?;
            if let Some(branch) = &stmt.else_branch {
                session.append("else", AppendMode::LINE)?;
                emit_branch(session, branch, FrameKind::Block)?;
            }
            Ok(())
        }
        Statement::While(stmt) => {
            session.append("while (", AppendMode::INLINE)?;
            emit_expr(session, &stmt.condition)?;
            session.append(")", AppendMode::END)?;
            emit_branch(session, &stmt.body, FrameKind::Loop)
        }
        Statement::Break => session.append("break;", AppendMode::INLINE),
        Statement::Continue => session.append("continue;", AppendMode::INLINE),
        Statement::Block(block) => emit_block(session, block, FrameKind::Block, stmt.span),
        Statement::Staged(staged) => {
            session.with_statement_prelude(|s| {
                for stmt in &staged.prelude {
                    emit_statement(s, stmt)?;
                }
                Ok(())
            })?;
            emit_statement_content(session, &staged.statement)
        }
    }
}

fn emit_variable(session: &mut EmitSession<'_>, variable: &VariableStatement) -> CodegenResult<()> {
    for decl in &variable.declarations {
        emit_variable_decl(session, variable.kind, decl)?;
    }
    Ok(())
}

/// `T x = init;`, or for `var`, a hoisted `T x;` and an assignment in place.
fn emit_variable_decl(
    session: &mut EmitSession<'_>,
    kind: VariableKind,
    decl: &Spanned<VariableDecl>,
) -> CodegenResult<()> {
    let span = decl.span;
    let name = match &decl.node.name {
        BindingName::Ident(name) => name,
        BindingName::ObjectPattern | BindingName::ArrayPattern => {
            return Err(CodegenError::structural(
                "only identifier bindings are supported, not destructuring patterns",
                span,
            ));
        }
    };
    let ty_node = decl
        .node
        .ty
        .as_ref()
        .ok_or_else(|| CodegenError::structural(format!("variable `{name}` requires a type annotation"), span))?;
    let ty = type_text(session, ty_node)?;

    match (kind, &decl.node.initializer) {
        (VariableKind::Var, initializer) => {
            session.hoist(&format!("{ty} {name};"), span)?;
            if let Some(init) = initializer {
                session.append(&format!("{name} = "), AppendMode::START)?;
                emit_expr(session, init)?;
                session.append(";", AppendMode::END)?;
            }
        }
        (VariableKind::Let | VariableKind::Const, Some(init)) => {
            session.append(&format!("{ty} {name} = "), AppendMode::START)?;
            emit_expr(session, init)?;
            session.append(";", AppendMode::END)?;
        }
        (VariableKind::Let | VariableKind::Const, None) => {
            session.append(&format!("{ty} {name};"), AppendMode::LINE)?;
        }
    }

    let semantic = session.model().type_from_node(&ty_node.node);
    session.locals_mut(span)?.declare(name.as_str(), semantic);
    Ok(())
}

/// `if`/`while` branch, braced even when the source has a lone statement.
fn emit_branch(session: &mut EmitSession<'_>, stmt: &Spanned<Statement>, kind: FrameKind) -> CodegenResult<()> {
    match &stmt.node {
        Statement::Block(block) => emit_block(session, block, kind, stmt.span),
        _ => {
            let block = Block {
                statements: vec![stmt.clone()],
            };
            emit_block(session, &block, kind, stmt.span)
        }
    }
}

fn emit_block(
    session: &mut EmitSession<'_>,
    block: &Block,
    kind: FrameKind,
    span: tscc_syntax::ast::Span,
) -> CodegenResult<()> {
    session.append("{", AppendMode::LINE)?;
    session.indent()?;
    session.locals_mut(span)?.push(kind);
    for stmt in &block.statements {
        emit_statement(session, stmt)?;
    }
    session.locals_mut(span)?.pop();
    session.dedent()?;
    session.append("}", AppendMode::LINE)
}
