//! AST rewrite passes.
//!
//! Passes run on one function or method body at a time, before any text is emitted. Each pass desugars one concern
//! into plain AST the emitters already understand: explicit cleanup calls, explicit receivers, explicit temporaries.
//! Synthesized statements that must run before the statement they were found in are attached to it with
//! [`Statement::Staged`].
//!
//! Enabled passes always run in [`Pass::CANONICAL`] order, whatever order they were selected in.
//!
//! ## Module Organization
//!
//! - `destructors` - Destructor calls at block exits
//! - `receiver` - `obj.m(args)` to `Class_m(&obj, args)`
//! - `address_of` - Temporaries for `addressof` on non-lvalues

mod address_of;
mod destructors;
mod receiver;

pub use receiver::bind_receiver;

use std::fmt;
use std::str::FromStr;

use tscc_core::lang::builtins::{self, BuiltinFnId};
use tscc_syntax::ast::{
    Block, CallExpr, Expr, IfStmt, Span, Spanned, StagedStmt, Statement, VariableDecl, WhileStmt,
};

use crate::backend::options::DestructorPolicy;
use crate::errors::{CodegenError, CodegenResult};
use crate::semantics::{FrameKind, Locals, SemanticModel, SymbolKind, Type};

/// A rewrite pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Insert `destructor()` calls for class-typed locals at block exits
    BlockScopeDestructors,
    /// Turn method calls into plain calls taking the receiver's address
    ReceiverInjection,
    /// Move non-lvalue `addressof` operands into temporaries
    AddressMaterialization,
}

impl Pass {
    /// Execution order of enabled passes.
    pub const CANONICAL: [Pass; 3] = [
        Pass::BlockScopeDestructors,
        Pass::ReceiverInjection,
        Pass::AddressMaterialization,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Pass::BlockScopeDestructors => "destructors",
            Pass::ReceiverInjection => "receiver",
            Pass::AddressMaterialization => "materialize",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pass::CANONICAL
            .into_iter()
            .find(|pass| pass.as_str() == s)
            .ok_or_else(|| format!("unknown pass `{s}` (expected one of: destructors, receiver, materialize)"))
    }
}

/// A selection of passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSet {
    enabled: [bool; 3],
}

impl Default for PassSet {
    fn default() -> Self {
        Self::empty()
            .with(Pass::BlockScopeDestructors)
            .with(Pass::AddressMaterialization)
    }
}

impl PassSet {
    pub fn empty() -> Self {
        Self { enabled: [false; 3] }
    }

    pub fn all() -> Self {
        Self { enabled: [true; 3] }
    }

    fn index(pass: Pass) -> usize {
        match pass {
            Pass::BlockScopeDestructors => 0,
            Pass::ReceiverInjection => 1,
            Pass::AddressMaterialization => 2,
        }
    }

    pub fn with(mut self, pass: Pass) -> Self {
        self.enabled[Self::index(pass)] = true;
        self
    }

    pub fn without(mut self, pass: Pass) -> Self {
        self.enabled[Self::index(pass)] = false;
        self
    }

    pub fn contains(&self, pass: Pass) -> bool {
        self.enabled[Self::index(pass)]
    }

    /// Enabled passes in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Pass> + '_ {
        Pass::CANONICAL.into_iter().filter(|pass| self.contains(*pass))
    }
}

impl FromIterator<Pass> for PassSet {
    fn from_iter<I: IntoIterator<Item = Pass>>(iter: I) -> Self {
        iter.into_iter().fold(PassSet::empty(), PassSet::with)
    }
}

/// What passes know about the body they rewrite.
pub struct PassContext<'a> {
    pub model: &'a dyn SemanticModel,
    /// Parameters and `this` class of the function
    pub locals: &'a Locals,
    pub destructor_policy: DestructorPolicy,
}

/// Run every enabled pass over `body`.
#[tracing::instrument(skip_all, fields(statements = body.statements.len()))]
pub fn run_passes(cx: &PassContext<'_>, passes: PassSet, body: Block) -> CodegenResult<Block> {
    let mut body = body;
    for pass in passes.iter() {
        body = match pass {
            Pass::BlockScopeDestructors => destructors::run(cx, body)?,
            Pass::ReceiverInjection => receiver::run(cx, body)?,
            Pass::AddressMaterialization => address_of::run(cx, body)?,
        };
        tracing::debug!(pass = %pass, "pass applied");
    }
    Ok(body)
}

/// Type a variable declaration binds: its annotation, else its initializer's type.
pub(crate) fn declared_type(model: &dyn SemanticModel, decl: &VariableDecl, locals: &Locals) -> Type {
    match (&decl.ty, &decl.initializer) {
        (Some(ty), _) => model.type_from_node(&ty.node),
        (None, Some(init)) => model.type_of(init, locals),
        (None, None) => Type::Unknown,
    }
}

/// Identifier bound to the built-in `id`, checked against the model.
fn builtin_callee(model: &dyn SemanticModel, id: BuiltinFnId, span: Span) -> CodegenResult<Spanned<Expr>> {
    match model.builtin(id) {
        Some(symbol) => Ok(Spanned::new(Expr::Ident(symbol.name.clone()), span)),
        None => Err(CodegenError::builtin_surface(
            format!("built-in `{}` is not declared", builtins::as_str(id)),
            span,
        )),
    }
}

/// Whether `callee` names the built-in `id`.
fn is_builtin_call(model: &dyn SemanticModel, callee: &Spanned<Expr>, id: BuiltinFnId) -> bool {
    let Expr::Ident(name) = &callee.node else {
        return false;
    };
    matches!(
        model.resolve(name).map(|symbol| &symbol.kind),
        Some(SymbolKind::Function(function)) if function.builtin == Some(id)
    )
}

/// Bottom-up expression rewriting shared by the expression-level passes.
trait ExprRewrite {
    /// Rewrite one expression whose sub-expressions are already rewritten. Statements pushed to `prelude` run
    /// before the enclosing statement.
    fn rewrite_expr(
        &mut self,
        expr: Spanned<Expr>,
        locals: &Locals,
        prelude: &mut Vec<Spanned<Statement>>,
    ) -> CodegenResult<Spanned<Expr>>;
}

/// Walks a body, keeping [`Locals`] in sync, and applies an [`ExprRewrite`] to every expression.
struct BodyWalker<'a, R> {
    model: &'a dyn SemanticModel,
    locals: Locals,
    rewriter: R,
}

impl<'a, R: ExprRewrite> BodyWalker<'a, R> {
    fn new(cx: &PassContext<'a>, rewriter: R) -> Self {
        Self {
            model: cx.model,
            locals: cx.locals.clone(),
            rewriter,
        }
    }

    /// Rewrite the function body; its statements share the parameters' frame.
    fn body(mut self, body: Block) -> CodegenResult<Block> {
        self.statements(body)
    }

    fn statements(&mut self, block: Block) -> CodegenResult<Block> {
        let statements = block
            .statements
            .into_iter()
            .map(|stmt| self.statement(stmt))
            .collect::<CodegenResult<Vec<_>>>()?;
        Ok(Block { statements })
    }

    fn block(&mut self, block: Block, kind: FrameKind) -> CodegenResult<Block> {
        self.locals.push(kind);
        let result = self.statements(block);
        self.locals.pop();
        result
    }

    /// Branch or loop body; a lone statement gets its own frame like a block would.
    fn nested(&mut self, stmt: Spanned<Statement>, kind: FrameKind) -> CodegenResult<Spanned<Statement>> {
        let span = stmt.span;
        match stmt.node {
            Statement::Block(block) => Ok(Spanned::new(Statement::Block(self.block(block, kind)?), span)),
            node => {
                self.locals.push(kind);
                let result = self.statement(Spanned::new(node, span));
                self.locals.pop();
                result
            }
        }
    }

    fn statement(&mut self, stmt: Spanned<Statement>) -> CodegenResult<Spanned<Statement>> {
        let span = stmt.span;
        let mut prelude = Vec::new();
        let node = match stmt.node {
            Statement::Variable(mut variable) => {
                for decl in &mut variable.declarations {
                    if let Some(init) = decl.node.initializer.take() {
                        decl.node.initializer = Some(self.expr(init, &mut prelude)?);
                    }
                    if let Some(name) = decl.node.name.as_ident() {
                        let ty = declared_type(self.model, &decl.node, &self.locals);
                        self.locals.declare(name, ty);
                    }
                }
                Statement::Variable(variable)
            }
            Statement::Expr(expr) => Statement::Expr(self.expr(expr, &mut prelude)?),
            Statement::Return(value) => Statement::Return(match value {
                Some(value) => Some(self.expr(value, &mut prelude)?),
                None => None,
            }),
            Statement::If(stmt) => {
                let condition = self.expr(stmt.condition, &mut prelude)?;
                let then_branch = Box::new(self.nested(*stmt.then_branch, FrameKind::Block)?);
                let else_branch = match stmt.else_branch {
                    Some(branch) => Some(Box::new(self.nested(*branch, FrameKind::Block)?)),
                    None => None,
                };
                Statement::If(IfStmt {
                    condition,
                    then_branch,
                    else_branch,
                })
            }
            Statement::While(stmt) => {
                let condition = self.expr(stmt.condition, &mut prelude)?;
                let body = Box::new(self.nested(*stmt.body, FrameKind::Loop)?);
                Statement::While(WhileStmt { condition, body })
            }
            Statement::Block(block) => Statement::Block(self.block(block, FrameKind::Block)?),
            Statement::Staged(staged) => {
                for stmt in staged.prelude {
                    prelude.push(self.statement(stmt)?);
                }
                match self.statement(*staged.statement)? {
                    Spanned {
                        node: Statement::Staged(inner),
                        ..
                    } => {
                        prelude.extend(inner.prelude);
                        inner.statement.node
                    }
                    other => other.node,
                }
            }
            node @ (Statement::Break | Statement::Continue) => node,
        };
        Ok(staged(prelude, Spanned::new(node, span)))
    }

    fn expr(&mut self, expr: Spanned<Expr>, prelude: &mut Vec<Spanned<Statement>>) -> CodegenResult<Spanned<Expr>> {
        let span = expr.span;
        let node = match expr.node {
            Expr::Property(mut access) => {
                access.object = Box::new(self.expr(*access.object, prelude)?);
                Expr::Property(access)
            }
            Expr::Call(call) => Expr::Call(CallExpr {
                callee: Box::new(self.expr(*call.callee, prelude)?),
                type_args: call.type_args,
                args: self.exprs(call.args, prelude)?,
            }),
            Expr::New(mut new) => {
                new.args = self.exprs(new.args, prelude)?;
                Expr::New(new)
            }
            Expr::Binary(mut binary) => {
                binary.left = Box::new(self.expr(*binary.left, prelude)?);
                binary.right = Box::new(self.expr(*binary.right, prelude)?);
                Expr::Binary(binary)
            }
            Expr::Unary(mut unary) => {
                unary.operand = Box::new(self.expr(*unary.operand, prelude)?);
                Expr::Unary(unary)
            }
            Expr::Paren(inner) => Expr::Paren(Box::new(self.expr(*inner, prelude)?)),
            Expr::Comma(items) => Expr::Comma(self.exprs(items, prelude)?),
            Expr::ReceiverCall(mut call) => {
                call.args = self.exprs(call.args, prelude)?;
                Expr::ReceiverCall(call)
            }
            leaf @ (Expr::Ident(_) | Expr::This | Expr::Literal(_)) => leaf,
        };
        self.rewriter.rewrite_expr(Spanned::new(node, span), &self.locals, prelude)
    }

    fn exprs(
        &mut self,
        exprs: Vec<Spanned<Expr>>,
        prelude: &mut Vec<Spanned<Statement>>,
    ) -> CodegenResult<Vec<Spanned<Expr>>> {
        exprs.into_iter().map(|expr| self.expr(expr, prelude)).collect()
    }
}

/// Attach `prelude` to `stmt`, unless there is none.
fn staged(prelude: Vec<Spanned<Statement>>, stmt: Spanned<Statement>) -> Spanned<Statement> {
    if prelude.is_empty() {
        return stmt;
    }
    let span = stmt.span;
    Spanned::new(
        Statement::Staged(StagedStmt {
            prelude,
            statement: Box::new(stmt),
        }),
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection() {
        let passes = PassSet::default();
        assert_eq!(
            passes.iter().collect::<Vec<_>>(),
            vec![Pass::BlockScopeDestructors, Pass::AddressMaterialization]
        );
    }

    #[test]
    fn test_canonical_order_regardless_of_selection_order() {
        let passes: PassSet = [Pass::AddressMaterialization, Pass::ReceiverInjection, Pass::BlockScopeDestructors]
            .into_iter()
            .collect();
        assert_eq!(passes.iter().collect::<Vec<_>>(), Pass::CANONICAL.to_vec());
    }

    #[test]
    fn test_pass_names() {
        for pass in Pass::CANONICAL {
            assert_eq!(pass.as_str().parse::<Pass>(), Ok(pass));
        }
        assert!("inline".parse::<Pass>().is_err());
    }

    #[test]
    fn test_without_removes_pass() {
        let passes = PassSet::all().without(Pass::ReceiverInjection);
        assert!(!passes.contains(Pass::ReceiverInjection));
        assert!(passes.contains(Pass::BlockScopeDestructors));
    }
}
