//! Address-of materialization.
//!
//! `addressof(expr)` where `expr` is not an lvalue becomes
//!
//! ```text
//! let _tscc_temp_N: T;            // staged before the statement
//! (_tscc_temp_N = expr, addressof(_tscc_temp_N))
//! ```
//!
//! with `T` the type of `expr`. Temporaries are numbered per body, starting at 1.

use tscc_core::lang::builtins::BuiltinFnId;
use tscc_core::lang::conventions::temp_name;
use tscc_syntax::ast::{
    BinaryExpr, BinaryOp, BindingName, Block, CallExpr, Expr, Spanned, Statement, VariableDecl, VariableKind,
    VariableStatement,
};

use super::{BodyWalker, ExprRewrite, PassContext, is_builtin_call};
use crate::errors::{CodegenError, CodegenResult};
use crate::semantics::{Locals, SemanticModel};

pub(super) fn run(cx: &PassContext<'_>, body: Block) -> CodegenResult<Block> {
    let rewriter = AddressMaterialization {
        model: cx.model,
        next_temp: 1,
    };
    BodyWalker::new(cx, rewriter).body(body)
}

struct AddressMaterialization<'a> {
    model: &'a dyn SemanticModel,
    next_temp: usize,
}

impl ExprRewrite for AddressMaterialization<'_> {
    fn rewrite_expr(
        &mut self,
        expr: Spanned<Expr>,
        locals: &Locals,
        prelude: &mut Vec<Spanned<Statement>>,
    ) -> CodegenResult<Spanned<Expr>> {
        let span = expr.span;
        let Expr::Call(call) = expr.node else {
            return Ok(expr);
        };
        let materialize = is_builtin_call(self.model, &call.callee, BuiltinFnId::AddressOf)
            && matches!(call.args.as_slice(), [operand] if !operand.node.is_addressable());
        if !materialize {
            return Ok(Spanned::new(Expr::Call(call), span));
        }

        let CallExpr { callee, type_args, args } = call;
        let Some(operand) = args.into_iter().next() else {
            return Err(CodegenError::structural("`addressof` requires exactly one argument", span));
        };
        let operand_span = operand.span;
        let ty = self
            .model
            .type_of(&operand, locals)
            .to_type_node(operand_span)
            .ok_or_else(|| {
                CodegenError::semantic("cannot infer the type of the `addressof` operand for a temporary", operand_span)
            })?;

        let temp = temp_name(self.next_temp);
        self.next_temp += 1;
        tracing::debug!(temp = %temp, "addressof operand materialized");

        prelude.push(Spanned::new(
            Statement::Variable(VariableStatement {
                kind: VariableKind::Let,
                declarations: vec![Spanned::new(
                    VariableDecl {
                        name: BindingName::Ident(temp.clone()),
                        ty: Some(ty),
                        initializer: None,
                    },
                    operand_span,
                )],
            }),
            operand_span,
        ));

        let temp_ref = || Spanned::new(Expr::Ident(temp.clone()), operand_span);
        let assignment = Spanned::new(
            Expr::Binary(BinaryExpr {
                op: BinaryOp::Assign,
                left: Box::new(temp_ref()),
                right: Box::new(operand),
            }),
            operand_span,
        );
        let address = Spanned::new(
            Expr::Call(CallExpr {
                callee,
                type_args,
                args: vec![temp_ref()],
            }),
            span,
        );
        Ok(Spanned::new(
            Expr::Paren(Box::new(Spanned::new(Expr::Comma(vec![assignment, address]), span))),
            span,
        ))
    }
}
