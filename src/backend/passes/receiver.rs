//! Implicit-receiver injection.
//!
//! `obj.method(args)` on a class instance becomes [`Expr::ReceiverCall`], a plain call of `Class_method` whose first
//! argument is the receiver's address:
//!
//! | Receiver | First argument |
//! |---|---|
//! | `this` | `this` |
//! | `Ptr<Class>` value | the pointer itself |
//! | shared-heap class value | the handle itself (its raw pointer is taken when emitted) |
//! | `@struct` class value | `addressof(obj)` (materialized later if `obj` is not an lvalue) |
//!
//! Calls of `destructor`, module members and native functions are left alone.
//!
//! The called functions are emitted next to each class by [`bind_receiver`]ing the method bodies: `this` becomes the
//! receiver parameter.

use tscc_core::lang::builtins::BuiltinFnId;
use tscc_core::lang::conventions::{DESTRUCTOR_METHOD, RECEIVER_PARAM};
use tscc_syntax::ast::{Block, CallExpr, Expr, ReceiverCall, Span, Spanned, Statement};

use super::{BodyWalker, ExprRewrite, PassContext, builtin_callee};
use crate::errors::{CodegenError, CodegenResult};
use crate::semantics::{Locals, Ownership, SemanticModel, SymbolKind, Type};

pub(super) fn run(cx: &PassContext<'_>, body: Block) -> CodegenResult<Block> {
    BodyWalker::new(cx, ReceiverInjection { model: cx.model }).body(body)
}

/// Turn a method body into the body of its receiver function.
pub fn bind_receiver(cx: &PassContext<'_>, body: Block) -> CodegenResult<Block> {
    BodyWalker::new(cx, ThisAsReceiver).body(body)
}

struct ThisAsReceiver;

impl ExprRewrite for ThisAsReceiver {
    fn rewrite_expr(
        &mut self,
        expr: Spanned<Expr>,
        _locals: &Locals,
        _prelude: &mut Vec<Spanned<Statement>>,
    ) -> CodegenResult<Spanned<Expr>> {
        Ok(match expr.node {
            Expr::This => Spanned::new(Expr::Ident(RECEIVER_PARAM.to_string()), expr.span),
            _ => expr,
        })
    }
}

struct ReceiverInjection<'a> {
    model: &'a dyn SemanticModel,
}

impl ReceiverInjection<'_> {
    /// Class owning `method` when `receiver_ty` is an instance (or pointer to an instance) of it.
    fn owning_class(&self, receiver_ty: &Type, method: &str, span: Span) -> CodegenResult<Option<String>> {
        match receiver_ty {
            Type::Class(name) => Ok(self
                .model
                .class(name)
                .filter(|(_, class)| class.method(method).is_some())
                .map(|_| name.clone())),
            Type::Pointer(inner) => self.owning_class(inner, method, span),
            Type::Interface(name) => match self.model.resolve_type(name).map(|symbol| &symbol.kind) {
                Some(SymbolKind::Interface(interface)) if interface.method(method).is_some() => {
                    Err(CodegenError::semantic(
                        format!("`{name}.{method}` is declared by an interface, not a class; it has no receiver function"),
                        span,
                    ))
                }
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }
}

impl ExprRewrite for ReceiverInjection<'_> {
    fn rewrite_expr(
        &mut self,
        expr: Spanned<Expr>,
        locals: &Locals,
        _prelude: &mut Vec<Spanned<Statement>>,
    ) -> CodegenResult<Spanned<Expr>> {
        let span = expr.span;
        let Expr::Call(CallExpr { callee, type_args, args }) = expr.node else {
            return Ok(expr);
        };
        let method = match &callee.node {
            Expr::Property(access) if access.name != DESTRUCTOR_METHOD => Some(access),
            _ => None,
        };
        let Some(access) = method else {
            return Ok(Spanned::new(Expr::Call(CallExpr { callee, type_args, args }), span));
        };

        let receiver_ty = self.model.type_of(&access.object, locals);
        let Some(class) = self.owning_class(&receiver_ty, &access.name, span)? else {
            return Ok(Spanned::new(Expr::Call(CallExpr { callee, type_args, args }), span));
        };

        let shared = matches!(
            self.model.class(&class),
            Some((_, symbol)) if symbol.traits.ownership == Ownership::SharedHeap
        );
        let object = (*access.object).clone();
        let receiver = match (&object.node, &receiver_ty) {
            (Expr::This, _) | (_, Type::Pointer(_)) => object,
            (_, Type::Class(_)) if shared => object,
            _ => {
                let object_span = object.span;
                Spanned::new(
                    Expr::Call(CallExpr {
                        callee: Box::new(builtin_callee(self.model, BuiltinFnId::AddressOf, object_span)?),
                        type_args: None,
                        args: vec![object],
                    }),
                    object_span,
                )
            }
        };
        tracing::debug!(class = %class, method = %access.name, "receiver injected");
        Ok(Spanned::new(
            Expr::ReceiverCall(ReceiverCall {
                class,
                method: access.name.clone(),
                args: std::iter::once(receiver).chain(args).collect(),
            }),
            span,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::options::DestructorPolicy;
    use crate::semantics::ProgramModel;
    use tscc_syntax::ast::{KeywordType, Program};
    use tscc_syntax::build::*;

    fn prelude() -> Program {
        program(vec![decorated(
            declare_function("addressof", vec![param("v", keyword(KeywordType::Number))], keyword(KeywordType::Number)),
            vec![decorator("extern_c", vec![])],
        )])
    }

    fn input() -> Program {
        program(vec![
            type_alias("i32"),
            struct_class(
                "Vec2",
                vec![
                    field("x", ty("i32")),
                    method("len", vec![], ty("i32"), vec![]),
                    method("destructor", vec![], void(), vec![]),
                ],
            ),
            class("Handle", vec![method("id", vec![], ty("i32"), vec![])]),
        ])
    }

    fn rewrite(model: &ProgramModel, locals: Locals, body: Vec<Spanned<Statement>>) -> CodegenResult<Block> {
        let cx = PassContext {
            model,
            locals: &locals,
            destructor_policy: DestructorPolicy::default(),
        };
        run(&cx, Block { statements: body })
    }

    fn only_expr(block: &Block) -> &Expr {
        match &block.statements[0].node {
            Statement::Expr(expr) => &expr.node,
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_value_receiver_is_passed_by_address() {
        let prelude = prelude();
        let model = ProgramModel::build(&input(), &[&prelude]).unwrap();
        let mut locals = Locals::new(None);
        locals.declare("v", Type::Class("Vec2".into()));

        let block = rewrite(&model, locals, vec![expr_stmt(method_call(ident("v"), "len", vec![]))]).unwrap();
        let Expr::ReceiverCall(call) = only_expr(&block) else {
            panic!("expected a receiver call");
        };
        assert_eq!(call.class, "Vec2");
        assert_eq!(call.method, "len");
        assert_eq!(call.args, vec![call_expr_addressof("v")]);
    }

    fn call_expr_addressof(name: &str) -> Spanned<Expr> {
        call(ident("addressof"), vec![ident(name)])
    }

    #[test]
    fn test_this_receiver_is_passed_as_is() {
        let prelude = prelude();
        let model = ProgramModel::build(&input(), &[&prelude]).unwrap();
        let locals = Locals::new(Some("Vec2".into()));

        let block = rewrite(&model, locals, vec![expr_stmt(method_call(this(), "len", vec![]))]).unwrap();
        let Expr::ReceiverCall(call) = only_expr(&block) else {
            panic!("expected a receiver call");
        };
        assert_eq!(call.args, vec![this()]);
    }

    #[test]
    fn test_shared_receiver_is_passed_as_handle() {
        let prelude = prelude();
        let model = ProgramModel::build(&input(), &[&prelude]).unwrap();
        let mut locals = Locals::new(None);
        locals.declare("h", Type::Class("Handle".into()));

        let block = rewrite(&model, locals, vec![expr_stmt(method_call(ident("h"), "id", vec![]))]).unwrap();
        let Expr::ReceiverCall(call) = only_expr(&block) else {
            panic!("expected a receiver call");
        };
        assert_eq!(call.args, vec![ident("h")]);
    }

    #[test]
    fn test_bound_body_uses_receiver_parameter() {
        let model = ProgramModel::build(&input(), &[]).unwrap();
        let locals = Locals::new(None);
        let cx = PassContext {
            model: &model,
            locals: &locals,
            destructor_policy: DestructorPolicy::default(),
        };
        let body = Block {
            statements: vec![ret(Some(prop(this(), "x")))],
        };
        let bound = bind_receiver(&cx, body).unwrap();
        assert_eq!(bound.statements, vec![ret(Some(prop(ident("self"), "x")))]);
    }

    #[test]
    fn test_destructor_calls_are_left_alone() {
        let prelude = prelude();
        let model = ProgramModel::build(&input(), &[&prelude]).unwrap();
        let mut locals = Locals::new(None);
        locals.declare("v", Type::Class("Vec2".into()));

        let stmt = expr_stmt(method_call(ident("v"), "destructor", vec![]));
        let block = rewrite(&model, locals, vec![stmt.clone()]).unwrap();
        assert_eq!(block.statements, vec![stmt]);
    }

    #[test]
    fn test_missing_addressof_is_builtin_surface_error() {
        let model = ProgramModel::build(&input(), &[]).unwrap();
        let mut locals = Locals::new(None);
        locals.declare("v", Type::Class("Vec2".into()));

        let err = rewrite(&model, locals, vec![expr_stmt(method_call(ident("v"), "len", vec![]))]).unwrap_err();
        assert!(matches!(err, CodegenError::BuiltinSurface { .. }));
    }
}
