//! Block-scope destructor synthesis.
//!
//! Locals whose class declares a `destructor` method get explicit `v.destructor()` calls:
//!
//! - before the first `return` of a block, for every enclosing frame up to the function;
//! - before the first `break`/`continue` of a block, for every frame up to the innermost loop;
//! - at the end of a block without such an exit, for the block's own locals.
//!
//! Calls run innermost frame first, each frame in reverse declaration order. Only variables declared before the exit
//! are destroyed. Lone `if`/`while` branches are wrapped in blocks so calls can be inserted next to them.

use tscc_core::lang::conventions::DESTRUCTOR_METHOD;
use tscc_syntax::ast::{
    Block, CallExpr, Expr, IfStmt, PropertyAccess, Span, Spanned, StagedStmt, Statement, WhileStmt,
};

use super::{PassContext, declared_type};
use crate::backend::options::DestructorPolicy;
use crate::errors::CodegenResult;
use crate::semantics::{FrameKind, Locals, Ownership, SemanticModel, Type};

pub(super) fn run(cx: &PassContext<'_>, body: Block) -> CodegenResult<Block> {
    let mut synthesis = DestructorSynthesis {
        model: cx.model,
        policy: cx.destructor_policy,
        locals: cx.locals.clone(),
        frames: vec![Tracked {
            kind: FrameKind::Function,
            variables: Vec::new(),
        }],
    };
    let statements = synthesis.statements(body.statements)?;
    Ok(Block { statements })
}

/// Destructible locals of one lexical frame, in declaration order.
struct Tracked {
    kind: FrameKind,
    variables: Vec<String>,
}

#[derive(Clone, Copy)]
enum Exit {
    Return,
    Loop,
}

struct DestructorSynthesis<'a> {
    model: &'a dyn SemanticModel,
    policy: DestructorPolicy,
    locals: Locals,
    frames: Vec<Tracked>,
}

impl DestructorSynthesis<'_> {
    /// Statements of the innermost frame, with cleanup calls inserted.
    fn statements(&mut self, statements: Vec<Spanned<Statement>>) -> CodegenResult<Vec<Spanned<Statement>>> {
        let mut out = Vec::with_capacity(statements.len());
        let mut rest = statements.into_iter();
        while let Some(stmt) = rest.next() {
            if let Some(exit) = exit_of(&stmt.node) {
                out.extend(self.cleanup(exit, stmt.span));
                out.push(stmt);
                out.extend(rest);
                return Ok(out);
            }
            out.push(self.statement(stmt)?);
        }
        let span = out.last().map(|stmt| stmt.span).unwrap_or_default();
        if let Some(frame) = self.frames.last() {
            out.extend(destructor_calls(frame, span));
        }
        Ok(out)
    }

    fn statement(&mut self, stmt: Spanned<Statement>) -> CodegenResult<Spanned<Statement>> {
        let span = stmt.span;
        let node = match stmt.node {
            Statement::Variable(variable) => {
                for decl in &variable.declarations {
                    let Some(name) = decl.node.name.as_ident() else {
                        continue;
                    };
                    let ty = declared_type(self.model, &decl.node, &self.locals);
                    if self.is_destructible(&ty) {
                        if let Some(frame) = self.frames.last_mut() {
                            frame.variables.push(name.to_string());
                        }
                    }
                    self.locals.declare(name, ty);
                }
                Statement::Variable(variable)
            }
            Statement::If(stmt) => Statement::If(IfStmt {
                condition: stmt.condition,
                then_branch: Box::new(self.branch(*stmt.then_branch, FrameKind::Block)?),
                else_branch: match stmt.else_branch {
                    Some(branch) => Some(Box::new(self.branch(*branch, FrameKind::Block)?)),
                    None => None,
                },
            }),
            Statement::While(stmt) => Statement::While(WhileStmt {
                condition: stmt.condition,
                body: Box::new(self.branch(*stmt.body, FrameKind::Loop)?),
            }),
            Statement::Block(block) => Statement::Block(self.block(block, FrameKind::Block)?),
            Statement::Staged(staged) => Statement::Staged(StagedStmt {
                prelude: staged
                    .prelude
                    .into_iter()
                    .map(|stmt| self.statement(stmt))
                    .collect::<CodegenResult<Vec<_>>>()?,
                statement: Box::new(self.statement(*staged.statement)?),
            }),
            node @ (Statement::Expr(_)
            | Statement::Return(_)
            | Statement::Break
            | Statement::Continue) => node,
        };
        Ok(Spanned::new(node, span))
    }

    fn block(&mut self, block: Block, kind: FrameKind) -> CodegenResult<Block> {
        self.locals.push(kind);
        self.frames.push(Tracked {
            kind,
            variables: Vec::new(),
        });
        let result = self.statements(block.statements);
        self.frames.pop();
        self.locals.pop();
        Ok(Block { statements: result? })
    }

    /// `if`/`while` branch, always as a block.
    fn branch(&mut self, stmt: Spanned<Statement>, kind: FrameKind) -> CodegenResult<Spanned<Statement>> {
        let span = stmt.span;
        let block = match stmt.node {
            Statement::Block(block) => block,
            node => Block {
                statements: vec![Spanned::new(node, span)],
            },
        };
        Ok(Spanned::new(Statement::Block(self.block(block, kind)?), span))
    }

    /// Calls for every frame `exit` leaves, innermost first.
    fn cleanup(&self, exit: Exit, span: Span) -> Vec<Spanned<Statement>> {
        let mut calls = Vec::new();
        for frame in self.frames.iter().rev() {
            calls.extend(destructor_calls(frame, span));
            if matches!(exit, Exit::Loop) && frame.kind == FrameKind::Loop {
                break;
            }
        }
        calls
    }

    fn is_destructible(&self, ty: &Type) -> bool {
        let Type::Class(name) = ty else {
            return false;
        };
        match self.model.class(name) {
            Some((_, class)) => {
                class.has_destructor()
                    && match self.policy {
                        DestructorPolicy::AllClasses => true,
                        DestructorPolicy::SharedHeapOnly => class.traits.ownership == Ownership::SharedHeap,
                    }
            }
            None => false,
        }
    }
}

fn exit_of(stmt: &Statement) -> Option<Exit> {
    match stmt {
        Statement::Return(_) => Some(Exit::Return),
        Statement::Break | Statement::Continue => Some(Exit::Loop),
        Statement::Staged(staged) => exit_of(&staged.statement.node),
        _ => None,
    }
}

/// `v.destructor();` for each tracked variable, last declared first.
fn destructor_calls(frame: &Tracked, span: Span) -> Vec<Spanned<Statement>> {
    frame
        .variables
        .iter()
        .rev()
        .map(|name| {
            let call = Expr::Call(CallExpr {
                callee: Box::new(Spanned::new(
                    Expr::Property(PropertyAccess {
                        object: Box::new(Spanned::new(Expr::Ident(name.clone()), span)),
                        name: DESTRUCTOR_METHOD.to_string(),
                    }),
                    span,
                )),
                type_args: None,
                args: Vec::new(),
            });
            Spanned::new(Statement::Expr(Spanned::new(call, span)), span)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::ProgramModel;
    use tscc_syntax::build::*;

    fn model() -> ProgramModel {
        let input = program(vec![
            class("Foo", vec![method("destructor", vec![], void(), vec![])]),
            class("Bar", vec![]),
            struct_class("Pod", vec![method("destructor", vec![], void(), vec![])]),
        ]);
        ProgramModel::build(&input, &[]).unwrap()
    }

    fn synthesize(policy: DestructorPolicy, body: Vec<Spanned<Statement>>) -> Vec<Spanned<Statement>> {
        let model = model();
        let locals = Locals::new(None);
        let cx = PassContext {
            model: &model,
            locals: &locals,
            destructor_policy: policy,
        };
        run(&cx, Block { statements: body }).unwrap().statements
    }

    fn destroy(name: &str) -> Spanned<Statement> {
        expr_stmt(method_call(ident(name), "destructor", vec![]))
    }

    fn local(name: &str, class: &str) -> Spanned<Statement> {
        let_(name, Some(ty(class)), Some(new_(class, vec![])))
    }

    #[test]
    fn test_return_destroys_only_destructible_locals() {
        let body = synthesize(
            DestructorPolicy::AllClasses,
            vec![local("a", "Foo"), local("b", "Bar"), ret(None)],
        );
        assert_eq!(body, vec![local("a", "Foo"), local("b", "Bar"), destroy("a"), ret(None)]);
    }

    #[test]
    fn test_reverse_declaration_order_at_block_end() {
        let body = synthesize(
            DestructorPolicy::AllClasses,
            vec![local("a", "Foo"), local("b", "Foo")],
        );
        assert_eq!(body, vec![local("a", "Foo"), local("b", "Foo"), destroy("b"), destroy("a")]);
    }

    #[test]
    fn test_return_in_nested_block_unwinds_all_frames() {
        let body = synthesize(
            DestructorPolicy::AllClasses,
            vec![
                local("outer", "Foo"),
                if_(boolean(true), block(vec![local("inner", "Foo"), ret(None)]), None),
            ],
        );
        assert_eq!(
            body,
            vec![
                local("outer", "Foo"),
                if_(
                    boolean(true),
                    block(vec![local("inner", "Foo"), destroy("inner"), destroy("outer"), ret(None)]),
                    None
                ),
                destroy("outer"),
            ]
        );
    }

    #[test]
    fn test_break_unwinds_up_to_the_loop() {
        let body = synthesize(
            DestructorPolicy::AllClasses,
            vec![
                local("outer", "Foo"),
                while_(boolean(true), block(vec![local("step", "Foo"), brk()])),
            ],
        );
        assert_eq!(
            body,
            vec![
                local("outer", "Foo"),
                while_(boolean(true), block(vec![local("step", "Foo"), destroy("step"), brk()])),
                destroy("outer"),
            ]
        );
    }

    #[test]
    fn test_lone_branch_is_wrapped() {
        let body = synthesize(
            DestructorPolicy::AllClasses,
            vec![local("a", "Foo"), if_(boolean(true), ret(None), None)],
        );
        assert_eq!(
            body,
            vec![
                local("a", "Foo"),
                if_(boolean(true), block(vec![destroy("a"), ret(None)]), None),
                destroy("a"),
            ]
        );
    }

    #[test]
    fn test_shared_heap_only_policy_skips_value_classes() {
        let body = synthesize(
            DestructorPolicy::SharedHeapOnly,
            vec![local("p", "Pod"), local("f", "Foo")],
        );
        assert_eq!(body, vec![local("p", "Pod"), local("f", "Foo"), destroy("f")]);
    }

    #[test]
    fn test_locals_declared_after_exit_are_ignored() {
        let body = synthesize(
            DestructorPolicy::AllClasses,
            vec![ret(None), local("late", "Foo")],
        );
        assert_eq!(body, vec![ret(None), local("late", "Foo")]);
    }
}
