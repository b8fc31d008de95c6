//! Helpers to construct AST nodes with default spans.
//!
//! Used by tests and tools that need a tree without running the external frontend.

use crate::ast::*;

pub fn sp<T>(node: T) -> Spanned<T> {
    Spanned::new(node, Span::default())
}

pub fn program(declarations: Vec<Spanned<Declaration>>) -> Program {
    Program { declarations }
}

// ---- declarations ----

pub fn decorator(name: &str, args: Vec<Spanned<Expr>>) -> Spanned<Decorator> {
    sp(Decorator {
        name: name.to_string(),
        args,
    })
}

pub fn class(name: &str, members: Vec<Spanned<ClassMember>>) -> Spanned<Declaration> {
    sp(Declaration::Class(ClassDecl {
        decorators: vec![],
        declare: false,
        name: Some(name.to_string()),
        members,
    }))
}

/// A class decorated with `@struct()`.
pub fn struct_class(name: &str, members: Vec<Spanned<ClassMember>>) -> Spanned<Declaration> {
    decorated(class(name, members), vec![decorator("struct", vec![])])
}

pub fn function(
    name: &str,
    params: Vec<Spanned<Param>>,
    return_type: Spanned<TypeNode>,
    body: Vec<Spanned<Statement>>,
) -> Spanned<Declaration> {
    sp(Declaration::Function(FunctionDecl {
        decorators: vec![],
        declare: false,
        name: Some(name.to_string()),
        type_params: vec![],
        params,
        return_type: Some(return_type),
        body: Some(Block { statements: body }),
    }))
}

/// `declare function name(params): ret;`
pub fn declare_function(name: &str, params: Vec<Spanned<Param>>, return_type: Spanned<TypeNode>) -> Spanned<Declaration> {
    sp(Declaration::Function(FunctionDecl {
        decorators: vec![],
        declare: true,
        name: Some(name.to_string()),
        type_params: vec![],
        params,
        return_type: Some(return_type),
        body: None,
    }))
}

/// Attach decorators to a class, function or module declaration. Other declarations are returned unchanged.
pub fn decorated(mut decl: Spanned<Declaration>, decorators: Vec<Spanned<Decorator>>) -> Spanned<Declaration> {
    match &mut decl.node {
        Declaration::Class(c) => c.decorators.extend(decorators),
        Declaration::Function(f) => f.decorators.extend(decorators),
        Declaration::Module(m) => m.decorators.extend(decorators),
        Declaration::Import(_) | Declaration::Interface(_) | Declaration::TypeAlias(_) => {}
    }
    decl
}

/// Mark a class, function or module as `declare`d.
pub fn declared(mut decl: Spanned<Declaration>) -> Spanned<Declaration> {
    match &mut decl.node {
        Declaration::Class(c) => c.declare = true,
        Declaration::Function(f) => f.declare = true,
        Declaration::Module(m) => m.declare = true,
        Declaration::Import(_) | Declaration::Interface(_) | Declaration::TypeAlias(_) => {}
    }
    decl
}

/// `declare module "name" { ... }`
pub fn module(name: &str, body: Vec<Spanned<Declaration>>) -> Spanned<Declaration> {
    sp(Declaration::Module(ModuleDecl {
        decorators: vec![],
        declare: true,
        name: name.to_string(),
        body,
    }))
}

pub fn type_alias(name: &str) -> Spanned<Declaration> {
    sp(Declaration::TypeAlias(TypeAliasDecl { name: name.to_string() }))
}

pub fn interface(name: &str, methods: Vec<Spanned<MethodSignature>>) -> Spanned<Declaration> {
    sp(Declaration::Interface(InterfaceDecl {
        name: name.to_string(),
        methods,
    }))
}

pub fn signature(name: &str, params: Vec<Spanned<Param>>, return_type: Spanned<TypeNode>) -> Spanned<MethodSignature> {
    sp(MethodSignature {
        name: name.to_string(),
        params,
        return_type: Some(return_type),
    })
}

/// `import { a, b } from "module"`
pub fn import_named(module: &str, names: &[&str]) -> Spanned<Declaration> {
    sp(Declaration::Import(ImportDecl {
        module: string(module),
        clause: Some(ImportClause::Named(
            names
                .iter()
                .map(|name| ImportItem {
                    name: name.to_string(),
                    alias: None,
                })
                .collect(),
        )),
    }))
}

/// `import * as alias from "module"`
pub fn import_namespace(module: &str, alias: &str) -> Spanned<Declaration> {
    sp(Declaration::Import(ImportDecl {
        module: string(module),
        clause: Some(ImportClause::Namespace(alias.to_string())),
    }))
}

// ---- class members ----

pub fn field(name: &str, ty: Spanned<TypeNode>) -> Spanned<ClassMember> {
    field_with(Visibility::Public, name, ty)
}

pub fn field_with(visibility: Visibility, name: &str, ty: Spanned<TypeNode>) -> Spanned<ClassMember> {
    sp(ClassMember::Property(PropertyDecl {
        visibility,
        name: name.to_string(),
        ty: Some(ty),
    }))
}

pub fn method(
    name: &str,
    params: Vec<Spanned<Param>>,
    return_type: Spanned<TypeNode>,
    body: Vec<Spanned<Statement>>,
) -> Spanned<ClassMember> {
    method_with(Visibility::Public, name, params, return_type, body)
}

pub fn method_with(
    visibility: Visibility,
    name: &str,
    params: Vec<Spanned<Param>>,
    return_type: Spanned<TypeNode>,
    body: Vec<Spanned<Statement>>,
) -> Spanned<ClassMember> {
    sp(ClassMember::Method(MethodDecl {
        decorators: vec![],
        visibility,
        name: name.to_string(),
        params,
        return_type: Some(return_type),
        body: Some(Block { statements: body }),
    }))
}

pub fn constructor(params: Vec<Spanned<Param>>, body: Vec<Spanned<Statement>>) -> Spanned<ClassMember> {
    sp(ClassMember::Constructor(ConstructorDecl {
        visibility: Visibility::Public,
        params,
        body: Some(Block { statements: body }),
    }))
}

pub fn param(name: &str, ty: Spanned<TypeNode>) -> Spanned<Param> {
    sp(Param {
        name: BindingName::Ident(name.to_string()),
        ty: Some(ty),
        default: None,
        rest: false,
    })
}

pub fn param_default(name: &str, ty: Spanned<TypeNode>, default: Spanned<Expr>) -> Spanned<Param> {
    sp(Param {
        name: BindingName::Ident(name.to_string()),
        ty: Some(ty),
        default: Some(default),
        rest: false,
    })
}

// ---- types ----

pub fn ty(name: &str) -> Spanned<TypeNode> {
    ty_args(name, vec![])
}

pub fn ty_args(name: &str, type_args: Vec<Spanned<TypeNode>>) -> Spanned<TypeNode> {
    sp(TypeNode::Reference(TypeReference {
        name: name.split('.').map(str::to_string).collect(),
        type_args,
    }))
}

/// `Ptr<inner>`
pub fn ptr(inner: Spanned<TypeNode>) -> Spanned<TypeNode> {
    ty_args("Ptr", vec![inner])
}

pub fn keyword(kw: KeywordType) -> Spanned<TypeNode> {
    sp(TypeNode::Keyword(kw))
}

pub fn void() -> Spanned<TypeNode> {
    keyword(KeywordType::Void)
}

// ---- statements ----

pub fn let_(name: &str, ty: Option<Spanned<TypeNode>>, initializer: Option<Spanned<Expr>>) -> Spanned<Statement> {
    variable(VariableKind::Let, name, ty, initializer)
}

pub fn var_(name: &str, ty: Option<Spanned<TypeNode>>, initializer: Option<Spanned<Expr>>) -> Spanned<Statement> {
    variable(VariableKind::Var, name, ty, initializer)
}

pub fn variable(
    kind: VariableKind,
    name: &str,
    ty: Option<Spanned<TypeNode>>,
    initializer: Option<Spanned<Expr>>,
) -> Spanned<Statement> {
    sp(Statement::Variable(VariableStatement {
        kind,
        declarations: vec![sp(VariableDecl {
            name: BindingName::Ident(name.to_string()),
            ty,
            initializer,
        })],
    }))
}

pub fn expr_stmt(expr: Spanned<Expr>) -> Spanned<Statement> {
    sp(Statement::Expr(expr))
}

pub fn ret(value: Option<Spanned<Expr>>) -> Spanned<Statement> {
    sp(Statement::Return(value))
}

pub fn if_(
    condition: Spanned<Expr>,
    then_branch: Spanned<Statement>,
    else_branch: Option<Spanned<Statement>>,
) -> Spanned<Statement> {
    sp(Statement::If(IfStmt {
        condition,
        then_branch: Box::new(then_branch),
        else_branch: else_branch.map(Box::new),
    }))
}

pub fn while_(condition: Spanned<Expr>, body: Spanned<Statement>) -> Spanned<Statement> {
    sp(Statement::While(WhileStmt {
        condition,
        body: Box::new(body),
    }))
}

pub fn block(statements: Vec<Spanned<Statement>>) -> Spanned<Statement> {
    sp(Statement::Block(Block { statements }))
}

pub fn brk() -> Spanned<Statement> {
    sp(Statement::Break)
}

pub fn cont() -> Spanned<Statement> {
    sp(Statement::Continue)
}

// ---- expressions ----

pub fn ident(name: &str) -> Spanned<Expr> {
    sp(Expr::Ident(name.to_string()))
}

pub fn this() -> Spanned<Expr> {
    sp(Expr::This)
}

pub fn num(raw: &str) -> Spanned<Expr> {
    sp(Expr::Literal(Literal::Number(raw.to_string())))
}

pub fn string(value: &str) -> Spanned<Expr> {
    sp(Expr::Literal(Literal::String(value.to_string())))
}

pub fn boolean(value: bool) -> Spanned<Expr> {
    sp(Expr::Literal(Literal::Bool(value)))
}

pub fn prop(object: Spanned<Expr>, name: &str) -> Spanned<Expr> {
    sp(Expr::Property(PropertyAccess {
        object: Box::new(object),
        name: name.to_string(),
    }))
}

pub fn call(callee: Spanned<Expr>, args: Vec<Spanned<Expr>>) -> Spanned<Expr> {
    sp(Expr::Call(CallExpr {
        callee: Box::new(callee),
        type_args: None,
        args,
    }))
}

/// `callee<type_args>(args)`
pub fn call_generic(
    callee: Spanned<Expr>,
    type_args: Vec<Spanned<TypeNode>>,
    args: Vec<Spanned<Expr>>,
) -> Spanned<Expr> {
    sp(Expr::Call(CallExpr {
        callee: Box::new(callee),
        type_args: Some(type_args),
        args,
    }))
}

/// `object.method(args)`
pub fn method_call(object: Spanned<Expr>, method: &str, args: Vec<Spanned<Expr>>) -> Spanned<Expr> {
    call(prop(object, method), args)
}

pub fn new_(class: &str, args: Vec<Spanned<Expr>>) -> Spanned<Expr> {
    sp(Expr::New(NewExpr {
        class: Box::new(ident(class)),
        args,
    }))
}

pub fn bin(op: BinaryOp, left: Spanned<Expr>, right: Spanned<Expr>) -> Spanned<Expr> {
    sp(Expr::Binary(BinaryExpr {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }))
}

pub fn assign(left: Spanned<Expr>, right: Spanned<Expr>) -> Spanned<Expr> {
    bin(BinaryOp::Assign, left, right)
}

pub fn unary(op: UnaryOp, operand: Spanned<Expr>) -> Spanned<Expr> {
    sp(Expr::Unary(UnaryExpr {
        op,
        operand: Box::new(operand),
    }))
}

pub fn paren(inner: Spanned<Expr>) -> Spanned<Expr> {
    sp(Expr::Paren(Box::new(inner)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_class_carries_decorator() {
        let decl = struct_class("Vec2", vec![field("x", ty("i32"))]);
        assert_eq!(decl.node.name(), Some("Vec2"));
        assert_eq!(decl.node.decorators().len(), 1);
        assert_eq!(decl.node.decorators()[0].node.name, "struct");
    }

    #[test]
    fn test_qualified_type_reference() {
        let TypeNode::Reference(reference) = ty("std.string").node else {
            panic!("expected a type reference");
        };
        assert_eq!(reference.name, vec!["std".to_string(), "string".to_string()]);
        assert_eq!(reference.simple_name(), None);
    }

    #[test]
    fn test_program_deserializes_without_spans() {
        let json = r#"{
            "declarations": [
                { "node": { "TypeAlias": { "name": "i32" } } }
            ]
        }"#;
        let program: Program = serde_json::from_str(json).unwrap();
        assert_eq!(program.declarations.len(), 1);
        assert_eq!(program.declarations[0].span, Span::default());
    }
}
