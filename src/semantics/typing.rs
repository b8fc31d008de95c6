//! Expression typing.
//!
//! The frontend has already type checked the program, so these functions never report errors: anything they cannot
//! classify is [`Type::Unknown`], and the caller decides whether that matters.

use tscc_core::lang::builtins::{self, BuiltinTypeId};
use tscc_core::lang::operators::OperatorId;
use tscc_syntax::ast::{CallExpr, Expr, KeywordType, Literal, Spanned, TypeNode, UnaryOp};

use super::symbols::SymbolKind;
use super::{Locals, Primitive, SemanticModel, Type};

/// Semantic type denoted by a type annotation.
pub fn type_from_node<M: SemanticModel + ?Sized>(model: &M, node: &TypeNode) -> Type {
    match node {
        TypeNode::Keyword(keyword) => Type::Primitive(match keyword {
            KeywordType::Void => Primitive::Void,
            KeywordType::Boolean => Primitive::Boolean,
            KeywordType::Number => Primitive::Number,
            KeywordType::String => Primitive::String,
        }),
        TypeNode::Reference(reference) => {
            let Some(name) = reference.simple_name() else {
                return Type::Named(reference.name.join("."));
            };
            if builtins::type_from_str(name) == Some(BuiltinTypeId::Ptr) {
                return match reference.type_args.first() {
                    Some(inner) => Type::Pointer(Box::new(type_from_node(model, &inner.node))),
                    None => Type::Unknown,
                };
            }
            match model.resolve_type(name).map(|symbol| &symbol.kind) {
                Some(SymbolKind::Class(_)) => Type::Class(name.to_string()),
                Some(SymbolKind::Interface(_)) => Type::Interface(name.to_string()),
                _ => Type::Named(name.to_string()),
            }
        }
    }
}

/// Semantic type of `expr` inside a body described by `locals`.
pub fn type_of<M: SemanticModel + ?Sized>(model: &M, expr: &Spanned<Expr>, locals: &Locals) -> Type {
    match &expr.node {
        Expr::Ident(name) => match locals.lookup(name) {
            Some(ty) => ty.clone(),
            None => value_type(model, name),
        },
        Expr::This => match locals.this_class() {
            Some(class) => Type::Class(class.to_string()),
            None => Type::Unknown,
        },
        Expr::Literal(literal) => match literal {
            Literal::Number(_) => Type::Primitive(Primitive::Number),
            Literal::String(_) => Type::Primitive(Primitive::String),
            Literal::Bool(_) => Type::Primitive(Primitive::Boolean),
            Literal::Null => Type::Unknown,
        },
        Expr::Property(access) => member_type(model, &type_of(model, &access.object, locals), &access.name),
        Expr::Call(call) => call_type(model, call, locals),
        Expr::New(new) => match &new.class.node {
            Expr::Ident(name) if model.class(name).is_some() => Type::Class(name.clone()),
            _ => Type::Unknown,
        },
        Expr::Binary(binary) => {
            let op = binary.op.id();
            if binary.op.is_assignment() {
                type_of(model, &binary.left, locals)
            } else if is_boolean_operator(op) {
                Type::Primitive(Primitive::Boolean)
            } else {
                type_of(model, &binary.left, locals)
            }
        }
        Expr::Unary(unary) => match unary.op {
            UnaryOp::Not => Type::Primitive(Primitive::Boolean),
            UnaryOp::Neg | UnaryOp::Plus | UnaryOp::BitNot => type_of(model, &unary.operand, locals),
        },
        Expr::Paren(inner) => type_of(model, inner, locals),
        Expr::Comma(items) => match items.last() {
            Some(last) => type_of(model, last, locals),
            None => Type::Unknown,
        },
        Expr::ReceiverCall(call) => match model.class(&call.class).and_then(|(_, class)| class.method(&call.method)) {
            Some(method) => returned(model, method.return_type.as_ref()),
            None => Type::Unknown,
        },
    }
}

fn is_boolean_operator(op: OperatorId) -> bool {
    matches!(
        op,
        OperatorId::Eq
            | OperatorId::NotEq
            | OperatorId::StrictEq
            | OperatorId::StrictNotEq
            | OperatorId::Lt
            | OperatorId::LtEq
            | OperatorId::Gt
            | OperatorId::GtEq
            | OperatorId::And
            | OperatorId::Or
    )
}

fn returned<M: SemanticModel + ?Sized>(model: &M, return_type: Option<&Spanned<TypeNode>>) -> Type {
    match return_type {
        Some(ty) => type_from_node(model, &ty.node),
        None => Type::Unknown,
    }
}

/// Type of a global name used as a value.
fn value_type<M: SemanticModel + ?Sized>(model: &M, name: &str) -> Type {
    match model.resolve(name).map(|symbol| (&symbol.name, &symbol.kind)) {
        Some((_, SymbolKind::Function(_))) => Type::Function,
        Some((specifier, SymbolKind::Module(_))) => Type::Module(specifier.clone()),
        _ => Type::Unknown,
    }
}

/// Type of `owner.name`.
fn member_type<M: SemanticModel + ?Sized>(model: &M, owner: &Type, name: &str) -> Type {
    match owner {
        Type::Class(class_name) => {
            let Some((_, class)) = model.class(class_name) else {
                return Type::Unknown;
            };
            if let Some(field) = class.field(name) {
                returned(model, field.ty.as_ref())
            } else if class.method(name).is_some() {
                Type::Function
            } else {
                Type::Unknown
            }
        }
        Type::Module(specifier) => {
            let Some(SymbolKind::Module(module)) = model.module(specifier).map(|symbol| &symbol.kind) else {
                return Type::Unknown;
            };
            match model.member(module, name).map(|member| &member.kind) {
                Some(SymbolKind::Function(_)) => Type::Function,
                _ => Type::Unknown,
            }
        }
        Type::Pointer(inner) => member_type(model, inner, name),
        _ => Type::Unknown,
    }
}

/// Return type of a call.
fn call_type<M: SemanticModel + ?Sized>(model: &M, call: &CallExpr, locals: &Locals) -> Type {
    match &call.callee.node {
        Expr::Ident(name) => match model.resolve(name).map(|symbol| &symbol.kind) {
            Some(SymbolKind::Function(function)) => returned(model, function.return_type.as_ref()),
            _ => Type::Unknown,
        },
        Expr::Property(access) => match type_of(model, &access.object, locals) {
            Type::Class(class_name) => match model.class(&class_name).and_then(|(_, class)| class.method(&access.name)) {
                Some(method) => returned(model, method.return_type.as_ref()),
                None => Type::Unknown,
            },
            Type::Module(specifier) => {
                let Some(SymbolKind::Module(module)) = model.module(&specifier).map(|symbol| &symbol.kind) else {
                    return Type::Unknown;
                };
                match model.member(module, &access.name).map(|member| &member.kind) {
                    Some(SymbolKind::Function(function)) => returned(model, function.return_type.as_ref()),
                    _ => Type::Unknown,
                }
            }
            _ => Type::Unknown,
        },
        _ => Type::Unknown,
    }
}
