//! Declaration emission: imports, classes and their members, free functions.
//!
//! `declare`d declarations describe the native surface and produce no output. Every function-like declaration goes
//! through the same steps:
//!
//! 1. the return type is lowered in an isolated scope,
//! 2. a [`FunctionRecord`] is opened and the parameters are lowered into it,
//! 3. the body is run through the enabled rewrite passes and its statements are emitted into the record's body,
//! 4. the record is closed, attaching it to the enclosing class or to the free-function list.
//!
//! With receiver injection enabled, every class is followed by one free `Class_method(Class* self, ...)` function
//! per method, which the rewritten call sites target.

use tscc_core::lang::builtins::{self, BuiltinFnId, BuiltinTypeId};
use tscc_core::lang::conventions::{DESTRUCTOR_METHOD, RECEIVER_PARAM};
use tscc_syntax::ast::{
    BindingName, Block, ClassDecl, ClassMember, ConstructorDecl, Declaration, FunctionDecl, ImportClause, ImportDecl,
    MethodDecl, Param, Program, Span, Spanned, TypeNode, TypeReference, Visibility,
};

use super::buffer::{AppendMode, CodeBuffer};
use super::expressions::emit_expr;
use super::records::{ClassRecord, FieldRecord, FunctionRecord, ParamRecord};
use super::session::EmitSession;
use super::statements::emit_statement;
use crate::backend::lowering::names::{
    destructor_name, emitted_name, member_qualifier, namespace_qualified, receiver_function_name, symbol_name,
};
use crate::backend::lowering::types::lower_type;
use crate::backend::passes::{Pass, PassContext, bind_receiver, run_passes};
use crate::errors::{CodegenError, CodegenResult};
use crate::semantics::model::module_specifier;
use crate::semantics::{Locals, SymbolKind};

/// Emit every declaration of `program` into `session`.
#[tracing::instrument(skip_all, fields(declarations = program.declarations.len()))]
pub fn emit_program(session: &mut EmitSession<'_>, program: &Program) -> CodegenResult<()> {
    for decl in &program.declarations {
        emit_declaration(session, decl)?;
    }
    Ok(())
}

fn emit_declaration(session: &mut EmitSession<'_>, decl: &Spanned<Declaration>) -> CodegenResult<()> {
    match &decl.node {
        Declaration::Import(import) => emit_import(session, import),
        node if node.is_declare() => Ok(()),
        Declaration::Class(class) => emit_class(session, class, decl.span),
        Declaration::Function(function) => emit_function(session, function, decl.span),
        Declaration::Module(module) => Err(CodegenError::unsupported(
            format!("module `{}` has a body; only ambient (`declare module`) modules are supported", module.name),
            decl.span,
        )),
        Declaration::Interface(_) | Declaration::TypeAlias(_) => Ok(()),
    }
}

/// `#include <module>`, plus one `using ns::name;` per named import of a `cpp_namespace` module.
fn emit_import(session: &mut EmitSession<'_>, import: &ImportDecl) -> CodegenResult<()> {
    let specifier = module_specifier(import)?;
    session.append(&format!("#include <{specifier}>"), AppendMode::LINE)?;

    let Some(ImportClause::Named(items)) = &import.clause else {
        return Ok(());
    };
    let model = session.model();
    let Some(SymbolKind::Module(module)) = model.module(specifier).map(|symbol| &symbol.kind) else {
        return Ok(());
    };
    let Some(namespace) = &module.traits.namespace else {
        return Ok(());
    };
    for item in items {
        let name = match model.member(module, &item.name) {
            Some(member) => symbol_name(member, session.prefix()),
            None => item.name.clone(),
        };
        session.append(&format!("using {};", namespace_qualified(namespace, &name)), AppendMode::LINE)?;
    }
    Ok(())
}

/// Lowered text of a type annotation, computed in an isolated scope.
pub(super) fn type_text(session: &mut EmitSession<'_>, node: &Spanned<TypeNode>) -> CodegenResult<String> {
    session.fragment(|s| {
        let text = lower_type(s.model(), s.prefix(), node)?;
        s.append(&text, AppendMode::INLINE)
    })
}

// ============================================================================
// Classes
// ============================================================================

fn emit_class(session: &mut EmitSession<'_>, class: &ClassDecl, span: Span) -> CodegenResult<()> {
    let declared = class
        .name
        .as_deref()
        .ok_or_else(|| CodegenError::structural("class declaration requires a name", span))?;
    let model = session.model();
    let Some((symbol, class_symbol)) = model.class(declared) else {
        return Err(CodegenError::semantic(format!("class `{declared}` is not in the symbol table"), span));
    };
    let emitted = emitted_name(&class_symbol.traits, &symbol.name, session.prefix());

    session.begin_class(ClassRecord::new(emitted.clone(), class_symbol.traits.ownership), span)?;
    for member in &class.members {
        match &member.node {
            ClassMember::Property(property) => {
                let ty = property.ty.as_ref().ok_or_else(|| {
                    CodegenError::structural(
                        format!("property `{}` requires a type annotation", property.name),
                        member.span,
                    )
                })?;
                let ty = type_text(session, ty)?;
                session.class_mut(member.span)?.fields.push(FieldRecord {
                    visibility: property.visibility,
                    ty,
                    name: property.name.clone(),
                });
            }
            ClassMember::Method(method) => emit_method(session, declared, &emitted, method, member.span)?,
            ClassMember::Constructor(constructor) => {
                emit_constructor(session, declared, &emitted, constructor, member.span)?
            }
        }
    }
    session.end_class(span)?;

    if session.options().passes.contains(Pass::ReceiverInjection) {
        for member in &class.members {
            match &member.node {
                ClassMember::Method(method) if method.name != DESTRUCTOR_METHOD => {
                    emit_receiver_function(session, declared, &emitted, method, member.span)?
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn emit_method(
    session: &mut EmitSession<'_>,
    class: &str,
    emitted: &str,
    method: &MethodDecl,
    span: Span,
) -> CodegenResult<()> {
    let body = method
        .body
        .as_ref()
        .ok_or_else(|| CodegenError::structural(format!("method `{}` requires a body", method.name), span))?;

    let (return_type, name) = if method.name == DESTRUCTOR_METHOD {
        if !method.params.is_empty() {
            return Err(CodegenError::structural("`destructor` takes no parameters", span));
        }
        (None, destructor_name(emitted))
    } else {
        let return_type = method.return_type.as_ref().ok_or_else(|| {
            CodegenError::structural(
                format!("method `{}` requires a return type annotation", method.name),
                span,
            )
        })?;
        (Some(type_text(session, return_type)?), method.name.clone())
    };

    emit_function_like(
        session,
        FunctionShape {
            return_type,
            name_prefix: Some(member_qualifier(emitted)),
            name,
            params: &method.params,
            body,
            this_class: Some(class.to_string()),
            visibility: Some(method.visibility),
        },
        span,
    )
}

/// `Ret Class_method(Class* self, params)`, the free function receiver calls target.
fn emit_receiver_function(
    session: &mut EmitSession<'_>,
    class: &str,
    emitted: &str,
    method: &MethodDecl,
    span: Span,
) -> CodegenResult<()> {
    let (Some(return_type), Some(body)) = (&method.return_type, &method.body) else {
        return Err(CodegenError::structural(
            format!("method `{}` requires a return type annotation and a body", method.name),
            span,
        ));
    };
    let return_type = type_text(session, return_type)?;

    let receiver_ty = TypeNode::Reference(TypeReference {
        name: vec![builtins::type_as_str(BuiltinTypeId::Ptr).to_string()],
        type_args: vec![Spanned::new(
            TypeNode::Reference(TypeReference {
                name: vec![class.to_string()],
                type_args: vec![],
            }),
            span,
        )],
    });
    let receiver = Spanned::new(
        Param {
            name: BindingName::Ident(RECEIVER_PARAM.to_string()),
            ty: Some(Spanned::new(receiver_ty, span)),
            default: None,
            rest: false,
        },
        span,
    );
    let params: Vec<Spanned<Param>> = std::iter::once(receiver).chain(method.params.iter().cloned()).collect();

    let body = {
        let locals = Locals::new(None);
        let cx = PassContext {
            model: session.model(),
            locals: &locals,
            destructor_policy: session.options().destructor_policy,
        };
        bind_receiver(&cx, body.clone())?
    };
    let name = receiver_function_name(emitted, &method.name);
    tracing::debug!(function = %name, "receiver function");

    emit_function_like(
        session,
        FunctionShape {
            return_type: Some(return_type),
            name_prefix: None,
            name,
            params: &params,
            body: &body,
            this_class: None,
            visibility: None,
        },
        span,
    )
}

fn emit_constructor(
    session: &mut EmitSession<'_>,
    class: &str,
    emitted: &str,
    constructor: &ConstructorDecl,
    span: Span,
) -> CodegenResult<()> {
    for id in [BuiltinFnId::AllocatorAlloc, BuiltinFnId::SizeOf] {
        if session.model().builtin(id).is_none() {
            return Err(CodegenError::builtin_surface(
                format!(
                    "constructor of `{class}` needs the built-in `{}`, which is not declared",
                    builtins::as_str(id)
                ),
                span,
            ));
        }
    }
    let body = constructor
        .body
        .as_ref()
        .ok_or_else(|| CodegenError::structural(format!("constructor of `{class}` requires a body"), span))?;

    emit_function_like(
        session,
        FunctionShape {
            return_type: None,
            name_prefix: Some(member_qualifier(emitted)),
            name: emitted.to_string(),
            params: &constructor.params,
            body,
            this_class: Some(class.to_string()),
            visibility: Some(constructor.visibility),
        },
        span,
    )
}

// ============================================================================
// Functions
// ============================================================================

fn emit_function(session: &mut EmitSession<'_>, function: &FunctionDecl, span: Span) -> CodegenResult<()> {
    let declared = function
        .name
        .as_deref()
        .ok_or_else(|| CodegenError::structural("function declaration requires a name", span))?;
    if !function.type_params.is_empty() {
        return Err(CodegenError::unsupported(
            format!("generic function `{declared}`"),
            span,
        ));
    }
    let return_type = function.return_type.as_ref().ok_or_else(|| {
        CodegenError::structural(format!("function `{declared}` requires a return type annotation"), span)
    })?;
    let body = function
        .body
        .as_ref()
        .ok_or_else(|| CodegenError::structural(format!("function `{declared}` requires a body"), span))?;
    let name = match session.model().resolve(declared) {
        Some(symbol) if matches!(symbol.kind, SymbolKind::Function(_)) => symbol_name(symbol, session.prefix()),
        _ => {
            return Err(CodegenError::semantic(
                format!("function `{declared}` is not in the symbol table"),
                span,
            ));
        }
    };

    let return_type = type_text(session, return_type)?;
    emit_function_like(
        session,
        FunctionShape {
            return_type: Some(return_type),
            name_prefix: None,
            name,
            params: &function.params,
            body,
            this_class: None,
            visibility: None,
        },
        span,
    )
}

/// Everything that differs between functions, methods, constructors and destructors.
struct FunctionShape<'d> {
    return_type: Option<String>,
    name_prefix: Option<String>,
    name: String,
    params: &'d [Spanned<Param>],
    body: &'d Block,
    this_class: Option<String>,
    visibility: Option<Visibility>,
}

fn emit_function_like(session: &mut EmitSession<'_>, shape: FunctionShape<'_>, span: Span) -> CodegenResult<()> {
    let record = FunctionRecord::new(session.layout(), shape.return_type, shape.name_prefix, shape.name);
    session.begin_function(record, Locals::new(shape.this_class), shape.visibility, span)?;
    for param in shape.params {
        emit_parameter(session, param)?;
    }
    emit_body(session, shape.body, span)?;
    session.end_function(span)
}

fn emit_parameter(session: &mut EmitSession<'_>, param: &Spanned<Param>) -> CodegenResult<()> {
    let span = param.span;
    if param.node.rest {
        return Err(CodegenError::unsupported("rest parameters", span));
    }
    let name = param.node.name.as_ident().ok_or_else(|| {
        CodegenError::structural("only identifier parameters are supported, not destructuring patterns", span)
    })?;
    let ty_node = param
        .node
        .ty
        .as_ref()
        .ok_or_else(|| CodegenError::structural(format!("parameter `{name}` requires a type annotation"), span))?;
    let ty = type_text(session, ty_node)?;
    let default = match &param.node.default {
        Some(value) => Some(session.fragment(|s| emit_expr(s, value))?),
        None => None,
    };

    let semantic = session.model().type_from_node(&ty_node.node);
    session.locals_mut(span)?.declare(name, semantic);
    session.function_mut(span)?.params.push(ParamRecord {
        ty,
        name: name.to_string(),
        default,
    });
    Ok(())
}

fn emit_body(session: &mut EmitSession<'_>, body: &Block, span: Span) -> CodegenResult<()> {
    let options = session.options();
    let body = {
        let cx = PassContext {
            model: session.model(),
            locals: session.locals(span)?,
            destructor_policy: options.destructor_policy,
        };
        run_passes(&cx, options.passes, body.clone())?
    };

    let buffer = session.run_in_scope(CodeBuffer::with_depth(session.layout(), 1), |s| {
        for stmt in &body.statements {
            emit_statement(s, stmt)?;
        }
        Ok(())
    })?;
    session.function_mut(span)?.body = buffer;
    Ok(())
}
