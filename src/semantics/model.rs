//! [`ProgramModel`]: the reference [`SemanticModel`] built from typed ASTs.
//!
//! The model is built from the input program plus any number of declaration preludes (the native surface, e.g. a
//! `libc.d.ts`). Building runs in two phases:
//!
//! 1. declare every top-level declaration and ambient module of every source,
//! 2. bind imports against the declared modules.
//!
//! Names live in two spaces, as in the source language: a class occupies both, a function only the value space, an
//! interface or type alias only the type space. A name may be declared once per space; declared (`declare`) function
//! overloads are the exception and resolve to their first declaration.

use std::collections::HashMap;

use tscc_core::lang::builtins;
use tscc_syntax::ast::{
    ClassDecl, ClassMember, Declaration, Expr, FunctionDecl, ImportClause, ImportDecl, Literal, ModuleDecl, Program,
    Span, Spanned, TypeNode,
};

use super::symbols::{
    ClassSymbol, FieldSymbol, FunctionSymbol, InterfaceSymbol, MethodSymbol, ModuleSymbol, Symbol, SymbolKind,
};
use super::traits::lowering_traits;
use super::{Locals, SemanticModel, Type, typing};
use crate::errors::{CodegenError, CodegenResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SymbolId(usize);

/// What a name in scope refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    Symbol(SymbolId),
    /// A named import of an ambient module member
    Member { module: SymbolId, name: String },
}

/// Global symbol table of one translation unit.
#[derive(Debug, Default)]
pub struct ProgramModel {
    symbols: Vec<Symbol>,
    values: HashMap<String, Binding>,
    types: HashMap<String, Binding>,
    modules: HashMap<String, SymbolId>,
}

impl ProgramModel {
    /// Build the model for `program`, with `preludes` declaring the native surface.
    #[tracing::instrument(skip_all, fields(preludes = preludes.len(), declarations = program.declarations.len()))]
    pub fn build(program: &Program, preludes: &[&Program]) -> CodegenResult<Self> {
        let mut model = Self::default();
        let sources: Vec<&Program> = preludes.iter().copied().chain(std::iter::once(program)).collect();

        for source in &sources {
            for decl in &source.declarations {
                model.declare(decl)?;
            }
        }

        for source in &sources {
            for decl in &source.declarations {
                if let Declaration::Import(import) = &decl.node {
                    model.bind_import(import)?;
                }
            }
        }

        tracing::debug!(
            symbols = model.symbols.len(),
            modules = model.modules.len(),
            "semantic model built"
        );
        Ok(model)
    }

    fn declare(&mut self, decl: &Spanned<Declaration>) -> CodegenResult<()> {
        match &decl.node {
            Declaration::Import(_) => Ok(()),
            Declaration::Class(class) => {
                let symbol = class_symbol(class, decl.span)?;
                let name = symbol.name.clone();
                let id = self.push(symbol);
                insert(&mut self.values, &name, Binding::Symbol(id), decl.span)?;
                insert(&mut self.types, &name, Binding::Symbol(id), decl.span)
            }
            Declaration::Function(function) => {
                let symbol = function_symbol(function, decl.span)?;
                if self.is_declared_overload(&symbol) {
                    return Ok(());
                }
                let name = symbol.name.clone();
                let id = self.push(symbol);
                insert(&mut self.values, &name, Binding::Symbol(id), decl.span)
            }
            Declaration::Interface(interface) => {
                let symbol = Symbol {
                    name: interface.name.clone(),
                    span: decl.span,
                    kind: SymbolKind::Interface(InterfaceSymbol {
                        methods: interface
                            .methods
                            .iter()
                            .map(|m| MethodSymbol {
                                name: m.node.name.clone(),
                                visibility: Default::default(),
                                return_type: m.node.return_type.clone(),
                            })
                            .collect(),
                    }),
                };
                let id = self.push(symbol);
                insert(&mut self.types, &interface.name, Binding::Symbol(id), decl.span)
            }
            Declaration::TypeAlias(alias) => {
                let id = self.push(Symbol {
                    name: alias.name.clone(),
                    span: decl.span,
                    kind: SymbolKind::TypeAlias,
                });
                insert(&mut self.types, &alias.name, Binding::Symbol(id), decl.span)
            }
            Declaration::Module(module) => {
                if self.modules.contains_key(&module.name) {
                    return Err(CodegenError::semantic(
                        format!("duplicate declaration of module \"{}\"", module.name),
                        decl.span,
                    ));
                }
                let symbol = module_symbol(module, decl.span)?;
                let id = self.push(symbol);
                self.modules.insert(module.name.clone(), id);
                Ok(())
            }
        }
    }

    fn bind_import(&mut self, import: &ImportDecl) -> CodegenResult<()> {
        let specifier = module_specifier(import)?;
        // Headers without a declaration prelude only produce an `#include`.
        let Some(&module_id) = self.modules.get(specifier) else {
            return Ok(());
        };

        match &import.clause {
            None => Ok(()),
            Some(ImportClause::Namespace(alias)) => {
                insert(&mut self.values, alias, Binding::Symbol(module_id), import.module.span)
            }
            Some(ImportClause::Named(items)) => {
                for item in items {
                    let member_kind = match &self.symbols[module_id.0].kind {
                        SymbolKind::Module(module) => module.members.get(&item.name).map(|m| (m.kind.is_value(), m.kind.is_type())),
                        _ => None,
                    };
                    let Some((is_value, is_type)) = member_kind else {
                        return Err(CodegenError::semantic(
                            format!("module \"{specifier}\" has no exported member `{}`", item.name),
                            import.module.span,
                        ));
                    };
                    let binding = Binding::Member {
                        module: module_id,
                        name: item.name.clone(),
                    };
                    if is_value {
                        insert(&mut self.values, item.local_name(), binding.clone(), import.module.span)?;
                    }
                    if is_type {
                        insert(&mut self.types, item.local_name(), binding, import.module.span)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn push(&mut self, symbol: Symbol) -> SymbolId {
        self.symbols.push(symbol);
        SymbolId(self.symbols.len() - 1)
    }

    fn is_declared_overload(&self, symbol: &Symbol) -> bool {
        let SymbolKind::Function(new) = &symbol.kind else {
            return false;
        };
        match self.resolve(&symbol.name).map(|existing| &existing.kind) {
            Some(SymbolKind::Function(existing)) => existing.declare && new.declare,
            _ => false,
        }
    }

    fn binding_symbol(&self, binding: &Binding) -> Option<&Symbol> {
        match binding {
            Binding::Symbol(id) => self.symbols.get(id.0),
            Binding::Member { module, name } => match &self.symbols.get(module.0)?.kind {
                SymbolKind::Module(m) => m.members.get(name),
                _ => None,
            },
        }
    }
}

impl SemanticModel for ProgramModel {
    fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.binding_symbol(self.values.get(name)?)
    }

    fn resolve_type(&self, name: &str) -> Option<&Symbol> {
        self.binding_symbol(self.types.get(name)?)
    }

    fn module(&self, specifier: &str) -> Option<&Symbol> {
        self.symbols.get(self.modules.get(specifier)?.0)
    }

    fn member<'m>(&'m self, module: &'m ModuleSymbol, name: &str) -> Option<&'m Symbol> {
        module.members.get(name)
    }

    fn type_from_node(&self, node: &TypeNode) -> Type {
        typing::type_from_node(self, node)
    }

    fn type_of(&self, expr: &Spanned<Expr>, locals: &Locals) -> Type {
        typing::type_of(self, expr, locals)
    }
}

/// Module specifier of an import; only string literals are supported.
pub fn module_specifier(import: &ImportDecl) -> CodegenResult<&str> {
    match &import.module.node {
        Expr::Literal(Literal::String(specifier)) => Ok(specifier.as_str()),
        _ => Err(CodegenError::structural(
            "only string literals are supported as module specifiers",
            import.module.span,
        )),
    }
}

fn insert(space: &mut HashMap<String, Binding>, name: &str, binding: Binding, span: Span) -> CodegenResult<()> {
    if space.contains_key(name) {
        return Err(CodegenError::semantic(format!("duplicate declaration of `{name}`"), span));
    }
    space.insert(name.to_string(), binding);
    Ok(())
}

fn class_symbol(class: &ClassDecl, span: Span) -> CodegenResult<Symbol> {
    let name = class
        .name
        .as_deref()
        .ok_or_else(|| CodegenError::structural("class declaration requires a name", span))?;

    let mut symbol = ClassSymbol {
        traits: lowering_traits(&class.decorators, name)?,
        declare: class.declare,
        fields: Vec::new(),
        methods: Vec::new(),
        has_constructor: false,
    };

    for member in &class.members {
        match &member.node {
            ClassMember::Property(property) => symbol.fields.push(FieldSymbol {
                name: property.name.clone(),
                visibility: property.visibility,
                ty: property.ty.clone(),
            }),
            ClassMember::Method(method) => symbol.methods.push(MethodSymbol {
                name: method.name.clone(),
                visibility: method.visibility,
                return_type: method.return_type.clone(),
            }),
            ClassMember::Constructor(_) => symbol.has_constructor = true,
        }
    }

    Ok(Symbol {
        name: name.to_string(),
        span,
        kind: SymbolKind::Class(symbol),
    })
}

fn function_symbol(function: &FunctionDecl, span: Span) -> CodegenResult<Symbol> {
    let name = function
        .name
        .as_deref()
        .ok_or_else(|| CodegenError::structural("function declaration requires a name", span))?;

    Ok(Symbol {
        name: name.to_string(),
        span,
        kind: SymbolKind::Function(FunctionSymbol {
            traits: lowering_traits(&function.decorators, name)?,
            declare: function.declare,
            return_type: function.return_type.clone(),
            builtin: if function.declare { builtins::from_str(name) } else { None },
        }),
    })
}

fn module_symbol(module: &ModuleDecl, span: Span) -> CodegenResult<Symbol> {
    let traits = lowering_traits(&module.decorators, &module.name)?;
    let mut members: HashMap<String, Symbol> = HashMap::new();

    for decl in &module.body {
        let member = match &decl.node {
            Declaration::Class(class) => class_symbol(class, decl.span)?,
            Declaration::Function(function) => function_symbol(function, decl.span)?,
            Declaration::Interface(interface) => Symbol {
                name: interface.name.clone(),
                span: decl.span,
                kind: SymbolKind::Interface(InterfaceSymbol { methods: Vec::new() }),
            },
            Declaration::TypeAlias(alias) => Symbol {
                name: alias.name.clone(),
                span: decl.span,
                kind: SymbolKind::TypeAlias,
            },
            Declaration::Import(_) | Declaration::Module(_) => {
                return Err(CodegenError::unsupported(
                    "imports and nested modules inside an ambient module",
                    decl.span,
                ));
            }
        };

        match members.get(&member.name).map(|existing| &existing.kind) {
            None => {
                members.insert(member.name.clone(), member);
            }
            Some(SymbolKind::Function(existing)) if existing.declare => {}
            Some(_) => {
                return Err(CodegenError::semantic(
                    format!("duplicate declaration of `{}` in module \"{}\"", member.name, module.name),
                    decl.span,
                ));
            }
        }
    }

    Ok(Symbol {
        name: module.name.clone(),
        span,
        kind: SymbolKind::Module(ModuleSymbol {
            traits,
            members,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::Ownership;
    use tscc_syntax::build::*;

    fn libc() -> Program {
        program(vec![
            type_alias("i32"),
            declare_function("i32", vec![param("v", keyword(tscc_syntax::ast::KeywordType::Number))], ty("i32")),
            decorated(
                declare_function("sizeof", vec![], keyword(tscc_syntax::ast::KeywordType::Number)),
                vec![decorator("extern_c", vec![])],
            ),
            decorated(
                module(
                    "cstdio",
                    vec![decorated(
                        declare_function("printf", vec![param("format", keyword(tscc_syntax::ast::KeywordType::String))], void()),
                        vec![decorator("extern_c", vec![])],
                    )],
                ),
                vec![decorator("cpp_namespace", vec![string("std")])],
            ),
        ])
    }

    #[test]
    fn test_type_and_value_spaces_are_separate() {
        let prelude = libc();
        let model = ProgramModel::build(&program(vec![]), &[&prelude]).unwrap();

        assert!(matches!(model.resolve_type("i32").map(|s| &s.kind), Some(SymbolKind::TypeAlias)));
        let Some(SymbolKind::Function(function)) = model.resolve("i32").map(|s| &s.kind) else {
            panic!("expected the i32 constructor function");
        };
        assert_eq!(function.builtin, Some(builtins::BuiltinFnId::I32));
    }

    #[test]
    fn test_named_import_binds_module_member() {
        let prelude = libc();
        let input = program(vec![import_named("cstdio", &["printf"])]);
        let model = ProgramModel::build(&input, &[&prelude]).unwrap();

        let printf = model.resolve("printf").unwrap();
        let SymbolKind::Function(function) = &printf.kind else {
            panic!("expected printf to be a function");
        };
        assert_eq!(function.traits.native_name.as_deref(), Some("printf"));

        let Some(SymbolKind::Module(module)) = model.module("cstdio").map(|s| &s.kind) else {
            panic!("expected the cstdio module");
        };
        assert_eq!(module.traits.namespace.as_deref(), Some("std"));
    }

    /// Member of `specifier`, borrowed for as long as the model.
    fn exported<'m>(model: &'m dyn SemanticModel, specifier: &str, name: &str) -> Option<&'m Symbol> {
        let SymbolKind::Module(module) = &model.module(specifier)?.kind else {
            return None;
        };
        model.member(module, name)
    }

    #[test]
    fn test_module_member_outlives_module_lookup() {
        let prelude = libc();
        let model = ProgramModel::build(&program(vec![]), &[&prelude]).unwrap();

        let printf = exported(&model, "cstdio", "printf").unwrap();
        assert_eq!(printf.name, "printf");
        assert!(matches!(printf.kind, SymbolKind::Function(_)));
        assert!(exported(&model, "cstdio", "puts").is_none());
        assert!(exported(&model, "cstring", "printf").is_none());
    }

    #[test]
    fn test_missing_module_member_is_semantic_error() {
        let prelude = libc();
        let input = program(vec![import_named("cstdio", &["puts"])]);
        let err = ProgramModel::build(&input, &[&prelude]).unwrap_err();
        assert!(matches!(err, CodegenError::Semantic { .. }));
    }

    #[test]
    fn test_duplicate_class_is_semantic_error() {
        let input = program(vec![class("Managed", vec![]), class("Managed", vec![])]);
        let err = ProgramModel::build(&input, &[]).unwrap_err();
        assert_eq!(err.to_string(), "duplicate declaration of `Managed`");
    }

    #[test]
    fn test_declared_overloads_are_merged() {
        let input = program(vec![
            declare_function("f", vec![], void()),
            declare_function("f", vec![param("x", ty("i32"))], void()),
        ]);
        assert!(ProgramModel::build(&input, &[]).is_ok());
    }

    #[test]
    fn test_class_traits_are_computed_once() {
        let input = program(vec![
            struct_class("Vec2", vec![field("x", ty("i32"))]),
            class("Managed", vec![method("destructor", vec![], void(), vec![])]),
        ]);
        let model = ProgramModel::build(&input, &[]).unwrap();

        let (_, vec2) = model.class("Vec2").unwrap();
        assert_eq!(vec2.traits.ownership, Ownership::Value);
        assert!(vec2.field("x").is_some());

        let (_, managed) = model.class("Managed").unwrap();
        assert_eq!(managed.traits.ownership, Ownership::SharedHeap);
        assert!(managed.has_destructor());
    }
}
