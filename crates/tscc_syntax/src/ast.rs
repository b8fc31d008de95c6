//! Abstract Syntax Tree definitions for the tscc source language.
//!
//! The tree is what the external frontend produces after parsing and type checking a source file. It covers the
//! whitelisted subset of the language only; anything else is rejected by the frontend before it gets here.
//!
//! Two statement/expression variants ([`Statement::Staged`] and [`Expr::ReceiverCall`]) never come out of the
//! frontend: they are produced by the backend's desugaring passes.

use serde::{Deserialize, Serialize};
use tscc_core::lang::operators::OperatorId;

/// Source location span (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A node with source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub node: T,
    #[serde(default)]
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Identifier
pub type Ident = String;

/// A source file is a sequence of top-level declarations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub declarations: Vec<Spanned<Declaration>>,
}

/// Top-level declarations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Declaration {
    Import(ImportDecl),
    Class(ClassDecl),
    Function(FunctionDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    /// Ambient module: `declare module "cstdio" { ... }`
    Module(ModuleDecl),
}

impl Declaration {
    /// Declared name, if the declaration binds one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Declaration::Import(_) => None,
            Declaration::Class(c) => c.name.as_deref(),
            Declaration::Function(f) => f.name.as_deref(),
            Declaration::Interface(i) => Some(&i.name),
            Declaration::TypeAlias(t) => Some(&t.name),
            Declaration::Module(m) => Some(&m.name),
        }
    }

    /// Whether the declaration only describes the native surface (`declare ...`).
    ///
    /// Interfaces and type aliases never produce code and count as declared.
    pub fn is_declare(&self) -> bool {
        match self {
            Declaration::Import(_) => false,
            Declaration::Class(c) => c.declare,
            Declaration::Function(f) => f.declare,
            Declaration::Interface(_) | Declaration::TypeAlias(_) => true,
            Declaration::Module(m) => m.declare,
        }
    }

    /// Decorators attached to the declaration.
    pub fn decorators(&self) -> &[Spanned<Decorator>] {
        match self {
            Declaration::Class(c) => &c.decorators,
            Declaration::Function(f) => &f.decorators,
            Declaration::Module(m) => &m.decorators,
            Declaration::Import(_) | Declaration::Interface(_) | Declaration::TypeAlias(_) => &[],
        }
    }
}

// ============================================================================
// Decorators and visibility
// ============================================================================

/// `@name(args...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decorator {
    pub name: Ident,
    #[serde(default)]
    pub args: Vec<Spanned<Expr>>,
}

/// Member visibility. Members without a modifier are public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    /// Canonical grouping order of emitted class members.
    pub const ORDER: [Visibility; 3] = [Visibility::Public, Visibility::Protected, Visibility::Private];

    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

// ============================================================================
// Imports and ambient modules
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    /// Module specifier; only string literals are supported.
    pub module: Spanned<Expr>,
    #[serde(default)]
    pub clause: Option<ImportClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImportClause {
    /// `import { a, b as c } from "m"`
    Named(Vec<ImportItem>),
    /// `import * as ns from "m"`
    Namespace(Ident),
}

/// An item in a named import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportItem {
    pub name: Ident,
    #[serde(default)]
    pub alias: Option<Ident>,
}

impl ImportItem {
    /// Name the binding is visible under in the importing file.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDecl {
    #[serde(default)]
    pub decorators: Vec<Spanned<Decorator>>,
    #[serde(default)]
    pub declare: bool,
    pub name: String,
    #[serde(default)]
    pub body: Vec<Spanned<Declaration>>,
}

// ============================================================================
// Classes, interfaces, functions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    #[serde(default)]
    pub decorators: Vec<Spanned<Decorator>>,
    #[serde(default)]
    pub declare: bool,
    pub name: Option<Ident>,
    #[serde(default)]
    pub members: Vec<Spanned<ClassMember>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassMember {
    Property(PropertyDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDecl {
    #[serde(default)]
    pub visibility: Visibility,
    pub name: Ident,
    #[serde(default)]
    pub ty: Option<Spanned<TypeNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    #[serde(default)]
    pub decorators: Vec<Spanned<Decorator>>,
    #[serde(default)]
    pub visibility: Visibility,
    pub name: Ident,
    #[serde(default)]
    pub params: Vec<Spanned<Param>>,
    #[serde(default)]
    pub return_type: Option<Spanned<TypeNode>>,
    #[serde(default)]
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub params: Vec<Spanned<Param>>,
    #[serde(default)]
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    #[serde(default)]
    pub decorators: Vec<Spanned<Decorator>>,
    #[serde(default)]
    pub declare: bool,
    pub name: Option<Ident>,
    #[serde(default)]
    pub type_params: Vec<Ident>,
    #[serde(default)]
    pub params: Vec<Spanned<Param>>,
    #[serde(default)]
    pub return_type: Option<Spanned<TypeNode>>,
    #[serde(default)]
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: BindingName,
    #[serde(default)]
    pub ty: Option<Spanned<TypeNode>>,
    #[serde(default)]
    pub default: Option<Spanned<Expr>>,
    /// `...rest`
    #[serde(default)]
    pub rest: bool,
}

/// Binding target of a parameter or variable declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BindingName {
    Ident(Ident),
    ObjectPattern,
    ArrayPattern,
}

impl BindingName {
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            BindingName::Ident(name) => Some(name),
            BindingName::ObjectPattern | BindingName::ArrayPattern => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: Ident,
    #[serde(default)]
    pub methods: Vec<Spanned<MethodSignature>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: Ident,
    #[serde(default)]
    pub params: Vec<Spanned<Param>>,
    #[serde(default)]
    pub return_type: Option<Spanned<TypeNode>>,
}

/// `type i32 = ...`; the aliased shape is frontend-only, so only the name is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAliasDecl {
    pub name: Ident,
}

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeNode {
    Reference(TypeReference),
    Keyword(KeywordType),
}

/// `Name`, `ns.Name`, `Ptr<T>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeReference {
    pub name: Vec<Ident>,
    #[serde(default)]
    pub type_args: Vec<Spanned<TypeNode>>,
}

impl TypeReference {
    /// The name if it is a single identifier (not qualified).
    pub fn simple_name(&self) -> Option<&str> {
        match self.name.as_slice() {
            [name] => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordType {
    Void,
    Boolean,
    Number,
    String,
}

// ============================================================================
// Statements
// ============================================================================

/// `{ ... }`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Spanned<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Variable(VariableStatement),
    Expr(Spanned<Expr>),
    Return(Option<Spanned<Expr>>),
    If(IfStmt),
    While(WhileStmt),
    Break,
    Continue,
    Block(Block),
    /// A statement with synthesized prelude statements (desugaring output).
    Staged(StagedStmt),
}

impl Statement {
    /// `return`, `break` or `continue`.
    pub fn is_exit(&self) -> bool {
        matches!(self, Statement::Return(_) | Statement::Break | Statement::Continue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Let,
    Const,
    Var,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableStatement {
    pub kind: VariableKind,
    pub declarations: Vec<Spanned<VariableDecl>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: BindingName,
    #[serde(default)]
    pub ty: Option<Spanned<TypeNode>>,
    #[serde(default)]
    pub initializer: Option<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub condition: Spanned<Expr>,
    pub then_branch: Box<Spanned<Statement>>,
    #[serde(default)]
    pub else_branch: Option<Box<Spanned<Statement>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub condition: Spanned<Expr>,
    pub body: Box<Spanned<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedStmt {
    pub prelude: Vec<Spanned<Statement>>,
    pub statement: Box<Spanned<Statement>>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Ident(Ident),
    This,
    Literal(Literal),
    Property(PropertyAccess),
    Call(CallExpr),
    New(NewExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Paren(Box<Spanned<Expr>>),
    Comma(Vec<Spanned<Expr>>),
    /// Method call with an explicit receiver argument (desugaring output).
    ReceiverCall(ReceiverCall),
}

impl Expr {
    /// Whether the expression denotes a storage location (identifier, or a property chain rooted at an
    /// identifier or `this`).
    pub fn is_addressable(&self) -> bool {
        match self {
            Expr::Ident(_) => true,
            Expr::Property(access) => matches!(access.object.node, Expr::This) || access.object.node.is_addressable(),
            Expr::Paren(inner) => inner.node.is_addressable(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Numeric literal, kept in source spelling
    Number(String),
    String(String),
    Bool(bool),
    Null,
}

/// `object.name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAccess {
    pub object: Box<Spanned<Expr>>,
    pub name: Ident,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub callee: Box<Spanned<Expr>>,
    /// `None` when written without `<...>`; `Some(vec![])` for an explicit empty list.
    #[serde(default)]
    pub type_args: Option<Vec<Spanned<TypeNode>>>,
    #[serde(default)]
    pub args: Vec<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpr {
    pub class: Box<Spanned<Expr>>,
    #[serde(default)]
    pub args: Vec<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Spanned<Expr>>,
    pub right: Box<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Spanned<Expr>>,
}

/// `Class_method(receiver, args...)` produced by implicit-receiver injection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverCall {
    /// Declared (unmangled) name of the class owning the method
    pub class: Ident,
    pub method: Ident,
    pub args: Vec<Spanned<Expr>>,
}

/// Binary operators, serialized with their source spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Rem,
    #[serde(rename = "**")]
    Pow,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "===")]
    StrictEq,
    #[serde(rename = "!==")]
    StrictNotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "^")]
    BitXor,
    #[serde(rename = "<<")]
    Shl,
    #[serde(rename = ">>")]
    Shr,
    #[serde(rename = ">>>")]
    UShr,
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+=")]
    AddAssign,
    #[serde(rename = "-=")]
    SubAssign,
    #[serde(rename = "*=")]
    MulAssign,
    #[serde(rename = "/=")]
    DivAssign,
    #[serde(rename = "%=")]
    RemAssign,
    #[serde(rename = "<<=")]
    ShlAssign,
    #[serde(rename = ">>=")]
    ShrAssign,
    #[serde(rename = "&=")]
    BitAndAssign,
    #[serde(rename = "|=")]
    BitOrAssign,
    #[serde(rename = "^=")]
    BitXorAssign,
}

impl BinaryOp {
    pub fn id(self) -> OperatorId {
        match self {
            BinaryOp::Add => OperatorId::Add,
            BinaryOp::Sub => OperatorId::Sub,
            BinaryOp::Mul => OperatorId::Mul,
            BinaryOp::Div => OperatorId::Div,
            BinaryOp::Rem => OperatorId::Rem,
            BinaryOp::Pow => OperatorId::Pow,
            BinaryOp::Eq => OperatorId::Eq,
            BinaryOp::NotEq => OperatorId::NotEq,
            BinaryOp::StrictEq => OperatorId::StrictEq,
            BinaryOp::StrictNotEq => OperatorId::StrictNotEq,
            BinaryOp::Lt => OperatorId::Lt,
            BinaryOp::LtEq => OperatorId::LtEq,
            BinaryOp::Gt => OperatorId::Gt,
            BinaryOp::GtEq => OperatorId::GtEq,
            BinaryOp::And => OperatorId::And,
            BinaryOp::Or => OperatorId::Or,
            BinaryOp::BitAnd => OperatorId::BitAnd,
            BinaryOp::BitOr => OperatorId::BitOr,
            BinaryOp::BitXor => OperatorId::BitXor,
            BinaryOp::Shl => OperatorId::Shl,
            BinaryOp::Shr => OperatorId::Shr,
            BinaryOp::UShr => OperatorId::UShr,
            BinaryOp::Assign => OperatorId::Assign,
            BinaryOp::AddAssign => OperatorId::AddAssign,
            BinaryOp::SubAssign => OperatorId::SubAssign,
            BinaryOp::MulAssign => OperatorId::MulAssign,
            BinaryOp::DivAssign => OperatorId::DivAssign,
            BinaryOp::RemAssign => OperatorId::RemAssign,
            BinaryOp::ShlAssign => OperatorId::ShlAssign,
            BinaryOp::ShrAssign => OperatorId::ShrAssign,
            BinaryOp::BitAndAssign => OperatorId::BitAndAssign,
            BinaryOp::BitOrAssign => OperatorId::BitOrAssign,
            BinaryOp::BitXorAssign => OperatorId::BitXorAssign,
        }
    }

    /// Whether the result of the expression is the (assigned) left operand.
    pub fn is_assignment(self) -> bool {
        tscc_core::lang::operators::info_for(self.id()).is_some_and(|info| info.is_assignment)
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    #[serde(rename = "-")]
    Neg,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "~")]
    BitNot,
}

impl UnaryOp {
    pub fn id(self) -> OperatorId {
        match self {
            UnaryOp::Neg => OperatorId::Neg,
            UnaryOp::Plus => OperatorId::Plus,
            UnaryOp::Not => OperatorId::Not,
            UnaryOp::BitNot => OperatorId::BitNot,
        }
    }
}
