//! C++ text emission.
//!
//! Emitters walk the (already rewritten) AST and append text to the current scope of an [`EmitSession`]. Functions
//! and classes are collected into records and only printed when the translation unit is finished, so the output
//! order does not depend on the declaration order.
//!
//! ## Module Organization
//!
//! - `buffer` - [`CodeBuffer`] with per-append indentation and newline flags
//! - `records` - Function and class records and their printed layout
//! - `session` - [`EmitSession`], the scope/statement/function/class stacks
//! - `decls` - Imports, classes, constructors, methods and free functions
//! - `statements` - Statement emission
//! - `expressions` - Expression emission, including the intercepted built-ins

mod buffer;
mod decls;
mod expressions;
mod records;
mod session;
mod statements;

pub use buffer::{AppendMode, CodeBuffer, Layout};
pub use decls::emit_program;
pub use records::{ClassRecord, FieldRecord, FunctionRecord, MethodRecord, ParamRecord};
pub use session::EmitSession;
