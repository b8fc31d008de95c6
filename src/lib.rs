#![forbid(unsafe_code)]
//! tscc: a compiler backend from a typed scripting language to C++
//!
//! The frontend (parsing and type checking) is external. This crate consumes the typed AST it produces
//! (see the `tscc_syntax` crate), builds a semantic model over it and lowers it to a single C++ translation unit.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `backend` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod backend;
pub mod cli;
pub mod errors;
pub mod semantics;
pub mod version;

pub use tscc_syntax::ast;

pub use backend::{CodegenOptions, CppCodegen, GenerationError};
pub use errors::{CodegenError, CodegenResult};
pub use semantics::{ProgramModel, SemanticModel};
