//! tscc Compiler Backend
//!
//! This module handles code generation from the typed AST to C++ source code.
//!
//! The pipeline is:
//! 1. Typed AST + declaration preludes → [`ProgramModel`](crate::semantics::ProgramModel)
//! 2. Each function-like body → rewrite passes (destructors, receivers, address-of temporaries)
//! 3. Rewritten declarations → emitters → one C++ translation unit
//!
//! ## Module Organization
//!
//! - `codegen` - [`CppCodegen`], the entry point
//! - `options` - [`CodegenOptions`] builder
//! - `passes` - AST rewrite passes run before emission
//! - `lowering` - Name mangling, ownership and type lowering
//! - `emit` - Emission session, records and the declaration/statement/expression emitters

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod codegen;
pub mod emit;
pub mod lowering;
pub mod options;
pub mod passes;

pub use codegen::{CppCodegen, GenerationError};
pub use options::{CodegenOptions, DestructorPolicy, LineEnding, OutputOrder};
pub use passes::{Pass, PassSet};
