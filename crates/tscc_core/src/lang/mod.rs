//! tscc language vocabulary registries.
//!
//! The design goal is to avoid stringly-typed checks scattered across the compiler. Callers resolve a
//! spelling once to a stable id (e.g. [`builtins::BuiltinFnId`]) and look up metadata via the registry
//! tables.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no AST types, no IO, no side effects.
//!
//! ## Examples
//! ```rust
//! use tscc_core::lang::decorators::{self, DecoratorId};
//!
//! assert_eq!(decorators::from_str("extern_c"), Some(DecoratorId::ExternC));
//! assert_eq!(decorators::as_str(DecoratorId::Struct), "struct");
//! ```

pub mod builtins;
pub mod conventions;
pub mod decorators;
pub mod operators;
pub mod registry;
