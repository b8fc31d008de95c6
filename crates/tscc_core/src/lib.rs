//! Provide the canonical language vocabulary shared by the tscc compiler and its tooling.
//!
//! This crate is intentionally small and dependency-free. It names the things the lowering engine
//! recognizes by spelling (decorators, built-in bindings, operators) and the fixed conventions of the
//! emitted C++ (mangling prefix, temporary names, smart-pointer spellings).
//!
//! ## Notes
//!
//! - This is a "vocabulary" crate: **no IO**, no global state, and no AST types.
//! - Callers work with stable ids (e.g. [`lang::decorators::DecoratorId`]) instead of comparing strings
//!   across the compiler.

pub mod lang;
