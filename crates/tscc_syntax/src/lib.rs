//! Typed AST shape for the tscc compiler.
//!
//! Parsing and type checking happen in an external frontend. This crate only fixes the shape of the tree the
//! lowering engine consumes, so that frontend and backend agree on one serializable contract.
//!
//! ## Notes
//! - This crate is intentionally "syntax-only": it does not do name resolution or lowering.
//! - Operator identity comes from `tscc_core::lang::operators`.
//!
//! ## Examples
//! ```rust
//! use tscc_syntax::build;
//!
//! let program = build::program(vec![build::function("main", vec![], build::ty("int"), vec![])]);
//! assert_eq!(program.declarations.len(), 1);
//! ```

pub mod ast;
pub mod build;
