//! Name and ownership lowering rules.
//!
//! These are pure functions: given a declaration's [`LoweringTraits`](crate::semantics::LoweringTraits) they decide
//! the emitted identifier, the construction and member-access syntax, and the C++ spelling of a type. Emitters call
//! them; they never inspect decorators themselves.
//!
//! ## See also
//! - [`names`]: mangling and qualification
//! - [`ownership`]: value vs. shared-heap syntax
//! - [`types`]: type annotations to C++ type names

pub mod names;
pub mod ownership;
pub mod types;
