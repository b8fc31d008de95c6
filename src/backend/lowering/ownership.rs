//! Value vs. shared-heap syntax.
//!
//! | | `Value` (`@struct()`) | `SharedHeap` |
//! |---|---|---|
//! | type reference | `T` | `std::shared_ptr<T>` |
//! | construction | `T(args)` | `std::make_shared<T>(args)` |
//! | member access | `.` | `->` |
//! | receiver argument | `&v` | `v.get()` |

use tscc_core::lang::conventions::{MAKE_SHARED, SHARED_PTR};

use crate::semantics::Ownership;

/// Member access on the current instance.
pub const THIS_ACCESS: &str = "this->";
/// Member access on a namespace.
pub const NAMESPACE_ACCESS: &str = "::";
/// Member access through a raw pointer.
pub const POINTER_ACCESS: &str = "->";
/// Member access on a value.
pub const VALUE_ACCESS: &str = ".";
/// Raw pointer out of a shared-heap handle.
pub const SHARED_RAW: &str = ".get()";

pub fn member_access(ownership: Ownership) -> &'static str {
    match ownership {
        Ownership::Value => VALUE_ACCESS,
        Ownership::SharedHeap => POINTER_ACCESS,
    }
}

/// Type reference to a class.
pub fn type_reference(ownership: Ownership, class_emitted: &str) -> String {
    match ownership {
        Ownership::Value => class_emitted.to_string(),
        Ownership::SharedHeap => format!("{SHARED_PTR}<{class_emitted}>"),
    }
}

/// Callee of a construction; the argument list follows.
pub fn constructor_callee(ownership: Ownership, class_emitted: &str) -> String {
    match ownership {
        Ownership::Value => class_emitted.to_string(),
        Ownership::SharedHeap => format!("{MAKE_SHARED}<{class_emitted}>"),
    }
}
