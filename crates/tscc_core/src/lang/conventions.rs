//! Fixed spellings of the emitted C++.
//!
//! Anything the backend writes that is not derived from the input program lives here, so the emitters never
//! hard-code spellings inline.

/// Prefix applied to every mangled function and class name.
pub const NAME_PREFIX: &str = "tscc_";

/// Prefix of materialized temporaries (`_tscc_temp_1`, `_tscc_temp_2`, ...).
pub const TEMP_PREFIX: &str = "_tscc_temp_";

/// A method with exactly this name is emitted with destructor syntax.
pub const DESTRUCTOR_METHOD: &str = "destructor";

/// First parameter of a receiver function (`Class_method(Class* self, ...)`).
pub const RECEIVER_PARAM: &str = "self";

/// Reference-counted smart pointer wrapping shared-heap class types.
pub const SHARED_PTR: &str = "std::shared_ptr";

/// Heap construction helper for shared-heap class types.
pub const MAKE_SHARED: &str = "std::make_shared";

/// Width of one indentation level in emitted code.
pub const INDENT_WIDTH: usize = 4;

/// Name of the `n`-th materialized temporary in a function body.
///
/// ## Examples
/// ```rust
/// use tscc_core::lang::conventions::temp_name;
///
/// assert_eq!(temp_name(1), "_tscc_temp_1");
/// ```
pub fn temp_name(index: usize) -> String {
    format!("{TEMP_PREFIX}{index}")
}
