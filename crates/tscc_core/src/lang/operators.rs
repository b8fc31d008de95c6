//! Operator vocabulary.
//!
//! Source operators are emitted with their source spelling; the only normalization is the plain assignment
//! token, which is always written as `=`.
//!
//! ## Examples
//! ```rust
//! use tscc_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str("<<="), Some(OperatorId::ShlAssign));
//! assert_eq!(operators::as_str(OperatorId::StrictEq), "===");
//! ```

/// Stable identifier for every supported operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,

    // Comparison
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical / bitwise
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,

    // Assignment
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    ShlAssign,
    ShrAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,

    // Prefix
    Neg,
    Plus,
    Not,
    BitNot,
}

/// Define whether an operator is infix (binary) or prefix (unary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Infix,
    Prefix,
}

/// Metadata for an operator.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spelling: &'static str,
    pub fixity: Fixity,
    pub is_assignment: bool,
}

/// Registry of all operators.
pub const OPERATORS: &[OperatorInfo] = &[
    infix(OperatorId::Add, "+"),
    infix(OperatorId::Sub, "-"),
    infix(OperatorId::Mul, "*"),
    infix(OperatorId::Div, "/"),
    infix(OperatorId::Rem, "%"),
    infix(OperatorId::Pow, "**"),
    infix(OperatorId::Eq, "=="),
    infix(OperatorId::NotEq, "!="),
    infix(OperatorId::StrictEq, "==="),
    infix(OperatorId::StrictNotEq, "!=="),
    infix(OperatorId::Lt, "<"),
    infix(OperatorId::LtEq, "<="),
    infix(OperatorId::Gt, ">"),
    infix(OperatorId::GtEq, ">="),
    infix(OperatorId::And, "&&"),
    infix(OperatorId::Or, "||"),
    infix(OperatorId::BitAnd, "&"),
    infix(OperatorId::BitOr, "|"),
    infix(OperatorId::BitXor, "^"),
    infix(OperatorId::Shl, "<<"),
    infix(OperatorId::Shr, ">>"),
    infix(OperatorId::UShr, ">>>"),
    assign(OperatorId::Assign, "="),
    assign(OperatorId::AddAssign, "+="),
    assign(OperatorId::SubAssign, "-="),
    assign(OperatorId::MulAssign, "*="),
    assign(OperatorId::DivAssign, "/="),
    assign(OperatorId::RemAssign, "%="),
    assign(OperatorId::ShlAssign, "<<="),
    assign(OperatorId::ShrAssign, ">>="),
    assign(OperatorId::BitAndAssign, "&="),
    assign(OperatorId::BitOrAssign, "|="),
    assign(OperatorId::BitXorAssign, "^="),
    prefix(OperatorId::Neg, "-"),
    prefix(OperatorId::Plus, "+"),
    prefix(OperatorId::Not, "!"),
    prefix(OperatorId::BitNot, "~"),
];

/// Resolve an infix spelling to its operator id.
///
/// Prefix operators share spellings with infix ones (`-`, `+`), so this only searches infix entries.
pub fn from_str(spelling: &str) -> Option<OperatorId> {
    OPERATORS
        .iter()
        .find(|op| op.fixity == Fixity::Infix && op.spelling == spelling)
        .map(|op| op.id)
}

/// Return the metadata entry for an operator.
pub fn info_for(id: OperatorId) -> Option<&'static OperatorInfo> {
    OPERATORS.iter().find(|op| op.id == id)
}

/// Return the source spelling of an operator.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).map(|op| op.spelling).unwrap_or("")
}

const fn infix(id: OperatorId, spelling: &'static str) -> OperatorInfo {
    OperatorInfo {
        id,
        spelling,
        fixity: Fixity::Infix,
        is_assignment: false,
    }
}

const fn assign(id: OperatorId, spelling: &'static str) -> OperatorInfo {
    OperatorInfo {
        id,
        spelling,
        fixity: Fixity::Infix,
        is_assignment: true,
    }
}

const fn prefix(id: OperatorId, spelling: &'static str) -> OperatorInfo {
    OperatorInfo {
        id,
        spelling,
        fixity: Fixity::Prefix,
        is_assignment: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infix_spellings_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for op in OPERATORS.iter().filter(|op| op.fixity == Fixity::Infix) {
            assert!(seen.insert(op.spelling), "duplicate spelling {}", op.spelling);
        }
    }

    #[test]
    fn test_prefix_minus_is_not_found_by_infix_lookup() {
        assert_eq!(from_str("-"), Some(OperatorId::Sub));
        assert_eq!(as_str(OperatorId::Neg), "-");
    }
}
