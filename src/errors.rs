//! Error types for lowering and C++ emission.
//!
//! Every failure aborts the translation of the current file: there is no recovery and no partial output. Errors carry
//! the span of the offending node so callers can point at the source.
//!
//! ## Notes
//!
//! - Prefer actionable messages: say which construct is unsupported and what the author can write instead.
//! - Construct errors through the helper constructors (`CodegenError::structural(...)` etc.) rather than spelling out
//!   the variants at every call site.

use miette::Diagnostic;
use thiserror::Error;
use tscc_syntax::ast::Span;

/// Error raised while building the semantic model, running rewrite passes, or emitting C++.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum CodegenError {
    /// A required sub-node is missing or has an unsupported shape.
    #[error("{message}")]
    #[diagnostic(code(tscc::structural))]
    Structural { message: String, span: Span },

    /// A symbol cannot be resolved or resolves to the wrong kind of declaration.
    #[error("{message}")]
    #[diagnostic(code(tscc::semantic))]
    Semantic { message: String, span: Span },

    /// An operation ran without the enclosing context it needs.
    #[error("{message}")]
    #[diagnostic(code(tscc::scope_discipline))]
    ScopeDiscipline { message: String, span: Span },

    /// A built-in binding the lowering relies on is not declared.
    #[error("{message}")]
    #[diagnostic(
        code(tscc::builtin_surface),
        help("declare the built-in in a prelude (for example `@extern_c() declare function sizeof<T>(expr?: T): number;`)")
    )]
    BuiltinSurface { message: String, span: Span },

    /// A construct outside the supported language subset.
    #[error("unsupported: {message}")]
    #[diagnostic(code(tscc::unsupported))]
    Unsupported { message: String, span: Span },

    /// The emission scope stack was popped past its root.
    #[error("scope underflow: {context}")]
    #[diagnostic(code(tscc::scope_underflow), help("this is a compiler bug; please report it"))]
    ScopeUnderflow { context: &'static str },
}

impl CodegenError {
    pub fn structural(message: impl Into<String>, span: Span) -> Self {
        Self::Structural {
            message: message.into(),
            span,
        }
    }

    pub fn semantic(message: impl Into<String>, span: Span) -> Self {
        Self::Semantic {
            message: message.into(),
            span,
        }
    }

    pub fn scope_discipline(message: impl Into<String>, span: Span) -> Self {
        Self::ScopeDiscipline {
            message: message.into(),
            span,
        }
    }

    pub fn builtin_surface(message: impl Into<String>, span: Span) -> Self {
        Self::BuiltinSurface {
            message: message.into(),
            span,
        }
    }

    pub fn unsupported(message: impl Into<String>, span: Span) -> Self {
        Self::Unsupported {
            message: message.into(),
            span,
        }
    }

    /// Source span of the node the error is about, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Structural { span, .. }
            | Self::Semantic { span, .. }
            | Self::ScopeDiscipline { span, .. }
            | Self::BuiltinSurface { span, .. }
            | Self::Unsupported { span, .. } => Some(*span),
            Self::ScopeUnderflow { .. } => None,
        }
    }
}

/// Result type for lowering and emission.
pub type CodegenResult<T> = Result<T, CodegenError>;

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn test_error_display_and_code() {
        let err = CodegenError::unsupported("destructuring parameters", Span::new(3, 9));
        assert_eq!(err.to_string(), "unsupported: destructuring parameters");
        assert_eq!(err.code().map(|c| c.to_string()), Some("tscc::unsupported".to_string()));
        assert_eq!(err.span(), Some(Span::new(3, 9)));
    }

    #[test]
    fn test_underflow_has_no_span() {
        let err = CodegenError::ScopeUnderflow { context: "pop_scope" };
        assert_eq!(err.span(), None);
        assert!(err.help().is_some());
    }
}
