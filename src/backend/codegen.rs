//! Code generation facade
//!
//! [`CppCodegen`] runs the whole pipeline for one translation unit:
//!
//! ```text
//! typed AST (+ preludes) → ProgramModel → rewrite passes per body → emitters → C++ source
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tscc::backend::CppCodegen;
//!
//! let codegen = CppCodegen::new();
//! let cpp = codegen.try_generate(&program, &[&libc_prelude])?;
//! ```
//!
//! ## Error Handling
//!
//! Generation is all-or-nothing: the first error aborts the file and no partial output is returned.

use miette::Diagnostic;
use thiserror::Error;
use tscc_syntax::ast::Program;

use super::emit::{EmitSession, emit_program};
use super::options::CodegenOptions;
use crate::errors::CodegenError;
use crate::semantics::{ProgramModel, SemanticModel};

/// Error during C++ code generation.
#[derive(Debug, Error, Diagnostic)]
pub enum GenerationError {
    /// Lowering or emission failed
    #[error(transparent)]
    #[diagnostic(transparent)]
    Codegen(#[from] CodegenError),

    /// The AST handed over by the frontend is not valid JSON for the expected shape
    #[error("invalid AST input: {0}")]
    #[diagnostic(code(tscc::decode), help("the input must be the JSON serialization of a `tscc_syntax::ast::Program`"))]
    Decode(#[from] serde_json::Error),
}

/// C++ code generator for one translation unit at a time.
#[derive(Debug, Clone, Default)]
pub struct CppCodegen {
    options: CodegenOptions,
}

impl CppCodegen {
    /// Create a generator with default options
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CodegenOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    /// Generate C++ for `program`, with `preludes` declaring the native surface.
    #[tracing::instrument(skip_all, fields(preludes = preludes.len()))]
    pub fn try_generate(&self, program: &Program, preludes: &[&Program]) -> Result<String, GenerationError> {
        let model = ProgramModel::build(program, preludes)?;
        self.try_generate_with_model(&model, program)
    }

    /// Generate C++ for `program` against a semantic model supplied by the caller.
    pub fn try_generate_with_model(
        &self,
        model: &dyn SemanticModel,
        program: &Program,
    ) -> Result<String, GenerationError> {
        let mut session = EmitSession::new(model, &self.options);
        emit_program(&mut session, program)?;
        let output = session.finish()?;
        tracing::debug!(bytes = output.len(), "translation unit generated");
        Ok(output)
    }

    /// Decode JSON-serialized ASTs and generate C++.
    pub fn generate_from_json(&self, program: &str, preludes: &[&str]) -> Result<String, GenerationError> {
        let program: Program = serde_json::from_str(program)?;
        let preludes = preludes
            .iter()
            .map(|source| serde_json::from_str::<Program>(source))
            .collect::<Result<Vec<_>, _>>()?;
        let preludes: Vec<&Program> = preludes.iter().collect();
        self.try_generate(&program, &preludes)
    }
}
