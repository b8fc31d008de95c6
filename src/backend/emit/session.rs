//! Emission session: the traversal state of one translation unit.
//!
//! The session owns four LIFO stacks, mirroring the nesting of the source:
//!
//! - **scopes**: the code buffers text is currently appended to. The root scope collects the preamble (`#include`s and
//!   `using` declarations) and is never popped.
//! - **statements**: the before/after buffers of the statement being emitted. Rewrite passes attach synthesized
//!   preludes to a statement; the emitter writes them into `before` so they land right above it.
//! - **function**: the [`FunctionRecord`] being filled, with the typed locals of its body.
//! - **class**: the [`ClassRecord`] being filled.
//!
//! Every push has exactly one matching pop before control returns to the enclosing construct. Popping the root scope
//! is a [`CodegenError::ScopeUnderflow`].

use tscc_syntax::ast::{Span, Visibility};

use super::buffer::{AppendMode, CodeBuffer, Layout};
use super::records::{ClassRecord, FunctionRecord, MethodRecord};
use crate::backend::options::{CodegenOptions, OutputOrder};
use crate::errors::{CodegenError, CodegenResult};
use crate::semantics::{Locals, SemanticModel};

#[derive(Debug)]
struct StatementStage {
    before: CodeBuffer,
    /// Trailing cleanup; nothing writes here yet
    after: CodeBuffer,
}

#[derive(Debug)]
struct FunctionContext {
    record: FunctionRecord,
    locals: Locals,
    /// Set for class members
    visibility: Option<Visibility>,
}

pub struct EmitSession<'a> {
    model: &'a dyn SemanticModel,
    options: &'a CodegenOptions,
    layout: Layout,
    scopes: Vec<CodeBuffer>,
    statements: Vec<StatementStage>,
    function: Option<FunctionContext>,
    class: Option<ClassRecord>,
    functions: Vec<FunctionRecord>,
    classes: Vec<ClassRecord>,
}

impl<'a> EmitSession<'a> {
    pub fn new(model: &'a dyn SemanticModel, options: &'a CodegenOptions) -> Self {
        let layout = options.layout();
        Self {
            model,
            options,
            layout,
            scopes: vec![CodeBuffer::new(layout)],
            statements: Vec::new(),
            function: None,
            class: None,
            functions: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn model(&self) -> &'a dyn SemanticModel {
        self.model
    }

    pub fn options(&self) -> &'a CodegenOptions {
        self.options
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Mangling prefix of this session.
    pub fn prefix(&self) -> &'a str {
        &self.options.name_prefix
    }

    // ---- scopes ----

    fn code(&mut self) -> CodegenResult<&mut CodeBuffer> {
        self.scopes
            .last_mut()
            .ok_or(CodegenError::ScopeUnderflow { context: "append" })
    }

    /// Append to the current scope.
    pub fn append(&mut self, text: &str, mode: AppendMode) -> CodegenResult<()> {
        self.code()?.append(text, mode);
        Ok(())
    }

    pub fn indent(&mut self) -> CodegenResult<()> {
        self.code()?.indent();
        Ok(())
    }

    pub fn dedent(&mut self) -> CodegenResult<()> {
        self.code()?.dedent();
        Ok(())
    }

    /// Make `buffer` (or a fresh one) the current scope.
    pub fn push_scope(&mut self, buffer: Option<CodeBuffer>) {
        let buffer = buffer.unwrap_or_else(|| CodeBuffer::new(self.layout));
        self.scopes.push(buffer);
        tracing::trace!(depth = self.scopes.len(), "push scope");
    }

    /// Pop the current scope and hand its buffer back.
    pub fn pop_scope(&mut self) -> CodegenResult<CodeBuffer> {
        if self.scopes.len() <= 1 {
            return Err(CodegenError::ScopeUnderflow { context: "pop_scope" });
        }
        let buffer = self
            .scopes
            .pop()
            .ok_or(CodegenError::ScopeUnderflow { context: "pop_scope" })?;
        tracing::trace!(depth = self.scopes.len(), "pop scope");
        Ok(buffer)
    }

    /// Number of open scopes, including the root.
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Run `f` with a fresh scope and return what it appended.
    ///
    /// The scope is popped whether or not `f` succeeds.
    pub fn run_in_new_scope<F>(&mut self, f: F) -> CodegenResult<CodeBuffer>
    where
        F: FnOnce(&mut Self) -> CodegenResult<()>,
    {
        self.run_in_scope(CodeBuffer::new(self.layout), f)
    }

    /// Like [`run_in_new_scope`](Self::run_in_new_scope), starting from `buffer`.
    pub fn run_in_scope<F>(&mut self, buffer: CodeBuffer, f: F) -> CodegenResult<CodeBuffer>
    where
        F: FnOnce(&mut Self) -> CodegenResult<()>,
    {
        self.push_scope(Some(buffer));
        let result = f(self);
        let buffer = self.pop_scope()?;
        result.map(|()| buffer)
    }

    /// Text `f` appends, isolated from the enclosing buffer.
    pub fn fragment<F>(&mut self, f: F) -> CodegenResult<String>
    where
        F: FnOnce(&mut Self) -> CodegenResult<()>,
    {
        Ok(self.run_in_new_scope(f)?.into_text())
    }

    // ---- statements ----

    /// Start staging a statement: its own text goes to a fresh scope until [`pop_statement`](Self::pop_statement).
    pub fn push_statement(&mut self) {
        self.statements.push(StatementStage {
            before: CodeBuffer::new(self.layout),
            after: CodeBuffer::new(self.layout),
        });
        self.push_scope(None);
    }

    /// Finish the staged statement and append prelude, statement and cleanup as one unit.
    pub fn pop_statement(&mut self) -> CodegenResult<()> {
        let content = self.pop_scope()?;
        let stage = self
            .statements
            .pop()
            .ok_or(CodegenError::ScopeUnderflow { context: "pop_statement" })?;
        let parts: Vec<&str> = [stage.before.text(), content.text(), stage.after.text()]
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            return Ok(());
        }
        let text = parts.join(self.layout.line_ending);
        self.append(&text, AppendMode::LINE)
    }

    /// Emit `f` into the prelude of the statement being staged.
    pub fn with_statement_prelude<F>(&mut self, f: F) -> CodegenResult<()>
    where
        F: FnOnce(&mut Self) -> CodegenResult<()>,
    {
        let before = match self.statements.last_mut() {
            Some(stage) => std::mem::replace(&mut stage.before, CodeBuffer::new(self.layout)),
            None => return Err(CodegenError::ScopeUnderflow { context: "statement prelude" }),
        };
        let result = self.run_in_scope(before, f);
        self.restore_stage(result, |stage, buffer| stage.before = buffer)
    }

    fn restore_stage(
        &mut self,
        result: CodegenResult<CodeBuffer>,
        put: impl FnOnce(&mut StatementStage, CodeBuffer),
    ) -> CodegenResult<()> {
        let buffer = result?;
        let stage = self
            .statements
            .last_mut()
            .ok_or(CodegenError::ScopeUnderflow { context: "statement stage" })?;
        put(stage, buffer);
        Ok(())
    }

    // ---- functions ----

    /// Open a function record. Function-like declarations do not nest.
    pub fn begin_function(
        &mut self,
        record: FunctionRecord,
        locals: Locals,
        visibility: Option<Visibility>,
        span: Span,
    ) -> CodegenResult<()> {
        if let Some(open) = &self.function {
            return Err(CodegenError::scope_discipline(
                format!("`{}` is declared inside `{}`; nested functions are not supported", record.name, open.record.name),
                span,
            ));
        }
        self.function = Some(FunctionContext {
            record,
            locals,
            visibility,
        });
        Ok(())
    }

    /// Close the open function record and register it with the enclosing class, or as a free function.
    pub fn end_function(&mut self, span: Span) -> CodegenResult<()> {
        let Some(context) = self.function.take() else {
            return Err(CodegenError::scope_discipline("no function to finish", span));
        };
        tracing::debug!(function = %context.record.name, "function finalized");
        match (context.visibility, self.class.as_mut()) {
            (Some(visibility), Some(class)) => class.methods.push(MethodRecord {
                visibility,
                function: context.record,
            }),
            (None, None) => self.functions.push(context.record),
            _ => {
                return Err(CodegenError::scope_discipline(
                    format!("`{}` does not match the enclosing class context", context.record.name),
                    span,
                ));
            }
        }
        Ok(())
    }

    pub fn in_function(&self) -> bool {
        self.function.is_some()
    }

    /// The open function record.
    pub fn function_mut(&mut self, span: Span) -> CodegenResult<&mut FunctionRecord> {
        match self.function.as_mut() {
            Some(context) => Ok(&mut context.record),
            None => Err(CodegenError::scope_discipline("not inside a function", span)),
        }
    }

    /// Typed locals of the open function.
    pub fn locals(&self, span: Span) -> CodegenResult<&Locals> {
        match self.function.as_ref() {
            Some(context) => Ok(&context.locals),
            None => Err(CodegenError::scope_discipline("not inside a function", span)),
        }
    }

    pub fn locals_mut(&mut self, span: Span) -> CodegenResult<&mut Locals> {
        match self.function.as_mut() {
            Some(context) => Ok(&mut context.locals),
            None => Err(CodegenError::scope_discipline("not inside a function", span)),
        }
    }

    /// Declare `text` in the hoisted section of the open function.
    pub fn hoist(&mut self, text: &str, span: Span) -> CodegenResult<()> {
        self.function_mut(span)?.hoisted.append(text, AppendMode::LINE);
        Ok(())
    }

    // ---- classes ----

    pub fn begin_class(&mut self, record: ClassRecord, span: Span) -> CodegenResult<()> {
        if self.class.is_some() || self.function.is_some() {
            return Err(CodegenError::scope_discipline(
                format!("class `{}` must be declared at the top level", record.name),
                span,
            ));
        }
        self.class = Some(record);
        Ok(())
    }

    pub fn end_class(&mut self, span: Span) -> CodegenResult<()> {
        let Some(record) = self.class.take() else {
            return Err(CodegenError::scope_discipline("no class to finish", span));
        };
        tracing::debug!(
            class = %record.name,
            fields = record.fields.len(),
            methods = record.methods.len(),
            "class finalized"
        );
        self.classes.push(record);
        Ok(())
    }

    /// The open class record.
    pub fn class_mut(&mut self, span: Span) -> CodegenResult<&mut ClassRecord> {
        self.class
            .as_mut()
            .ok_or_else(|| CodegenError::scope_discipline("not inside a class", span))
    }

    pub fn class(&self) -> Option<&ClassRecord> {
        self.class.as_ref()
    }

    // ---- output ----

    /// Serialize the translation unit: preamble, then free functions and classes in the configured order.
    pub fn finish(mut self) -> CodegenResult<String> {
        if self.function.is_some() || self.class.is_some() || !self.statements.is_empty() {
            return Err(CodegenError::scope_discipline(
                "emission finished inside an open declaration",
                Span::default(),
            ));
        }
        if self.scopes.len() != 1 {
            return Err(CodegenError::ScopeUnderflow { context: "finish" });
        }
        let line_ending = self.layout.line_ending;
        let blank = format!("{line_ending}{line_ending}");

        let preamble = self.scopes.pop().map(CodeBuffer::into_text).unwrap_or_default();
        let functions: Vec<String> = self.functions.iter().map(FunctionRecord::print).collect();
        let classes: Vec<String> = self.classes.iter().map(|class| class.print(self.layout)).collect();
        let (functions, classes) = (functions.join(&blank), classes.join(&blank));

        let sections = match self.options.output_order {
            OutputOrder::FunctionsFirst => [preamble.trim_end(), functions.as_str(), classes.as_str()],
            OutputOrder::ClassesFirst => [preamble.trim_end(), classes.as_str(), functions.as_str()],
        };
        let mut out = sections
            .into_iter()
            .filter(|section| !section.is_empty())
            .collect::<Vec<_>>()
            .join(&blank);
        if !out.is_empty() {
            out.push_str(line_ending);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::options::LineEnding;
    use crate::semantics::ProgramModel;
    use tscc_syntax::ast::Program;

    fn options() -> CodegenOptions {
        CodegenOptions::default().with_line_ending(LineEnding::Lf)
    }

    fn with_session(f: impl FnOnce(&mut EmitSession<'_>)) {
        let model = ProgramModel::build(&Program::default(), &[]).unwrap();
        let options = options();
        let mut session = EmitSession::new(&model, &options);
        f(&mut session);
    }

    // ========================================
    // Scope stack tests
    // ========================================

    #[test]
    fn test_popping_root_scope_underflows() {
        with_session(|session| {
            assert_eq!(
                session.pop_scope(),
                Err(CodegenError::ScopeUnderflow { context: "pop_scope" })
            );
        });
    }

    #[test]
    fn test_run_in_new_scope_isolates_text() {
        with_session(|session| {
            session.append("#include <cstdio>", AppendMode::LINE).unwrap();
            let fragment = session
                .fragment(|s| s.append("std::shared_ptr<tscc_Managed>", AppendMode::INLINE))
                .unwrap();
            assert_eq!(fragment, "std::shared_ptr<tscc_Managed>");
            assert_eq!(session.scope_depth(), 1);
        });
    }

    #[test]
    fn test_run_in_new_scope_pops_on_error() {
        with_session(|session| {
            let result = session.run_in_new_scope(|_| Err(CodegenError::semantic("boom", Span::default())));
            assert!(result.is_err());
            assert_eq!(session.scope_depth(), 1);
        });
    }

    // ========================================
    // Statement staging tests
    // ========================================

    #[test]
    fn test_statement_prelude_lands_above_statement() {
        let model = ProgramModel::build(&Program::default(), &[]).unwrap();
        let options = options();
        let mut session = EmitSession::new(&model, &options);
        session.push_scope(Some(CodeBuffer::with_depth(options.layout(), 1)));
        session.push_statement();
        session.append("f(&_tscc_temp_1);", AppendMode::INLINE).unwrap();
        session
            .with_statement_prelude(|s| s.append("i32 _tscc_temp_1;", AppendMode::LINE))
            .unwrap();
        session.pop_statement().unwrap();
        let body = session.pop_scope().unwrap();
        assert_eq!(body.text(), "    i32 _tscc_temp_1;\n    f(&_tscc_temp_1);\n");
    }

    #[test]
    fn test_prelude_outside_statement_is_an_error() {
        with_session(|session| {
            assert!(session.with_statement_prelude(|_| Ok(())).is_err());
        });
    }

    // ========================================
    // Record tests
    // ========================================

    #[test]
    fn test_nested_functions_are_rejected() {
        with_session(|session| {
            let layout = session.layout();
            let outer = FunctionRecord::new(layout, Some("void".into()), None, "outer".into());
            let inner = FunctionRecord::new(layout, Some("void".into()), None, "inner".into());
            session.begin_function(outer, Locals::new(None), None, Span::default()).unwrap();
            let err = session.begin_function(inner, Locals::new(None), None, Span::default());
            assert!(matches!(err, Err(CodegenError::ScopeDiscipline { .. })));
        });
    }

    #[test]
    fn test_finish_orders_sections() {
        let model = ProgramModel::build(&Program::default(), &[]).unwrap();
        for (order, expected) in [
            (
                OutputOrder::FunctionsFirst,
                "#include <cstdio>\n\nvoid f()\n{\n}\n\nclass tscc_A\n{\n};\n",
            ),
            (
                OutputOrder::ClassesFirst,
                "#include <cstdio>\n\nclass tscc_A\n{\n};\n\nvoid f()\n{\n}\n",
            ),
        ] {
            let options = options().with_output_order(order);
            let mut session = EmitSession::new(&model, &options);
            session.append("#include <cstdio>", AppendMode::LINE).unwrap();
            let record = FunctionRecord::new(session.layout(), Some("void".into()), None, "f".into());
            session.begin_function(record, Locals::new(None), None, Span::default()).unwrap();
            session.end_function(Span::default()).unwrap();
            session
                .begin_class(ClassRecord::new("tscc_A".into(), Default::default()), Span::default())
                .unwrap();
            session.end_class(Span::default()).unwrap();
            assert_eq!(session.finish().unwrap(), expected);
        }
    }

    #[test]
    fn test_finish_inside_open_class_fails() {
        let model = ProgramModel::build(&Program::default(), &[]).unwrap();
        let options = options();
        let mut session = EmitSession::new(&model, &options);
        session
            .begin_class(ClassRecord::new("tscc_A".into(), Default::default()), Span::default())
            .unwrap();
        assert!(session.finish().is_err());
    }
}
