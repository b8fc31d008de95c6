//! Code generation options.
//!
//! Defaults reproduce the canonical output: `tscc_` name prefix, 4-space indentation, platform line endings, free
//! functions before classes, destructor synthesis and address-of materialization enabled.

use tscc_core::lang::conventions::{INDENT_WIDTH, NAME_PREFIX};

use super::emit::Layout;
use super::passes::{Pass, PassSet};

/// Line terminator written after each emitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\r\n` on Windows, `\n` elsewhere
    #[default]
    Platform,
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Platform => {
                if cfg!(windows) {
                    "\r\n"
                } else {
                    "\n"
                }
            }
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Order of the top-level sections after the include preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputOrder {
    #[default]
    FunctionsFirst,
    ClassesFirst,
}

/// Which class-typed locals get destructor calls synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DestructorPolicy {
    /// Every local whose class declares `destructor`
    #[default]
    AllClasses,
    /// Only shared-heap (non-`@struct`) classes
    SharedHeapOnly,
}

/// Code generation configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Prefix prepended to every mangled function and class name
    pub name_prefix: String,
    /// Number of spaces per indentation level
    pub indent_width: usize,
    pub line_ending: LineEnding,
    pub output_order: OutputOrder,
    /// Rewrite passes run on every body before emission
    pub passes: PassSet,
    pub destructor_policy: DestructorPolicy,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            name_prefix: NAME_PREFIX.to_string(),
            indent_width: INDENT_WIDTH,
            line_ending: LineEnding::default(),
            output_order: OutputOrder::default(),
            passes: PassSet::default(),
            destructor_policy: DestructorPolicy::default(),
        }
    }
}

impl CodegenOptions {
    /// Create options with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mangling prefix
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Set the indentation width
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn with_output_order(mut self, order: OutputOrder) -> Self {
        self.output_order = order;
        self
    }

    /// Replace the whole pass selection
    pub fn with_passes(mut self, passes: PassSet) -> Self {
        self.passes = passes;
        self
    }

    /// Enable a single pass on top of the current selection
    pub fn with_pass(mut self, pass: Pass) -> Self {
        self.passes = self.passes.with(pass);
        self
    }

    /// Disable a single pass
    pub fn without_pass(mut self, pass: Pass) -> Self {
        self.passes = self.passes.without(pass);
        self
    }

    pub fn with_destructor_policy(mut self, policy: DestructorPolicy) -> Self {
        self.destructor_policy = policy;
        self
    }

    /// Text layout derived from these options
    pub fn layout(&self) -> Layout {
        Layout {
            indent_width: self.indent_width,
            line_ending: self.line_ending.as_str(),
        }
    }
}
