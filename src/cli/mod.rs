//! CLI module for the tscc compiler
//!
//! This module provides the command-line interface for the compiler.
//!
//! ## Commands
//!
//! - `emit <ast.json>` - Lower a typed AST to C++ and print or write it
//! - `check <ast.json>` - Lower without writing output
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::backend::{CodegenOptions, DestructorPolicy, LineEnding, OutputOrder, Pass};
use crate::version::TSCC_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Compiler backend from a typed scripting language to C++
#[derive(Parser, Debug)]
#[command(name = "tscc")]
#[command(version = TSCC_VERSION)]
#[command(about = "Lower typed ASTs to C++", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lower a typed AST (JSON) to C++
    Emit {
        /// Typed AST of the file to compile
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        lowering: LoweringArgs,
        /// Write the C++ source here instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Lower a typed AST without writing output
    Check {
        /// Typed AST of the file to check
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        lowering: LoweringArgs,
    },
}

/// Flags shared by every command that lowers a file.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct LoweringArgs {
    /// Declaration prelude (typed AST of a `.d.ts`-style file); may be repeated
    #[arg(long = "prelude", value_name = "FILE")]
    pub preludes: Vec<PathBuf>,

    /// Line terminator of the generated source
    #[arg(long, value_enum, default_value_t = LineEndingArg::Platform)]
    pub line_ending: LineEndingArg,

    /// Print classes before free functions
    #[arg(long)]
    pub classes_first: bool,

    /// Enable a rewrite pass (destructors, receiver, materialize)
    #[arg(long = "enable-pass", value_name = "PASS")]
    pub enable: Vec<Pass>,

    /// Disable a rewrite pass (destructors, receiver, materialize)
    #[arg(long = "disable-pass", value_name = "PASS")]
    pub disable: Vec<Pass>,

    /// Which class-typed locals get destructor calls
    #[arg(long = "destructors", value_enum, default_value_t = DestructorArg::All)]
    pub destructors: DestructorArg,

    /// Prefix of mangled names
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEndingArg {
    #[default]
    Platform,
    Lf,
    Crlf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DestructorArg {
    /// Every local whose class declares `destructor`
    #[default]
    All,
    /// Only locals of shared-heap (non-`@struct`) classes
    SharedHeap,
}

impl LoweringArgs {
    /// Map the flags onto code generation options.
    pub fn options(&self) -> CodegenOptions {
        let mut options = CodegenOptions::new()
            .with_line_ending(match self.line_ending {
                LineEndingArg::Platform => LineEnding::Platform,
                LineEndingArg::Lf => LineEnding::Lf,
                LineEndingArg::Crlf => LineEnding::CrLf,
            })
            .with_destructor_policy(match self.destructors {
                DestructorArg::All => DestructorPolicy::AllClasses,
                DestructorArg::SharedHeap => DestructorPolicy::SharedHeapOnly,
            });
        if self.classes_first {
            options = options.with_output_order(OutputOrder::ClassesFirst);
        }
        if let Some(prefix) = &self.prefix {
            options = options.with_name_prefix(prefix.clone());
        }
        for pass in &self.enable {
            options = options.with_pass(*pass);
        }
        for pass in &self.disable {
            options = options.without_pass(*pass);
        }
        options
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Emit {
            file,
            lowering,
            output,
        } => commands::emit_file(&file, &lowering, output.as_deref()),
        Command::Check { file, lowering } => commands::check_file(&file, &lowering),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::PassSet;

    #[test]
    fn test_cli_parse_emit() {
        let cli = Cli::try_parse_from(["tscc", "emit", "main.json", "--prelude", "libc.json", "-o", "main.cpp"]).unwrap();
        let Command::Emit { file, lowering, output } = cli.command else {
            panic!("Expected Emit command");
        };
        assert_eq!(file, PathBuf::from("main.json"));
        assert_eq!(lowering.preludes, vec![PathBuf::from("libc.json")]);
        assert_eq!(output, Some(PathBuf::from("main.cpp")));
    }

    #[test]
    fn test_cli_parse_check() {
        let cli = Cli::try_parse_from(["tscc", "check", "main.json"]).unwrap();
        assert!(matches!(cli.command, Command::Check { .. }));
    }

    #[test]
    fn test_default_flags_give_default_options() {
        assert_eq!(LoweringArgs::default().options(), CodegenOptions::default());
    }

    #[test]
    fn test_pass_flags() {
        let cli = Cli::try_parse_from([
            "tscc",
            "check",
            "main.json",
            "--enable-pass",
            "receiver",
            "--disable-pass",
            "destructors",
        ])
        .unwrap();
        let Command::Check { lowering, .. } = cli.command else {
            panic!("Expected Check command");
        };
        let expected = PassSet::default().with(Pass::ReceiverInjection).without(Pass::BlockScopeDestructors);
        assert_eq!(lowering.options().passes, expected);
    }

    #[test]
    fn test_layout_flags() {
        let cli = Cli::try_parse_from([
            "tscc",
            "emit",
            "main.json",
            "--line-ending",
            "crlf",
            "--classes-first",
            "--destructors",
            "shared-heap",
            "--prefix",
            "app_",
        ])
        .unwrap();
        let Command::Emit { lowering, .. } = cli.command else {
            panic!("Expected Emit command");
        };
        let options = lowering.options();
        assert_eq!(options.line_ending, LineEnding::CrLf);
        assert_eq!(options.output_order, OutputOrder::ClassesFirst);
        assert_eq!(options.destructor_policy, DestructorPolicy::SharedHeapOnly);
        assert_eq!(options.name_prefix, "app_");
    }

    #[test]
    fn test_unknown_pass_is_rejected() {
        assert!(Cli::try_parse_from(["tscc", "check", "main.json", "--enable-pass", "inline"]).is_err());
    }
}
