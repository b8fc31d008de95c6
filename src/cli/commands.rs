//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::Path;

use crate::backend::{CppCodegen, GenerationError};
use crate::cli::LoweringArgs;

use super::{CliError, CliResult, ExitCode};

/// Maximum AST file size (100 MB)
const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Read an input file into a string, with a size limit.
pub fn read_source(path: &Path) -> CliResult<String> {
    let display = path.display();
    let metadata = fs::metadata(path).map_err(|e| CliError::failure(format!("Cannot access file '{display}': {e}")))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Input file '{display}' is too large ({} bytes, max {MAX_SOURCE_SIZE} bytes)",
            metadata.len(),
        )));
    }

    fs::read_to_string(path).map_err(|e| CliError::failure(format!("Error reading file '{display}': {e}")))
}

/// Lower `file` with the preludes and options named by `args`.
fn lower(file: &Path, args: &LoweringArgs) -> CliResult<String> {
    let source = read_source(file)?;
    let preludes = args
        .preludes
        .iter()
        .map(|path| read_source(path))
        .collect::<CliResult<Vec<_>>>()?;
    let preludes: Vec<&str> = preludes.iter().map(String::as_str).collect();

    let codegen = CppCodegen::with_options(args.options());
    codegen
        .generate_from_json(&source, &preludes)
        .map_err(|e| report(file, e))
}

/// Render a generation error with miette's fancy handler.
fn report(file: &Path, error: GenerationError) -> CliError {
    let report = miette::Report::new(error);
    CliError::failure(format!("error in '{}':\n{report:?}", file.display()))
}

/// Emit generated C++ code, to `output` or stdout.
pub fn emit_file(file: &Path, args: &LoweringArgs, output: Option<&Path>) -> CliResult<ExitCode> {
    let cpp = lower(file, args)?;
    match output {
        Some(path) => {
            fs::write(path, cpp)
                .map_err(|e| CliError::failure(format!("Error writing file '{}': {e}", path.display())))?;
            tracing::info!(output = %path.display(), "C++ source written");
        }
        None => print!("{cpp}"),
    }
    Ok(ExitCode::SUCCESS)
}

/// Lower a file and discard the output.
pub fn check_file(file: &Path, args: &LoweringArgs) -> CliResult<ExitCode> {
    lower(file, args)?;
    println!("✓ Lowering succeeded");
    Ok(ExitCode::SUCCESS)
}
