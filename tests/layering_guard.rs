//! Layering guardrails to keep the shared crates independent of the compiler.
//!
//! `tscc_core` (vocabulary) depends on nothing, and `tscc_syntax` (AST shape) depends only on `tscc_core`. Neither may
//! pull in the `tscc` crate, or the frontend contract would drag the whole lowering engine along with it.

/// Names listed in the `[dependencies]` table of a manifest.
fn dependencies(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn test_core_has_no_dependencies() {
    let deps = dependencies(include_str!("../crates/tscc_core/Cargo.toml"));
    assert!(deps.is_empty(), "tscc_core must stay dependency-free, found {deps:?}");
}

#[test]
fn test_syntax_depends_only_on_core_and_serde() {
    let deps = dependencies(include_str!("../crates/tscc_syntax/Cargo.toml"));
    for dep in &deps {
        assert!(
            dep == "tscc_core" || dep == "serde",
            "`{dep}` must not appear in tscc_syntax [dependencies]"
        );
    }
}

#[test]
fn test_compiler_uses_shared_crates() {
    let deps = dependencies(include_str!("../Cargo.toml"));
    assert!(deps.iter().any(|dep| dep == "tscc_core"));
    assert!(deps.iter().any(|dep| dep == "tscc_syntax"));
}
