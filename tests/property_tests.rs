//! Property-based tests for the tscc lowering engine
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use proptest::prelude::*;
use tscc::ProgramModel;
use tscc::ast::{KeywordType, Program, Spanned, Statement};
use tscc::backend::emit::{AppendMode, EmitSession};
use tscc::backend::{CodegenOptions, CppCodegen, LineEnding};
use tscc_syntax::build::*;

fn lf() -> CppCodegen {
    CppCodegen::with_options(CodegenOptions::default().with_line_ending(LineEnding::Lf))
}

fn nested_blocks(depth: usize) -> Spanned<Statement> {
    (0..depth).fold(ret(None), |inner, _| block(vec![inner]))
}

fn materialize_prelude() -> Program {
    program(vec![
        type_alias("i32"),
        declare_function("i32", vec![param("v", keyword(KeywordType::Number))], ty("i32")),
        decorated(
            declare_function("addressof", vec![param("v", keyword(KeywordType::Number))], keyword(KeywordType::Number)),
            vec![decorator("extern_c", vec![])],
        ),
        decorated(
            declare_function("consume", vec![param("p", ptr(ty("i32")))], void()),
            vec![decorator("extern_c", vec![])],
        ),
    ])
}

// =============================================================================
// Naming Properties
// =============================================================================

proptest! {
    /// Property: every free function is emitted under the configured prefix, deterministically
    #[test]
    fn test_function_names_are_prefixed(name in "[a-z][a-z0-9_]{0,12}", prefix in "[a-z]{1,6}_") {
        let input = program(vec![function(&name, vec![], void(), vec![])]);
        let codegen = CppCodegen::with_options(
            CodegenOptions::default().with_line_ending(LineEnding::Lf).with_name_prefix(prefix.clone()),
        );
        let first = codegen.try_generate(&input, &[]).unwrap();
        let second = codegen.try_generate(&input, &[]).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first, format!("void {prefix}{name}()\n{{\n}}\n"));
    }

    /// Property: functions are printed in declaration order
    #[test]
    fn test_declaration_order_is_kept(count in 1usize..8) {
        let input = program((0..count).map(|i| function(&format!("f{i}"), vec![], void(), vec![])).collect());
        let cpp = lf().try_generate(&input, &[]).unwrap();
        let positions: Vec<usize> = (0..count)
            .map(|i| cpp.find(&format!("void tscc_f{i}()")).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

// =============================================================================
// Scope Properties
// =============================================================================

proptest! {
    /// Property: nested blocks balance their braces and indent one level per block
    #[test]
    fn test_nested_blocks_balance(depth in 0usize..10) {
        let input = program(vec![function("main", vec![], void(), vec![nested_blocks(depth)])]);
        let cpp = lf().try_generate(&input, &[]).unwrap();

        let opens = cpp.matches('{').count();
        let closes = cpp.matches('}').count();
        prop_assert_eq!(opens, depth + 1);
        prop_assert_eq!(opens, closes);

        let expected = format!("\n{}return;\n", " ".repeat(4 * (depth + 1)));
        prop_assert!(cpp.contains(&expected), "got:\n{}", cpp);
    }

    /// Property: any interleaving of pushes and pops leaves the root scope and its text intact
    #[test]
    fn test_scope_stack_returns_to_root(ops in prop::collection::vec(any::<bool>(), 0..40)) {
        let model = ProgramModel::build(&Program::default(), &[]).unwrap();
        let options = CodegenOptions::default().with_line_ending(LineEnding::Lf);
        let mut session = EmitSession::new(&model, &options);
        session.append("#include <cstdio>", AppendMode::LINE).unwrap();

        let mut open = 0usize;
        for (i, push) in ops.into_iter().enumerate() {
            if push {
                session.push_scope(None);
                session.append(&format!("fragment_{i}"), AppendMode::INLINE).unwrap();
                open += 1;
            } else if open > 0 {
                let popped = session.pop_scope().unwrap();
                prop_assert!(popped.text().starts_with("fragment_"), "got: {}", popped.text());
                prop_assert_eq!(popped.text().matches("fragment_").count(), 1);
                open -= 1;
            }
            prop_assert_eq!(session.scope_depth(), open + 1);
        }
        for _ in 0..open {
            session.pop_scope().unwrap();
        }
        prop_assert!(session.pop_scope().is_err());
        prop_assert_eq!(session.scope_depth(), 1);
        prop_assert_eq!(session.finish().unwrap(), "#include <cstdio>\n");
    }

    /// Property: materialized temporaries are numbered 1..=n in statement order
    #[test]
    fn test_temporaries_are_sequential(count in 1usize..6) {
        let make = function("make", vec![], ty("i32"), vec![ret(Some(call(ident("i32"), vec![num("1")])))]);
        let body = (0..count)
            .map(|_| {
                expr_stmt(call(
                    ident("consume"),
                    vec![call(ident("addressof"), vec![call(ident("make"), vec![])])],
                ))
            })
            .collect();
        let input = program(vec![make, function("main", vec![], void(), body)]);
        let prelude = materialize_prelude();
        let cpp = lf().try_generate(&input, &[&prelude]).unwrap();

        for i in 1..=count {
            let declaration = format!("    i32 _tscc_temp_{i};\n");
            prop_assert_eq!(cpp.matches(&declaration).count(), 1, "got:\n{}", cpp);
        }
        let next = format!("_tscc_temp_{}", count + 1);
        prop_assert!(!cpp.contains(&next));
    }
}
