//! Guardrails for the vocabulary registries: every id has exactly one entry and spellings do not collide.

use tscc_core::lang::{builtins, decorators};

#[test]
fn test_builtin_spellings_are_unique() {
    let mut seen = std::collections::HashSet::new();
    for info in builtins::BUILTIN_FUNCTIONS {
        assert!(seen.insert(info.canonical), "duplicate builtin {}", info.canonical);
    }
}

#[test]
fn test_builtins_and_decorators_do_not_share_spellings() {
    for info in decorators::DECORATORS {
        assert!(
            builtins::from_str(info.canonical).is_none(),
            "decorator `{}` shadows a builtin",
            info.canonical
        );
    }
}
