//! Shareable metadata for `tscc_core::lang` registries.
//!
//! Every registry in this crate (decorators, builtins) is a `const` table of [`LangItemInfo`] entries keyed by
//! a stable id. This submodule provides the small metadata shape reused across them.
//!
//! ## Notes
//! - These types are `Copy` so registries can live in `const` tables.
//! - Metadata is meant for diagnostics and docs; enforcement lives in the lowering engine.

/// Describe the lifecycle status of a vocabulary item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stability {
    Stable,
}

/// Shared metadata shape for "registry-first" vocabulary items.
///
/// - stable identity (`id`)
/// - accepted spellings (`canonical` + `aliases`)
/// - documentation (`description`)
#[derive(Debug, Clone, Copy)]
pub struct LangItemInfo<Id> {
    pub id: Id,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub stability: Stability,
}

impl<Id: Copy + PartialEq> LangItemInfo<Id> {
    /// Whether `name` is the canonical spelling or one of the aliases.
    pub fn matches(&self, name: &str) -> bool {
        self.canonical == name || self.aliases.contains(&name)
    }
}

/// Resolve `name` against a registry table.
pub fn lookup<Id: Copy + PartialEq>(table: &[LangItemInfo<Id>], name: &str) -> Option<Id> {
    table.iter().find(|info| info.matches(name)).map(|info| info.id)
}

/// Find the registry entry for `id`.
pub fn entry<Id: Copy + PartialEq>(table: &'static [LangItemInfo<Id>], id: Id) -> Option<&'static LangItemInfo<Id>> {
    table.iter().find(|info| info.id == id)
}
