//! Type compatibility over possibly ambiguous names.

use crate::index::SymbolIndex;

/// Assignability between qualified type names.
///
/// A name may resolve to several declarations (duplicate classes on the
/// classpath, a project class shadowing a library one). Every pair of
/// candidates is considered.
pub struct TypeCompat<'a, I: SymbolIndex + ?Sized> {
    index: &'a I,
}

impl<'a, I: SymbolIndex + ?Sized> TypeCompat<'a, I> {
    pub fn new(index: &'a I) -> Self {
        Self { index }
    }

    /// True when a value of type `source` can be used where `target` is
    /// expected. Reflexive on names, even ones the index does not know.
    pub fn assignable(&self, target: &str, source: &str) -> bool {
        if target == source {
            return true;
        }
        let targets = self.index.resolve_type(target);
        if targets.is_empty() {
            return false;
        }
        let sources = self.index.resolve_type(source);
        sources.iter().any(|&sub| {
            targets
                .iter()
                .any(|&sup| sub == sup || self.index.is_subtype(sub, sup))
        })
    }

    /// Assignable in either direction.
    pub fn compatible(&self, a: &str, b: &str) -> bool {
        self.assignable(a, b) || self.assignable(b, a)
    }
}
