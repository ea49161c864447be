use std::sync::Arc;

use super::Marker;
use crate::base::DeclId;

/// A concrete annotation declaration that counts as a [`Marker`].
///
/// `parent` is the broader marker it was discovered under; the built-in
/// framework annotation is the root and has no parent.
#[derive(Clone, Debug)]
pub struct ResolvedMarker {
    pub marker: Marker,
    pub declaration: DeclId,
    pub qualified_name: Arc<str>,
    pub parent: Option<Arc<ResolvedMarker>>,
}

impl ResolvedMarker {
    pub fn root(marker: Marker, declaration: DeclId, qualified_name: Arc<str>) -> Self {
        Self {
            marker,
            declaration,
            qualified_name,
            parent: None,
        }
    }

    /// Number of meta-annotation hops between this marker and its root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent.as_deref();
        while let Some(parent) = current {
            depth += 1;
            current = parent.parent.as_deref();
        }
        depth
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

// Identity is the qualified name: the same annotation type reached through
// two different candidates is still one marker.
impl PartialEq for ResolvedMarker {
    fn eq(&self, other: &Self) -> bool {
        self.qualified_name == other.qualified_name
    }
}

impl Eq for ResolvedMarker {}

impl std::hash::Hash for ResolvedMarker {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.qualified_name.hash(state);
    }
}
