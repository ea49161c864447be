//! Marker forest: every annotation type that counts as a framework marker.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use super::ResolveContext;
use crate::index::{DeclKind, SymbolIndex};
use crate::model::{Marker, MessageKind, ResolvedMarker};

/// Resolved markers for one index revision.
///
/// Per marker, entries are in discovery order: the root first, then custom
/// annotations by increasing meta-annotation depth.
#[derive(Debug, Default)]
pub struct MarkerForest {
    by_marker: FxHashMap<Marker, Vec<Arc<ResolvedMarker>>>,
    by_name: FxHashMap<Arc<str>, Arc<ResolvedMarker>>,
}

impl MarkerForest {
    /// Every resolved annotation for `marker`, root first.
    pub fn markers(&self, marker: Marker) -> &[Arc<ResolvedMarker>] {
        self.by_marker.get(&marker).map(Vec::as_slice).unwrap_or_default()
    }

    /// The marker an annotation type was claimed by.
    pub fn get(&self, qualified_name: &str) -> Option<&Arc<ResolvedMarker>> {
        self.by_name.get(qualified_name)
    }

    pub fn marker_for_annotation(&self, qualified_name: &str) -> Option<Marker> {
        self.get(qualified_name).map(|resolved| resolved.marker)
    }

    /// Qualified names that count as `marker`.
    pub fn names(&self, marker: Marker) -> impl Iterator<Item = &str> {
        self.markers(marker)
            .iter()
            .map(|resolved| resolved.qualified_name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    fn claim(&mut self, resolved: Arc<ResolvedMarker>) {
        self.by_name
            .insert(resolved.qualified_name.clone(), resolved.clone());
        self.by_marker
            .entry(resolved.marker)
            .or_default()
            .push(resolved);
    }
}

/// Resolves the marker forest, cached per revision.
pub struct MarkerResolver<'a, I: SymbolIndex + ?Sized> {
    ctx: ResolveContext<'a, I>,
}

impl<'a, I: SymbolIndex + ?Sized> MarkerResolver<'a, I> {
    pub fn new(ctx: ResolveContext<'a, I>) -> Self {
        Self { ctx }
    }

    /// The forest for the index's current revision.
    pub fn forest(&self) -> Arc<MarkerForest> {
        let revision = self.ctx.index.revision();
        self.ctx
            .caches
            .markers
            .get_or_compute(revision, || Arc::new(self.compute()))
    }

    /// Resolved annotations for one marker.
    pub fn markers_for(&self, marker: Marker) -> Vec<Arc<ResolvedMarker>> {
        self.forest().markers(marker).to_vec()
    }

    /// Resolved annotations for the marker behind a handler kind.
    pub fn resolve_markers(&self, kind: MessageKind) -> Vec<Arc<ResolvedMarker>> {
        self.markers_for(kind.marker())
    }

    pub fn marker_for_annotation(&self, qualified_name: &str) -> Option<Marker> {
        self.forest().marker_for_annotation(qualified_name)
    }

    pub fn resolved_by_name(&self, qualified_name: &str) -> Option<Arc<ResolvedMarker>> {
        self.forest().get(qualified_name).cloned()
    }

    /// Every resolved annotation, grouped by marker in [`Marker::ALL`] order.
    pub fn all_markers(&self) -> Vec<Arc<ResolvedMarker>> {
        let forest = self.forest();
        Marker::ALL
            .iter()
            .flat_map(|marker| forest.markers(*marker).iter().cloned())
            .collect()
    }

    fn compute(&self) -> MarkerForest {
        let index = self.ctx.index;
        let mut forest = MarkerForest::default();
        // Doubles as the visited set, so meta-annotation cycles terminate.
        let mut claimed: FxHashSet<Arc<str>> = FxHashSet::default();

        for marker in Marker::ALL {
            let Some(root_name) = self.ctx.config.marker_name(marker) else {
                tracing::trace!(
                    "[MARKERS] {:?} has no name in {:?}",
                    marker,
                    self.ctx.config.version
                );
                continue;
            };
            let Some(root_id) = index.resolve_type(root_name).into_iter().find(|id| {
                index
                    .declaration(*id)
                    .is_some_and(|d| d.kind == DeclKind::Annotation)
            }) else {
                tracing::debug!("[MARKERS] root '{}' not in index", root_name);
                continue;
            };

            let root_name: Arc<str> = Arc::from(root_name);
            if !claimed.insert(root_name.clone()) {
                continue;
            }
            let root = Arc::new(ResolvedMarker::root(marker, root_id, root_name));
            forest.claim(root.clone());

            let mut queue = VecDeque::from([root]);
            while let Some(parent) = queue.pop_front() {
                for candidate in index.find_meta_annotated_by(&parent.qualified_name) {
                    let Some(decl) = index.declaration(candidate) else {
                        continue;
                    };
                    if decl.kind != DeclKind::Annotation {
                        continue;
                    }
                    if Marker::is_handler_root(&decl.qualified_name) {
                        continue;
                    }
                    if !claimed.insert(decl.qualified_name.clone()) {
                        tracing::trace!(
                            "[MARKERS] '{}' already claimed, skipped under {:?}",
                            decl.qualified_name,
                            marker
                        );
                        continue;
                    }
                    let child = Arc::new(ResolvedMarker {
                        marker,
                        declaration: candidate,
                        qualified_name: decl.qualified_name.clone(),
                        parent: Some(parent.clone()),
                    });
                    forest.claim(child.clone());
                    queue.push_back(child);
                }
            }
        }

        tracing::debug!("[MARKERS] resolved {} marker annotations", forest.len());
        forest
    }
}
