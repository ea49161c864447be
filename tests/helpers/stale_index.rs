//! A [`SymbolIndex`] whose declarations can go stale without a revision bump.
//!
//! Editor-backed indexes invalidate declarations as soon as a file is
//! reparsed but only advance their revision once reindexing finishes. Cached
//! engine results must still hide stale declarations in between.

use parking_lot::RwLock;
use rustc_hash::FxHashSet;

use msgflow::index::{CallSite, Declaration, Expression, InMemoryIndex, TypeName};
use msgflow::{CallSiteId, DeclId, ExprId, MessageFlowEngine, Revision, SymbolIndex};

use super::fixtures::Fixture;

pub struct StaleIndex {
    inner: InMemoryIndex,
    stale: RwLock<FxHashSet<DeclId>>,
}

impl StaleIndex {
    pub fn new(inner: InMemoryIndex) -> Self {
        Self {
            inner,
            stale: RwLock::new(FxHashSet::default()),
        }
    }

    /// Mark `decl` invalid, leaving the revision untouched.
    pub fn invalidate(&self, decl: DeclId) {
        self.stale.write().insert(decl);
    }
}

impl SymbolIndex for StaleIndex {
    fn revision(&self) -> Revision {
        self.inner.revision()
    }

    fn declaration(&self, id: DeclId) -> Option<&Declaration> {
        self.inner.declaration(id)
    }

    fn call_site(&self, id: CallSiteId) -> Option<&CallSite> {
        self.inner.call_site(id)
    }

    fn expression(&self, id: ExprId) -> Option<&Expression> {
        self.inner.expression(id)
    }

    fn is_valid(&self, id: DeclId) -> bool {
        self.inner.is_valid(id) && !self.stale.read().contains(&id)
    }

    fn find_declarations_annotated_with(&self, annotation: &str) -> Vec<DeclId> {
        self.inner.find_declarations_annotated_with(annotation)
    }

    fn find_meta_annotated_by(&self, annotation: &str) -> Vec<DeclId> {
        self.inner.find_meta_annotated_by(annotation)
    }

    fn resolve_type(&self, qualified_name: &str) -> Vec<DeclId> {
        self.inner.resolve_type(qualified_name)
    }

    fn find_constructors(&self, ty: DeclId) -> Vec<DeclId> {
        self.inner.find_constructors(ty)
    }

    fn find_methods(&self, ty: DeclId) -> Vec<DeclId> {
        self.inner.find_methods(ty)
    }

    fn find_call_sites(&self, callee: DeclId) -> Vec<CallSiteId> {
        self.inner.find_call_sites(callee)
    }

    fn is_subtype(&self, sub: DeclId, sup: DeclId) -> bool {
        self.inner.is_subtype(sub, sup)
    }

    fn find_subtypes(&self, ty: DeclId) -> Vec<DeclId> {
        self.inner.find_subtypes(ty)
    }

    fn evaluate_constant_string(&self, expr: ExprId) -> Option<String> {
        self.inner.evaluate_constant_string(expr)
    }

    fn expression_type(&self, expr: ExprId) -> Option<&TypeName> {
        self.inner.expression_type(expr)
    }
}

impl Fixture {
    /// Engine over a [`StaleIndex`] wrapping this fixture's index.
    pub fn stale_engine(self) -> MessageFlowEngine<StaleIndex> {
        MessageFlowEngine::new(StaleIndex::new(self.index))
    }
}
