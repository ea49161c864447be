//! Symbol index: the engine's view of the analysed codebase.
//!
//! The resolvers only ever talk to a [`SymbolIndex`]. How the facts are
//! produced (compiler frontend, language server, build database) is up to the
//! host. [`InMemoryIndex`] is a reference implementation over explicitly
//! registered facts.
//!
//! ## Key Types
//!
//! - [`SymbolIndex`] - Query trait consumed by every resolver
//! - [`Declaration`] - A type, annotation type, method, constructor or field
//! - [`CallSite`] - A call or construction site with its arguments
//! - [`Expression`] - An argument or annotation attribute value

mod facts;
mod memory;

pub use facts::{
    Annotation, CallSite, DeclKind, Declaration, ExprValue, Expression, Origin, Parameter,
    TypeName,
};
pub use memory::InMemoryIndex;

use crate::base::{CallSiteId, DeclId, ExprId, Revision};

/// Declaration lookup, annotation metadata, inheritance and call-site search.
///
/// Implementations must be cheap to query concurrently; the engine calls
/// them from whichever thread issues a query.
pub trait SymbolIndex: Send + Sync {
    /// Current mutation state. Must change whenever any answer below may
    /// change.
    fn revision(&self) -> Revision;

    fn declaration(&self, id: DeclId) -> Option<&Declaration>;

    fn call_site(&self, id: CallSiteId) -> Option<&CallSite>;

    fn expression(&self, id: ExprId) -> Option<&Expression>;

    /// False once the declaration's source has been removed or replaced.
    fn is_valid(&self, id: DeclId) -> bool;

    /// Methods and constructors directly annotated with `annotation`.
    fn find_declarations_annotated_with(&self, annotation: &str) -> Vec<DeclId>;

    /// Type declarations (including annotation types) carrying `annotation`.
    fn find_meta_annotated_by(&self, annotation: &str) -> Vec<DeclId>;

    /// All type declarations with this qualified name. Not necessarily unique.
    fn resolve_type(&self, qualified_name: &str) -> Vec<DeclId>;

    fn find_constructors(&self, ty: DeclId) -> Vec<DeclId>;

    fn find_methods(&self, ty: DeclId) -> Vec<DeclId>;

    /// Every call site whose target is `callee`.
    fn find_call_sites(&self, callee: DeclId) -> Vec<CallSiteId>;

    /// Transitive, non-reflexive nominal subtyping between two type declarations.
    fn is_subtype(&self, sub: DeclId, sup: DeclId) -> bool;

    /// Every transitive subtype (class or interface inheritor) of `ty`.
    fn find_subtypes(&self, ty: DeclId) -> Vec<DeclId>;

    /// Nearest method or constructor lexically containing the site.
    fn enclosing_declaration(&self, site: CallSiteId) -> Option<DeclId> {
        self.call_site(site).and_then(|site| site.enclosing)
    }

    /// Statically evaluate a string expression. `None` when the value depends
    /// on anything the index cannot fold.
    fn evaluate_constant_string(&self, expr: ExprId) -> Option<String>;

    /// Qualified name of the type an expression evaluates to.
    fn expression_type(&self, expr: ExprId) -> Option<&TypeName> {
        self.expression(expr).and_then(|e| e.ty.as_ref())
    }
}
