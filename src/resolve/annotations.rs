//! Reading marker annotations and their attributes.
//!
//! A custom marker may carry attribute values on its own declaration, e.g.
//! `@ProcessingGroup("billing") annotation class BillingHandler`. Reading an
//! attribute therefore walks from the usage up through the annotation types
//! until one of them declares it.

use crate::index::{Annotation, Declaration, SymbolIndex, TypeName};
use crate::model::Marker;

use super::MarkerForest;

/// Guards against annotation types that annotate each other.
const MAX_META_DEPTH: usize = 16;

pub struct AnnotationReader<'a, I: SymbolIndex + ?Sized> {
    index: &'a I,
    forest: &'a MarkerForest,
}

impl<'a, I: SymbolIndex + ?Sized> AnnotationReader<'a, I> {
    pub fn new(index: &'a I, forest: &'a MarkerForest) -> Self {
        Self { index, forest }
    }

    /// The annotation on `decl` that counts as `marker`. The most specific
    /// (deepest) custom marker wins over its ancestors.
    pub fn marker_annotation<'d>(
        &self,
        decl: &'d Declaration,
        marker: Marker,
    ) -> Option<&'d Annotation> {
        self.forest
            .markers(marker)
            .iter()
            .rev()
            .find_map(|resolved| decl.annotation(&resolved.qualified_name))
    }

    pub fn has_marker(&self, decl: &Declaration, marker: Marker) -> bool {
        self.marker_annotation(decl, marker).is_some()
    }

    /// First annotation on `decl` that is any known marker.
    pub fn any_marker_annotation<'d>(&self, decl: &'d Declaration) -> Option<&'d Annotation> {
        decl.annotations
            .iter()
            .find(|annotation| self.forest.get(&annotation.qualified_name).is_some())
    }

    /// Constant value of `attribute` for the `marker` annotation on `decl`.
    ///
    /// If the usage does not declare the attribute, the annotation type's own
    /// annotations are consulted, recursively. A declared but non-constant
    /// value yields `None` without looking further.
    pub fn string_attribute(
        &self,
        decl: &Declaration,
        marker: Marker,
        attribute: &str,
    ) -> Option<String> {
        self.string_attribute_at(decl, marker, attribute, 0)
    }

    fn string_attribute_at(
        &self,
        decl: &Declaration,
        marker: Marker,
        attribute: &str,
        depth: usize,
    ) -> Option<String> {
        if depth > MAX_META_DEPTH {
            return None;
        }
        let annotation = self.marker_annotation(decl, marker)?;
        if let Some(expr) = annotation.attribute(attribute) {
            let value = self.index.evaluate_constant_string(expr);
            if value.is_none() {
                tracing::trace!(
                    "[ANNOTATIONS] {}.{} on '{}' is not a constant",
                    annotation.qualified_name,
                    attribute,
                    decl.qualified_name
                );
            }
            return value;
        }

        self.index
            .resolve_type(&annotation.qualified_name)
            .into_iter()
            .filter(|id| *id != decl.id)
            .filter_map(|id| self.index.declaration(id))
            .find_map(|meta| self.string_attribute_at(meta, marker, attribute, depth + 1))
    }

    /// Type named by a class-literal attribute, e.g. `payloadType = Foo.class`.
    pub fn class_attribute(&self, annotation: &Annotation, attribute: &str) -> Option<TypeName> {
        let expr = annotation.attribute(attribute)?;
        self.index
            .expression(expr)
            .and_then(|e| e.class_literal())
            .cloned()
    }
}
