//! In-memory reference implementation of [`SymbolIndex`].
//!
//! Facts are registered explicitly. Every mutation advances the revision so
//! that engine caches built on top of the index are invalidated.

use std::collections::VecDeque;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::SymbolIndex;
use super::facts::{
    Annotation, CallSite, DeclKind, Declaration, ExprValue, Expression, Origin, Parameter,
    TypeName,
};
use crate::base::{CallSiteId, DeclId, ExprId, FileId, Generation, Revision, TextRange};
use crate::error::{IndexError, IndexResult};

/// Nesting limit when folding constant expressions that reference each other.
const MAX_CONSTANT_DEPTH: usize = 16;

#[derive(Clone, Debug)]
struct FileEntry {
    origin: Origin,
    declarations: Vec<DeclId>,
    call_sites: Vec<CallSiteId>,
}

/// A [`SymbolIndex`] over explicitly registered facts.
///
/// Declarations and call sites are stored in vectors and referenced by
/// index from all other maps. Removing a file marks its entries invalid
/// rather than compacting, so ids stay stable.
#[derive(Debug)]
pub struct InMemoryIndex {
    files: FxHashMap<FileId, FileEntry>,
    next_file: u32,
    declarations: Vec<Declaration>,
    removed: FxHashSet<DeclId>,
    /// Type declarations by qualified name (IndexMap keeps registration order).
    types_by_name: IndexMap<Arc<str>, Vec<DeclId>>,
    /// Annotation qualified name -> declarations carrying it.
    annotated: FxHashMap<Arc<str>, Vec<DeclId>>,
    /// Supertype qualified name -> types naming it directly.
    subtypes_by_name: FxHashMap<Arc<str>, Vec<DeclId>>,
    /// Type -> member declarations.
    members: FxHashMap<DeclId, Vec<DeclId>>,
    /// Field qualified name -> field declarations.
    fields_by_name: FxHashMap<Arc<str>, Vec<DeclId>>,
    call_sites: Vec<CallSite>,
    removed_sites: FxHashSet<CallSiteId>,
    /// Callee -> call sites targeting it.
    callers: FxHashMap<DeclId, Vec<CallSiteId>>,
    expressions: Vec<Expression>,
    string_type: Arc<str>,
    generation: Generation,
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIndex {
    /// Create an empty index using `java.lang.String` as the string type.
    pub fn new() -> Self {
        Self::with_string_type("java.lang.String")
    }

    /// Create an empty index whose string literals have the given type.
    pub fn with_string_type(string_type: impl Into<Arc<str>>) -> Self {
        Self {
            files: FxHashMap::default(),
            next_file: 0,
            declarations: Vec::new(),
            removed: FxHashSet::default(),
            types_by_name: IndexMap::new(),
            annotated: FxHashMap::default(),
            subtypes_by_name: FxHashMap::default(),
            members: FxHashMap::default(),
            fields_by_name: FxHashMap::default(),
            call_sites: Vec::new(),
            removed_sites: FxHashSet::default(),
            callers: FxHashMap::default(),
            expressions: Vec::new(),
            string_type: string_type.into(),
            generation: Generation::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------------

    /// Register a new, empty source unit.
    pub fn add_file(&mut self, origin: Origin) -> FileId {
        let id = FileId::new(self.next_file);
        self.next_file += 1;
        self.files.insert(
            id,
            FileEntry {
                origin,
                declarations: Vec::new(),
                call_sites: Vec::new(),
            },
        );
        self.bump(origin);
        id
    }

    /// Remove a file. Its declarations become invalid and its call sites
    /// disappear from every search.
    pub fn remove_file(&mut self, file: FileId) -> IndexResult<()> {
        let entry = self.files.remove(&file).ok_or(IndexError::UnknownFile(file))?;

        for &id in &entry.declarations {
            self.removed.insert(id);
            let Some(decl) = self.declarations.get(id.raw() as usize) else {
                continue;
            };
            let qname = decl.qualified_name.clone();
            let annotations: Vec<Arc<str>> = decl
                .annotations
                .iter()
                .map(|a| a.qualified_name.clone())
                .collect();
            let supertypes = decl.supertypes.clone();
            let container = decl.container;

            self.types_by_name.retain_value(&qname, id);
            self.fields_by_name.retain_value(&qname, id);
            for name in annotations {
                self.annotated.retain_value(&name, id);
            }
            for name in supertypes {
                self.subtypes_by_name.retain_value(&name, id);
            }
            if let Some(owner) = container {
                if let Some(list) = self.members.get_mut(&owner) {
                    list.retain(|&m| m != id);
                }
            }
            self.members.remove(&id);
        }

        for &site in &entry.call_sites {
            self.removed_sites.insert(site);
            if let Some(target) = self.call_sites.get(site.raw() as usize).map(|s| s.target) {
                if let Some(list) = self.callers.get_mut(&target) {
                    list.retain(|&s| s != site);
                }
            }
        }

        tracing::debug!(
            "[INDEX] removed {:?}: {} declarations, {} call sites",
            file,
            entry.declarations.len(),
            entry.call_sites.len()
        );
        self.bump(entry.origin);
        Ok(())
    }

    /// Record an edit to `file` that did not change any registered fact.
    pub fn mark_changed(&mut self, file: FileId) -> IndexResult<()> {
        let origin = self.file_origin(file)?;
        self.bump(origin);
        Ok(())
    }

    /// Record a dependency/classpath change.
    pub fn mark_libraries_changed(&mut self) {
        self.generation.bump_library();
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    pub fn add_class(&mut self, file: FileId, qualified_name: &str) -> IndexResult<DeclId> {
        self.add_type(file, DeclKind::Class, qualified_name)
    }

    pub fn add_interface(&mut self, file: FileId, qualified_name: &str) -> IndexResult<DeclId> {
        self.add_type(file, DeclKind::Interface, qualified_name)
    }

    pub fn add_annotation_type(
        &mut self,
        file: FileId,
        qualified_name: &str,
    ) -> IndexResult<DeclId> {
        self.add_type(file, DeclKind::Annotation, qualified_name)
    }

    fn add_type(&mut self, file: FileId, kind: DeclKind, qualified_name: &str) -> IndexResult<DeclId> {
        validate_qualified_name(qualified_name)?;
        let qname: Arc<str> = Arc::from(qualified_name);
        let name = crate::model::short_name(qualified_name);
        let id = self.push_declaration(file, kind, SmolStr::new(name), qname.clone(), None, Vec::new())?;
        self.types_by_name.entry(qname).or_default().push(id);
        Ok(id)
    }

    /// Declare that `ty` extends or implements the type named `supertype`.
    pub fn add_supertype(&mut self, ty: DeclId, supertype: &str) -> IndexResult<()> {
        validate_qualified_name(supertype)?;
        let decl = self.declaration_mut(ty)?;
        if !decl.kind.is_type() {
            return Err(IndexError::NotAType(ty));
        }
        let supertype: Arc<str> = Arc::from(supertype);
        decl.supertypes.push(supertype.clone());
        let file = decl.file;
        self.subtypes_by_name.entry(supertype).or_default().push(ty);
        self.bump_file(file);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------------

    pub fn add_method(
        &mut self,
        owner: DeclId,
        name: &str,
        parameters: Vec<Parameter>,
    ) -> IndexResult<DeclId> {
        self.add_member(owner, DeclKind::Method, name, parameters)
    }

    pub fn add_constructor(
        &mut self,
        owner: DeclId,
        parameters: Vec<Parameter>,
    ) -> IndexResult<DeclId> {
        let name = self.declaration_checked(owner)?.name.clone();
        self.add_member(owner, DeclKind::Constructor, &name, parameters)
    }

    /// Add a field. A field with an initializer acts as a named constant.
    pub fn add_field(
        &mut self,
        owner: DeclId,
        name: &str,
        ty: TypeName,
        initializer: Option<ExprId>,
    ) -> IndexResult<DeclId> {
        if let Some(expr) = initializer {
            self.expression_checked(expr)?;
        }
        let id = self.add_member(owner, DeclKind::Field, name, Vec::new())?;
        let decl = &mut self.declarations[id.raw() as usize];
        decl.ty = Some(ty);
        decl.initializer = initializer;
        let qname = decl.qualified_name.clone();
        self.fields_by_name.entry(qname).or_default().push(id);
        Ok(id)
    }

    fn add_member(
        &mut self,
        owner: DeclId,
        kind: DeclKind,
        name: &str,
        parameters: Vec<Parameter>,
    ) -> IndexResult<DeclId> {
        let owner_decl = self.declaration_checked(owner)?;
        if !owner_decl.kind.is_type() {
            return Err(IndexError::NotAType(owner));
        }
        let file = owner_decl.file;
        let qname: Arc<str> = Arc::from(format!("{}.{}", owner_decl.qualified_name, name));
        let id = self.push_declaration(file, kind, SmolStr::new(name), qname, Some(owner), parameters)?;
        self.members.entry(owner).or_default().push(id);
        Ok(id)
    }

    fn push_declaration(
        &mut self,
        file: FileId,
        kind: DeclKind,
        name: SmolStr,
        qualified_name: Arc<str>,
        container: Option<DeclId>,
        parameters: Vec<Parameter>,
    ) -> IndexResult<DeclId> {
        let entry = self.files.get_mut(&file).ok_or(IndexError::UnknownFile(file))?;
        let id = DeclId::new(self.declarations.len() as u32);
        entry.declarations.push(id);
        let origin = entry.origin;
        self.declarations.push(Declaration {
            id,
            kind,
            name,
            qualified_name,
            container,
            parameters,
            annotations: Vec::new(),
            supertypes: Vec::new(),
            ty: None,
            initializer: None,
            origin,
            file,
            range: TextRange::default(),
        });
        self.bump(origin);
        Ok(id)
    }

    /// Attach an annotation usage to any declaration.
    pub fn annotate(
        &mut self,
        decl: DeclId,
        annotation: &str,
        attributes: &[(&str, ExprId)],
    ) -> IndexResult<()> {
        validate_qualified_name(annotation)?;
        for (_, expr) in attributes {
            self.expression_checked(*expr)?;
        }
        let qname: Arc<str> = Arc::from(annotation);
        let target = self.declaration_mut(decl)?;
        target.annotations.push(Annotation {
            qualified_name: qname.clone(),
            attributes: attributes
                .iter()
                .map(|(name, expr)| (SmolStr::new(name), *expr))
                .collect(),
        });
        let file = target.file;
        let list = self.annotated.entry(qname).or_default();
        if !list.contains(&decl) {
            list.push(decl);
        }
        self.bump_file(file);
        Ok(())
    }

    /// Set the source range of a declaration.
    pub fn set_declaration_range(&mut self, decl: DeclId, range: TextRange) -> IndexResult<()> {
        self.declaration_mut(decl)?.range = range;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    pub fn add_expression(&mut self, value: ExprValue, ty: Option<TypeName>) -> ExprId {
        let id = ExprId::new(self.expressions.len() as u32);
        self.expressions.push(Expression { id, ty, value });
        id
    }

    /// `"text"`
    pub fn string_literal(&mut self, text: &str) -> ExprId {
        let ty = TypeName::new(self.string_type.clone());
        self.add_expression(ExprValue::StringLiteral(text.to_string()), Some(ty))
    }

    /// Reference to a string constant field, e.g. `Names.PROCESSOR`.
    pub fn constant_ref(&mut self, qualified_name: &str) -> ExprId {
        let ty = TypeName::new(self.string_type.clone());
        self.add_expression(ExprValue::ConstantRef(Arc::from(qualified_name)), Some(ty))
    }

    /// String concatenation of previously registered expressions.
    pub fn concat(&mut self, parts: Vec<ExprId>) -> IndexResult<ExprId> {
        for part in &parts {
            self.expression_checked(*part)?;
        }
        let ty = TypeName::new(self.string_type.clone());
        Ok(self.add_expression(ExprValue::Concat(parts), Some(ty)))
    }

    /// `Type.class`
    pub fn class_literal(&mut self, qualified_name: &str) -> ExprId {
        let ty = TypeName::new(qualified_name);
        self.add_expression(
            ExprValue::ClassLiteral(ty.clone()),
            Some(TypeName::generic("java.lang.Class", vec![ty])),
        )
    }

    /// An expression whose value is unknown but whose static type is `qualified_name`.
    pub fn typed(&mut self, text: &str, qualified_name: &str) -> ExprId {
        self.add_expression(
            ExprValue::Opaque(text.to_string()),
            Some(TypeName::new(qualified_name)),
        )
    }

    // ------------------------------------------------------------------------
    // Call sites
    // ------------------------------------------------------------------------

    /// Register a call to `target` inside the body of `enclosing`.
    pub fn add_call(
        &mut self,
        enclosing: DeclId,
        target: DeclId,
        arguments: Vec<ExprId>,
    ) -> IndexResult<CallSiteId> {
        let decl = self.declaration_checked(enclosing)?;
        if !decl.kind.is_callable() {
            return Err(IndexError::NotCallable(enclosing));
        }
        let file = decl.file;
        self.push_call(file, Some(enclosing), target, arguments)
    }

    /// Register a call outside any method body (field initializer, script).
    pub fn add_top_level_call(
        &mut self,
        file: FileId,
        target: DeclId,
        arguments: Vec<ExprId>,
    ) -> IndexResult<CallSiteId> {
        self.push_call(file, None, target, arguments)
    }

    fn push_call(
        &mut self,
        file: FileId,
        enclosing: Option<DeclId>,
        target: DeclId,
        arguments: Vec<ExprId>,
    ) -> IndexResult<CallSiteId> {
        let target_decl = self.declaration_checked(target)?;
        if !target_decl.kind.is_callable() {
            return Err(IndexError::NotCallable(target));
        }
        for arg in &arguments {
            self.expression_checked(*arg)?;
        }
        let entry = self.files.get_mut(&file).ok_or(IndexError::UnknownFile(file))?;
        let id = CallSiteId::new(self.call_sites.len() as u32);
        entry.call_sites.push(id);
        let origin = entry.origin;
        self.call_sites.push(CallSite {
            id,
            target,
            enclosing,
            arguments,
            file,
            range: TextRange::default(),
        });
        self.callers.entry(target).or_default().push(id);
        self.bump(origin);
        Ok(id)
    }

    /// Set the source range of a call site.
    pub fn set_call_range(&mut self, site: CallSiteId, range: TextRange) -> IndexResult<()> {
        if self.removed_sites.contains(&site) {
            return Err(IndexError::UnknownCallSite(site));
        }
        let call = self
            .call_sites
            .get_mut(site.raw() as usize)
            .ok_or(IndexError::UnknownCallSite(site))?;
        call.range = range;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    /// Number of live declarations.
    pub fn declaration_count(&self) -> usize {
        self.declarations.len() - self.removed.len()
    }

    /// Iterate over every live declaration.
    pub fn all_declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations
            .iter()
            .filter(|d| !self.removed.contains(&d.id))
    }

    pub fn file_origin(&self, file: FileId) -> IndexResult<Origin> {
        self.files
            .get(&file)
            .map(|entry| entry.origin)
            .ok_or(IndexError::UnknownFile(file))
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn bump(&self, origin: Origin) {
        match origin {
            Origin::Project => self.generation.bump_source(),
            Origin::Library => self.generation.bump_library(),
        };
    }

    fn bump_file(&self, file: FileId) {
        let origin = self.files.get(&file).map_or(Origin::Project, |e| e.origin);
        self.bump(origin);
    }

    fn declaration_checked(&self, id: DeclId) -> IndexResult<&Declaration> {
        if self.removed.contains(&id) {
            return Err(IndexError::StaleDeclaration(id));
        }
        self.declarations
            .get(id.raw() as usize)
            .ok_or(IndexError::UnknownDeclaration(id))
    }

    fn declaration_mut(&mut self, id: DeclId) -> IndexResult<&mut Declaration> {
        if self.removed.contains(&id) {
            return Err(IndexError::StaleDeclaration(id));
        }
        self.declarations
            .get_mut(id.raw() as usize)
            .ok_or(IndexError::UnknownDeclaration(id))
    }

    fn expression_checked(&self, id: ExprId) -> IndexResult<&Expression> {
        self.expressions
            .get(id.raw() as usize)
            .ok_or(IndexError::UnknownExpression(id))
    }

    fn live(&self, ids: Option<&Vec<DeclId>>) -> impl Iterator<Item = &Declaration> {
        ids.into_iter()
            .flatten()
            .filter(|id| !self.removed.contains(*id))
            .filter_map(|id| self.declarations.get(id.raw() as usize))
    }

    fn members_of(&self, ty: DeclId, kind: DeclKind) -> Vec<DeclId> {
        self.live(self.members.get(&ty))
            .filter(|d| d.kind == kind)
            .map(|d| d.id)
            .collect()
    }

    fn fold_string(&self, expr: ExprId, depth: usize) -> Option<String> {
        if depth > MAX_CONSTANT_DEPTH {
            return None;
        }
        match &self.expressions.get(expr.raw() as usize)?.value {
            ExprValue::StringLiteral(text) => Some(text.clone()),
            ExprValue::ConstantRef(name) => {
                let field = self.live(self.fields_by_name.get(name)).next()?;
                self.fold_string(field.initializer?, depth + 1)
            }
            ExprValue::Concat(parts) => parts
                .iter()
                .map(|part| self.fold_string(*part, depth + 1))
                .collect(),
            ExprValue::ClassLiteral(_) | ExprValue::Opaque(_) => None,
        }
    }
}

impl SymbolIndex for InMemoryIndex {
    fn revision(&self) -> Revision {
        self.generation.current()
    }

    fn declaration(&self, id: DeclId) -> Option<&Declaration> {
        self.declarations.get(id.raw() as usize)
    }

    fn call_site(&self, id: CallSiteId) -> Option<&CallSite> {
        if self.removed_sites.contains(&id) {
            return None;
        }
        self.call_sites.get(id.raw() as usize)
    }

    fn expression(&self, id: ExprId) -> Option<&Expression> {
        self.expressions.get(id.raw() as usize)
    }

    fn is_valid(&self, id: DeclId) -> bool {
        (id.raw() as usize) < self.declarations.len() && !self.removed.contains(&id)
    }

    fn find_declarations_annotated_with(&self, annotation: &str) -> Vec<DeclId> {
        self.live(self.annotated.get(annotation))
            .filter(|d| d.kind.is_callable())
            .map(|d| d.id)
            .collect()
    }

    fn find_meta_annotated_by(&self, annotation: &str) -> Vec<DeclId> {
        self.live(self.annotated.get(annotation))
            .filter(|d| d.kind.is_type())
            .map(|d| d.id)
            .collect()
    }

    fn resolve_type(&self, qualified_name: &str) -> Vec<DeclId> {
        self.live(self.types_by_name.get(qualified_name))
            .map(|d| d.id)
            .collect()
    }

    fn find_constructors(&self, ty: DeclId) -> Vec<DeclId> {
        self.members_of(ty, DeclKind::Constructor)
    }

    fn find_methods(&self, ty: DeclId) -> Vec<DeclId> {
        self.members_of(ty, DeclKind::Method)
    }

    fn find_call_sites(&self, callee: DeclId) -> Vec<CallSiteId> {
        self.callers
            .get(&callee)
            .map(|sites| {
                sites
                    .iter()
                    .copied()
                    .filter(|site| !self.removed_sites.contains(site))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn is_subtype(&self, sub: DeclId, sup: DeclId) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack = vec![sub];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(decl) = self.declaration(current) else {
                continue;
            };
            for name in &decl.supertypes {
                for candidate in self.resolve_type(name) {
                    if candidate == sup {
                        return true;
                    }
                    stack.push(candidate);
                }
            }
        }
        false
    }

    fn find_subtypes(&self, ty: DeclId) -> Vec<DeclId> {
        let Some(root) = self.declaration(ty) else {
            return Vec::new();
        };
        let mut found = Vec::new();
        let mut visited: FxHashSet<DeclId> = FxHashSet::default();
        visited.insert(ty);
        let mut queue = VecDeque::from([root.qualified_name.clone()]);
        while let Some(name) = queue.pop_front() {
            for sub in self.live(self.subtypes_by_name.get(&name)) {
                if visited.insert(sub.id) {
                    found.push(sub.id);
                    queue.push_back(sub.qualified_name.clone());
                }
            }
        }
        found
    }

    fn evaluate_constant_string(&self, expr: ExprId) -> Option<String> {
        self.fold_string(expr, 0)
    }
}

/// Shared removal logic for the Fx and insertion-ordered multimaps.
trait MapLike {
    fn retain_value(&mut self, key: &Arc<str>, id: DeclId);
}

impl MapLike for FxHashMap<Arc<str>, Vec<DeclId>> {
    fn retain_value(&mut self, key: &Arc<str>, id: DeclId) {
        if let Some(list) = self.get_mut(key) {
            list.retain(|&d| d != id);
            if list.is_empty() {
                self.remove(key);
            }
        }
    }
}

impl MapLike for IndexMap<Arc<str>, Vec<DeclId>> {
    fn retain_value(&mut self, key: &Arc<str>, id: DeclId) {
        if let Some(list) = self.get_mut(key) {
            list.retain(|&d| d != id);
            if list.is_empty() {
                self.shift_remove(key);
            }
        }
    }
}

fn validate_qualified_name(name: &str) -> IndexResult<()> {
    let valid = !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c == '_' || c == '$' || unicode_ident::is_xid_start(c))
                && chars.all(|c| c == '$' || unicode_ident::is_xid_continue(c))
        });
    if valid {
        Ok(())
    } else {
        Err(IndexError::InvalidName(name.to_string()))
    }
}
