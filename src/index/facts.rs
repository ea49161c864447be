//! Facts stored in a symbol index.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::{CallSiteId, DeclId, ExprId, FileId, TextRange};

// ============================================================================
// DECLARATIONS
// ============================================================================

/// The kind of a declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Class,
    Interface,
    /// An annotation type. Only these can act as markers.
    Annotation,
    Method,
    Constructor,
    Field,
}

impl DeclKind {
    pub fn is_type(self) -> bool {
        matches!(
            self,
            DeclKind::Class | DeclKind::Interface | DeclKind::Annotation
        )
    }

    pub fn is_callable(self) -> bool {
        matches!(self, DeclKind::Method | DeclKind::Constructor)
    }
}

/// Where a declaration lives.
///
/// Library declarations change far less often than project sources, which
/// lets library-derived results be cached for longer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Origin {
    #[default]
    Project,
    Library,
}

/// A reference to a type as written in a signature, e.g. `CommandMessage<PlaceOrder>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeName {
    pub qualified_name: Arc<str>,
    /// Generic type arguments, outermost first.
    pub arguments: Vec<TypeName>,
    /// `?`, `*` or another unbounded wildcard.
    pub wildcard: bool,
}

impl TypeName {
    pub fn new(qualified_name: impl Into<Arc<str>>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            arguments: Vec::new(),
            wildcard: false,
        }
    }

    pub fn generic(qualified_name: impl Into<Arc<str>>, arguments: Vec<TypeName>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            arguments,
            wildcard: false,
        }
    }

    pub fn wildcard() -> Self {
        Self {
            qualified_name: Arc::from("?"),
            arguments: Vec::new(),
            wildcard: true,
        }
    }

    pub fn has_arguments(&self) -> bool {
        !self.arguments.is_empty()
    }
}

/// A method or constructor parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: SmolStr,
    pub ty: TypeName,
}

impl Parameter {
    pub fn new(name: impl Into<SmolStr>, ty: TypeName) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// An annotation usage on a declaration, with its explicitly declared attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub qualified_name: Arc<str>,
    pub attributes: Vec<(SmolStr, ExprId)>,
}

impl Annotation {
    /// The expression given for `name`, if the usage declares it.
    pub fn attribute(&self, name: &str) -> Option<ExprId> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, expr)| *expr)
    }
}

/// A declaration known to the index.
#[derive(Clone, Debug)]
pub struct Declaration {
    pub id: DeclId,
    pub kind: DeclKind,
    /// Simple name. Constructors carry the name of their type.
    pub name: SmolStr,
    /// Qualified name; members are `<type>.<name>`.
    pub qualified_name: Arc<str>,
    /// Enclosing type for members, `None` for top-level types.
    pub container: Option<DeclId>,
    pub parameters: Vec<Parameter>,
    pub annotations: Vec<Annotation>,
    /// Declared supertypes, by qualified name. Resolution happens at query
    /// time because the name may map to several candidates.
    pub supertypes: Vec<Arc<str>>,
    /// Type of a field (or return type of a method), when known.
    pub ty: Option<TypeName>,
    /// Initializer of a constant field.
    pub initializer: Option<ExprId>,
    pub origin: Origin,
    pub file: FileId,
    pub range: TextRange,
}

impl Declaration {
    pub fn has_annotation(&self, qualified_name: &str) -> bool {
        self.annotations
            .iter()
            .any(|a| a.qualified_name.as_ref() == qualified_name)
    }

    pub fn annotation(&self, qualified_name: &str) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.qualified_name.as_ref() == qualified_name)
    }

    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == DeclKind::Constructor
    }
}

// ============================================================================
// CALL SITES AND EXPRESSIONS
// ============================================================================

/// A call or construction site.
#[derive(Clone, Debug)]
pub struct CallSite {
    pub id: CallSiteId,
    /// The invoked method or constructor.
    pub target: DeclId,
    /// The method or constructor whose body contains the site.
    pub enclosing: Option<DeclId>,
    pub arguments: Vec<ExprId>,
    pub file: FileId,
    pub range: TextRange,
}

/// The statically known shape of an expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprValue {
    /// `"text"`
    StringLiteral(String),
    /// Reference to a constant field by qualified name, e.g. `Names.PROCESSOR`.
    ConstantRef(Arc<str>),
    /// String concatenation of other expressions.
    Concat(Vec<ExprId>),
    /// `Foo.class` / `Foo::class`
    ClassLiteral(TypeName),
    /// Anything else. Keeps the source text for diagnostics.
    Opaque(String),
}

/// An expression used as call argument or annotation attribute value.
#[derive(Clone, Debug)]
pub struct Expression {
    pub id: ExprId,
    /// Static type of the expression, when known.
    pub ty: Option<TypeName>,
    pub value: ExprValue,
}

impl Expression {
    /// The referenced type of a class literal.
    pub fn class_literal(&self) -> Option<&TypeName> {
        match &self.value {
            ExprValue::ClassLiteral(ty) => Some(ty),
            _ => None,
        }
    }
}
