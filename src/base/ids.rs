//! Opaque identifiers handed out by a symbol index.
//!
//! The engine never interprets the numeric value of an id; it only compares,
//! hashes and passes them back to the index that produced them.

use std::fmt;

macro_rules! index_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        #[cfg(feature = "export")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u32(self.0)
            }
        }
    };
}

index_id!(
    /// A source file (compilation unit) known to the index.
    FileId,
    "file"
);
index_id!(
    /// A declaration: type, annotation type, method, constructor or field.
    DeclId,
    "decl"
);
index_id!(
    /// A call or construction site.
    CallSiteId,
    "site"
);
index_id!(
    /// An expression, such as a call argument or an annotation attribute value.
    ExprId,
    "expr"
);
