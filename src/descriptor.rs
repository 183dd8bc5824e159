//! The schema descriptor interface the core consumes (§6). How a
//! descriptor is produced — derive macro, reflection, hand-written — is
//! external to this crate; only the trait shape is specified here.

use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Class,
    Map,
    List,
    Primitive,
    Enum,
}

/// Which primitive a `Kind::Primitive` (or `Kind::Enum`, treated as a
/// string) descriptor expects. Drives scalar coercion on decode (§4.C)
/// and literal formatting on encode (§4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Bool,
    Int,
    Float,
    Str,
    Char,
}

/// One recognized annotation kind: a comment to emit before the field's
/// key in block presentation (§4.D "Comment emission").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// One or more comment lines, emitted one per output line.
    Comment(Vec<String>),
}

/// Schema metadata for a structured type. Returned behind an `Rc` so that
/// recursive element descriptors (a class field whose type is itself a
/// class) can be handed back without borrowing from the parent.
pub trait Descriptor {
    fn kind(&self) -> Kind;

    /// Meaningful for `Kind::Class` only; `Map`/`List` are unbounded (§6).
    fn element_count(&self) -> usize {
        0
    }

    fn element_name(&self, index: usize) -> &str;

    fn element_descriptor(&self, index: usize) -> Rc<dyn Descriptor>;

    fn element_annotations(&self, index: usize) -> &[Annotation] {
        &[]
    }

    /// A human-readable name for this descriptor, used only in
    /// diagnostics (`Error::SchemaMismatch` paths).
    fn name(&self) -> &str {
        "<anonymous>"
    }

    /// Meaningful for `Kind::Primitive`/`Kind::Enum` only.
    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::Str
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A minimal hand-written descriptor, standing in for what a derive
    /// macro would generate (out of scope per `spec.md` §1).
    pub struct ClassDescriptor {
        pub type_name: &'static str,
        pub fields: Vec<(&'static str, Rc<dyn Descriptor>, Vec<Annotation>)>,
    }

    impl Descriptor for ClassDescriptor {
        fn kind(&self) -> Kind {
            Kind::Class
        }
        fn element_count(&self) -> usize {
            self.fields.len()
        }
        fn element_name(&self, index: usize) -> &str {
            self.fields[index].0
        }
        fn element_descriptor(&self, index: usize) -> Rc<dyn Descriptor> {
            self.fields[index].1.clone()
        }
        fn element_annotations(&self, index: usize) -> &[Annotation] {
            &self.fields[index].2
        }
        fn name(&self) -> &str {
            self.type_name
        }
    }

    pub struct PrimitiveDescriptor(pub &'static str, pub PrimitiveKind);

    impl PrimitiveDescriptor {
        pub fn str(name: &'static str) -> Self {
            PrimitiveDescriptor(name, PrimitiveKind::Str)
        }
    }

    impl Descriptor for PrimitiveDescriptor {
        fn kind(&self) -> Kind {
            Kind::Primitive
        }
        fn element_name(&self, _index: usize) -> &str {
            ""
        }
        fn element_descriptor(&self, _index: usize) -> Rc<dyn Descriptor> {
            unreachable!("primitive descriptors have no elements")
        }
        fn name(&self) -> &str {
            self.0
        }
        fn primitive_kind(&self) -> PrimitiveKind {
            self.1
        }
    }

    pub struct ListDescriptor {
        pub element: Rc<dyn Descriptor>,
    }

    impl Descriptor for ListDescriptor {
        fn kind(&self) -> Kind {
            Kind::List
        }
        fn element_name(&self, _index: usize) -> &str {
            ""
        }
        fn element_descriptor(&self, _index: usize) -> Rc<dyn Descriptor> {
            self.element.clone()
        }
        fn name(&self) -> &str {
            "list"
        }
    }

    pub struct MapDescriptor {
        pub value: Rc<dyn Descriptor>,
    }

    impl Descriptor for MapDescriptor {
        fn kind(&self) -> Kind {
            Kind::Map
        }
        fn element_name(&self, _index: usize) -> &str {
            ""
        }
        fn element_descriptor(&self, _index: usize) -> Rc<dyn Descriptor> {
            self.value.clone()
        }
        fn name(&self) -> &str {
            "map"
        }
    }
}
