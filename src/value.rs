//! The dynamic YAML tree (§3).
//!
//! Generalized from the teacher's tag/anchor-carrying `NodeData` enum
//! (`src/yaml.rs`) down to a tag-free tree, per `spec.md`'s Non-goals
//! (no anchors/aliases/tags).

/// How a scalar was quoted in the source, retained only to decide
/// coercion rules on decode (a plain `null` is `Null`; a quoted `"null"`
/// is the string `"null"`). Never affects equality — see the hand-rolled
/// `PartialEq` below, which backs the round-trip invariant (§8.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
}

#[derive(Debug, Clone)]
pub enum Element {
    Null,
    Scalar(String, ScalarStyle),
    Sequence(Vec<Element>),
    /// Insertion order is significant and preserved; a `Vec` of pairs
    /// rather than a hash map, mirroring the order-preserving sequences
    /// the teacher keeps for mapping nodes in `document.rs`.
    Mapping(Vec<(Element, Element)>),
}

impl Element {
    pub fn scalar(text: impl Into<String>) -> Element {
        Element::Scalar(text.into(), ScalarStyle::Plain)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Element::Scalar(s, _) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Element::Null)
    }

    /// Looks up a mapping entry by scalar key text. `None` if this isn't
    /// a mapping or the key isn't present.
    pub fn get(&self, key: &str) -> Option<&Element> {
        match self {
            Element::Mapping(pairs) => pairs
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Structural equality that ignores scalar style: `Scalar("x", Plain) ==
/// Scalar("x", DoubleQuoted)`. This is deliberate — it is what backs the
/// round-trip invariant (§8.1), since re-encoding a tree is free to pick
/// a different quoting style than the source used. Null-vs-`"null"`
/// (§8.2) is unaffected because those are different *variants*, not a
/// style difference on the same variant.
impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Element::Null, Element::Null) => true,
            (Element::Scalar(a, _), Element::Scalar(b, _)) => a == b,
            (Element::Sequence(a), Element::Sequence(b)) => a == b,
            (Element::Mapping(a), Element::Mapping(b)) => a == b,
            _ => false,
        }
    }
}
