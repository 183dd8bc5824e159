//! The value sink/source interfaces the core consumes for schema-directed
//! decode and encode (§6). "For schema-directed decode, the core invokes a
//! caller-provided sink with typed primitive writes... For encode, the
//! inverse: the core asks the caller to enumerate elements and values."

use crate::descriptor::Kind;
use crate::error::Result;

/// A decoded primitive value, passed to [`ValueSink`] one call per
/// primitive (§4.C).
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
}

/// Caller-supplied decode target. The decoder drives this: it walks the
/// parsed structure and the schema descriptor together, calling `field`/
/// `element`/`map_key`/`map_value` to announce which slot the next
/// primitive or composite belongs to, then the corresponding `put_*` or
/// `begin_*`/`end_composite` pair.
pub trait ValueSink {
    fn put_null(&mut self) -> Result<()>;
    fn put_bool(&mut self, v: bool) -> Result<()>;
    fn put_i64(&mut self, v: i64) -> Result<()>;
    fn put_f64(&mut self, v: f64) -> Result<()>;
    fn put_string(&mut self, v: String) -> Result<()>;
    fn put_char(&mut self, v: char) -> Result<()>;

    fn begin_class(&mut self, name: &str) -> Result<()>;
    fn begin_map(&mut self) -> Result<()>;
    fn begin_list(&mut self) -> Result<()>;
    fn end_composite(&mut self) -> Result<()>;

    /// Announces that the next value belongs to class field `index`
    /// (per the descriptor's element order, not necessarily stream order).
    fn field(&mut self, index: usize) -> Result<()>;
    /// Announces that the next value is the next list element.
    fn element(&mut self) -> Result<()>;
    /// Announces that the next value is a map entry's key.
    fn map_key(&mut self) -> Result<()>;
    /// Announces that the next value is a map entry's value.
    fn map_value(&mut self) -> Result<()>;
}

/// A value about to be encoded: either a primitive the encoder can write
/// directly, a null, or a composite the encoder recurses into via
/// [`ValueSource`].
pub enum EncodeValue<'a> {
    Null,
    Primitive(Primitive),
    Composite(&'a dyn ValueSource),
}

/// Caller-supplied encode source. The encoder asks it to enumerate a
/// composite's elements and their values (§6, "the inverse" of
/// `ValueSink`).
pub trait ValueSource {
    fn kind(&self) -> Kind;

    /// Number of fields (Class), entries (Map), or items (List).
    fn element_count(&self) -> usize;

    /// `Map` only: the key of entry `index`. `Class` element names come
    /// from the descriptor instead.
    fn element_key(&self, index: usize) -> Option<String> {
        let _ = index;
        None
    }

    fn element_value(&self, index: usize) -> EncodeValue<'_>;

    /// Whether element `index` currently holds its descriptor-declared
    /// default value. Consulted only when
    /// `Config::encode_default_values` is `false` (see `SPEC_FULL.md` §C.2)
    fn is_default(&self, index: usize) -> bool {
        let _ = index;
        false
    }
}

/// A dotted path into the value graph, used for `SchemaMismatch`/
/// `UnknownKey` diagnostics.
#[derive(Debug, Clone, Default)]
pub struct PathBuf(Vec<String>);

impl PathBuf {
    pub fn new() -> Self {
        PathBuf::default()
    }

    pub fn pushed(&self, segment: impl Into<String>) -> PathBuf {
        let mut next = self.0.clone();
        next.push(segment.into());
        PathBuf(next)
    }
}

impl std::fmt::Display for PathBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "$")
        } else {
            write!(f, "{}", self.0.join("."))
        }
    }
}
