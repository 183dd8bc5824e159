//! Error taxonomy for the codec.
//!
//! One flat enum instead of the teacher's one-enum-per-layer split: this
//! crate has far fewer layers (no reader/scanner/parser/emitter split with
//! independent failure domains), so a single `Error` keeps call sites
//! simple while still carrying a `Mark` on every variant that can.

use std::fmt;

/// A position in the source buffer or, for encode-side errors, a logical
/// path into the value graph.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct Mark {
    /// Byte offset from the start of the buffer.
    pub index: usize,
    /// 1-based line number.
    pub line: usize,
    /// 0-based column.
    pub column: usize,
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// A dotted path into a mapping/class used to locate schema-directed
/// decode failures (`SchemaMismatch`, `UnknownKey`).
pub type Path = String;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{mark}: expected {expected}, found {got}")]
    UnexpectedToken {
        expected: &'static str,
        got: String,
        mark: Mark,
    },

    #[error("{mark}: malformed scalar: {reason}")]
    MalformedScalar { reason: String, mark: Mark },

    #[error("at {path}: expected {expected_kind}, found {encountered_kind}")]
    SchemaMismatch {
        expected_kind: &'static str,
        encountered_kind: &'static str,
        path: Path,
    },

    #[error("at {container_path}: unknown key {key:?}")]
    UnknownKey { key: String, container_path: Path },

    #[error("cannot coerce {text:?} to {target_primitive}")]
    CoercionFailure {
        text: String,
        target_primitive: &'static str,
    },

    #[error("unsupported feature: {0}")]
    UnsupportedFeature(&'static str),

    #[error("internal encoder invariant violated: {0}")]
    InvariantViolation(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
