//! Codec configuration (§3). Immutable once built, safe to share across
//! threads (§5), constructed once per codec instance.
//!
//! Plain struct with chainable `with_*` builders — the idiomatic-Rust
//! equivalent of the teacher's `yaml_emitter_set_indent`/
//! `yaml_emitter_set_canonical`-style setter functions (`src/api.rs`).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Block,
    Flow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPresentation {
    Block,
    Flow,
    /// Flow when the element type is primitive-kinded, block otherwise.
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringSerialization {
    /// Plain unless the value needs quoting to be unambiguous, in which
    /// case promote to double-quoted.
    None,
    DoubleQuoted,
    SingleQuoted,
}

#[derive(Debug, Clone)]
pub struct BooleanSerialization {
    pub r#true: String,
    pub r#false: String,
}

impl Default for BooleanSerialization {
    fn default() -> Self {
        BooleanSerialization {
            r#true: "true".to_string(),
            r#false: "false".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub class_serialization: Presentation,
    pub map_serialization: Presentation,
    pub list_serialization: ListPresentation,
    pub string_serialization: StringSerialization,
    pub boolean_serialization: BooleanSerialization,
    pub null_serialization: String,
    pub encode_default_values: bool,
    /// Spaces per indentation level. Constant across one encode (§4.B).
    pub indent_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            class_serialization: Presentation::Block,
            map_serialization: Presentation::Block,
            list_serialization: ListPresentation::Auto,
            string_serialization: StringSerialization::None,
            boolean_serialization: BooleanSerialization::default(),
            null_serialization: "null".to_string(),
            encode_default_values: true,
            indent_width: 2,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class_serialization(mut self, p: Presentation) -> Self {
        self.class_serialization = p;
        self
    }

    pub fn with_map_serialization(mut self, p: Presentation) -> Self {
        self.map_serialization = p;
        self
    }

    pub fn with_list_serialization(mut self, p: ListPresentation) -> Self {
        self.list_serialization = p;
        self
    }

    pub fn with_string_serialization(mut self, s: StringSerialization) -> Self {
        self.string_serialization = s;
        self
    }

    pub fn with_boolean_serialization(mut self, t: impl Into<String>, f: impl Into<String>) -> Self {
        self.boolean_serialization = BooleanSerialization {
            r#true: t.into(),
            r#false: f.into(),
        };
        self
    }

    pub fn with_null_serialization(mut self, s: impl Into<String>) -> Self {
        self.null_serialization = s.into();
        self
    }

    pub fn with_encode_default_values(mut self, b: bool) -> Self {
        self.encode_default_values = b;
        self
    }

    pub fn with_indent_width(mut self, w: usize) -> Self {
        self.indent_width = w;
        self
    }
}
