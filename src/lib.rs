//! A YAML 1.2-compatible codec core: a lexer ([`scanner`]), a buffered
//! output sink ([`writer`]), a decoder that produces either a dynamic
//! [`value::Element`] tree or drives a caller's [`sink::ValueSink`] against
//! a [`descriptor::Descriptor`], and an encoder that does the inverse,
//! driven either by a [`sink::ValueSource`] or by a dynamic tree.
//!
//! Anchors, aliases, tags, directives, and multi-document streams are out
//! of scope (`SPEC_FULL.md` Non-goals); this crate covers exactly the
//! block/flow mapping-and-sequence-of-scalars subset of YAML needed to
//! round-trip plain configuration-shaped data.
#![deny(unsafe_code)]

mod config;
mod decoder;
mod descriptor;
mod encoder;
mod error;
mod scanner;
mod sink;
mod token;
mod value;
mod writer;

pub use crate::config::{
    BooleanSerialization, Config, ListPresentation, Presentation, StringSerialization,
};
pub use crate::decoder::{decode_dynamic, decode_with_descriptor};
pub use crate::descriptor::{Annotation, Descriptor, Kind, PrimitiveKind};
pub use crate::encoder::{encode_dynamic, encode_value};
pub use crate::error::{Error, Mark, Path, Result};
pub use crate::sink::{EncodeValue, PathBuf, Primitive, ValueSink, ValueSource};
pub use crate::value::{Element, ScalarStyle};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::test_support::{ClassDescriptor, PrimitiveDescriptor};
    use std::rc::Rc;

    #[test]
    fn dynamic_round_trip_through_public_api() {
        let input = "name: widget\ncount: 3\n";
        let element = decode_dynamic(input).unwrap();
        let out = encode_dynamic(&element, &Config::new()).unwrap();
        let reparsed = decode_dynamic(&out).unwrap();
        assert_eq!(element, reparsed);
    }

    #[test]
    fn schema_directed_decode_rejects_unknown_key() {
        struct DummySink;
        impl ValueSink for DummySink {
            fn put_null(&mut self) -> Result<()> {
                Ok(())
            }
            fn put_bool(&mut self, _v: bool) -> Result<()> {
                Ok(())
            }
            fn put_i64(&mut self, _v: i64) -> Result<()> {
                Ok(())
            }
            fn put_f64(&mut self, _v: f64) -> Result<()> {
                Ok(())
            }
            fn put_string(&mut self, _v: String) -> Result<()> {
                Ok(())
            }
            fn put_char(&mut self, _v: char) -> Result<()> {
                Ok(())
            }
            fn begin_class(&mut self, _name: &str) -> Result<()> {
                Ok(())
            }
            fn begin_map(&mut self) -> Result<()> {
                Ok(())
            }
            fn begin_list(&mut self) -> Result<()> {
                Ok(())
            }
            fn end_composite(&mut self) -> Result<()> {
                Ok(())
            }
            fn field(&mut self, _index: usize) -> Result<()> {
                Ok(())
            }
            fn element(&mut self) -> Result<()> {
                Ok(())
            }
            fn map_key(&mut self) -> Result<()> {
                Ok(())
            }
            fn map_value(&mut self) -> Result<()> {
                Ok(())
            }
        }

        let descriptor = ClassDescriptor {
            type_name: "Widget",
            fields: vec![(
                "name",
                Rc::new(PrimitiveDescriptor::str("str")) as Rc<dyn Descriptor>,
                vec![],
            )],
        };
        let mut sink = DummySink;
        let err = decode_with_descriptor("bogus: 1\n", &descriptor, &mut sink).unwrap_err();
        assert!(matches!(err, Error::UnknownKey { .. }));
    }
}
