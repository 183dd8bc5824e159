//! The Decoder (§4.C): dynamic decode and schema-directed decode against
//! the same `TokenStream`.
//!
//! Grounded on the teacher's `parser.rs` for the general "read a token,
//! decide what it starts, recurse" recursive-descent shape, stripped of
//! the directive/anchor/simple-key roll-back machinery the teacher needs
//! for full YAML 1.2 and this spec explicitly excludes (§1 Non-goals).
//! Schema-directed decode is implemented as dynamic decode followed by a
//! tree walk that drives the caller's [`ValueSink`] against the
//! descriptor — see `DESIGN.md` for why.

use std::rc::Rc;

use crate::descriptor::{Descriptor, Kind, PrimitiveKind};
use crate::error::{Error, Result};
use crate::scanner::TokenStream;
use crate::sink::{PathBuf, ValueSink};
use crate::token::{Token, TokenData};
use crate::value::{Element, ScalarStyle};

/// Decodes a complete YAML document into the dynamic tree (§4.C.1).
pub fn decode_dynamic(input: &str) -> Result<Element> {
    let mut stream = TokenStream::new(input);
    let mut decoder = Decoder::new(&mut stream);
    let tok = decoder.next_real()?.0;
    let value = decoder.parse_value_from_token(tok)?;
    let (trailing, _) = decoder.peek_real()?;
    if !matches!(trailing.data, TokenData::EndOfFile) {
        return Err(Error::UnexpectedToken {
            expected: "end of input",
            got: trailing.data.describe(),
            mark: trailing.start_mark,
        });
    }
    Ok(value)
}

/// Decodes a complete YAML document against `descriptor`, driving `sink`
/// (§4.C.2).
pub fn decode_with_descriptor(
    input: &str,
    descriptor: &dyn Descriptor,
    sink: &mut dyn ValueSink,
) -> Result<()> {
    let element = decode_dynamic(input)?;
    drive_sink(&element, descriptor, sink, &PathBuf::new())
}

struct KeyInfo {
    text: String,
    style: ScalarStyle,
    is_null: bool,
}

impl KeyInfo {
    fn into_element(self) -> Element {
        if self.is_null {
            Element::Null
        } else {
            Element::Scalar(self.text, self.style)
        }
    }
}

fn scalar_payload(data: &TokenData) -> Option<(String, ScalarStyle, bool)> {
    match data {
        TokenData::StringNull => Some((String::new(), ScalarStyle::Plain, true)),
        TokenData::String(s) => Some((s.clone(), ScalarStyle::Plain, false)),
        TokenData::StringSingle(s) => Some((s.clone(), ScalarStyle::SingleQuoted, false)),
        TokenData::StringDouble(s) => Some((s.clone(), ScalarStyle::DoubleQuoted, false)),
        _ => None,
    }
}

struct Decoder<'s> {
    stream: &'s mut TokenStream,
}

impl<'s> Decoder<'s> {
    fn new(stream: &'s mut TokenStream) -> Self {
        Decoder { stream }
    }

    /// Consumes and returns the next token that isn't a `LineSeparator`,
    /// plus whether at least one separator was skipped to reach it.
    fn next_real(&mut self) -> Result<(Token, bool)> {
        let mut crossed = false;
        let mut tok = self.stream.next()?;
        while matches!(tok.data, TokenData::LineSeparator) {
            crossed = true;
            tok = self.stream.next()?;
        }
        Ok((tok, crossed))
    }

    /// Same as `next_real` but puts the token back (one token of
    /// lookahead), so it can be re-fetched by the next `next_real`/`next`.
    fn peek_real(&mut self) -> Result<(Token, bool)> {
        let (tok, crossed) = self.next_real()?;
        self.stream.reuse_current();
        Ok((tok, crossed))
    }

    /// `tok` must be a scalar-kinded token; consumes the `:` that must
    /// follow it to complete a mapping key.
    fn expect_key_rest(&mut self, tok: Token) -> Result<KeyInfo> {
        let Some((text, style, is_null)) = scalar_payload(&tok.data) else {
            return Err(Error::UnexpectedToken {
                expected: "mapping key",
                got: tok.data.describe(),
                mark: tok.start_mark,
            });
        };
        let (colon, _) = self.next_real()?;
        if !matches!(colon.data, TokenData::Colon) {
            return Err(Error::UnexpectedToken {
                expected: "':'",
                got: colon.data.describe(),
                mark: colon.start_mark,
            });
        }
        Ok(KeyInfo {
            text,
            style,
            is_null,
        })
    }

    /// The main recursive-descent dispatch: given an already-fetched
    /// first token of a value position, decides what it starts.
    fn parse_value_from_token(&mut self, tok: Token) -> Result<Element> {
        if let Some((text, style, is_null)) = scalar_payload(&tok.data) {
            // A scalar followed *directly* (no intervening newline) by a
            // colon is a mapping key, not a bare value. The newline check
            // must be strict here — skipping separators while looking
            // for the colon would misread an unrelated later line as
            // "this scalar is a key".
            let after = self.stream.next()?;
            return if matches!(after.data, TokenData::Colon) {
                let key_column = tok.start_mark.column;
                let key_info = KeyInfo {
                    text,
                    style,
                    is_null,
                };
                self.parse_block_mapping(key_info, key_column)
            } else {
                self.stream.reuse_current();
                Ok(if is_null {
                    Element::Null
                } else {
                    Element::Scalar(text, style)
                })
            };
        }
        match tok.data {
            TokenData::MultilineListFlag => self.parse_block_sequence(tok),
            TokenData::FlowMapBegin => self.parse_flow_mapping(),
            TokenData::FlowSequenceBegin => self.parse_flow_sequence(),
            TokenData::EndOfFile => Ok(Element::Null),
            other => Err(Error::UnexpectedToken {
                expected: "a value",
                got: other.describe(),
                mark: tok.start_mark,
            }),
        }
    }

    fn parse_block_mapping(&mut self, first_key: KeyInfo, key_column: usize) -> Result<Element> {
        let mut pairs = Vec::new();
        let mut current = Some(first_key);
        while let Some(key_info) = current.take() {
            let key_elem = key_info.into_element();
            let value = self.parse_mapping_entry_value(key_column)?;
            pairs.push((key_elem, value));
            current = self.maybe_next_key(key_column)?;
        }
        Ok(Element::Mapping(pairs))
    }

    /// Parses the value after a mapping key's `:`. Handles the null
    /// coercion (§4.C "immediate newline after `:`") and the
    /// same-column-or-deeper nested block sequence exception (§4.C
    /// "Nested indent interaction").
    fn parse_mapping_entry_value(&mut self, key_column: usize) -> Result<Element> {
        let (tok, crossed) = self.peek_real()?;
        if !crossed {
            self.stream.next()?;
            if matches!(tok.data, TokenData::EndOfFile) {
                return Ok(Element::Null);
            }
            return self.parse_value_from_token(tok);
        }
        match &tok.data {
            TokenData::EndOfFile => Ok(Element::Null),
            TokenData::MultilineListFlag if tok.start_mark.column >= key_column => {
                self.stream.next()?;
                self.parse_block_sequence(tok)
            }
            _ if tok.start_mark.column > key_column => {
                self.stream.next()?;
                self.parse_value_from_token(tok)
            }
            // Column <= key_column and not a qualifying sequence marker:
            // the entry's value is empty/Null. `tok` stays unconsumed —
            // it is either the next sibling key or a container terminator.
            _ => Ok(Element::Null),
        }
    }

    fn maybe_next_key(&mut self, key_column: usize) -> Result<Option<KeyInfo>> {
        let (tok, _) = self.peek_real()?;
        match &tok.data {
            TokenData::EndOfFile => Ok(None),
            _ if tok.start_mark.column < key_column => Ok(None),
            _ if tok.start_mark.column == key_column => {
                self.stream.next()?;
                Ok(Some(self.expect_key_rest(tok)?))
            }
            _ => Err(Error::UnexpectedToken {
                expected: "mapping key at matching indent",
                got: tok.data.describe(),
                mark: tok.start_mark,
            }),
        }
    }

    fn parse_block_sequence(&mut self, first_flag: Token) -> Result<Element> {
        let column = first_flag.start_mark.column;
        let mut items = Vec::new();
        loop {
            let (item_tok, _) = self.next_real()?;
            let item = self.parse_value_from_token(item_tok)?;
            items.push(item);
            let (tok, _) = self.peek_real()?;
            match tok.data {
                TokenData::MultilineListFlag if tok.start_mark.column == column => {
                    self.stream.next()?;
                }
                _ => break,
            }
        }
        Ok(Element::Sequence(items))
    }

    fn parse_flow_sequence(&mut self) -> Result<Element> {
        let mut items = Vec::new();
        loop {
            let (tok, _) = self.peek_real()?;
            if matches!(tok.data, TokenData::FlowSequenceEnd) {
                self.stream.next()?;
                break;
            }
            let (item_tok, _) = self.next_real()?;
            let item = self.parse_value_from_token(item_tok)?;
            items.push(item);
            let (sep, _) = self.next_real()?;
            match sep.data {
                TokenData::Comma => continue,
                TokenData::FlowSequenceEnd => break,
                other => {
                    return Err(Error::UnexpectedToken {
                        expected: "',' or ']'",
                        got: other.describe(),
                        mark: sep.start_mark,
                    })
                }
            }
        }
        Ok(Element::Sequence(items))
    }

    fn parse_flow_mapping(&mut self) -> Result<Element> {
        let mut pairs = Vec::new();
        loop {
            let (tok, _) = self.peek_real()?;
            if matches!(tok.data, TokenData::FlowMapEnd) {
                self.stream.next()?;
                break;
            }
            let (key_tok, _) = self.next_real()?;
            let key_info = self.expect_key_rest(key_tok)?;
            let key_elem = key_info.into_element();
            let (vtok, _) = self.peek_real()?;
            let value = if matches!(vtok.data, TokenData::Comma | TokenData::FlowMapEnd) {
                Element::Null
            } else {
                let (v, _) = self.next_real()?;
                self.parse_value_from_token(v)?
            };
            pairs.push((key_elem, value));
            let (sep, _) = self.next_real()?;
            match sep.data {
                TokenData::Comma => continue,
                TokenData::FlowMapEnd => break,
                other => {
                    return Err(Error::UnexpectedToken {
                        expected: "',' or '}'",
                        got: other.describe(),
                        mark: sep.start_mark,
                    })
                }
            }
        }
        Ok(Element::Mapping(pairs))
    }
}

fn kind_name(element: &Element) -> &'static str {
    match element {
        Element::Null => "null",
        Element::Scalar(..) => "scalar",
        Element::Sequence(_) => "sequence",
        Element::Mapping(_) => "mapping",
    }
}

fn drive_sink(
    element: &Element,
    descriptor: &dyn Descriptor,
    sink: &mut dyn ValueSink,
    path: &PathBuf,
) -> Result<()> {
    match descriptor.kind() {
        Kind::Primitive | Kind::Enum => drive_primitive(element, descriptor, sink, path),
        Kind::Class => drive_class(element, descriptor, sink, path),
        Kind::Map => drive_map(element, descriptor, sink, path),
        Kind::List => drive_list(element, descriptor, sink, path),
    }
}

fn drive_primitive(
    element: &Element,
    descriptor: &dyn Descriptor,
    sink: &mut dyn ValueSink,
    path: &PathBuf,
) -> Result<()> {
    if element.is_null() {
        return sink.put_null();
    }
    let Some(text) = element.as_str() else {
        return Err(Error::SchemaMismatch {
            expected_kind: "primitive",
            encountered_kind: kind_name(element),
            path: path.to_string(),
        });
    };
    match descriptor.primitive_kind() {
        PrimitiveKind::Bool => match text {
            "true" => sink.put_bool(true),
            "false" => sink.put_bool(false),
            _ => Err(Error::CoercionFailure {
                text: text.to_string(),
                target_primitive: "bool",
            }),
        },
        PrimitiveKind::Int => {
            let v: i64 = text.parse().map_err(|_| Error::CoercionFailure {
                text: text.to_string(),
                target_primitive: "int",
            })?;
            sink.put_i64(v)
        }
        PrimitiveKind::Float => {
            let v: f64 = text.parse().map_err(|_| Error::CoercionFailure {
                text: text.to_string(),
                target_primitive: "float",
            })?;
            sink.put_f64(v)
        }
        PrimitiveKind::Char => {
            let mut chars = text.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return Err(Error::CoercionFailure {
                    text: text.to_string(),
                    target_primitive: "char",
                });
            };
            sink.put_char(c)
        }
        PrimitiveKind::Str => sink.put_string(text.to_string()),
    }
}

fn drive_class(
    element: &Element,
    descriptor: &dyn Descriptor,
    sink: &mut dyn ValueSink,
    path: &PathBuf,
) -> Result<()> {
    let Element::Mapping(pairs) = element else {
        return Err(Error::SchemaMismatch {
            expected_kind: "class",
            encountered_kind: kind_name(element),
            path: path.to_string(),
        });
    };
    sink.begin_class(descriptor.name())?;
    for (key_elem, value_elem) in pairs {
        let Some(key) = key_elem.as_str() else {
            return Err(Error::SchemaMismatch {
                expected_kind: "string key",
                encountered_kind: kind_name(key_elem),
                path: path.to_string(),
            });
        };
        let Some(index) = (0..descriptor.element_count()).find(|&i| descriptor.element_name(i) == key)
        else {
            return Err(Error::UnknownKey {
                key: key.to_string(),
                container_path: path.to_string(),
            });
        };
        sink.field(index)?;
        let child: Rc<dyn Descriptor> = descriptor.element_descriptor(index);
        drive_sink(value_elem, child.as_ref(), sink, &path.pushed(key))?;
    }
    sink.end_composite()
}

fn drive_map(
    element: &Element,
    descriptor: &dyn Descriptor,
    sink: &mut dyn ValueSink,
    path: &PathBuf,
) -> Result<()> {
    let Element::Mapping(pairs) = element else {
        return Err(Error::SchemaMismatch {
            expected_kind: "map",
            encountered_kind: kind_name(element),
            path: path.to_string(),
        });
    };
    sink.begin_map()?;
    let value_descriptor = descriptor.element_descriptor(0);
    for (key_elem, value_elem) in pairs {
        let Some(key) = key_elem.as_str() else {
            return Err(Error::SchemaMismatch {
                expected_kind: "string key",
                encountered_kind: kind_name(key_elem),
                path: path.to_string(),
            });
        };
        sink.map_key()?;
        sink.put_string(key.to_string())?;
        sink.map_value()?;
        drive_sink(value_elem, value_descriptor.as_ref(), sink, &path.pushed(key))?;
    }
    sink.end_composite()
}

fn drive_list(
    element: &Element,
    descriptor: &dyn Descriptor,
    sink: &mut dyn ValueSink,
    path: &PathBuf,
) -> Result<()> {
    let Element::Sequence(items) = element else {
        return Err(Error::SchemaMismatch {
            expected_kind: "list",
            encountered_kind: kind_name(element),
            path: path.to_string(),
        });
    };
    sink.begin_list()?;
    let element_descriptor = descriptor.element_descriptor(0);
    for (i, item) in items.iter().enumerate() {
        sink.element()?;
        drive_sink(item, element_descriptor.as_ref(), sink, &path.pushed(i.to_string()))?;
    }
    sink.end_composite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_simple_block_mapping() {
        let input = "part_no: A4786\nprice: 1.47\nquantity: 4\n";
        let got = decode_dynamic(input).unwrap();
        let want = Element::Mapping(vec![
            (Element::scalar("part_no"), Element::scalar("A4786")),
            (Element::scalar("price"), Element::scalar("1.47")),
            (Element::scalar("quantity"), Element::scalar("4")),
        ]);
        assert_eq!(got, want);
    }

    #[test]
    fn s2_null_disambiguation() {
        let input = "part_no: A4786\ndescrip2: 'null'\ndescrip: \"null\"\nquantity: null\n";
        let got = decode_dynamic(input).unwrap();
        let Element::Mapping(pairs) = got else {
            panic!("expected mapping");
        };
        assert_eq!(pairs[0].1, Element::scalar("A4786"));
        assert_eq!(
            pairs[1].1,
            Element::Scalar("null".into(), ScalarStyle::SingleQuoted)
        );
        assert_eq!(
            pairs[2].1,
            Element::Scalar("null".into(), ScalarStyle::DoubleQuoted)
        );
        assert_eq!(pairs[3].1, Element::Null);
        assert_ne!(pairs[3].1, pairs[2].1);
    }

    #[test]
    fn s3_nested_block_sequence_same_column() {
        let input = "t:\n- part_no: A4786\n  descrip: Water Bucket (Filled)\n  price: 1.47\n  quantity: 4\n";
        let got = decode_dynamic(input).unwrap();
        let want = Element::Mapping(vec![(
            Element::scalar("t"),
            Element::Sequence(vec![Element::Mapping(vec![
                (Element::scalar("part_no"), Element::scalar("A4786")),
                (
                    Element::scalar("descrip"),
                    Element::scalar("Water Bucket (Filled)"),
                ),
                (Element::scalar("price"), Element::scalar("1.47")),
                (Element::scalar("quantity"), Element::scalar("4")),
            ])]),
        )]);
        assert_eq!(got, want);
    }

    #[test]
    fn flow_collections() {
        let got = decode_dynamic("{ a: 1, b: [1, 2, 3] }").unwrap();
        let want = Element::Mapping(vec![
            (Element::scalar("a"), Element::scalar("1")),
            (
                Element::scalar("b"),
                Element::Sequence(vec![
                    Element::scalar("1"),
                    Element::scalar("2"),
                    Element::scalar("3"),
                ]),
            ),
        ]);
        assert_eq!(got, want);
    }

    #[test]
    fn empty_composites_round_trip_empty() {
        assert_eq!(decode_dynamic("[]").unwrap(), Element::Sequence(vec![]));
        assert_eq!(decode_dynamic("{}").unwrap(), Element::Mapping(vec![]));
    }

    #[test]
    fn unexpected_trailing_content_fails() {
        assert!(decode_dynamic("a: 1\nb").is_err());
    }
}
