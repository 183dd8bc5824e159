//! The Encoder (§4.D): walks a schema descriptor plus a caller-supplied
//! value source (or, for the dynamic-tree round-trip path, an
//! [`Element`] directly) and drives the [`Writer`], selecting block vs.
//! flow presentation per level from [`Config`].
//!
//! Grounded on the teacher's `emitter.rs` state-machine shape and its own
//! `yaml_emitter_increase_indent`/scalar-analysis routines, replaced with
//! the flat "frame" dispatch `spec.md` §9 calls for in place of the
//! teacher's `yaml_emitter_state_t` transition table (no anchors/tags/
//! directives to drive here).

use std::rc::Rc;

use crate::config::{Config, ListPresentation, Presentation, StringSerialization};
use crate::descriptor::{Annotation, Descriptor, Kind};
use crate::error::Result;
use crate::sink::{EncodeValue, Primitive, ValueSource};
use crate::value::Element;
use crate::writer::Writer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    BlockMapOrClass,
    BlockSequence,
    FlowMapOrClass,
    FlowSequence,
    EmptySequence,
}

/// Either a borrowed descriptor (the root, or any descriptor reachable
/// without recursing through `Rc`) or one owned via
/// `Descriptor::element_descriptor`'s `Rc<dyn Descriptor>` return.
enum DescRef<'a> {
    Borrowed(&'a dyn Descriptor),
    Owned(Rc<dyn Descriptor>),
}

impl<'a> DescRef<'a> {
    fn as_ref(&self) -> &dyn Descriptor {
        match self {
            DescRef::Borrowed(d) => *d,
            DescRef::Owned(rc) => rc.as_ref(),
        }
    }
}

/// A value at some position in the output: a primitive, null, a
/// schema-directed composite, or a dynamic-tree composite. Unifying
/// these lets the frame/indentation machinery below be written once and
/// shared by both `encode_value` and `encode_dynamic`.
enum Val<'a> {
    Null,
    Primitive(Primitive),
    Schema(&'a dyn ValueSource, DescRef<'a>),
    Dyn(&'a Element),
}

/// Encodes `source` against `descriptor`, producing a complete YAML
/// document (§4.D).
pub fn encode_value(source: &dyn ValueSource, descriptor: &dyn Descriptor, config: &Config) -> Result<String> {
    let mut writer = Writer::new(config.indent_width);
    let val = Val::Schema(source, DescRef::Borrowed(descriptor));
    let frame = presentation_for(&val, config);
    emit_resolved(&val, frame, config, &mut writer, false)?;
    writer.writeln();
    Ok(writer.into_string())
}

/// Re-encodes a dynamic tree, used by the structural round-trip
/// invariant (§8.1). A trailing newline is added only when the root is
/// composite (§4.D "Termination").
pub fn encode_dynamic(element: &Element, config: &Config) -> Result<String> {
    let mut writer = Writer::new(config.indent_width);
    let val = Val::Dyn(element);
    match kind_of(&val) {
        Kind::Primitive | Kind::Enum => {
            emit(&val, config, &mut writer, false)?;
        }
        _ => {
            let frame = presentation_for(&val, config);
            emit_resolved(&val, frame, config, &mut writer, false)?;
            writer.writeln();
        }
    }
    Ok(writer.into_string())
}

fn kind_of(val: &Val) -> Kind {
    match val {
        Val::Null | Val::Primitive(_) => Kind::Primitive,
        Val::Schema(_, d) => d.as_ref().kind(),
        Val::Dyn(e) => match e {
            Element::Null | Element::Scalar(..) => Kind::Primitive,
            Element::Sequence(_) => Kind::List,
            Element::Mapping(_) => Kind::Map,
        },
    }
}

fn count(val: &Val) -> usize {
    match val {
        Val::Schema(s, _) => s.element_count(),
        Val::Dyn(Element::Sequence(items)) => items.len(),
        Val::Dyn(Element::Mapping(pairs)) => pairs.len(),
        _ => 0,
    }
}

fn child<'a>(val: &Val<'a>, index: usize) -> Val<'a> {
    match val {
        Val::Schema(s, d) => {
            let s: &'a dyn ValueSource = *s;
            match s.element_value(index) {
                EncodeValue::Null => Val::Null,
                EncodeValue::Primitive(p) => Val::Primitive(p),
                EncodeValue::Composite(cs) => {
                    let child_descriptor = d.as_ref().element_descriptor(index);
                    Val::Schema(cs, DescRef::Owned(child_descriptor))
                }
            }
        }
        Val::Dyn(Element::Sequence(items)) => Val::Dyn(&items[index]),
        Val::Dyn(Element::Mapping(pairs)) => Val::Dyn(&pairs[index].1),
        _ => unreachable!("child() called on a non-composite Val"),
    }
}

fn element_name(val: &Val, index: usize) -> String {
    match val {
        Val::Schema(s, d) => {
            if d.as_ref().kind() == Kind::Map {
                s.element_key(index).unwrap_or_default()
            } else {
                d.as_ref().element_name(index).to_string()
            }
        }
        Val::Dyn(Element::Mapping(pairs)) => pairs[index].0.as_str().unwrap_or("").to_string(),
        _ => unreachable!("element_name() called on a non-mapping Val"),
    }
}

fn annotations(val: &Val, index: usize) -> Vec<Annotation> {
    match val {
        Val::Schema(_, d) => d.as_ref().element_annotations(index).to_vec(),
        _ => Vec::new(),
    }
}

fn comment_lines(val: &Val, index: usize) -> Vec<String> {
    annotations(val, index)
        .into_iter()
        .flat_map(|a| match a {
            Annotation::Comment(lines) => lines,
        })
        .collect()
}

/// Only `Kind::Class` fields carry a declared default; maps/lists have
/// no notion of one. See `SPEC_FULL.md` §C.2 for why a missing default
/// never suppresses a field on its own.
fn is_default(val: &Val, index: usize) -> bool {
    match val {
        Val::Schema(s, d) if d.as_ref().kind() == Kind::Class => s.is_default(index),
        _ => false,
    }
}

fn is_default_skip(val: &Val, index: usize, config: &Config) -> bool {
    !config.encode_default_values && is_default(val, index)
}

fn visible_indices(val: &Val, config: &Config) -> Vec<usize> {
    (0..count(val)).filter(|&i| !is_default_skip(val, i, config)).collect()
}

fn element_is_primitive_kinded(val: &Val) -> bool {
    match val {
        Val::Schema(_, d) => matches!(
            d.as_ref().element_descriptor(0).kind(),
            Kind::Primitive | Kind::Enum
        ),
        Val::Dyn(Element::Sequence(items)) => {
            matches!(items.first(), Some(Element::Null) | Some(Element::Scalar(..)) | None)
        }
        _ => true,
    }
}

fn frame_for_presentation(p: Presentation) -> Frame {
    match p {
        Presentation::Block => Frame::BlockMapOrClass,
        Presentation::Flow => Frame::FlowMapOrClass,
    }
}

/// Presentation selection (§4.D): from configuration, keyed by kind,
/// with `AUTO` consulting the list's element kind and an empty list
/// always forced to `EmptySequence`.
fn presentation_for(val: &Val, config: &Config) -> Frame {
    match kind_of(val) {
        Kind::Class => frame_for_presentation(config.class_serialization),
        Kind::Map => frame_for_presentation(config.map_serialization),
        Kind::List => {
            if count(val) == 0 {
                return Frame::EmptySequence;
            }
            match config.list_serialization {
                ListPresentation::Block => Frame::BlockSequence,
                ListPresentation::Flow => Frame::FlowSequence,
                ListPresentation::Auto => {
                    if element_is_primitive_kinded(val) {
                        Frame::FlowSequence
                    } else {
                        Frame::BlockSequence
                    }
                }
            }
        }
        Kind::Primitive | Kind::Enum => {
            unreachable!("presentation_for called on a primitive-kinded Val")
        }
    }
}

fn force_flow(frame: Frame) -> Frame {
    match frame {
        Frame::BlockMapOrClass => Frame::FlowMapOrClass,
        Frame::BlockSequence => Frame::FlowSequence,
        other => other,
    }
}

/// True when `val`, presented as `frame`, renders as one or more extra
/// output lines rather than staying inline after `key: `.
fn is_multiline_block(val: &Val, frame: Frame, config: &Config) -> bool {
    match frame {
        Frame::BlockSequence => true,
        Frame::BlockMapOrClass => !visible_indices(val, config).is_empty(),
        _ => false,
    }
}

/// Emits `val` at a value position that isn't the value side of a block
/// map entry (sequence item, flow entry, or document root): resolves
/// its frame fresh, forcing flow if `parent_flow` is set (§4.D "A
/// composite opened inside a Flow frame is forced Flow").
fn emit(val: &Val, config: &Config, writer: &mut Writer, parent_flow: bool) -> Result<()> {
    match val {
        Val::Null => {
            writer.write_str(&config.null_serialization);
            Ok(())
        }
        Val::Primitive(p) => emit_primitive(p, config, writer),
        Val::Dyn(Element::Null) => {
            writer.write_str(&config.null_serialization);
            Ok(())
        }
        Val::Dyn(Element::Scalar(text, _)) => {
            emit_scalar_text(text, config, writer);
            Ok(())
        }
        _ => {
            let mut frame = presentation_for(val, config);
            if parent_flow {
                frame = force_flow(frame);
            }
            emit_resolved(val, frame, config, writer, false)
        }
    }
}

/// Emits a composite `val` whose frame has already been decided.
/// `is_block_map_value` triggers the block-sequence-inside-block-mapping
/// indent correction (§4.D "the single trickiest rule").
fn emit_resolved(val: &Val, frame: Frame, config: &Config, writer: &mut Writer, is_block_map_value: bool) -> Result<()> {
    match frame {
        Frame::EmptySequence => {
            writer.write_str("[]");
            Ok(())
        }
        Frame::FlowMapOrClass => emit_flow_map(val, config, writer),
        Frame::FlowSequence => emit_flow_sequence(val, config, writer),
        Frame::BlockMapOrClass => emit_block_map(val, config, writer),
        Frame::BlockSequence => {
            if is_block_map_value {
                writer.level_decrease();
                emit_block_sequence(val, config, writer)?;
                writer.level_increase();
                Ok(())
            } else {
                emit_block_sequence(val, config, writer)
            }
        }
    }
}

fn emit_block_map(val: &Val, config: &Config, writer: &mut Writer) -> Result<()> {
    let visible = visible_indices(val, config);
    if visible.is_empty() {
        writer.write_str("{}");
        return Ok(());
    }
    writer.level_increase();
    for (pos, &i) in visible.iter().enumerate() {
        if pos > 0 {
            writer.writeln();
        }
        for line in comment_lines(val, i) {
            writer.write_indented_smart(&format!("# {line}"));
            writer.writeln();
        }
        let name = element_name(val, i);
        let child_val = child(val, i);
        if matches!(kind_of(&child_val), Kind::Class | Kind::Map | Kind::List) {
            let child_frame = presentation_for(&child_val, config);
            if is_multiline_block(&child_val, child_frame, config) {
                // The value renders on its own line(s); no trailing space
                // after the colon, since nothing follows it on this line.
                writer.write_indented_smart(&format!("{name}:"));
                writer.writeln();
            } else {
                writer.write_indented_smart(&format!("{name}: "));
            }
            emit_resolved(&child_val, child_frame, config, writer, matches!(child_frame, Frame::BlockSequence))?;
        } else {
            writer.write_indented_smart(&format!("{name}: "));
            emit(&child_val, config, writer, false)?;
        }
    }
    writer.level_decrease();
    Ok(())
}

fn emit_block_sequence(val: &Val, config: &Config, writer: &mut Writer) -> Result<()> {
    let n = count(val);
    writer.level_increase();
    for i in 0..n {
        if i > 0 {
            writer.writeln();
        }
        writer.write_indented_smart("- ");
        let item = child(val, i);
        emit(&item, config, writer, false)?;
    }
    writer.level_decrease();
    Ok(())
}

fn emit_flow_map(val: &Val, config: &Config, writer: &mut Writer) -> Result<()> {
    let visible = visible_indices(val, config);
    if visible.is_empty() {
        writer.write_str("{}");
        return Ok(());
    }
    writer.write_str("{ ");
    for (pos, &i) in visible.iter().enumerate() {
        if pos > 0 {
            writer.write_str(", ");
        }
        let name = element_name(val, i);
        writer.write_str(&format!("{name}: "));
        let item = child(val, i);
        emit(&item, config, writer, true)?;
    }
    writer.write_str(" }");
    Ok(())
}

fn emit_flow_sequence(val: &Val, config: &Config, writer: &mut Writer) -> Result<()> {
    let n = count(val);
    writer.write_str("[ ");
    for i in 0..n {
        if i > 0 {
            writer.write_str(", ");
        }
        let item = child(val, i);
        emit(&item, config, writer, true)?;
    }
    writer.write_str(" ]");
    Ok(())
}

fn emit_primitive(p: &Primitive, config: &Config, writer: &mut Writer) -> Result<()> {
    match p {
        Primitive::Bool(b) => {
            let text = if *b {
                &config.boolean_serialization.r#true
            } else {
                &config.boolean_serialization.r#false
            };
            writer.write_str(text);
        }
        Primitive::Int(i) => writer.write_str(&i.to_string()),
        Primitive::Float(f) => writer.write_str(&f.to_string()),
        Primitive::Str(s) => emit_scalar_text(s, config, writer),
        Primitive::Char(c) => emit_scalar_text(&c.to_string(), config, writer),
    }
    Ok(())
}

fn emit_scalar_text(text: &str, config: &Config, writer: &mut Writer) {
    let formatted = match config.string_serialization {
        StringSerialization::DoubleQuoted => double_quote(text),
        StringSerialization::SingleQuoted => single_quote(text),
        StringSerialization::None => {
            if is_plain_safe(text) {
                text.to_string()
            } else {
                double_quote(text)
            }
        }
    };
    writer.write_str(&formatted);
}

const RESERVED_WORDS: [&str; 6] = ["true", "false", "yes", "no", "null", "~"];

/// §4.D "emit plain if the value contains no YAML-reserved characters...
/// and is not a reserved scalar". Also quotes on `,[]{}` even though
/// `spec.md` doesn't list them explicitly — unquoted they would be
/// ambiguous inside a flow collection, and quoting is never wrong.
fn is_plain_safe(text: &str) -> bool {
    if text.is_empty() || RESERVED_WORDS.contains(&text) || text.parse::<f64>().is_ok() {
        return false;
    }
    let first = text.chars().next().unwrap();
    if matches!(first, '-' | '?' | '*' | '&' | '!' | '|' | '>' | '%' | '@' | '`') {
        return false;
    }
    if text.ends_with(' ') || text.ends_with('\t') || text.contains('\n') || text.contains(':') {
        return false;
    }
    if text.contains(['#', ',', '[', ']', '{', '}']) {
        return false;
    }
    true
}

fn double_quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn single_quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        if c == '\'' {
            out.push_str("''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}
