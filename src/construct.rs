//! Type-directed construction: driving an event stream into typed values.
//!
//! Each constructible type implements [`FromYaml`]. The engine glue,
//! [`construct_child`], resolves aliases, validates tags and anchors, and
//! dispatches to the type's constructor; the constructors recurse through the
//! glue so every nested node gets the same treatment. Record and variant
//! types are written against the [`RecordReader`] / [`VariantReader`]
//! helpers, which encode the wire contracts (mappings keyed by field name,
//! sequences of single-pair maps with the discriminator first).

use std::any::Any;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::rc::Rc;

use tracing::trace;

use crate::error::{ConstructionError, ConstructionErrorKind, LoadError};
use crate::events::{BufferedEvents, EventStream, StructEvent, NO_ANCHOR};
use crate::hints::{guess_type, TypeHint};
use crate::tags::{TagId, TagRegistry};

/// Shape a type occupies on the wire. Drives tag validation and the nil
/// sentinels for nullable strings and sequences.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum NodeKind {
    Scalar,
    String,
    Sequence,
    Mapping,
}

/// Per-document construction state: anchors bound to object identities.
#[derive(Default)]
pub struct ConstructionContext {
    refs: HashMap<u32, Rc<dyn Any>>,
}

impl ConstructionContext {
    pub fn new() -> ConstructionContext {
        ConstructionContext::default()
    }

    /// Bind an anchor to an object. An anchor binds at most once.
    pub fn bind(&mut self, anchor: u32, obj: Rc<dyn Any>) -> Result<(), ConstructionErrorKind> {
        if self.refs.contains_key(&anchor) {
            return Err(ConstructionErrorKind::AnchorAlreadyBound(anchor));
        }
        trace!(anchor, "binding anchor");
        self.refs.insert(anchor, obj);
        Ok(())
    }

    pub fn resolve<T: Any>(&self, anchor: u32) -> Option<Result<Rc<T>, ()>> {
        let obj = self.refs.get(&anchor)?;
        Some(Rc::clone(obj).downcast::<T>().map_err(|_| ()))
    }
}

/// A type constructible from a YAML event stream.
pub trait FromYaml: Sized {
    const KIND: NodeKind;
    /// Reference-typed values may carry anchors and be the target of
    /// aliases; they bypass the engine glue and do their own resolution.
    const IS_REF: bool = false;
    /// Implicit variant wrappers are absent from the wire; dispatch is by
    /// the payload's tag.
    const IMPLICIT_VARIANT: bool = false;

    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    fn yaml_tag(reg: &mut TagRegistry) -> TagId;

    /// Tags this type constructs from. The default is the `{?, !, own}` set
    /// for scalars and `{?, own}` for containers.
    fn accepts_tag(tag: TagId, reg: &mut TagRegistry) -> bool {
        if tag == TagId::QUESTION {
            return true;
        }
        match Self::KIND {
            NodeKind::Scalar | NodeKind::String => {
                tag == TagId::EXCLAMATION || tag == Self::yaml_tag(reg)
            }
            NodeKind::Sequence | NodeKind::Mapping => tag == Self::yaml_tag(reg),
        }
    }

    fn construct<E: EventStream>(
        stream: &mut E,
        ctx: &mut ConstructionContext,
        reg: &mut TagRegistry,
    ) -> Result<Self, LoadError>;
}

pub(crate) fn err_at<E: EventStream>(stream: &E, kind: ConstructionErrorKind) -> LoadError {
    LoadError::Construction(ConstructionError::new(kind).at(stream.last_token_context()))
}

/// Construct one node of type `T`, with alias resolution and tag/anchor
/// validation applied before `T`'s own constructor runs.
pub fn construct_child<T: FromYaml, E: EventStream>(
    stream: &mut E,
    ctx: &mut ConstructionContext,
    reg: &mut TagRegistry,
) -> Result<T, LoadError> {
    if T::IS_REF {
        return T::construct(stream, ctx, reg);
    }
    if matches!(stream.peek()?, StructEvent::Alias { .. }) {
        return Err(err_at(stream, ConstructionErrorKind::AliasOnNonRef));
    }
    if T::IMPLICIT_VARIANT {
        return T::construct(stream, ctx, reg);
    }
    let (tag, anchor) = {
        let ev = stream.peek()?;
        (ev.tag(), ev.anchor())
    };
    if anchor != NO_ANCHOR {
        return Err(err_at(stream, ConstructionErrorKind::AnchorOnNonRef));
    }
    if let Some(tag) = tag {
        if !T::accepts_tag(tag, reg) {
            let expected_tag = T::yaml_tag(reg);
            let expected = reg.uri(expected_tag).to_string();
            let got = reg.uri(tag).to_string();
            return Err(err_at(stream, ConstructionErrorKind::WrongTag { expected, got }));
        }
    }
    T::construct(stream, ctx, reg)
}

// ---------------------------------------------------------------------------
// event helpers used by constructors

pub fn expect_scalar<E: EventStream>(stream: &mut E) -> Result<String, LoadError> {
    match stream.next()? {
        StructEvent::Scalar { content, .. } => Ok(content),
        other => Err(err_at(
            stream,
            ConstructionErrorKind::UnexpectedEvent {
                expected: "scalar",
                got: other.kind_name().to_string(),
            },
        )),
    }
}

macro_rules! expect_event {
    ($name:ident, $pat:pat, $expected:literal) => {
        pub fn $name<E: EventStream>(stream: &mut E) -> Result<(), LoadError> {
            match stream.next()? {
                $pat => Ok(()),
                other => Err(err_at(
                    stream,
                    ConstructionErrorKind::UnexpectedEvent {
                        expected: $expected,
                        got: other.kind_name().to_string(),
                    },
                )),
            }
        }
    };
}

expect_event!(expect_seq_start, StructEvent::SeqStart { .. }, "sequence start");
expect_event!(expect_seq_end, StructEvent::SeqEnd, "sequence end");
expect_event!(expect_map_start, StructEvent::MapStart { .. }, "mapping start");
expect_event!(expect_map_end, StructEvent::MapEnd, "mapping end");

/// Consume the null scalar a payload-less variant branch is encoded as.
pub fn consume_null<E: EventStream>(stream: &mut E) -> Result<(), LoadError> {
    expect_scalar(stream).map(|_| ())
}

// ---------------------------------------------------------------------------
// primitives

macro_rules! impl_from_yaml_int {
    ($($t:ty => $uri:literal),* $(,)?) => {$(
        impl FromYaml for $t {
            const KIND: NodeKind = NodeKind::Scalar;

            fn yaml_tag(reg: &mut TagRegistry) -> TagId {
                reg.register($uri)
            }

            fn accepts_tag(tag: TagId, reg: &mut TagRegistry) -> bool {
                tag == TagId::QUESTION
                    || tag == TagId::EXCLAMATION
                    || tag == TagId::INTEGER
                    || tag == Self::yaml_tag(reg)
            }

            fn construct<E: EventStream>(
                stream: &mut E,
                _ctx: &mut ConstructionContext,
                _reg: &mut TagRegistry,
            ) -> Result<Self, LoadError> {
                fn parse_radix(digits: &str, radix: u32) -> Option<$t> {
                    let mut acc: $t = 0;
                    let mut any = false;
                    for ch in digits.chars() {
                        if ch == '_' {
                            continue;
                        }
                        let digit = ch.to_digit(radix)? as $t;
                        acc = acc.checked_mul(radix as $t)?.checked_add(digit)?;
                        any = true;
                    }
                    if any { Some(acc) } else { None }
                }

                let content = expect_scalar(stream)?;
                let parsed = if let Some(hex) =
                    content.strip_prefix("0x").or_else(|| content.strip_prefix("0X"))
                {
                    parse_radix(hex, 16)
                } else if let Some(oct) =
                    content.strip_prefix("0o").or_else(|| content.strip_prefix("0O"))
                {
                    parse_radix(oct, 8)
                } else {
                    content.parse::<$t>().ok()
                };
                parsed.ok_or_else(|| {
                    err_at(
                        stream,
                        ConstructionErrorKind::MalformedLiteral {
                            target: stringify!($t),
                            content,
                        },
                    )
                })
            }
        }
    )*};
}

impl_from_yaml_int! {
    i8 => "!forge:i8",
    i16 => "!forge:i16",
    i32 => "!forge:i32",
    i64 => "!forge:i64",
    isize => "!forge:isize",
    u8 => "!forge:u8",
    u16 => "!forge:u16",
    u32 => "!forge:u32",
    u64 => "!forge:u64",
    usize => "!forge:usize",
}

macro_rules! impl_from_yaml_float {
    ($($t:ty => $uri:literal),* $(,)?) => {$(
        impl FromYaml for $t {
            const KIND: NodeKind = NodeKind::Scalar;

            fn yaml_tag(reg: &mut TagRegistry) -> TagId {
                reg.register($uri)
            }

            fn accepts_tag(tag: TagId, reg: &mut TagRegistry) -> bool {
                tag == TagId::QUESTION
                    || tag == TagId::EXCLAMATION
                    || tag == TagId::FLOAT
                    || tag == Self::yaml_tag(reg)
            }

            fn construct<E: EventStream>(
                stream: &mut E,
                _ctx: &mut ConstructionContext,
                _reg: &mut TagRegistry,
            ) -> Result<Self, LoadError> {
                let content = expect_scalar(stream)?;
                match guess_type(&content) {
                    TypeHint::Integer | TypeHint::Float => {
                        content.parse::<$t>().map_err(|_| {
                            err_at(
                                stream,
                                ConstructionErrorKind::MalformedLiteral {
                                    target: stringify!($t),
                                    content,
                                },
                            )
                        })
                    }
                    TypeHint::FloatInf => Ok(if content.starts_with('-') {
                        <$t>::NEG_INFINITY
                    } else {
                        <$t>::INFINITY
                    }),
                    TypeHint::FloatNaN => Ok(<$t>::NAN),
                    _ => Err(err_at(
                        stream,
                        ConstructionErrorKind::MalformedLiteral {
                            target: stringify!($t),
                            content,
                        },
                    )),
                }
            }
        }
    )*};
}

impl_from_yaml_float! {
    f32 => "!forge:f32",
    f64 => "!forge:f64",
}

impl FromYaml for bool {
    const KIND: NodeKind = NodeKind::Scalar;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::BOOLEAN
    }

    fn construct<E: EventStream>(
        stream: &mut E,
        _ctx: &mut ConstructionContext,
        _reg: &mut TagRegistry,
    ) -> Result<Self, LoadError> {
        let content = expect_scalar(stream)?;
        match guess_type(&content) {
            TypeHint::BoolTrue => Ok(true),
            TypeHint::BoolFalse => Ok(false),
            _ => Err(err_at(
                stream,
                ConstructionErrorKind::MalformedLiteral {
                    target: "bool",
                    content,
                },
            )),
        }
    }
}

impl FromYaml for char {
    const KIND: NodeKind = NodeKind::Scalar;

    fn yaml_tag(reg: &mut TagRegistry) -> TagId {
        reg.register("!forge:char")
    }

    fn construct<E: EventStream>(
        stream: &mut E,
        _ctx: &mut ConstructionContext,
        _reg: &mut TagRegistry,
    ) -> Result<Self, LoadError> {
        let content = expect_scalar(stream)?;
        let mut chars = content.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(err_at(
                stream,
                ConstructionErrorKind::MalformedLiteral {
                    target: "char",
                    content,
                },
            )),
        }
    }
}

impl FromYaml for String {
    const KIND: NodeKind = NodeKind::String;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::STRING
    }

    fn construct<E: EventStream>(
        stream: &mut E,
        _ctx: &mut ConstructionContext,
        _reg: &mut TagRegistry,
    ) -> Result<Self, LoadError> {
        expect_scalar(stream)
    }
}

/// Tags of the signed integer widths, for implicit variant dispatch.
pub fn signed_int_tags(reg: &mut TagRegistry) -> Vec<TagId> {
    vec![
        i8::yaml_tag(reg),
        i16::yaml_tag(reg),
        i32::yaml_tag(reg),
        i64::yaml_tag(reg),
        isize::yaml_tag(reg),
    ]
}

/// Tags of the unsigned integer widths, for implicit variant dispatch.
pub fn unsigned_int_tags(reg: &mut TagRegistry) -> Vec<TagId> {
    vec![
        u8::yaml_tag(reg),
        u16::yaml_tag(reg),
        u32::yaml_tag(reg),
        u64::yaml_tag(reg),
        usize::yaml_tag(reg),
    ]
}

pub fn float_tags(reg: &mut TagRegistry) -> Vec<TagId> {
    vec![f32::yaml_tag(reg), f64::yaml_tag(reg)]
}

// ---------------------------------------------------------------------------
// containers

impl<T: FromYaml> FromYaml for Vec<T> {
    const KIND: NodeKind = NodeKind::Sequence;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::SEQ
    }

    fn construct<E: EventStream>(
        stream: &mut E,
        ctx: &mut ConstructionContext,
        reg: &mut TagRegistry,
    ) -> Result<Self, LoadError> {
        expect_seq_start(stream)?;
        let mut out = Vec::new();
        while !matches!(stream.peek()?, StructEvent::SeqEnd) {
            out.push(construct_child(stream, ctx, reg)?);
        }
        stream.next()?;
        Ok(out)
    }
}

impl<T: FromYaml + Eq + Hash> FromYaml for HashSet<T> {
    const KIND: NodeKind = NodeKind::Sequence;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::SET
    }

    fn construct<E: EventStream>(
        stream: &mut E,
        ctx: &mut ConstructionContext,
        reg: &mut TagRegistry,
    ) -> Result<Self, LoadError> {
        expect_seq_start(stream)?;
        let mut out = HashSet::new();
        while !matches!(stream.peek()?, StructEvent::SeqEnd) {
            out.insert(construct_child(stream, ctx, reg)?);
        }
        stream.next()?;
        Ok(out)
    }
}

impl<T: FromYaml, const N: usize> FromYaml for [T; N] {
    const KIND: NodeKind = NodeKind::Sequence;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::SEQ
    }

    fn construct<E: EventStream>(
        stream: &mut E,
        ctx: &mut ConstructionContext,
        reg: &mut TagRegistry,
    ) -> Result<Self, LoadError> {
        expect_seq_start(stream)?;
        let mut items = Vec::with_capacity(N);
        while !matches!(stream.peek()?, StructEvent::SeqEnd) {
            if items.len() == N {
                return Err(err_at(stream, ConstructionErrorKind::TooManyElements(N)));
            }
            items.push(construct_child(stream, ctx, reg)?);
        }
        stream.next()?;
        if items.len() < N {
            return Err(err_at(stream, ConstructionErrorKind::TooFewElements(N)));
        }
        match items.try_into() {
            Ok(array) => Ok(array),
            Err(_) => unreachable!("length verified above"),
        }
    }
}

fn construct_map_entry<K: FromYaml, V: FromYaml, E: EventStream>(
    stream: &mut E,
    ctx: &mut ConstructionContext,
    reg: &mut TagRegistry,
) -> Result<(K, V, String), LoadError> {
    let key_repr = match stream.peek()? {
        StructEvent::Scalar { content, .. } => content.clone(),
        _ => String::from("<complex key>"),
    };
    let key = construct_child(stream, ctx, reg)?;
    let value = construct_child(stream, ctx, reg)?;
    Ok((key, value, key_repr))
}

impl<K: FromYaml + Eq + Hash, V: FromYaml> FromYaml for HashMap<K, V> {
    const KIND: NodeKind = NodeKind::Mapping;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::MAP
    }

    fn construct<E: EventStream>(
        stream: &mut E,
        ctx: &mut ConstructionContext,
        reg: &mut TagRegistry,
    ) -> Result<Self, LoadError> {
        expect_map_start(stream)?;
        let mut out = HashMap::new();
        while !matches!(stream.peek()?, StructEvent::MapEnd) {
            let (key, value, key_repr) = construct_map_entry(stream, ctx, reg)?;
            if out.contains_key(&key) {
                return Err(err_at(stream, ConstructionErrorKind::DuplicateKey(key_repr)));
            }
            out.insert(key, value);
        }
        stream.next()?;
        Ok(out)
    }
}

impl<K: FromYaml + Ord, V: FromYaml> FromYaml for BTreeMap<K, V> {
    const KIND: NodeKind = NodeKind::Mapping;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::MAP
    }

    fn construct<E: EventStream>(
        stream: &mut E,
        ctx: &mut ConstructionContext,
        reg: &mut TagRegistry,
    ) -> Result<Self, LoadError> {
        expect_map_start(stream)?;
        let mut out = BTreeMap::new();
        while !matches!(stream.peek()?, StructEvent::MapEnd) {
            let (key, value, key_repr) = construct_map_entry(stream, ctx, reg)?;
            if out.contains_key(&key) {
                return Err(err_at(stream, ConstructionErrorKind::DuplicateKey(key_repr)));
            }
            out.insert(key, value);
        }
        stream.next()?;
        Ok(out)
    }
}

/// An insertion-ordered map. On the wire it is a sequence of single-pair
/// maps, which keeps entry order across tag libraries whose plain mappings
/// are unordered.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct OrderedMap<K, V>(pub Vec<(K, V)>);

impl<K: FromYaml, V: FromYaml> FromYaml for OrderedMap<K, V> {
    const KIND: NodeKind = NodeKind::Sequence;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::OMAP
    }

    fn construct<E: EventStream>(
        stream: &mut E,
        ctx: &mut ConstructionContext,
        reg: &mut TagRegistry,
    ) -> Result<Self, LoadError> {
        expect_seq_start(stream)?;
        let mut out = Vec::new();
        while !matches!(stream.peek()?, StructEvent::SeqEnd) {
            expect_map_start(stream)?;
            let key = construct_child(stream, ctx, reg)?;
            let value = construct_child(stream, ctx, reg)?;
            expect_map_end(stream)?;
            out.push((key, value));
        }
        stream.next()?;
        Ok(OrderedMap(out))
    }
}

impl<T: FromYaml> FromYaml for Option<T> {
    const KIND: NodeKind = T::KIND;
    const IS_REF: bool = T::IS_REF;

    fn yaml_tag(reg: &mut TagRegistry) -> TagId {
        T::yaml_tag(reg)
    }

    fn accepts_tag(tag: TagId, reg: &mut TagRegistry) -> bool {
        tag == TagId::NULL
            || (tag == TagId::NIL_STRING && T::KIND == NodeKind::String)
            || (tag == TagId::NIL_SEQ && T::KIND == NodeKind::Sequence)
            || T::accepts_tag(tag, reg)
    }

    fn construct<E: EventStream>(
        stream: &mut E,
        ctx: &mut ConstructionContext,
        reg: &mut TagRegistry,
    ) -> Result<Self, LoadError> {
        let is_null = match stream.peek()? {
            StructEvent::Scalar { content, tag, .. } => {
                *tag == TagId::NULL
                    || (*tag == TagId::NIL_STRING && T::KIND == NodeKind::String)
                    || (*tag == TagId::NIL_SEQ && T::KIND == NodeKind::Sequence)
                    || (*tag == TagId::QUESTION && guess_type(content) == TypeHint::Null)
            }
            _ => false,
        };
        if is_null {
            stream.next()?;
            return Ok(None);
        }
        construct_child(stream, ctx, reg).map(Some)
    }
}

// ---------------------------------------------------------------------------
// references

impl<T: FromYaml + Default + 'static> FromYaml for Rc<RefCell<T>> {
    const KIND: NodeKind = T::KIND;
    const IS_REF: bool = true;

    fn yaml_tag(reg: &mut TagRegistry) -> TagId {
        T::yaml_tag(reg)
    }

    fn accepts_tag(tag: TagId, reg: &mut TagRegistry) -> bool {
        T::accepts_tag(tag, reg)
    }

    fn construct<E: EventStream>(
        stream: &mut E,
        ctx: &mut ConstructionContext,
        reg: &mut TagRegistry,
    ) -> Result<Self, LoadError> {
        let alias_target = match stream.peek()? {
            StructEvent::Alias { target } => Some(*target),
            _ => None,
        };
        if let Some(target) = alias_target {
            let resolved = match ctx.resolve::<RefCell<T>>(target) {
                None => Err(err_at(stream, ConstructionErrorKind::UnknownAlias(target))),
                Some(Err(())) => Err(err_at(stream, ConstructionErrorKind::AliasTypeMismatch)),
                Some(Ok(rc)) => Ok(rc),
            }?;
            stream.next()?;
            return Ok(resolved);
        }
        let anchor = stream.peek()?.anchor();
        let fresh: Rc<RefCell<T>> = Rc::new(RefCell::new(T::default()));
        if anchor != NO_ANCHOR {
            // bind before recursing so aliases inside the node resolve,
            // and strip the anchor so the inner constructor accepts it
            let identity: Rc<dyn Any> = fresh.clone();
            ctx.bind(anchor, identity)
                .map_err(|kind| err_at(stream, kind))?;
            stream.peek_mut()?.clear_anchor();
        }
        let value = construct_child::<T, E>(stream, ctx, reg)?;
        *fresh.borrow_mut() = value;
        Ok(fresh)
    }
}

// ---------------------------------------------------------------------------
// record and variant helpers

/// Reads a non-variant record: a mapping keyed by field name, every field
/// present exactly once.
pub struct RecordReader {
    fields: &'static [&'static str],
    matched: Vec<bool>,
}

impl RecordReader {
    pub fn new(fields: &'static [&'static str]) -> RecordReader {
        RecordReader {
            fields,
            matched: vec![false; fields.len()],
        }
    }

    /// Consume the record's `MapStart`.
    pub fn begin<E: EventStream>(&mut self, stream: &mut E) -> Result<(), LoadError> {
        expect_map_start(stream)
    }

    /// Index of the next field, or `None` once the mapping ends. Duplicate,
    /// unknown and (at the end) missing fields fail here.
    pub fn next_field<E: EventStream>(&mut self, stream: &mut E) -> Result<Option<usize>, LoadError> {
        if matches!(stream.peek()?, StructEvent::MapEnd) {
            stream.next()?;
            if let Some(missing) = self.matched.iter().position(|m| !m) {
                return Err(err_at(
                    stream,
                    ConstructionErrorKind::MissingField(self.fields[missing]),
                ));
            }
            return Ok(None);
        }
        let key = expect_scalar(stream)?;
        match self.fields.iter().position(|f| **f == *key) {
            Some(i) if self.matched[i] => Err(err_at(
                stream,
                ConstructionErrorKind::DuplicateField(self.fields[i]),
            )),
            Some(i) => {
                self.matched[i] = true;
                Ok(Some(i))
            }
            None => Err(err_at(stream, ConstructionErrorKind::UnknownField(key))),
        }
    }
}

/// Reads a variant record: a sequence of single-pair maps, the discriminator
/// pair first.
pub struct VariantReader {
    discriminator: &'static str,
}

impl VariantReader {
    pub fn new(discriminator: &'static str) -> VariantReader {
        VariantReader { discriminator }
    }

    /// Consume the record's `SeqStart`.
    pub fn begin<E: EventStream>(&self, stream: &mut E) -> Result<(), LoadError> {
        expect_seq_start(stream)
    }

    /// Read the leading discriminator pair.
    pub fn read_discriminator<D: FromYaml, E: EventStream>(
        &self,
        stream: &mut E,
        ctx: &mut ConstructionContext,
        reg: &mut TagRegistry,
    ) -> Result<D, LoadError> {
        expect_map_start(stream)?;
        let key = expect_scalar(stream)?;
        if key != self.discriminator {
            return Err(err_at(
                stream,
                ConstructionErrorKind::UnexpectedEvent {
                    expected: "discriminator field",
                    got: key,
                },
            ));
        }
        let value = construct_child(stream, ctx, reg)?;
        expect_map_end(stream)?;
        Ok(value)
    }

    /// Key of the next field pair, or `None` at the sequence end. The caller
    /// constructs the value and then calls [`VariantReader::end_field`].
    pub fn next_field<E: EventStream>(&self, stream: &mut E) -> Result<Option<String>, LoadError> {
        if matches!(stream.peek()?, StructEvent::SeqEnd) {
            stream.next()?;
            return Ok(None);
        }
        expect_map_start(stream)?;
        expect_scalar(stream).map(Some)
    }

    /// Consume the `MapEnd` closing a field pair.
    pub fn end_field<E: EventStream>(&self, stream: &mut E) -> Result<(), LoadError> {
        expect_map_end(stream)
    }

    /// The error for a field the current discriminator value does not allow.
    pub fn field_not_allowed(&self, field: String, value: String) -> ConstructionErrorKind {
        ConstructionErrorKind::FieldNotAllowed {
            field,
            discriminator: self.discriminator,
            value,
        }
    }
}

// ---------------------------------------------------------------------------
// implicit variant dispatch

/// Tags the next node could construct into, per the implicit variant rules:
/// untagged scalars enumerate by spelling, `!` means string, explicit tags
/// stand for themselves, and untagged containers are an error.
pub fn possible_tags<E: EventStream>(
    stream: &mut E,
    reg: &mut TagRegistry,
) -> Result<Vec<TagId>, LoadError> {
    enum Peeked {
        Scalar { content: String, tag: TagId },
        Container { tag: TagId },
        Other(&'static str),
    }
    let peeked = match stream.peek()? {
        StructEvent::Scalar { content, tag, .. } => Peeked::Scalar {
            content: content.clone(),
            tag: *tag,
        },
        StructEvent::SeqStart { tag, .. } | StructEvent::MapStart { tag, .. } => {
            Peeked::Container { tag: *tag }
        }
        other => Peeked::Other(other.kind_name()),
    };
    match peeked {
        Peeked::Scalar { content, tag } => {
            if tag == TagId::QUESTION {
                Ok(match guess_type(&content) {
                    TypeHint::Integer => {
                        let mut tags = signed_int_tags(reg);
                        if !content.starts_with('-') {
                            tags.extend(unsigned_int_tags(reg));
                        }
                        tags
                    }
                    TypeHint::Float | TypeHint::FloatInf | TypeHint::FloatNaN => float_tags(reg),
                    TypeHint::BoolTrue | TypeHint::BoolFalse => vec![TagId::BOOLEAN],
                    TypeHint::Null => vec![TagId::NULL],
                    TypeHint::Unknown => vec![TagId::STRING],
                })
            } else if tag == TagId::EXCLAMATION {
                Ok(vec![TagId::STRING])
            } else {
                Ok(vec![tag])
            }
        }
        Peeked::Container { tag } => {
            if tag == TagId::QUESTION || tag == TagId::EXCLAMATION {
                Err(err_at(stream, ConstructionErrorKind::UntaggedComplexValue))
            } else {
                Ok(vec![tag])
            }
        }
        Peeked::Other(name) => Err(err_at(
            stream,
            ConstructionErrorKind::UnexpectedEvent {
                expected: "node",
                got: name.to_string(),
            },
        )),
    }
}

/// The error raised when no branch of an implicit variant matches.
pub fn no_variant_match<E: EventStream>(
    stream: &E,
    reg: &TagRegistry,
    target: &'static str,
    possible: &[TagId],
) -> LoadError {
    let uri = possible
        .first()
        .map(|t| reg.uri(*t).to_string())
        .unwrap_or_default();
    err_at(stream, ConstructionErrorKind::NoVariantMatch { target, uri })
}

// ---------------------------------------------------------------------------
// document driving

/// Drives construction over the documents of one event stream. A single
/// context spans all documents of the load call, so anchors bound in an
/// earlier document stay resolvable in later ones.
pub struct Loader<E> {
    stream: E,
    ctx: ConstructionContext,
    started: bool,
}

impl<E: EventStream> Loader<E> {
    pub fn new(stream: E) -> Loader<E> {
        Loader {
            stream,
            ctx: ConstructionContext::new(),
            started: false,
        }
    }

    /// Construct the next document's root value. Consumes everything from
    /// its `DocStart` through the matching `DocEnd`.
    pub fn load_next<T: FromYaml>(&mut self, reg: &mut TagRegistry) -> Result<T, LoadError> {
        if !self.started {
            self.started = true;
            if matches!(self.stream.peek(), Ok(StructEvent::StreamStart)) {
                self.stream.next()?;
            }
        }
        match self.stream.next()? {
            StructEvent::DocStart => {}
            other => {
                return Err(err_at(
                    &self.stream,
                    ConstructionErrorKind::UnexpectedEvent {
                        expected: "document start",
                        got: other.kind_name().to_string(),
                    },
                ))
            }
        }
        trace!(root = T::type_name(), "constructing document");
        let value = construct_child::<T, E>(&mut self.stream, &mut self.ctx, reg)?;
        match self.stream.next()? {
            StructEvent::DocEnd => Ok(value),
            other => Err(err_at(
                &self.stream,
                ConstructionErrorKind::UnexpectedEvent {
                    expected: "document end",
                    got: other.kind_name().to_string(),
                },
            )),
        }
    }

    pub fn finished(&mut self) -> bool {
        self.stream.finished() || matches!(self.stream.peek(), Ok(StructEvent::StreamEnd))
    }
}

/// Load a single document from a materialised event stream.
pub fn load<T: FromYaml>(
    events: impl Into<BufferedEvents>,
    reg: &mut TagRegistry,
) -> Result<T, LoadError> {
    Loader::new(events.into()).load_next(reg)
}
