//! Representation: walking a typed value into a materialised event stream.
//!
//! The inverse of construction. [`represent`] returns the document's events
//! wrapped in `DocStart`/`DocEnd`; materialisation (rather than a lazy
//! stream) is what makes the `Tidy` anchor style possible, since it patches
//! first occurrences after the walk.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use tracing::trace;

use crate::construct::{NodeKind, OrderedMap};
use crate::error::StreamError;
use crate::events::{AnchorId, BufferedEvents, ScalarStyle, StructEvent, NO_ANCHOR};
use crate::tags::{TagId, TagRegistry};

/// How tags are written out.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TagStyle {
    /// `?` everywhere.
    None,
    /// The real tag on the root node, `?` beneath.
    RootOnly,
    /// Real tags everywhere.
    All,
}

impl TagStyle {
    /// The style children of the current node are written in. `RootOnly`
    /// downgrades to `None` beneath the root.
    pub fn child(self) -> TagStyle {
        match self {
            TagStyle::RootOnly => TagStyle::None,
            other => other,
        }
    }
}

/// How anchors are assigned to reference values.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AnchorStyle {
    /// Dereference and inline; no alias detection.
    None,
    /// Anchor only objects that turn out to be referenced more than once.
    Tidy,
    /// Anchor every reference object on first sight.
    Always,
}

enum RefState {
    /// Seen once; no id assigned yet (`Tidy` only).
    Provisional,
    Anchored(AnchorId),
}

/// Per-document serialization state: object identity to anchor mapping, the
/// id generator, and the event buffer being produced.
pub struct SerializationContext {
    style: AnchorStyle,
    refs: HashMap<usize, RefState>,
    /// First-occurrence event positions awaiting the post-pass (`Tidy`).
    pending: Vec<(usize, usize)>,
    next_anchor: AnchorId,
    events: Vec<StructEvent>,
}

impl SerializationContext {
    pub fn new(style: AnchorStyle) -> SerializationContext {
        SerializationContext {
            style,
            refs: HashMap::new(),
            pending: Vec::new(),
            next_anchor: NO_ANCHOR + 1,
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: StructEvent) {
        self.events.push(event);
    }

    fn fresh_anchor(&mut self) -> AnchorId {
        let id = self.next_anchor;
        self.next_anchor += 1;
        id
    }

    /// Resolve `Tidy`'s provisional entries: objects referenced more than
    /// once got an id on their second visit; patch it onto their first
    /// occurrence. Singly-referenced objects stay anchor-free.
    fn finish(mut self) -> Vec<StructEvent> {
        for (index, addr) in &self.pending {
            if let Some(RefState::Anchored(id)) = self.refs.get(addr) {
                self.events[*index].set_anchor(*id);
            }
        }
        self.events
    }
}

/// A type representable as YAML events.
pub trait ToYaml {
    const KIND: NodeKind;

    fn yaml_tag(reg: &mut TagRegistry) -> TagId
    where
        Self: Sized;

    fn represent(
        &self,
        ctx: &mut SerializationContext,
        reg: &mut TagRegistry,
        tags: TagStyle,
    ) -> Result<(), StreamError>;
}

/// The tag to put on a node, honouring the tag style.
pub fn node_tag<T: ToYaml>(reg: &mut TagRegistry, tags: TagStyle) -> TagId {
    match tags {
        TagStyle::None => TagId::QUESTION,
        _ => T::yaml_tag(reg),
    }
}

/// Emit a record field key in the given style.
pub fn represent_field_key(ctx: &mut SerializationContext, name: &str, tags: TagStyle) {
    let tag = match tags {
        TagStyle::None => TagId::QUESTION,
        _ => TagId::STRING,
    };
    ctx.emit(StructEvent::scalar(name, tag));
}

/// Represent one value as a single document event stream.
pub fn represent<T: ToYaml>(
    value: &T,
    tags: TagStyle,
    anchors: AnchorStyle,
    reg: &mut TagRegistry,
) -> Result<Vec<StructEvent>, StreamError> {
    trace!(root = std::any::type_name::<T>(), "representing document");
    let mut ctx = SerializationContext::new(anchors);
    ctx.emit(StructEvent::DocStart);
    value.represent(&mut ctx, reg, tags)?;
    ctx.emit(StructEvent::DocEnd);
    Ok(ctx.finish())
}

/// Represent one value and wrap the events for immediate re-loading.
pub fn dump<T: ToYaml>(
    value: &T,
    tags: TagStyle,
    anchors: AnchorStyle,
    reg: &mut TagRegistry,
) -> Result<BufferedEvents, StreamError> {
    represent(value, tags, anchors, reg).map(BufferedEvents::new)
}

// ---------------------------------------------------------------------------
// primitives

fn emit_scalar(ctx: &mut SerializationContext, content: String, tag: TagId) {
    ctx.emit(StructEvent::Scalar {
        content,
        tag,
        anchor: NO_ANCHOR,
        style: ScalarStyle::Plain,
    });
}

macro_rules! impl_to_yaml_int {
    ($($t:ty => $uri:literal),* $(,)?) => {$(
        impl ToYaml for $t {
            const KIND: NodeKind = NodeKind::Scalar;

            fn yaml_tag(reg: &mut TagRegistry) -> TagId {
                reg.register($uri)
            }

            fn represent(
                &self,
                ctx: &mut SerializationContext,
                reg: &mut TagRegistry,
                tags: TagStyle,
            ) -> Result<(), StreamError> {
                let tag = node_tag::<Self>(reg, tags);
                emit_scalar(ctx, self.to_string(), tag);
                Ok(())
            }
        }
    )*};
}

impl_to_yaml_int! {
    i8 => "!forge:i8",
    i16 => "!forge:i16",
    i32 => "!forge:i32",
    i64 => "!forge:i64",
    u8 => "!forge:u8",
    u16 => "!forge:u16",
    u32 => "!forge:u32",
    u64 => "!forge:u64",
}

impl ToYaml for isize {
    const KIND: NodeKind = NodeKind::Scalar;

    fn yaml_tag(reg: &mut TagRegistry) -> TagId {
        reg.register("!forge:isize")
    }

    fn represent(
        &self,
        ctx: &mut SerializationContext,
        reg: &mut TagRegistry,
        tags: TagStyle,
    ) -> Result<(), StreamError> {
        let wire: i64 = (*self)
            .try_into()
            .map_err(|_| StreamError::OutOfRange(self.to_string()))?;
        let tag = node_tag::<Self>(reg, tags);
        emit_scalar(ctx, wire.to_string(), tag);
        Ok(())
    }
}

impl ToYaml for usize {
    const KIND: NodeKind = NodeKind::Scalar;

    fn yaml_tag(reg: &mut TagRegistry) -> TagId {
        reg.register("!forge:usize")
    }

    fn represent(
        &self,
        ctx: &mut SerializationContext,
        reg: &mut TagRegistry,
        tags: TagStyle,
    ) -> Result<(), StreamError> {
        let wire: u64 = (*self)
            .try_into()
            .map_err(|_| StreamError::OutOfRange(self.to_string()))?;
        let tag = node_tag::<Self>(reg, tags);
        emit_scalar(ctx, wire.to_string(), tag);
        Ok(())
    }
}

macro_rules! impl_to_yaml_float {
    ($($t:ty => $uri:literal),* $(,)?) => {$(
        impl ToYaml for $t {
            const KIND: NodeKind = NodeKind::Scalar;

            fn yaml_tag(reg: &mut TagRegistry) -> TagId {
                reg.register($uri)
            }

            fn represent(
                &self,
                ctx: &mut SerializationContext,
                reg: &mut TagRegistry,
                tags: TagStyle,
            ) -> Result<(), StreamError> {
                let content = if self.is_nan() {
                    String::from(".nan")
                } else if *self == <$t>::INFINITY {
                    String::from(".inf")
                } else if *self == <$t>::NEG_INFINITY {
                    String::from("-.inf")
                } else {
                    self.to_string()
                };
                let tag = node_tag::<Self>(reg, tags);
                emit_scalar(ctx, content, tag);
                Ok(())
            }
        }
    )*};
}

impl_to_yaml_float! {
    f32 => "!forge:f32",
    f64 => "!forge:f64",
}

impl ToYaml for bool {
    const KIND: NodeKind = NodeKind::Scalar;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::BOOLEAN
    }

    fn represent(
        &self,
        ctx: &mut SerializationContext,
        reg: &mut TagRegistry,
        tags: TagStyle,
    ) -> Result<(), StreamError> {
        let tag = node_tag::<Self>(reg, tags);
        emit_scalar(ctx, String::from(if *self { "true" } else { "false" }), tag);
        Ok(())
    }
}

impl ToYaml for char {
    const KIND: NodeKind = NodeKind::Scalar;

    fn yaml_tag(reg: &mut TagRegistry) -> TagId {
        reg.register("!forge:char")
    }

    fn represent(
        &self,
        ctx: &mut SerializationContext,
        reg: &mut TagRegistry,
        tags: TagStyle,
    ) -> Result<(), StreamError> {
        let tag = node_tag::<Self>(reg, tags);
        emit_scalar(ctx, self.to_string(), tag);
        Ok(())
    }
}

impl ToYaml for String {
    const KIND: NodeKind = NodeKind::String;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::STRING
    }

    fn represent(
        &self,
        ctx: &mut SerializationContext,
        reg: &mut TagRegistry,
        tags: TagStyle,
    ) -> Result<(), StreamError> {
        let tag = node_tag::<Self>(reg, tags);
        emit_scalar(ctx, self.clone(), tag);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// containers

fn represent_seq<'a, T: ToYaml + 'a>(
    items: impl Iterator<Item = &'a T>,
    tag: TagId,
    ctx: &mut SerializationContext,
    reg: &mut TagRegistry,
    tags: TagStyle,
) -> Result<(), StreamError> {
    ctx.emit(StructEvent::SeqStart {
        tag,
        anchor: NO_ANCHOR,
    });
    for item in items {
        item.represent(ctx, reg, tags.child())?;
    }
    ctx.emit(StructEvent::SeqEnd);
    Ok(())
}

impl<T: ToYaml> ToYaml for Vec<T> {
    const KIND: NodeKind = NodeKind::Sequence;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::SEQ
    }

    fn represent(
        &self,
        ctx: &mut SerializationContext,
        reg: &mut TagRegistry,
        tags: TagStyle,
    ) -> Result<(), StreamError> {
        let tag = node_tag::<Self>(reg, tags);
        represent_seq(self.iter(), tag, ctx, reg, tags)
    }
}

impl<T: ToYaml, const N: usize> ToYaml for [T; N] {
    const KIND: NodeKind = NodeKind::Sequence;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::SEQ
    }

    fn represent(
        &self,
        ctx: &mut SerializationContext,
        reg: &mut TagRegistry,
        tags: TagStyle,
    ) -> Result<(), StreamError> {
        let tag = node_tag::<Self>(reg, tags);
        represent_seq(self.iter(), tag, ctx, reg, tags)
    }
}

impl<T: ToYaml> ToYaml for HashSet<T> {
    const KIND: NodeKind = NodeKind::Sequence;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::SET
    }

    fn represent(
        &self,
        ctx: &mut SerializationContext,
        reg: &mut TagRegistry,
        tags: TagStyle,
    ) -> Result<(), StreamError> {
        let tag = node_tag::<Self>(reg, tags);
        represent_seq(self.iter(), tag, ctx, reg, tags)
    }
}

fn represent_map<'a, K: ToYaml + 'a, V: ToYaml + 'a>(
    entries: impl Iterator<Item = (&'a K, &'a V)>,
    tag: TagId,
    ctx: &mut SerializationContext,
    reg: &mut TagRegistry,
    tags: TagStyle,
) -> Result<(), StreamError> {
    ctx.emit(StructEvent::MapStart {
        tag,
        anchor: NO_ANCHOR,
    });
    for (key, value) in entries {
        key.represent(ctx, reg, tags.child())?;
        value.represent(ctx, reg, tags.child())?;
    }
    ctx.emit(StructEvent::MapEnd);
    Ok(())
}

impl<K: ToYaml, V: ToYaml> ToYaml for HashMap<K, V> {
    const KIND: NodeKind = NodeKind::Mapping;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::MAP
    }

    fn represent(
        &self,
        ctx: &mut SerializationContext,
        reg: &mut TagRegistry,
        tags: TagStyle,
    ) -> Result<(), StreamError> {
        let tag = node_tag::<Self>(reg, tags);
        represent_map(self.iter(), tag, ctx, reg, tags)
    }
}

impl<K: ToYaml, V: ToYaml> ToYaml for BTreeMap<K, V> {
    const KIND: NodeKind = NodeKind::Mapping;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::MAP
    }

    fn represent(
        &self,
        ctx: &mut SerializationContext,
        reg: &mut TagRegistry,
        tags: TagStyle,
    ) -> Result<(), StreamError> {
        let tag = node_tag::<Self>(reg, tags);
        represent_map(self.iter(), tag, ctx, reg, tags)
    }
}

impl<K: ToYaml, V: ToYaml> ToYaml for OrderedMap<K, V> {
    const KIND: NodeKind = NodeKind::Sequence;

    fn yaml_tag(_reg: &mut TagRegistry) -> TagId {
        TagId::OMAP
    }

    fn represent(
        &self,
        ctx: &mut SerializationContext,
        reg: &mut TagRegistry,
        tags: TagStyle,
    ) -> Result<(), StreamError> {
        let tag = node_tag::<Self>(reg, tags);
        ctx.emit(StructEvent::SeqStart {
            tag,
            anchor: NO_ANCHOR,
        });
        for (key, value) in &self.0 {
            ctx.emit(StructEvent::MapStart {
                tag: TagId::QUESTION,
                anchor: NO_ANCHOR,
            });
            key.represent(ctx, reg, tags.child())?;
            value.represent(ctx, reg, tags.child())?;
            ctx.emit(StructEvent::MapEnd);
        }
        ctx.emit(StructEvent::SeqEnd);
        Ok(())
    }
}

impl<T: ToYaml> ToYaml for Option<T> {
    const KIND: NodeKind = T::KIND;

    fn yaml_tag(reg: &mut TagRegistry) -> TagId {
        T::yaml_tag(reg)
    }

    fn represent(
        &self,
        ctx: &mut SerializationContext,
        reg: &mut TagRegistry,
        tags: TagStyle,
    ) -> Result<(), StreamError> {
        match self {
            Some(value) => value.represent(ctx, reg, tags),
            // null strings and sequences keep their nullability on the wire
            // through the sentinel tags
            None => {
                let (content, tag) = match T::KIND {
                    NodeKind::String => (String::new(), TagId::NIL_STRING),
                    NodeKind::Sequence => (String::new(), TagId::NIL_SEQ),
                    _ => (
                        String::from("~"),
                        if tags == TagStyle::None {
                            TagId::QUESTION
                        } else {
                            TagId::NULL
                        },
                    ),
                };
                emit_scalar(ctx, content, tag);
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// references

impl<T: ToYaml> ToYaml for Rc<RefCell<T>> {
    const KIND: NodeKind = T::KIND;

    fn yaml_tag(reg: &mut TagRegistry) -> TagId {
        T::yaml_tag(reg)
    }

    fn represent(
        &self,
        ctx: &mut SerializationContext,
        reg: &mut TagRegistry,
        tags: TagStyle,
    ) -> Result<(), StreamError> {
        let addr = Rc::as_ptr(self) as usize;
        let seen = match ctx.refs.get(&addr) {
            None => None,
            Some(RefState::Provisional) => Some(None),
            Some(RefState::Anchored(id)) => Some(Some(*id)),
        };
        match ctx.style {
            AnchorStyle::None => self.borrow().represent(ctx, reg, tags),
            AnchorStyle::Always => match seen {
                Some(Some(id)) => {
                    ctx.emit(StructEvent::Alias { target: id });
                    Ok(())
                }
                _ => {
                    let id = ctx.fresh_anchor();
                    ctx.refs.insert(addr, RefState::Anchored(id));
                    let start = ctx.events.len();
                    self.borrow().represent(ctx, reg, tags)?;
                    ctx.events[start].set_anchor(id);
                    Ok(())
                }
            },
            AnchorStyle::Tidy => match seen {
                Some(Some(id)) => {
                    ctx.emit(StructEvent::Alias { target: id });
                    Ok(())
                }
                Some(None) => {
                    // second visit: the object is shared after all
                    let id = ctx.fresh_anchor();
                    ctx.refs.insert(addr, RefState::Anchored(id));
                    ctx.emit(StructEvent::Alias { target: id });
                    Ok(())
                }
                None => {
                    ctx.refs.insert(addr, RefState::Provisional);
                    let start = ctx.events.len();
                    self.borrow().represent(ctx, reg, tags)?;
                    ctx.pending.push((start, addr));
                    Ok(())
                }
            },
        }
    }
}
