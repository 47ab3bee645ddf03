//! Structural events and the stream interface between parser and engine.

use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

use crate::error::{SourceContext, StreamError};
use crate::tags::TagId;

/// Anchor identifier. Anchors are small integers assigned by the event
/// producer; `NO_ANCHOR` marks an unanchored node.
pub type AnchorId = u32;

pub const NO_ANCHOR: AnchorId = 0;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum ScalarStyle {
    #[default]
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

/// One structural event of a document stream.
#[derive(Clone, PartialEq, Debug)]
pub enum StructEvent {
    StreamStart,
    StreamEnd,
    DocStart,
    DocEnd,
    SeqStart { tag: TagId, anchor: AnchorId },
    SeqEnd,
    MapStart { tag: TagId, anchor: AnchorId },
    MapEnd,
    Scalar {
        content: String,
        tag: TagId,
        anchor: AnchorId,
        style: ScalarStyle,
    },
    Alias { target: AnchorId },
}

impl StructEvent {
    pub fn scalar(content: impl Into<String>, tag: TagId) -> StructEvent {
        StructEvent::Scalar {
            content: content.into(),
            tag,
            anchor: NO_ANCHOR,
            style: ScalarStyle::Plain,
        }
    }

    pub fn anchor(&self) -> AnchorId {
        match self {
            StructEvent::SeqStart { anchor, .. }
            | StructEvent::MapStart { anchor, .. }
            | StructEvent::Scalar { anchor, .. } => *anchor,
            _ => NO_ANCHOR,
        }
    }

    pub fn set_anchor(&mut self, id: AnchorId) {
        if let StructEvent::SeqStart { anchor, .. }
        | StructEvent::MapStart { anchor, .. }
        | StructEvent::Scalar { anchor, .. } = self
        {
            *anchor = id;
        }
    }

    pub fn clear_anchor(&mut self) {
        self.set_anchor(NO_ANCHOR);
    }

    pub fn tag(&self) -> Option<TagId> {
        match self {
            StructEvent::SeqStart { tag, .. }
            | StructEvent::MapStart { tag, .. }
            | StructEvent::Scalar { tag, .. } => Some(*tag),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            StructEvent::StreamStart => "stream start",
            StructEvent::StreamEnd => "stream end",
            StructEvent::DocStart => "document start",
            StructEvent::DocEnd => "document end",
            StructEvent::SeqStart { .. } => "sequence start",
            StructEvent::SeqEnd => "sequence end",
            StructEvent::MapStart { .. } => "mapping start",
            StructEvent::MapEnd => "mapping end",
            StructEvent::Scalar { .. } => "scalar",
            StructEvent::Alias { .. } => "alias",
        }
    }
}

impl Display for StructEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fn node(f: &mut Formatter<'_>, tag: TagId, anchor: AnchorId) -> std::fmt::Result {
            if anchor != NO_ANCHOR {
                write!(f, " &{anchor}")?;
            }
            if tag != TagId::QUESTION {
                write!(f, " <{}>", tag.index())?;
            }
            Ok(())
        }
        match self {
            StructEvent::StreamStart => write!(f, "+STR"),
            StructEvent::StreamEnd => write!(f, "-STR"),
            StructEvent::DocStart => write!(f, "+DOC"),
            StructEvent::DocEnd => write!(f, "-DOC"),
            StructEvent::SeqStart { tag, anchor } => {
                write!(f, "+SEQ")?;
                node(f, *tag, *anchor)
            }
            StructEvent::SeqEnd => write!(f, "-SEQ"),
            StructEvent::MapStart { tag, anchor } => {
                write!(f, "+MAP")?;
                node(f, *tag, *anchor)
            }
            StructEvent::MapEnd => write!(f, "-MAP"),
            StructEvent::Scalar {
                content,
                tag,
                anchor,
                ..
            } => {
                write!(f, "=VAL")?;
                node(f, *tag, *anchor)?;
                write!(f, " :{content}")
            }
            StructEvent::Alias { target } => write!(f, "=ALI *{target}"),
        }
    }
}

/// Forward, peekable, finite stream of structural events.
///
/// The peeked event may be replaced in place; the engine uses this to strip
/// an anchor before recursing into the anchored node's constructor.
pub trait EventStream {
    fn next(&mut self) -> Result<StructEvent, StreamError>;
    fn peek(&mut self) -> Result<&StructEvent, StreamError>;
    fn peek_mut(&mut self) -> Result<&mut StructEvent, StreamError>;
    fn finished(&mut self) -> bool;

    /// Best-effort source location of the last delivered token.
    fn last_token_context(&self) -> Option<SourceContext> {
        None
    }
}

/// Materialised event stream backed by a queue. Produced by the
/// representation engine and used directly in tests and round-trips.
#[derive(Clone, Debug, Default)]
pub struct BufferedEvents {
    events: VecDeque<StructEvent>,
}

impl BufferedEvents {
    pub fn new(events: Vec<StructEvent>) -> BufferedEvents {
        BufferedEvents {
            events: events.into(),
        }
    }
}

impl From<Vec<StructEvent>> for BufferedEvents {
    fn from(events: Vec<StructEvent>) -> BufferedEvents {
        BufferedEvents::new(events)
    }
}

impl EventStream for BufferedEvents {
    fn next(&mut self) -> Result<StructEvent, StreamError> {
        self.events.pop_front().ok_or(StreamError::UnexpectedEnd)
    }

    fn peek(&mut self) -> Result<&StructEvent, StreamError> {
        self.events.front().ok_or(StreamError::UnexpectedEnd)
    }

    fn peek_mut(&mut self) -> Result<&mut StructEvent, StreamError> {
        self.events.front_mut().ok_or(StreamError::UnexpectedEnd)
    }

    fn finished(&mut self) -> bool {
        self.events.is_empty()
    }
}
