//! The error surface of the typed engine.
//!
//! Lexer errors are inline events and never reach this module. Everything the
//! construction and representation engines can raise is classified here so a
//! caller sees a typed construction error, a stream/IO error, or a parser
//! error, never an unclassified failure.

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::events::AnchorId;

/// Best-effort source location of the event a failure was detected on.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SourceContext {
    pub line: u32,
    pub column: u32,
    pub line_content: String,
}

/// Semantic failure while constructing a typed value from events.
#[derive(Debug)]
pub struct ConstructionError {
    pub kind: ConstructionErrorKind,
    pub location: Option<SourceContext>,
}

impl ConstructionError {
    pub fn new(kind: ConstructionErrorKind) -> ConstructionError {
        ConstructionError {
            kind,
            location: None,
        }
    }

    pub fn at(mut self, location: Option<SourceContext>) -> ConstructionError {
        self.location = location;
        self
    }
}

impl Display for ConstructionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(loc) = &self.location {
            write!(f, " at line {}, column {}", loc.line + 1, loc.column + 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConstructionError {}

impl From<ConstructionErrorKind> for ConstructionError {
    fn from(kind: ConstructionErrorKind) -> ConstructionError {
        ConstructionError::new(kind)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConstructionErrorKind {
    #[error("Wrong tag: expected {expected}, got {got}")]
    WrongTag { expected: String, got: String },
    #[error("Anchor on non-ref type")]
    AnchorOnNonRef,
    #[error("Alias to non-ref type")]
    AliasOnNonRef,
    #[error("Alias to unknown anchor: {0}")]
    UnknownAlias(AnchorId),
    #[error("Alias target has incompatible type")]
    AliasTypeMismatch,
    #[error("Anchor already bound: {0}")]
    AnchorAlreadyBound(AnchorId),
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Duplicate field: {0}")]
    DuplicateField(&'static str),
    #[error("Duplicate table key: {0}")]
    DuplicateKey(String),
    #[error("Cannot construct to {target}: {content}")]
    MalformedLiteral {
        target: &'static str,
        content: String,
    },
    #[error("Field {field} not allowed for {discriminator} == {value}")]
    FieldNotAllowed {
        field: String,
        discriminator: &'static str,
        value: String,
    },
    #[error("This value type does not map to any field in {target}: {uri}")]
    NoVariantMatch { target: &'static str, uri: String },
    #[error("Complex value must have a tag")]
    UntaggedComplexValue,
    #[error("Expected {expected}, got {got}")]
    UnexpectedEvent {
        expected: &'static str,
        got: String,
    },
    #[error("Too few elements: expected {0}")]
    TooFewElements(usize),
    #[error("Too many elements: expected {0}")]
    TooManyElements(usize),
}

/// Failure of the event producer itself, or a value that does not fit the
/// wire format during representation.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Unexpected end of event stream")]
    UnexpectedEnd,
    #[error("Event producer failed: {0}")]
    Producer(String),
    #[error("Value out of range for wire format: {0}")]
    OutOfRange(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Error raised by the external parser, surfaced unchanged.
#[derive(Debug, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct ParserError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

/// Umbrella error at the `load` boundary.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Parser(#[from] ParserError),
}

impl From<ConstructionErrorKind> for LoadError {
    fn from(kind: ConstructionErrorKind) -> LoadError {
        LoadError::Construction(ConstructionError::new(kind))
    }
}

impl LoadError {
    /// The construction error kind, for matching in tests and callers.
    pub fn construction_kind(&self) -> Option<&ConstructionErrorKind> {
        match self {
            LoadError::Construction(e) => Some(&e.kind),
            _ => None,
        }
    }
}
