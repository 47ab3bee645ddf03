//! Core of a YAML 1.2 processing library: a streaming, permissive lexer and
//! a type-directed construction/representation engine over structural event
//! streams. The parser sitting between the two layers is an external
//! collaborator; its interfaces ([`events::EventStream`], [`error::ParserError`])
//! are defined here.

pub use construct::{construct_child, load, FromYaml, Loader};
pub use represent::{dump, represent, AnchorStyle, TagStyle, ToYaml};
pub use tokenizer::{LexEventKind, Lexer};

pub mod construct;
pub mod encoding;
pub mod error;
pub mod events;
pub mod hints;
pub mod represent;
pub mod tags;
pub mod tokenizer;
