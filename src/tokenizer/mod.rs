pub(crate) mod char_utils;
mod iterator;
mod lexer;
mod source;

pub use iterator::{LexIter, OwnedLexEvent};
pub use lexer::{LexEvent, Lexer};
pub use source::{ReadSource, SliceSource, Source};

/// Kind of a lexical event.
///
/// Payload text, when a kind carries one, lives in the lexer's content slot
/// and is valid until the next event is requested.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LexEventKind {
    // separators
    DirectivesEnd,
    DocumentEnd,
    StreamEnd,
    // directive-only
    TagDirective,
    YamlDirective,
    UnknownDirective,
    MajorVersion,
    MinorVersion,
    TagUri,
    UnknownDirectiveParam,
    // shared
    TagHandle,
    Comment,
    // content
    LineStart,
    ControlChar,
    // block scalar header
    LiteralScalar,
    FoldedScalar,
    BlockIndentationIndicator,
    BlockChompingIndicator,
    // scalar
    Scalar,
    BlockScalarLine,
    // tag
    VerbatimTag,
    TagSuffix,
    // anchoring
    Anchor,
    Alias,
    // error; the content slot holds the message
    Error,
}

impl LexEventKind {
    pub fn name(self) -> &'static str {
        use LexEventKind::*;
        match self {
            DirectivesEnd => "DirectivesEnd",
            DocumentEnd => "DocumentEnd",
            StreamEnd => "StreamEnd",
            TagDirective => "TagDirective",
            YamlDirective => "YamlDirective",
            UnknownDirective => "UnknownDirective",
            MajorVersion => "MajorVersion",
            MinorVersion => "MinorVersion",
            TagUri => "TagUri",
            UnknownDirectiveParam => "UnknownDirectiveParam",
            TagHandle => "TagHandle",
            Comment => "Comment",
            LineStart => "LineStart",
            ControlChar => "ControlChar",
            LiteralScalar => "LiteralScalar",
            FoldedScalar => "FoldedScalar",
            BlockIndentationIndicator => "BlockIndentationIndicator",
            BlockChompingIndicator => "BlockChompingIndicator",
            Scalar => "Scalar",
            BlockScalarLine => "BlockScalarLine",
            VerbatimTag => "VerbatimTag",
            TagSuffix => "TagSuffix",
            Anchor => "Anchor",
            Alias => "Alias",
            Error => "Error",
        }
    }
}
