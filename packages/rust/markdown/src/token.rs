//! Top-level markdown tokens.
//!
//! The lexer groups pulldown-cmark's flat event stream into one [`Token`] per
//! top-level block. Each token keeps the exact source slice it came from and,
//! where the renderer needs them, the owned events of the block.

use std::fmt;

use pulldown_cmark::{CowStr, Event, HeadingLevel};

/// A parsed top-level block of a markdown document.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Heading(Heading),
    Code(CodeBlock),
    Html(HtmlBlock),
    Paragraph(Block),
    List(Block),
    BlockQuote(Block),
    Table(Block),
    Rule(Block),
    /// Any other top-level container (footnote definitions and the like).
    Other(Block),
}

/// Discriminant of a [`Token`], used for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Heading,
    Code,
    Html,
    Paragraph,
    List,
    BlockQuote,
    Table,
    Rule,
    Other,
}

/// An ATX or setext heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    /// Level, 1-6.
    pub depth: u8,
    /// Plain text content (inline markup stripped).
    pub text: String,
    /// Source slice.
    pub raw: String,
    /// Inline events between the heading's start and end tags.
    pub inline: Vec<Event<'static>>,
    /// Not part of any source document; rendered without an anchor id.
    pub synthesized: bool,
}

/// A fenced or indented code block.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    /// Fence language (first word of the info string), empty when absent.
    pub lang: String,
    /// Code content, including its trailing newline.
    pub text: String,
    /// Source slice.
    pub raw: String,
}

/// Raw HTML emitted verbatim by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlBlock {
    pub text: String,
    pub raw: String,
}

/// Any block the renderer hands to pulldown-cmark as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub raw: String,
    /// All events of the block, start and end tags included.
    pub events: Vec<Event<'static>>,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Heading(_) => TokenKind::Heading,
            Token::Code(_) => TokenKind::Code,
            Token::Html(_) => TokenKind::Html,
            Token::Paragraph(_) => TokenKind::Paragraph,
            Token::List(_) => TokenKind::List,
            Token::BlockQuote(_) => TokenKind::BlockQuote,
            Token::Table(_) => TokenKind::Table,
            Token::Rule(_) => TokenKind::Rule,
            Token::Other(_) => TokenKind::Other,
        }
    }

    /// The source text this token was lexed from.
    pub fn raw(&self) -> &str {
        match self {
            Token::Heading(h) => &h.raw,
            Token::Code(c) => &c.raw,
            Token::Html(h) => &h.raw,
            Token::Paragraph(b)
            | Token::List(b)
            | Token::BlockQuote(b)
            | Token::Table(b)
            | Token::Rule(b)
            | Token::Other(b) => &b.raw,
        }
    }

    /// Heading level, or `None` for non-heading tokens.
    pub fn heading_depth(&self) -> Option<u8> {
        match self {
            Token::Heading(h) => Some(h.depth),
            _ => None,
        }
    }
}

impl Heading {
    /// Build a heading that does not come from any source document.
    pub fn synthesized(depth: u8, text: &str) -> Self {
        let depth = depth.clamp(1, 6);
        Self {
            depth,
            text: text.to_string(),
            raw: format!("{} {text}", "#".repeat(depth as usize)),
            inline: vec![Event::Text(CowStr::from(text.to_string()))],
            synthesized: true,
        }
    }
}

impl Block {
    /// A thematic break, which pulldown-cmark reports as a bare event.
    pub(crate) fn rule(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            events: vec![Event::Rule],
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Heading => "heading",
            TokenKind::Code => "code",
            TokenKind::Html => "html",
            TokenKind::Paragraph => "paragraph",
            TokenKind::List => "list",
            TokenKind::BlockQuote => "blockquote",
            TokenKind::Table => "table",
            TokenKind::Rule => "hr",
            TokenKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Convert a heading level enum to its number (1-6).
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
