//! Markdown tokens, transformation, highlighting, and HTML rendering.
//!
//! Pipeline inside this crate:
//! 1. [`lex`] the source into top-level [`Token`]s
//! 2. [`transform`] them (default fence language, mermaid rewrite, header/body split)
//! 3. [`Renderer::render`] each section, highlighting code through [`Highlighter`]

mod highlight;
mod lexer;
mod render;
mod slug;
mod token;
mod transform;

pub use highlight::{CLASS_PREFIX, Highlighter};
pub use lexer::{lex, lex_with_fragment};
pub use render::{Renderer, escape_html};
pub use slug::{Slugger, slugify};
pub use token::{Block, CodeBlock, Heading, HtmlBlock, Token, TokenKind};
pub use transform::{
    MERMAID_CLASS, MERMAID_LANGUAGE, Sections, apply_default_language, mermaid_container,
    rewrite_mermaid, split_sections, transform,
};
