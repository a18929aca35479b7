//! Markdown source → [`Token`] sequence.
//!
//! pulldown-cmark does the actual parsing. This module only groups its
//! offset-annotated event stream into top-level blocks.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use tracing::{debug, instrument};

use readmepage_shared::{ReadmePageError, Result};

use crate::token::{Block, CodeBlock, Heading, HtmlBlock, Token, heading_level_to_num};

/// Parser options shared by the lexer and the renderer.
pub(crate) fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Events of one top-level element collected so far.
struct Pending {
    range: Range<usize>,
    events: Vec<Event<'static>>,
}

/// Lex markdown source into top-level tokens.
///
/// Every token's `raw` is the exact source slice of the block. Errors only
/// when the event stream is unbalanced.
#[instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut pending: Option<Pending> = None;
    let mut depth = 0usize;

    for (event, range) in Parser::new_ext(source, parser_options()).into_offset_iter() {
        let event = event.into_static();
        match event {
            Event::Start(_) => {
                if depth == 0 {
                    pending = Some(Pending {
                        range: range.clone(),
                        events: Vec::new(),
                    });
                }
                depth += 1;
                push_event(&mut pending, event, &range)?;
            }
            Event::End(_) => {
                if depth == 0 {
                    return Err(ReadmePageError::parse(format!(
                        "unexpected end of block at byte {}",
                        range.start
                    )));
                }
                push_event(&mut pending, event, &range)?;
                depth -= 1;
                if depth == 0 {
                    if let Some(done) = pending.take() {
                        tokens.push(build_token(source, done)?);
                    }
                }
            }
            other if depth == 0 => tokens.push(standalone_token(source, other, range)?),
            other => push_event(&mut pending, other, &range)?,
        }
    }

    if depth != 0 {
        return Err(ReadmePageError::parse(format!(
            "document ended inside an unclosed block ({depth} level(s) open)"
        )));
    }

    debug!(tokens = tokens.len(), "lexed markdown");
    Ok(tokens)
}

/// Lex the fetched document and append the tokens of a local fragment.
pub fn lex_with_fragment(source: &str, fragment: &str) -> Result<Vec<Token>> {
    let mut tokens = lex(source)?;
    let extra = lex(fragment)?;
    debug!(fragment_tokens = extra.len(), "appending fragment tokens");
    tokens.extend(extra);
    Ok(tokens)
}

fn push_event(
    pending: &mut Option<Pending>,
    event: Event<'static>,
    range: &Range<usize>,
) -> Result<()> {
    match pending {
        Some(p) => {
            p.events.push(event);
            Ok(())
        }
        None => Err(ReadmePageError::parse(format!(
            "event outside of any block at byte {}",
            range.start
        ))),
    }
}

fn slice(source: &str, range: Range<usize>) -> Result<String> {
    source
        .get(range.clone())
        .map(str::to_string)
        .ok_or_else(|| {
            ReadmePageError::parse(format!(
                "block range {}..{} is outside the source",
                range.start, range.end
            ))
        })
}

/// Turn a completed top-level element into its token.
fn build_token(source: &str, pending: Pending) -> Result<Token> {
    let raw = slice(source, pending.range)?;
    let mut events = pending.events;

    let first = events.first().cloned();
    let token = match first {
        Some(Event::Start(Tag::Heading { level, .. })) => {
            let depth = heading_level_to_num(level);
            // Drop the start and end tags; keep only inline content.
            events.pop();
            let inline: Vec<Event<'static>> = events.into_iter().skip(1).collect();
            Token::Heading(Heading {
                depth,
                text: plain_text(&inline),
                raw,
                inline,
                synthesized: false,
            })
        }
        Some(Event::Start(Tag::CodeBlock(kind))) => {
            let lang = match kind {
                CodeBlockKind::Fenced(info) => info.split_whitespace().next().unwrap_or("").to_string(),
                CodeBlockKind::Indented => String::new(),
            };
            Token::Code(CodeBlock {
                lang,
                text: collect_text(&events),
                raw,
            })
        }
        Some(Event::Start(Tag::HtmlBlock)) => {
            let text = events
                .iter()
                .filter_map(|e| match e {
                    Event::Html(html) => Some(html.as_ref()),
                    _ => None,
                })
                .collect();
            Token::Html(HtmlBlock { text, raw })
        }
        Some(Event::Start(Tag::Paragraph)) => Token::Paragraph(Block { raw, events }),
        Some(Event::Start(Tag::List(_))) => Token::List(Block { raw, events }),
        Some(Event::Start(Tag::BlockQuote(_))) => Token::BlockQuote(Block { raw, events }),
        Some(Event::Start(Tag::Table(_))) => Token::Table(Block { raw, events }),
        _ => Token::Other(Block { raw, events }),
    };
    Ok(token)
}

/// Tokens for events that appear at the top level without a container.
fn standalone_token(source: &str, event: Event<'static>, range: Range<usize>) -> Result<Token> {
    let raw = slice(source, range)?;
    Ok(match event {
        Event::Rule => Token::Rule(Block::rule(&raw)),
        Event::Html(html) => Token::Html(HtmlBlock {
            text: html.to_string(),
            raw,
        }),
        other => Token::Other(Block {
            raw,
            events: vec![other],
        }),
    })
}

/// Concatenate `Text` events (code block bodies).
fn collect_text(events: &[Event<'_>]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Text(t) => Some(t.as_ref()),
            _ => None,
        })
        .collect()
}

/// Visible text of inline events, markup dropped.
fn plain_text(events: &[Event<'_>]) -> String {
    let mut out = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => out.push_str(t),
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            _ => {}
        }
    }
    out.trim().to_string()
}
