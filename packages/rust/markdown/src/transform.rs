//! Token transformer: fence language defaults, mermaid rewrite, and the
//! header/body split.

use tracing::{debug, instrument};

use readmepage_shared::TransformConfig;

use crate::token::{Heading, HtmlBlock, Token};

/// Fence language that marks a diagram.
pub const MERMAID_LANGUAGE: &str = "mermaid";

/// CSS class of the diagram container the mermaid runtime looks for.
pub const MERMAID_CLASS: &str = "mermaid";

/// A document split into the part above the first section and the rest.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sections {
    pub header: Vec<Token>,
    pub body: Vec<Token>,
}

/// Apply every rule in order and split the result.
///
/// Code-block rules run before the split so both sections see them.
#[instrument(skip_all, fields(tokens = tokens.len(), mermaid = config.mermaid))]
pub fn transform(mut tokens: Vec<Token>, config: &TransformConfig) -> Sections {
    let defaulted = apply_default_language(&mut tokens, &config.default_language);
    let diagrams = if config.mermaid {
        rewrite_mermaid(&mut tokens)
    } else {
        0
    };

    let sections = split_sections(tokens, &config.fallback_title);
    debug!(
        defaulted,
        diagrams,
        header = sections.header.len(),
        body = sections.body.len(),
        "tokens transformed"
    );
    sections
}

/// Give every code block without a fence language `language`.
/// Returns how many blocks were changed.
pub fn apply_default_language(tokens: &mut [Token], language: &str) -> usize {
    let mut changed = 0;
    for token in tokens.iter_mut() {
        if let Token::Code(code) = token {
            if code.lang.is_empty() {
                code.lang = language.to_string();
                changed += 1;
            }
        }
    }
    changed
}

/// Replace every `mermaid` code block with a raw diagram container so it
/// never reaches the syntax highlighter. Returns the number of rewrites.
pub fn rewrite_mermaid(tokens: &mut [Token]) -> usize {
    let mut rewritten = 0;
    for slot in tokens.iter_mut() {
        let replacement = match slot {
            Token::Code(code) if code.lang == MERMAID_LANGUAGE => Some(Token::Html(HtmlBlock {
                text: mermaid_container(&code.text),
                raw: std::mem::take(&mut code.raw),
            })),
            _ => None,
        };
        if let Some(token) = replacement {
            *slot = token;
            rewritten += 1;
        }
    }
    rewritten
}

/// Diagram source wrapped for the mermaid runtime, inserted verbatim.
pub fn mermaid_container(code: &str) -> String {
    format!("<div class=\"{MERMAID_CLASS}\">\n{code}</div>\n")
}

/// Split at a single cut point.
///
/// - First depth-2 heading at `i`: header `[0, i)`, body `[i, end)`.
/// - Otherwise a leading depth-1 heading is the whole header.
/// - Otherwise the header is one synthesized heading titled `fallback_title`
///   and the body is the untouched input (this covers the empty document).
pub fn split_sections(mut tokens: Vec<Token>, fallback_title: &str) -> Sections {
    if let Some(cut) = tokens.iter().position(|t| t.heading_depth() == Some(2)) {
        let body = tokens.split_off(cut);
        return Sections {
            header: tokens,
            body,
        };
    }

    if tokens.first().and_then(Token::heading_depth) == Some(1) {
        let body = tokens.split_off(1);
        return Sections {
            header: tokens,
            body,
        };
    }

    debug!(fallback_title, "no header found, synthesizing one");
    Sections {
        header: vec![Token::Heading(Heading::synthesized(1, fallback_title))],
        body: tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::token::{CodeBlock, TokenKind};

    fn config() -> TransformConfig {
        TransformConfig::default()
    }

    fn code(lang: &str, text: &str) -> Token {
        Token::Code(CodeBlock {
            lang: lang.into(),
            text: text.into(),
            raw: format!("```{lang}\n{text}```"),
        })
    }

    #[test]
    fn split_at_first_depth_two_heading() {
        let tokens = lex("# Title\n\nIntro\n\n## One\n\nText\n\n## Two\n").unwrap();
        let sections = split_sections(tokens.clone(), "Example");

        assert_eq!(sections.header, tokens[..2].to_vec());
        assert_eq!(sections.body, tokens[2..].to_vec());
        assert_eq!(sections.body[0].heading_depth(), Some(2));
    }

    #[test]
    fn depth_two_heading_at_start_gives_empty_header() {
        let tokens = lex("## Usage\n\nText\n").unwrap();
        let sections = split_sections(tokens.clone(), "Example");

        assert!(sections.header.is_empty());
        assert_eq!(sections.body, tokens);
    }

    #[test]
    fn leading_h1_is_the_header_without_sections() {
        let tokens = lex("# Title\n\nText\n\n### Deep\n").unwrap();
        let sections = split_sections(tokens.clone(), "Example");

        assert_eq!(sections.header, vec![tokens[0].clone()]);
        assert_eq!(sections.body, tokens[1..].to_vec());
    }

    #[test]
    fn h1_not_first_falls_back_to_synthesized_header() {
        let tokens = lex("Intro\n\n# Late title\n").unwrap();
        let sections = split_sections(tokens.clone(), "Example");

        assert_eq!(sections.header.len(), 1);
        match &sections.header[0] {
            Token::Heading(h) => {
                assert_eq!(h.depth, 1);
                assert_eq!(h.text, "Example");
            }
            other => panic!("expected heading, got {:?}", other.kind()),
        }
        assert_eq!(sections.body, tokens);
    }

    #[test]
    fn empty_document_synthesizes_header() {
        let sections = split_sections(Vec::new(), "Example");
        assert_eq!(sections.header.len(), 1);
        assert!(sections.body.is_empty());
    }

    #[test]
    fn default_language_only_touches_empty_tags() {
        let mut tokens = vec![code("", "foo()\n"), code("rust", "fn f() {}\n")];
        let before = tokens.clone();

        let changed = apply_default_language(&mut tokens, "plaintext");

        assert_eq!(changed, 1);
        match (&tokens[0], &before[0]) {
            (Token::Code(after), Token::Code(orig)) => {
                assert_eq!(after.lang, "plaintext");
                assert_eq!(after.text, orig.text);
                assert_eq!(after.raw, orig.raw);
            }
            _ => panic!("expected code tokens"),
        }
        assert_eq!(tokens[1], before[1]);
    }

    #[test]
    fn mermaid_blocks_become_html() {
        let mut tokens = vec![code("mermaid", "graph TD;\n  A-->B;\n"), code("js", "x()\n")];

        let rewritten = rewrite_mermaid(&mut tokens);

        assert_eq!(rewritten, 1);
        match &tokens[0] {
            Token::Html(html) => {
                assert!(html.text.starts_with("<div class=\"mermaid\">"));
                assert!(html.text.contains("graph TD;\n  A-->B;\n"));
                assert!(html.raw.starts_with("```mermaid"));
            }
            other => panic!("expected html, got {:?}", other.kind()),
        }
        assert_eq!(tokens[1].kind(), TokenKind::Code);
    }

    #[test]
    fn transform_skips_mermaid_when_disabled() {
        let mut config = config();
        config.mermaid = false;
        let tokens = lex("# T\n\n```mermaid\ngraph TD;\n```\n").unwrap();

        let sections = transform(tokens, &config);
        assert_eq!(sections.body[0].kind(), TokenKind::Code);
    }

    #[test]
    fn transform_applies_rules_before_split() {
        let source = "# Title\n\n```\nhead()\n```\n\n## Section\n\n```mermaid\ngraph LR;\n```\n";
        let sections = transform(lex(source).unwrap(), &config());

        assert_eq!(sections.header.len(), 2);
        match &sections.header[1] {
            Token::Code(code) => assert_eq!(code.lang, "plaintext"),
            other => panic!("expected code, got {:?}", other.kind()),
        }
        assert_eq!(sections.body[0].heading_depth(), Some(2));
        assert_eq!(sections.body[1].kind(), TokenKind::Html);
    }

    #[test]
    fn split_preserves_every_token() {
        let tokens = lex("# A\n\np\n\n- l\n\n## B\n\n## C\n\n> q\n").unwrap();
        let sections = split_sections(tokens.clone(), "Example");

        let mut joined = sections.header.clone();
        joined.extend(sections.body.clone());
        assert_eq!(joined, tokens);
    }
}
