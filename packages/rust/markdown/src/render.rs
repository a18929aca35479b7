//! Token sequence → HTML.
//!
//! Code blocks go through the [`Highlighter`]; everything else is handed to
//! pulldown-cmark's HTML writer. Headings get slug ids so the table of
//! contents can link to them.

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd, html};

use crate::highlight::Highlighter;
use crate::lexer::parser_options;
use crate::slug::Slugger;
use crate::token::{Heading, Token};
use crate::transform::{MERMAID_LANGUAGE, mermaid_container};

/// Renders tokens to HTML, keeping heading ids unique across calls.
///
/// Render the header and the body with the same instance so that ids match
/// the ones the table of contents computes for the whole document.
pub struct Renderer<'h> {
    highlighter: &'h Highlighter,
    slugger: Slugger,
    default_language: String,
    mermaid: bool,
}

impl<'h> Renderer<'h> {
    pub fn new(highlighter: &'h Highlighter, default_language: impl Into<String>) -> Self {
        Self {
            highlighter,
            slugger: Slugger::new(),
            default_language: default_language.into(),
            mermaid: false,
        }
    }

    /// Hand out heading ids from `slugger` (e.g. one reserving page ids).
    pub fn with_slugger(mut self, slugger: Slugger) -> Self {
        self.slugger = slugger;
        self
    }

    /// Turn `mermaid` fences nested in lists or quotes into diagram containers.
    pub fn with_mermaid(mut self, enabled: bool) -> Self {
        self.mermaid = enabled;
        self
    }

    /// Render a token sequence.
    pub fn render(&mut self, tokens: &[Token]) -> String {
        let mut out = String::with_capacity(4096);
        for token in tokens {
            match token {
                Token::Heading(heading) => self.render_heading(&mut out, heading),
                Token::Code(code) => out.push_str(&self.code_block(&code.text, &code.lang)),
                Token::Html(block) => out.push_str(&block.text),
                Token::Paragraph(block)
                | Token::List(block)
                | Token::BlockQuote(block)
                | Token::Table(block)
                | Token::Rule(block)
                | Token::Other(block) => self.render_events(&mut out, block.events.iter().cloned()),
            }
        }
        out
    }

    /// Render a standalone markdown fragment (no heading ids).
    pub fn render_markdown(&self, markdown: &str) -> String {
        let mut out = String::new();
        self.render_events(&mut out, Parser::new_ext(markdown, parser_options()));
        out
    }

    /// `<pre><code>` wrapper around highlighted code.
    pub fn code_block(&self, code: &str, lang: &str) -> String {
        let lang = if lang.is_empty() {
            self.default_language.as_str()
        } else {
            lang
        };
        format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            escape_html(lang),
            self.highlighter.highlight(code, lang)
        )
    }

    fn render_heading(&mut self, out: &mut String, heading: &Heading) {
        let mut inner = String::new();
        html::push_html(&mut inner, heading.inline.iter().cloned());
        if heading.synthesized {
            out.push_str(&format!("<h{d}>{inner}</h{d}>\n", d = heading.depth));
            return;
        }
        let id = self.slugger.slug(&heading.text);
        out.push_str(&format!(
            "<h{d} id=\"{id}\">{inner}</h{d}>\n",
            d = heading.depth,
            id = escape_html(&id),
        ));
    }

    /// Push events through the HTML writer, highlighting nested code blocks.
    fn render_events<'a, I>(&self, out: &mut String, events: I)
    where
        I: Iterator<Item = Event<'a>>,
    {
        let mut rewritten: Vec<Event<'a>> = Vec::new();
        let mut code: Option<(String, String)> = None;

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().unwrap_or("").to_string()
                        }
                        CodeBlockKind::Indented => String::new(),
                    };
                    code = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, text)) = code.take() {
                        let html = if self.mermaid && lang == MERMAID_LANGUAGE {
                            mermaid_container(&text)
                        } else {
                            self.code_block(&text, &lang)
                        };
                        rewritten.push(Event::Html(html.into()));
                    }
                }
                Event::Text(text) if code.is_some() => {
                    if let Some((_, buf)) = code.as_mut() {
                        buf.push_str(&text);
                    }
                }
                other => rewritten.push(other),
            }
        }

        html::push_html(out, rewritten.into_iter());
    }
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::transform::transform;
    use readmepage_shared::{HighlightConfig, TransformConfig};

    fn highlighter() -> Highlighter {
        Highlighter::new(&HighlightConfig::default()).expect("default theme")
    }

    #[test]
    fn headings_get_unique_ids_across_calls() {
        let h = highlighter();
        let mut renderer = Renderer::new(&h, "plaintext");

        let header = renderer.render(&lex("# Usage\n").unwrap());
        let body = renderer.render(&lex("## Usage\n\n## *Fancy* title\n").unwrap());

        assert_eq!(header, "<h1 id=\"usage\">Usage</h1>\n");
        assert!(body.contains("<h2 id=\"usage-1\">Usage</h2>"));
        assert!(body.contains("<h2 id=\"fancy-title\"><em>Fancy</em> title</h2>"));
    }

    #[test]
    fn code_tokens_are_highlighted() {
        let h = highlighter();
        let mut renderer = Renderer::new(&h, "plaintext");
        let html = renderer.render(&lex("```rust\nfn main() {}\n```\n").unwrap());

        assert!(html.starts_with("<pre><code class=\"language-rust\">"));
        assert!(html.contains("hl-"));
        assert!(html.ends_with("</code></pre>\n"));
    }

    #[test]
    fn nested_code_blocks_are_highlighted() {
        let h = highlighter();
        let mut renderer = Renderer::new(&h, "plaintext");
        let html = renderer.render(&lex("- item\n\n  ```\n  a < b\n  ```\n").unwrap());

        assert!(html.contains("<li>"));
        assert!(html.contains("class=\"language-plaintext\""));
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn html_tokens_pass_through() {
        let h = highlighter();
        let mut renderer = Renderer::new(&h, "plaintext");
        let sections = transform(
            lex("# T\n\n```mermaid\ngraph TD;\n  A-->B;\n```\n").unwrap(),
            &TransformConfig::default(),
        );
        let html = renderer.render(&sections.body);

        assert!(html.contains("<div class=\"mermaid\">\ngraph TD;\n  A-->B;\n</div>"));
        assert!(!html.contains("<pre>"));
        assert!(!html.contains("hl-"));
    }

    #[test]
    fn nested_mermaid_fences_become_diagrams() {
        let h = highlighter();
        let source = "> ```mermaid\n> graph TD;\n> ```\n";

        let html = Renderer::new(&h, "plaintext")
            .with_mermaid(true)
            .render(&lex(source).unwrap());
        assert!(html.contains("<blockquote>"));
        assert!(html.contains("<div class=\"mermaid\">\ngraph TD;\n</div>"));
        assert!(!html.contains("language-mermaid"));

        let plain = Renderer::new(&h, "plaintext").render(&lex(source).unwrap());
        assert!(plain.contains("class=\"language-mermaid\""));
        assert!(!plain.contains("<div class=\"mermaid\">"));
    }

    #[test]
    fn synthesized_heading_takes_no_id() {
        let h = highlighter();
        let mut renderer = Renderer::new(&h, "plaintext");
        let sections = transform(lex("Intro\n\n### Example\n").unwrap(), &TransformConfig::default());

        let header = renderer.render(&sections.header);
        let body = renderer.render(&sections.body);

        assert_eq!(header, "<h1>Example</h1>\n");
        assert!(body.contains("<h3 id=\"example\">Example</h3>"));
    }

    #[test]
    fn paragraphs_and_tables_render() {
        let h = highlighter();
        let mut renderer = Renderer::new(&h, "plaintext");
        let html = renderer.render(&lex("Some *text*\n\n| a |\n|---|\n| 1 |\n").unwrap());

        assert!(html.contains("<p>Some <em>text</em></p>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn render_markdown_fragment() {
        let h = highlighter();
        let renderer = Renderer::new(&h, "plaintext");
        let html = renderer.render_markdown("- [Usage](#usage)\n");
        assert!(html.contains("<a href=\"#usage\">Usage</a>"));
    }

    #[test]
    fn escape_html_special_chars() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
    }
}
