//! Table-of-contents types shared by the TOC generator and the page assembler.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Toc / TocEntry
// ---------------------------------------------------------------------------

/// Table of contents derived from the raw markdown source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toc {
    /// Top-level entries, in document order.
    pub entries: Vec<TocEntry>,
}

/// A single heading in the TOC tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading text with inline markup stripped.
    pub title: String,
    /// Anchor id of the rendered heading.
    pub slug: String,
    /// Heading level (1-6).
    pub depth: u8,
    /// Nested entries.
    #[serde(default)]
    pub children: Vec<TocEntry>,
}

impl Toc {
    /// True when there is nothing to list.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of entries at every level.
    pub fn len(&self) -> usize {
        fn count(entries: &[TocEntry]) -> usize {
            entries.iter().map(|e| 1 + count(&e.children)).sum()
        }
        count(&self.entries)
    }

    /// Render as a nested markdown bullet list of anchor links.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            push_entry(&mut out, entry, 0);
        }
        out
    }
}

fn push_entry(out: &mut String, entry: &TocEntry, indent: usize) {
    out.push_str(&"  ".repeat(indent));
    out.push_str(&format!(
        "- [{}](#{})\n",
        escape_link_text(&entry.title),
        entry.slug
    ));
    for child in &entry.children {
        push_entry(out, child, indent + 1);
    }
}

/// Escape characters that would end or nest the link text.
fn escape_link_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '[' | ']' | '\\' | '*' | '_' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, slug: &str, depth: u8, children: Vec<TocEntry>) -> TocEntry {
        TocEntry {
            title: title.into(),
            slug: slug.into(),
            depth,
            children,
        }
    }

    #[test]
    fn to_markdown_nests_children() {
        let toc = Toc {
            entries: vec![
                entry(
                    "Usage",
                    "usage",
                    2,
                    vec![entry("Options", "options", 3, vec![])],
                ),
                entry("License", "license", 2, vec![]),
            ],
        };

        assert_eq!(
            toc.to_markdown(),
            "- [Usage](#usage)\n  - [Options](#options)\n- [License](#license)\n"
        );
        assert_eq!(toc.len(), 3);
    }

    #[test]
    fn to_markdown_escapes_brackets() {
        let toc = Toc {
            entries: vec![entry("The [beta] API", "the-beta-api", 2, vec![])],
        };
        assert_eq!(toc.to_markdown(), "- [The \\[beta\\] API](#the-beta-api)\n");
    }

    #[test]
    fn empty_toc() {
        let toc = Toc::default();
        assert!(toc.is_empty());
        assert_eq!(toc.len(), 0);
        assert_eq!(toc.to_markdown(), "");
    }
}
