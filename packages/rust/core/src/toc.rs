//! TOC (Table of Contents) builder.
//!
//! Derived from the raw markdown source, independently of the transformed
//! token sequence. Anchors use the same slug rules as the renderer.

use tracing::{debug, instrument};

use readmepage_markdown::{Slugger, Token, lex};
use readmepage_shared::{Result, Toc, TocConfig, TocEntry};

/// Build a TOC from raw markdown source.
///
/// The builder:
/// 1. Slugs every top-level heading in document order (so duplicate
///    counters line up with the rendered ids)
/// 2. Drops headings deeper than `max_depth`, and the first H1 unless
///    `include_first_h1` is set
/// 3. Nests each entry under the nearest preceding shallower entry
pub fn build_toc(source: &str, config: &TocConfig) -> Result<Toc> {
    build_toc_with(source, config, Slugger::new())
}

/// [`build_toc`] with anchors drawn from `slugger`, so ids it already
/// reserves (page placeholder ids) are never linked.
#[instrument(skip_all, fields(source_len = source.len(), max_depth = config.max_depth))]
pub fn build_toc_with(source: &str, config: &TocConfig, mut slugger: Slugger) -> Result<Toc> {
    if !config.enabled {
        return Ok(Toc::default());
    }

    let mut seen_h1 = false;
    let mut flat: Vec<TocEntry> = Vec::new();

    for token in lex(source)? {
        let Token::Heading(heading) = token else {
            continue;
        };
        let slug = slugger.slug(&heading.text);

        if heading.depth == 1 && !seen_h1 {
            seen_h1 = true;
            if !config.include_first_h1 {
                continue;
            }
        }
        if heading.depth > config.max_depth {
            continue;
        }

        flat.push(TocEntry {
            title: heading.text,
            slug,
            depth: heading.depth,
            children: vec![],
        });
    }

    let toc = Toc {
        entries: nest(flat),
    };
    debug!(entries = toc.len(), "TOC built from source headings");
    Ok(toc)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Turn a flat, ordered heading list into a tree.
fn nest(flat: Vec<TocEntry>) -> Vec<TocEntry> {
    let mut roots: Vec<TocEntry> = Vec::new();
    for entry in flat {
        insert(&mut roots, entry);
    }
    roots
}

fn insert(siblings: &mut Vec<TocEntry>, entry: TocEntry) {
    match siblings.last_mut() {
        Some(last) if last.depth < entry.depth => insert(&mut last.children, entry),
        _ => siblings.push(entry),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
