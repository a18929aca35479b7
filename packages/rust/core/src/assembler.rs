//! Page assembler.
//!
//! Drops the rendered fragments into a fixed HTML shell and writes the
//! result atomically.

use std::path::Path;

use tracing::{debug, info, instrument};

use readmepage_markdown::escape_html;
use readmepage_shared::{PageConfig, ReadmePageError, Result};

/// Rendered fragments that go into the page, in template order.
#[derive(Debug, Clone, Default)]
pub struct PageParts {
    /// HTML of the header section.
    pub header_html: String,
    /// HTML of the table of contents (may be empty).
    pub toc_html: String,
    /// HTML of the body section.
    pub body_html: String,
    /// Highlight theme CSS, inlined in `<head>`.
    pub highlight_css: String,
    /// Load the mermaid runtime at the end of `<body>`.
    pub mermaid: bool,
}

/// Interpolate the fragments into the page template.
///
/// Layout:
/// ```text
/// <head>  meta, title, stylesheet links, inline highlight CSS
/// <body>  header | nav.toc | placeholder | main (body) | scripts
/// ```
pub fn assemble_page(parts: &PageParts, config: &PageConfig) -> String {
    let mut page = String::with_capacity(
        parts.header_html.len() + parts.toc_html.len() + parts.body_html.len() + 4096,
    );

    page.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    page.push_str("  <meta charset=\"utf-8\">\n");
    page.push_str(
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
    );
    page.push_str(&format!("  <title>{}</title>\n", escape_html(&config.title)));
    for href in &config.stylesheets {
        page.push_str(&format!(
            "  <link rel=\"stylesheet\" href=\"{}\">\n",
            escape_html(href)
        ));
    }
    if !parts.highlight_css.is_empty() {
        page.push_str("  <style>\n");
        page.push_str(&parts.highlight_css);
        page.push_str("\n  </style>\n");
    }
    page.push_str("</head>\n<body>\n");

    page.push_str("  <header class=\"readme-header\">\n");
    page.push_str(&parts.header_html);
    page.push_str("  </header>\n");

    page.push_str("  <nav class=\"toc\">\n");
    page.push_str(&parts.toc_html);
    page.push_str("  </nav>\n");

    page.push_str("  ");
    page.push_str(&config.placeholder);
    page.push('\n');

    page.push_str("  <main class=\"markdown-body\">\n");
    page.push_str(&parts.body_html);
    page.push_str("  </main>\n");

    for src in &config.scripts {
        page.push_str(&format!("  <script src=\"{}\"></script>\n", escape_html(src)));
    }
    if parts.mermaid {
        page.push_str(&format!(
            "  <script src=\"{}\"></script>\n",
            escape_html(&config.mermaid_script)
        ));
        page.push_str("  <script>mermaid.initialize({ startOnLoad: true });</script>\n");
    }

    page.push_str("</body>\n</html>\n");
    page
}

/// Values of the `id` attributes in an HTML snippet, in order.
/// Only quoted values are recognised.
pub fn element_ids(html: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let mut rest = html;
    while let Some(pos) = rest.find("id=") {
        let attribute_start = rest[..pos].ends_with(|c: char| c.is_ascii_whitespace());
        let after = &rest[pos + 3..];
        rest = after;
        if !attribute_start {
            continue;
        }
        let Some(quote) = after.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        if let Some(end) = after[1..].find(quote) {
            ids.push(after[1..1 + end].to_string());
            rest = &after[1 + end..];
        }
    }
    ids
}

/// Write the page to `path` all-or-nothing.
///
/// Writes a sibling temp file first, then renames it over the target, so a
/// failed run never leaves a truncated page behind.
#[instrument(skip(html), fields(path = %path.display(), bytes = html.len()))]
pub async fn write_page(path: &Path, html: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| {
            ReadmePageError::validation(format!("output path has no file name: {}", path.display()))
        })?
        .to_string_lossy()
        .into_owned();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ReadmePageError::io(parent, e))?;
    }

    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    if let Err(e) = tokio::fs::write(&temp, html).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(ReadmePageError::io(&temp, e));
    }
    debug!(temp = %temp.display(), "wrote temp file");

    if let Err(e) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(ReadmePageError::io(path, e));
    }

    info!("page written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts() -> PageParts {
        PageParts {
            header_html: "<h1 id=\"title\">Title</h1>\n".into(),
            toc_html: "<ul>\n<li><a href=\"#section\">Section</a></li>\n</ul>\n".into(),
            body_html: "<h2 id=\"section\">Section</h2>\n".into(),
            highlight_css: ".hl-source { color: #333; }".into(),
            mermaid: false,
        }
    }

    #[test]
    fn fragments_appear_in_template_order() {
        let page = assemble_page(&parts(), &PageConfig::default());

        let header = page.find("<h1 id=\"title\">").unwrap();
        let toc = page.find("<nav class=\"toc\">").unwrap();
        let placeholder = page.find("<div id=\"example\"></div>").unwrap();
        let body = page.find("<h2 id=\"section\">").unwrap();

        assert!(page.starts_with("<!doctype html>"));
        assert!(header < toc && toc < placeholder && placeholder < body);
        assert!(page.trim_end().ends_with("</html>"));
    }

    #[test]
    fn head_links_assets_and_inlines_css() {
        let config = PageConfig {
            title: "Nature <Hero>".into(),
            ..PageConfig::default()
        };
        let page = assemble_page(&parts(), &config);

        assert!(page.contains("<title>Nature &lt;Hero&gt;</title>"));
        assert!(page.contains("github-markdown.min.css"));
        assert!(page.contains("<style>\n.hl-source"));
    }

    #[test]
    fn mermaid_runtime_only_when_enabled() {
        let without = assemble_page(&parts(), &PageConfig::default());
        assert!(!without.contains("mermaid"));

        let with = assemble_page(
            &PageParts {
                mermaid: true,
                ..parts()
            },
            &PageConfig::default(),
        );
        assert!(with.contains("mermaid.min.js"));
        assert!(with.contains("mermaid.initialize"));
        assert!(with.find("mermaid.min.js").unwrap() > with.find("</main>").unwrap());
    }

    #[test]
    fn extra_scripts_are_appended() {
        let config = PageConfig {
            scripts: vec!["https://example.com/app.js".into()],
            ..PageConfig::default()
        };
        let page = assemble_page(&parts(), &config);
        assert!(page.contains("<script src=\"https://example.com/app.js\"></script>"));
    }

    #[test]
    fn element_ids_reads_quoted_id_attributes() {
        assert_eq!(element_ids("<div id=\"example\"></div>"), vec!["example"]);
        assert_eq!(
            element_ids("<section id='demo'><p data-id=\"x\" id=\"note\"></p></section>"),
            vec!["demo", "note"]
        );
        assert!(element_ids("<div></div>").is_empty());
    }

    #[tokio::test]
    async fn write_page_replaces_target_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site").join("index.html");

        write_page(&path, "first").await.unwrap();
        write_page(&path, "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn write_page_fails_without_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        // A directory sitting where the output file should go.
        let path = dir.path().join("index.html");
        std::fs::create_dir(&path).unwrap();

        let err = write_page(&path, "<html></html>").await.unwrap_err();
        assert!(matches!(err, ReadmePageError::Io { .. }));
        assert!(!dir.path().join(".index.html.tmp").exists());
    }
}
