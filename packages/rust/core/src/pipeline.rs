//! End-to-end `build` pipeline: fetch → lex → transform → TOC → render → assemble → write.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, instrument};
use url::Url;

use readmepage_fetch::{FetchOptions, fetch_markdown};
use readmepage_markdown::{
    Highlighter, Renderer, Sections, Slugger, lex, lex_with_fragment, transform,
};
use readmepage_shared::{
    AppConfig, HighlightConfig, PageConfig, ReadmePageError, Result, TocConfig, TransformConfig,
};

use crate::assembler::{PageParts, assemble_page, element_ids, write_page};
use crate::toc;

/// Runtime configuration for one build, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// README to fetch.
    pub url: Url,
    /// Output HTML file.
    pub output: PathBuf,
    /// Local markdown appended after the fetched document.
    pub fragment: Option<PathBuf>,
    /// HTTP settings.
    pub fetch: FetchOptions,
    /// Token transformer rules.
    pub transform: TransformConfig,
    /// Highlight theme.
    pub highlight: HighlightConfig,
    /// TOC settings.
    pub toc: TocConfig,
    /// Page template assets.
    pub page: PageConfig,
}

impl TryFrom<&AppConfig> for BuildConfig {
    type Error = ReadmePageError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let url = config.validate()?;

        Ok(Self {
            url,
            output: config.output.path.clone(),
            fragment: config.source.fragment.clone(),
            fetch: FetchOptions {
                timeout_secs: config.source.timeout_secs,
            },
            transform: config.transform.clone(),
            highlight: config.highlight.clone(),
            toc: config.toc.clone(),
            page: config.page.clone(),
        })
    }
}

/// Result of the `build` pipeline.
#[derive(Debug)]
pub struct BuildResult {
    /// Path of the written page.
    pub output: PathBuf,
    /// Tokens in the header section.
    pub header_tokens: usize,
    /// Tokens in the body section.
    pub body_tokens: usize,
    /// Entries in the table of contents (all levels).
    pub toc_entries: usize,
    /// Size of the written page.
    pub bytes_written: usize,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// A page rendered in memory, before it is written.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Complete HTML document.
    pub html: String,
    /// The transformed sections the page was rendered from.
    pub sections: Sections,
    /// Entries in the table of contents (all levels).
    pub toc_entries: usize,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Run the full `build` pipeline.
///
/// 1. Load the highlighter (fails fast on a bad theme)
/// 2. Fetch the README, then read the optional local fragment
/// 3. Lex, transform, build the TOC, render
/// 4. Assemble and write the page atomically
///
/// Any failure aborts the run; no partial page is written.
#[instrument(skip_all, fields(url = %config.url, output = %config.output.display()))]
pub async fn run_build(
    config: &BuildConfig,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();
    info!("starting build");

    // --- Phase 1: Highlighter ---
    progress.phase("Loading syntax definitions");
    let highlighter = Highlighter::new(&config.highlight)?;

    // --- Phase 2: Inputs ---
    progress.phase("Fetching README");
    let source = fetch_markdown(&config.url, &config.fetch).await?;

    let fragment = match &config.fragment {
        Some(path) => {
            progress.phase("Reading example fragment");
            Some(read_fragment(path).await?)
        }
        None => None,
    };

    // --- Phase 3: Render ---
    progress.phase("Rendering page");
    let rendered = render_page(&source, fragment.as_deref(), config, &highlighter)?;

    // --- Phase 4: Write ---
    progress.phase("Writing page");
    write_page(&config.output, &rendered.html).await?;

    let result = BuildResult {
        output: config.output.clone(),
        header_tokens: rendered.sections.header.len(),
        body_tokens: rendered.sections.body.len(),
        toc_entries: rendered.toc_entries,
        bytes_written: rendered.html.len(),
        elapsed: start.elapsed(),
    };

    info!(
        header_tokens = result.header_tokens,
        body_tokens = result.body_tokens,
        toc_entries = result.toc_entries,
        bytes = result.bytes_written,
        "build complete"
    );

    progress.done(&result);
    Ok(result)
}

/// Turn markdown into the finished HTML document, without any I/O.
pub fn render_page(
    source: &str,
    fragment: Option<&str>,
    config: &BuildConfig,
    highlighter: &Highlighter,
) -> Result<RenderedPage> {
    let tokens = match fragment {
        Some(extra) => lex_with_fragment(source, extra)?,
        None => lex(source)?,
    };
    debug!(tokens = tokens.len(), "lexed source");

    let sections = transform(tokens, &config.transform);

    // Heading ids must not collide with ids the placeholder puts on the page.
    let slugger = Slugger::reserving(element_ids(&config.page.placeholder));

    // The TOC comes from the fetched source only, never the fragment.
    let toc = toc::build_toc_with(source, &config.toc, slugger.clone())?;

    let mut renderer = Renderer::new(highlighter, config.transform.default_language.as_str())
        .with_slugger(slugger)
        .with_mermaid(config.transform.mermaid);
    let header_html = renderer.render(&sections.header);
    let body_html = renderer.render(&sections.body);
    let toc_html = renderer.render_markdown(&toc.to_markdown());

    let parts = PageParts {
        header_html,
        toc_html,
        body_html,
        highlight_css: highlighter.stylesheet()?,
        mermaid: config.transform.mermaid,
    };

    Ok(RenderedPage {
        html: assemble_page(&parts, &config.page),
        sections,
        toc_entries: toc.len(),
    })
}

async fn read_fragment(path: &Path) -> Result<String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ReadmePageError::io(path, e))?;
    debug!(path = %path.display(), bytes = content.len(), "read fragment");
    Ok(content)
}
