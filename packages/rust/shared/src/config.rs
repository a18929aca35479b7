//! Application configuration for readmepage.
//!
//! Config lives in `readmepage.toml`, looked up in the working directory and
//! then under `~/.readmepage/`. CLI flags override config file values, which
//! override defaults. With no file at all the defaults build the nature-hero
//! showcase page.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ReadmePageError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "readmepage.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".readmepage";

/// README fetched when no URL is configured.
pub const DEFAULT_SOURCE_URL: &str = "https://unpkg.com/@springernature/nature-hero@2.1.2/README.md";

// ---------------------------------------------------------------------------
// Config structs (matching readmepage.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the markdown comes from.
    #[serde(default)]
    pub source: SourceConfig,

    /// Where the page goes.
    #[serde(default)]
    pub output: OutputConfig,

    /// Token transformer rules.
    #[serde(default)]
    pub transform: TransformConfig,

    /// Syntax highlighter settings.
    #[serde(default)]
    pub highlight: HighlightConfig,

    /// Table-of-contents settings.
    #[serde(default)]
    pub toc: TocConfig,

    /// Page template assets.
    #[serde(default)]
    pub page: PageConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Remote markdown document to fetch.
    #[serde(default = "default_source_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional local markdown appended after the fetched document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            timeout_secs: default_timeout_secs(),
            fragment: None,
        }
    }
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output HTML file, overwritten on every run.
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("index.html")
}

/// `[transform]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Language assigned to code fences that declare none.
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Rewrite `mermaid` fences into diagram containers.
    #[serde(default = "default_true")]
    pub mermaid: bool,

    /// Title of the heading synthesized when the document has no usable header.
    #[serde(default = "default_fallback_title")]
    pub fallback_title: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            mermaid: true,
            fallback_title: default_fallback_title(),
        }
    }
}

fn default_language() -> String {
    "plaintext".into()
}
fn default_true() -> bool {
    true
}
fn default_fallback_title() -> String {
    "Example".into()
}

/// `[highlight]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// Theme used to generate the inline stylesheet.
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
        }
    }
}

fn default_theme() -> String {
    "InspiredGitHub".into()
}

/// `[toc]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocConfig {
    /// Emit a table of contents at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Deepest heading level listed.
    #[serde(default = "default_max_depth")]
    pub max_depth: u8,

    /// List the first H1 (usually the document title).
    #[serde(default)]
    pub include_first_h1: bool,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: default_max_depth(),
            include_first_h1: false,
        }
    }
}

fn default_max_depth() -> u8 {
    3
}

/// `[page]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Contents of the `<title>` element.
    #[serde(default = "default_page_title")]
    pub title: String,

    /// External stylesheets linked from `<head>`.
    #[serde(default = "default_stylesheets")]
    pub stylesheets: Vec<String>,

    /// Scripts loaded at the end of `<body>`.
    #[serde(default)]
    pub scripts: Vec<String>,

    /// Mermaid runtime loaded when diagrams are enabled.
    #[serde(default = "default_mermaid_script")]
    pub mermaid_script: String,

    /// Markup inserted between the TOC and the body for externally injected content.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_page_title(),
            stylesheets: default_stylesheets(),
            scripts: Vec::new(),
            mermaid_script: default_mermaid_script(),
            placeholder: default_placeholder(),
        }
    }
}

fn default_page_title() -> String {
    "Example".into()
}
fn default_stylesheets() -> Vec<String> {
    vec!["https://cdnjs.cloudflare.com/ajax/libs/github-markdown-css/5.5.1/github-markdown.min.css".into()]
}
fn default_mermaid_script() -> String {
    "https://cdn.jsdelivr.net/npm/mermaid@10.9.1/dist/mermaid.min.js".into()
}
fn default_placeholder() -> String {
    r#"<div id="example"></div>"#.into()
}

impl AppConfig {
    /// Reject values no stage can work with. Returns the parsed source URL.
    pub fn validate(&self) -> Result<Url> {
        let url = Url::parse(&self.source.url).map_err(|e| {
            ReadmePageError::config(format!("invalid source url '{}': {e}", self.source.url))
        })?;

        if self.output.path.as_os_str().is_empty() {
            return Err(ReadmePageError::config("output.path must not be empty"));
        }
        if self.transform.default_language.trim().is_empty() {
            return Err(ReadmePageError::config(
                "transform.default_language must not be empty",
            ));
        }
        if !(1..=6).contains(&self.toc.max_depth) {
            return Err(ReadmePageError::config(format!(
                "toc.max_depth must be between 1 and 6, got {}",
                self.toc.max_depth
            )));
        }
        Ok(url)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.readmepage/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ReadmePageError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the user config file (`~/.readmepage/readmepage.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Find the config file to use: an explicit path, then `./readmepage.toml`,
/// then the user config file. Returns `None` when none of them exist.
pub fn resolve_config(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return Ok(Some(path.to_path_buf()));
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Ok(Some(local));
    }

    let user = config_file_path()?;
    Ok(user.exists().then_some(user))
}

/// Load the application config. Returns defaults if no file is found.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    match resolve_config(explicit)? {
        Some(path) => load_config_from(&path),
        None => {
            tracing::debug!("no config file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ReadmePageError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        ReadmePageError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ReadmePageError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ReadmePageError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ReadmePageError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
