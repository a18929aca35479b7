//! Syntax highlighting adapter over syntect.
//!
//! Output is class-annotated `<span>` markup; colours come from a stylesheet
//! generated for the configured theme. Unknown languages are not an error:
//! they render through the plain-text syntax.

use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::{debug, warn};

use readmepage_shared::{HighlightConfig, ReadmePageError, Result};

use crate::render::escape_html;

/// Prefix on every generated CSS class, so theme rules stay scoped.
pub const CLASS_PREFIX: &str = "hl-";

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed {
    prefix: CLASS_PREFIX,
};

/// Language registry plus the theme used for the stylesheet.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
    theme: String,
}

impl Highlighter {
    /// Load the bundled syntaxes and themes. Fails if the configured theme
    /// does not exist.
    pub fn new(config: &HighlightConfig) -> Result<Self> {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let themes = ThemeSet::load_defaults();

        if !themes.themes.contains_key(&config.theme) {
            let mut known: Vec<&str> = themes.themes.keys().map(String::as_str).collect();
            known.sort_unstable();
            return Err(ReadmePageError::config(format!(
                "unknown highlight theme '{}' (available: {})",
                config.theme,
                known.join(", ")
            )));
        }

        debug!(
            syntaxes = syntaxes.syntaxes().len(),
            theme = %config.theme,
            "highlighter ready"
        );

        Ok(Self {
            syntaxes,
            themes,
            theme: config.theme.clone(),
        })
    }

    /// Whether `lang` resolves to a real grammar (not the plain-text fallback).
    pub fn supports(&self, lang: &str) -> bool {
        self.lookup(lang).is_some()
    }

    /// Highlight `code` as `lang`, falling back to plain text.
    pub fn highlight(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .lookup(lang)
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                warn!(lang, error = %e, "highlighting failed, emitting plain code");
                return escape_html(code);
            }
        }
        generator.finalize()
    }

    /// CSS for the configured theme, scoped to the generated classes.
    pub fn stylesheet(&self) -> Result<String> {
        let theme = self.themes.themes.get(&self.theme).ok_or_else(|| {
            ReadmePageError::config(format!("unknown highlight theme '{}'", self.theme))
        })?;
        css_for_theme_with_class_style(theme, CLASS_STYLE).map_err(|e| {
            ReadmePageError::validation(format!("failed to build stylesheet for '{}': {e}", self.theme))
        })
    }

    fn lookup(&self, lang: &str) -> Option<&SyntaxReference> {
        let lang = lang.trim();
        if lang.is_empty() {
            return None;
        }
        self.syntaxes
            .find_syntax_by_token(lang)
            .or_else(|| alias(lang).and_then(|name| self.syntaxes.find_syntax_by_token(name)))
    }
}

/// Closest bundled grammar for fence languages the default set lacks.
fn alias(lang: &str) -> Option<&'static str> {
    match lang.to_ascii_lowercase().as_str() {
        "scss" | "sass" | "less" => Some("css"),
        "shell" | "console" | "zsh" | "shell-session" => Some("bash"),
        "ts" | "tsx" | "typescript" | "jsx" => Some("js"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlighter() -> Highlighter {
        Highlighter::new(&HighlightConfig::default()).expect("default theme exists")
    }

    #[test]
    fn known_language_gets_classes() {
        let h = highlighter();
        assert!(h.supports("rust"));
        let html = h.highlight("fn main() {}\n", "rust");
        assert!(html.contains("<span class=\"hl-"));
        assert!(html.contains("main"));
    }

    #[test]
    fn readme_fence_aliases_resolve() {
        let h = highlighter();
        for lang in ["scss", "sass", "shell", "console", "bash", "sh", "css", "ts"] {
            assert!(h.supports(lang), "{lang} should resolve to a grammar");
        }

        let html = h.highlight(".hero { color: red; }\n", "scss");
        assert!(html.contains("<span class=\"hl-"));
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text() {
        let h = highlighter();
        assert!(!h.supports("plaintext"));
        assert!(!h.supports("no-such-language"));

        let html = h.highlight("a < b\n", "plaintext");
        assert!(html.contains("a &lt; b"));
        assert!(!html.contains("a < b"));
    }

    #[test]
    fn empty_language_is_plain_text() {
        let h = highlighter();
        assert!(!h.supports(""));
        assert!(h.highlight("x\n", "").contains('x'));
    }

    #[test]
    fn highlight_does_not_touch_input() {
        let h = highlighter();
        let code = String::from("let x = 1;\n");
        let _ = h.highlight(&code, "js");
        assert_eq!(code, "let x = 1;\n");
    }

    #[test]
    fn unknown_theme_is_a_config_error() {
        let config = HighlightConfig {
            theme: "Nope".into(),
        };
        let err = Highlighter::new(&config).err().expect("theme should be rejected");
        assert!(matches!(err, ReadmePageError::Config { .. }));
        assert!(err.to_string().contains("InspiredGitHub"));
    }

    #[test]
    fn stylesheet_uses_class_prefix() {
        let css = highlighter().stylesheet().unwrap();
        assert!(css.contains(".hl-"));
    }
}
