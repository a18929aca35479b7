//! Heading anchor ids.

use std::collections::{HashMap, HashSet};

/// Convert text to URL-safe slug.
///
/// Lowercases, turns runs of whitespace/dashes/underscores into a single
/// dash, and drops other punctuation.
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        result.push_str("section");
    }
    result
}

/// Hands out unique slugs in document order: repeats get `-1`, `-2`, ...
///
/// A suffixed slug is never one that was already handed out or reserved, so
/// "Usage", "Usage", "Usage 1" yields `usage`, `usage-1`, `usage-1-1`.
#[derive(Debug, Default, Clone)]
pub struct Slugger {
    counts: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slugger that never hands out any of `ids`.
    pub fn reserving<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            counts: HashMap::new(),
            issued: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut id = base.clone();
        while self.issued.contains(&id) {
            let count = self.counts.entry(base.clone()).or_default();
            *count += 1;
            id = format!("{base}-{count}");
        }
        self.issued.insert(id.clone());
        id
    }
}
