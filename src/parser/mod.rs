//! Parser module for extracting structured data from Douban HTML
//!
//! Each parser owns its compiled selectors and patterns, built once when the
//! owning service is constructed and shared read-only afterwards. Parsing
//! never fails: a missing node or label leaves the field empty.

pub mod book;
pub mod celebrity;
pub mod movie;
pub mod photo;

use std::collections::HashMap;

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Selector};

use crate::constants::filters::{IMAGE_SIZES, POSTER_SIZE_TOKEN};

pub use book::BookParser;
pub use celebrity::CelebrityParser;
pub use movie::MovieParser;
pub use photo::PhotoParser;

/// Compile a selector known at build time
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

/// Compile a pattern known at build time
pub(crate) fn pattern(re: &str) -> Regex {
    Regex::new(re).unwrap()
}

/// Trimmed text content of an element
pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first match under `scope`, or empty
pub(crate) fn first_text(scope: ElementRef<'_>, sel: &Selector) -> String {
    scope.select(sel).next().map(text_of).unwrap_or_default()
}

/// Trimmed attribute of the first match under `scope`, or empty
pub(crate) fn first_attr(scope: ElementRef<'_>, sel: &Selector, attr: &str) -> String {
    scope
        .select(sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// First capture group of `re` in `text`, trimmed of whitespace and quotes
pub(crate) fn capture(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_matches(|c| c == '"' || c == '\'').trim().to_string())
        .unwrap_or_default()
}

/// Keep at most `limit` items when `limit` is positive
pub(crate) fn truncate<T>(items: &mut Vec<T>, limit: i64) {
    if limit > 0 {
        items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
}

/// Rewrite the size token of a poster URL for the `m` and `l` hints
///
/// Any other hint leaves the URL as scraped.
pub fn image_by_size(url: &str, size: &str) -> String {
    if IMAGE_SIZES.contains(&size) {
        url.replacen(POSTER_SIZE_TOKEN, size, 1)
    } else {
        url.to_string()
    }
}

/// Flatten a metadata block into one `label: value` line per `<br>`
///
/// Tags are dropped, entities decoded, runs of whitespace inside a line
/// collapsed to one space and blank lines removed.
pub fn info_text(block: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for node in block.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(el) if el.name() == "br" => raw.push('\n'),
            _ => {}
        }
    }

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Per-label `label : value` patterns anchored to the end of a line
#[derive(Debug)]
pub struct LabelPatterns {
    patterns: Vec<(&'static str, Regex)>,
}

impl LabelPatterns {
    pub fn new(labels: &[&'static str]) -> Self {
        let patterns = labels
            .iter()
            .map(|label| {
                let re = format!(r"{}\s*:\s*(.+?)(?:\n|$)", regex::escape(label));
                (*label, pattern(&re))
            })
            .collect();
        Self { patterns }
    }

    /// Pull every known label out of a flattened metadata block
    pub fn extract(&self, text: &str) -> LabelMap {
        let values = self
            .patterns
            .iter()
            .filter_map(|(label, re)| {
                let value = capture(re, text);
                (!value.is_empty()).then(|| (label.to_string(), value))
            })
            .collect();
        LabelMap(values)
    }
}

/// Label to value mapping read from a metadata block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap(HashMap<String, String>);

impl LabelMap {
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.0.insert(label.into(), value.into());
    }

    /// Value for `label`, empty when the label was absent
    pub fn text(&self, label: &str) -> String {
        self.0.get(label).cloned().unwrap_or_default()
    }

    /// `/`-separated value for `label`, split and trimmed, blanks dropped
    pub fn texts(&self, label: &str) -> Vec<String> {
        self.0
            .get(label)
            .map(|raw| {
                raw.split('/')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
