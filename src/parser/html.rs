//! HTML text and link extraction
//!
//! This module turns raw HTML into a [`ParsedPage`]: visible text is
//! tokenized into word counts and anchor hrefs are resolved into absolute
//! outbound links. Everything here is pure, with no I/O.

use crate::parser::ParsedPage;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Element subtrees whose text never counts as page content
const SKIPPED_ELEMENTS: [&str; 4] = ["head", "script", "style", "noscript"];

/// Parses HTML content into word counts and outbound links
///
/// # Word Counting Rules
///
/// Visible text is split on whitespace, and each raw token is processed in
/// order:
///
/// 1. Blank tokens are dropped.
/// 2. Tokens matching any ignored-word pattern are dropped. The patterns see
///    the raw token, before any normalization.
/// 3. Non-word characters (anything outside `[A-Za-z0-9_]`) are stripped.
/// 4. The remainder is lowercased; tokens that stripped to nothing are
///    dropped.
///
/// Text inside `<head>`, `<script>`, `<style>` and `<noscript>` is never
/// counted.
///
/// # Link Extraction Rules
///
/// Every `<a href>` is resolved against `base_url`. Links with `javascript:`,
/// `mailto:`, `tel:` or `data:` schemes are skipped, as are fragment-only
/// anchors. Duplicates within one page are dropped, keeping the first
/// occurrence; document order is preserved otherwise.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The base URL for resolving relative links
/// * `ignored_words` - Patterns for raw tokens that must not be counted
pub fn extract_page(html: &str, base_url: &Url, ignored_words: &[Regex]) -> ParsedPage {
    let document = Html::parse_document(html);

    let mut text = String::new();
    collect_text(&document.root_element(), &mut text);

    ParsedPage {
        word_counts: tokenize(&text, ignored_words),
        links: extract_links(&document, base_url),
    }
}

/// Recursively collects text nodes, skipping non-content subtrees
fn collect_text(element: &ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(&text.text);
                out.push(' ');
            }
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    if !SKIPPED_ELEMENTS.contains(&child_element.value().name()) {
                        collect_text(&child_element, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Counts words in a block of text, honoring the ignored-word patterns
pub(crate) fn tokenize(text: &str, ignored_words: &[Regex]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();

    for token in text.split_whitespace() {
        if ignored_words.iter().any(|pattern| pattern.is_match(token)) {
            continue;
        }

        let word = token
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect::<String>()
            .to_lowercase();

        if word.is_empty() {
            continue;
        }

        *counts.entry(word).or_insert(0) += 1;
    }

    counts
}

/// Extracts all followable links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    if let Ok(anchor_selector) = Selector::parse("a[href]") {
        for element in document.select(&anchor_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    if seen.insert(absolute_url.clone()) {
                        links.push(absolute_url);
                    }
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links (same page anchors)
/// - anything that does not resolve to an http(s) or file URL
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            // file URLs stay followable so local corpora can interlink
            if matches!(absolute_url.scheme(), "http" | "https" | "file") {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
