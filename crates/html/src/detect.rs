//! Boundary detection: split a raw HTML document into slide boundaries.
//!
//! An ordered cascade of strategies, tried in priority order until one
//! yields at least one section. All offsets are byte positions in the
//! original string, never positions in a re-serialized tree, so the splicer
//! can address the exact same substrings later.

use deck_core::text;
use regex::Regex;
use std::sync::LazyLock;

use crate::section::{HtmlSection, SectionKind};

/// Start tags explicitly marked as slides, capturing the tag name.
static MARKER_START_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<([a-z][a-z0-9]*)\b[^>]*(?:data-slide\b|data-slide-id\b|class\s*=\s*["'][^"']*\bslide\b[^"']*["'])[^>]*>"#,
    )
    .unwrap()
});

/// Generic sectioning containers, capturing the tag name.
static CONTAINER_START_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(section|article)\b[^>]*>").unwrap());

/// Any heading start tag, capturing its level.
static HEADING_START_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h([1-6])\b[^>]*>").unwrap());

/// First heading with its inner markup, for title derivation.
static HEADING_CONTENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h[1-6][^>]*>(.*?)</h[1-6]\s*>").unwrap());

/// The document body interior.
static BODY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*?)</body\s*>").unwrap());

/// Image tags, for the degenerate-boundary check.
static IMAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\b").unwrap());

/// One way of splitting a document into slide boundaries.
pub trait BoundaryStrategy {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Detect boundaries; an empty result hands over to the next strategy.
    fn detect(&self, html: &str) -> Vec<HtmlSection>;
}

/// Cascade of boundary strategies, tried in priority order.
pub struct BoundaryDetector {
    strategies: Vec<Box<dyn BoundaryStrategy>>,
}

impl Default for BoundaryDetector {
    fn default() -> Self {
        Self {
            strategies: vec![
                Box::new(MarkerStrategy),
                Box::new(ContainerStrategy),
                Box::new(HeadingStrategy),
                Box::new(WholeDocumentStrategy),
            ],
        }
    }
}

impl BoundaryDetector {
    /// Detector with the standard cascade: explicit markers, sectioning
    /// containers, heading-driven split, whole-document fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a custom strategy just ahead of the whole-document fallback.
    pub fn with_strategy(mut self, strategy: Box<dyn BoundaryStrategy>) -> Self {
        let at = self.strategies.len().saturating_sub(1);
        self.strategies.insert(at, strategy);
        self
    }

    /// Split `html` into slide boundaries.
    ///
    /// The fallback strategy always produces one boundary, so the result is
    /// non-empty for any input.
    pub fn detect(&self, html: &str) -> Vec<HtmlSection> {
        for strategy in &self.strategies {
            let sections = strategy.detect(html);
            if !sections.is_empty() {
                log::debug!(
                    "boundary detection: {} yielded {} section(s)",
                    strategy.name(),
                    sections.len()
                );
                return sections;
            }
        }

        log::warn!("boundary detection: no strategy produced a section");
        Vec::new()
    }
}

/// Elements carrying an explicit slide marker: a `data-slide`/`data-slide-id`
/// attribute or a `slide` class.
pub struct MarkerStrategy;

impl BoundaryStrategy for MarkerStrategy {
    fn name(&self) -> &'static str {
        "explicit markers"
    }

    fn detect(&self, html: &str) -> Vec<HtmlSection> {
        detect_by_start_tag(html, &MARKER_START_REGEX, SectionKind::Slide)
    }
}

/// Generic sectioning containers (`<section>`, `<article>`).
pub struct ContainerStrategy;

impl BoundaryStrategy for ContainerStrategy {
    fn name(&self) -> &'static str {
        "semantic containers"
    }

    fn detect(&self, html: &str) -> Vec<HtmlSection> {
        detect_by_start_tag(html, &CONTAINER_START_REGEX, SectionKind::Section)
    }
}

/// Heading-driven split: every heading of the primary level (the smallest
/// level present) starts a boundary that runs to the next such heading.
pub struct HeadingStrategy;

impl BoundaryStrategy for HeadingStrategy {
    fn name(&self) -> &'static str {
        "heading split"
    }

    fn detect(&self, html: &str) -> Vec<HtmlSection> {
        let mut by_level: Vec<Vec<usize>> = vec![Vec::new(); 6];
        for caps in HEADING_START_REGEX.captures_iter(html) {
            let m = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let level: usize = caps
                .get(1)
                .and_then(|g| g.as_str().parse().ok())
                .unwrap_or(0);
            if (1..=6).contains(&level) {
                by_level[level - 1].push(m.start());
            }
        }

        let starts = match by_level.iter().find(|v| !v.is_empty()) {
            Some(v) => v,
            None => return Vec::new(),
        };

        let limit = body_end(html);
        let mut sections = Vec::new();
        for (i, &start) in starts.iter().enumerate() {
            let end = starts
                .get(i + 1)
                .copied()
                .unwrap_or(if limit > start { limit } else { html.len() });
            push_boundary(&mut sections, html, SectionKind::Custom, start, end);
        }
        sections
    }
}

/// Last resort: the whole body (or the whole string) as one boundary.
/// Never drops its result, so the cascade is guaranteed to terminate with
/// at least one section.
pub struct WholeDocumentStrategy;

impl BoundaryStrategy for WholeDocumentStrategy {
    fn name(&self) -> &'static str {
        "whole document"
    }

    fn detect(&self, html: &str) -> Vec<HtmlSection> {
        let (start, end) = match BODY_REGEX.captures(html).and_then(|c| c.get(1)) {
            Some(g) => (g.start(), g.end()),
            None => (0, html.len()),
        };
        let title = section_title(&html[start..end])
            .unwrap_or_else(|| text::default_slide_title(1));
        vec![HtmlSection::new(SectionKind::Custom, title, html, start, end)]
    }
}

/// Shared scan for strategies keyed on a start-tag pattern. Nested matches
/// inside an accepted boundary are skipped, which keeps ranges
/// non-overlapping and strictly increasing.
fn detect_by_start_tag(html: &str, pattern: &Regex, kind: SectionKind) -> Vec<HtmlSection> {
    let mut sections = Vec::new();
    let mut cursor = 0usize;

    for caps in pattern.captures_iter(html) {
        let m = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        if m.start() < cursor {
            continue;
        }

        let tag = caps
            .get(1)
            .map(|g| g.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        let end = match find_element_end(html, &tag, m.end()) {
            Some(end) => end,
            None => {
                log::warn!("unclosed <{}> at byte {}, extending to end", tag, m.start());
                html.len()
            }
        };

        push_boundary(&mut sections, html, kind, m.start(), end);
        cursor = end;
    }

    sections
}

/// Append the boundary unless it is degenerate (no text, no media).
fn push_boundary(
    sections: &mut Vec<HtmlSection>,
    html: &str,
    kind: SectionKind,
    start: usize,
    end: usize,
) {
    let markup = &html[start..end];
    if is_degenerate(markup) {
        log::debug!("dropping degenerate boundary at {}..{}", start, end);
        return;
    }

    let title =
        section_title(markup).unwrap_or_else(|| text::default_slide_title(sections.len() + 1));
    sections.push(HtmlSection::new(kind, title, html, start, end));
}

/// Find the byte offset just past the balanced closing tag of `tag`, given
/// the offset just past its opening tag. Self-closing occurrences do not
/// affect nesting depth.
fn find_element_end(html: &str, tag: &str, after_open: usize) -> Option<usize> {
    let pattern = format!(r"(?is)<(/?){}\b[^>]*>", regex::escape(tag));
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(_) => return None,
    };

    let mut depth = 1usize;
    for m in re.find_iter(&html[after_open..]) {
        let matched = m.as_str();
        if matched.starts_with("</") {
            depth -= 1;
            if depth == 0 {
                return Some(after_open + m.end());
            }
        } else if !matched.ends_with("/>") {
            depth += 1;
        }
    }
    None
}

/// A boundary with no text content and no images carries nothing worth
/// turning into a slide.
fn is_degenerate(markup: &str) -> bool {
    text::strip_tags(markup).trim().is_empty() && !IMAGE_REGEX.is_match(markup)
}

/// Title from the first nested heading, if it has any text.
fn section_title(markup: &str) -> Option<String> {
    let inner = HEADING_CONTENT_REGEX.captures(markup)?.get(1)?.as_str();
    let title = text::clean_title(&text::decode_entities(&text::strip_tags(inner)));
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// End offset of the body interior, or the end of the string.
fn body_end(html: &str) -> usize {
    BODY_REGEX
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|g| g.end())
        .unwrap_or(html.len())
}
