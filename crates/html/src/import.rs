//! Import boundary: arbitrary HTML in, structured presentation out.
//!
//! Never fails. The boundary cascade guarantees at least one section, and
//! extraction degrades instead of erroring, so the worst malformed input
//! becomes a single coarse slide rather than a hard failure.

use deck_core::text;
use deck_core::types::{Background, BackgroundKind, Presentation, Slide};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::detect::BoundaryDetector;
use crate::extract::extract_elements;
use crate::section::HtmlSection;

/// The document's body start tag.
static BODY_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<body\b[^>]*>").unwrap());

/// The tag a section's markup opens with.
static LEADING_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\s*<[a-z][a-z0-9]*\b[^>]*>").unwrap());

/// Double-quoted attributes inside a start tag.
static ATTR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([a-zA-Z][a-zA-Z0-9-]*)\s*=\s*"([^"]*)""#).unwrap());

/// Importer from raw HTML to the structured model.
pub struct HtmlImporter {
    detector: BoundaryDetector,
}

impl HtmlImporter {
    /// Importer with the standard boundary cascade.
    pub fn new() -> Self {
        Self {
            detector: BoundaryDetector::new(),
        }
    }

    /// Importer with a custom boundary detector.
    pub fn with_detector(detector: BoundaryDetector) -> Self {
        Self { detector }
    }

    /// Build a presentation from an HTML document of any well-formedness.
    ///
    /// `title` is the display title for the new presentation; a document
    /// carrying synthesizer metadata restores its own title instead, so
    /// edit/export/import cycles are lossless.
    pub fn import(&self, html: &str, title: &str) -> Presentation {
        let mut presentation = Presentation::new(title);
        apply_document_meta(&mut presentation, html);

        let sections = self.detector.detect(html);
        log::debug!("import: {} section(s) detected", sections.len());

        for (index, section) in sections.iter().enumerate() {
            presentation.slides.push(slide_from_section(section, index));
        }
        if presentation.slides.is_empty() {
            presentation
                .slides
                .push(Slide::new(text::default_slide_title(1)));
        }

        presentation.renumber();
        presentation
    }
}

impl Default for HtmlImporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Build one slide from a detected boundary.
fn slide_from_section(section: &HtmlSection, index: usize) -> Slide {
    let attrs = tag_attrs(
        LEADING_TAG_REGEX
            .find(&section.markup)
            .map(|m| m.as_str())
            .unwrap_or_default(),
    );

    let mut slide = Slide::new("");
    slide.elements = extract_elements(&section.markup);
    slide.order = index;

    if let Some(id) = attrs.get("data-slide-id") {
        slide.id = id.clone();
    }
    if let Some(notes) = attrs.get("data-notes") {
        slide.notes = notes.clone();
    }
    if let (Some(kind), Some(value)) = (
        attrs.get("data-background-kind"),
        attrs.get("data-background-value"),
    ) {
        if let Some(kind) = BackgroundKind::from_name(kind) {
            slide.background = Some(Background {
                kind,
                value: value.clone(),
            });
        }
    }
    if let Some(thumbnail) = attrs.get("data-thumbnail") {
        slide.thumbnail = Some(thumbnail.clone());
    }

    slide.title = attrs
        .get("data-slide-title")
        .cloned()
        .or_else(|| slide.heading_title())
        .unwrap_or_else(|| section.title.clone());

    slide
}

/// Restore presentation-level metadata from a synthesized document's body tag.
fn apply_document_meta(presentation: &mut Presentation, html: &str) {
    let tag = match BODY_TAG_REGEX.find(html) {
        Some(m) => m.as_str(),
        None => return,
    };
    let attrs = tag_attrs(tag);

    if let Some(id) = attrs.get("data-presentation-id") {
        presentation.id = id.clone();
    }
    if let Some(title) = attrs.get("data-presentation-title") {
        presentation.title = title.clone();
    }
    if let Some(theme) = attrs.get("data-theme") {
        presentation.theme = theme.clone();
    }
    if let Some(topic) = attrs.get("data-topic") {
        presentation.topic = Some(topic.clone());
    }
    if let Some(audience) = attrs.get("data-audience") {
        presentation.audience = Some(audience.clone());
    }
}

/// Attribute map of a start tag, keys lowercased, values entity-decoded.
fn tag_attrs(tag: &str) -> HashMap<String, String> {
    ATTR_REGEX
        .captures_iter(tag)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = text::decode_entities(caps.get(2)?.as_str());
            Some((name, value))
        })
        .collect()
}
