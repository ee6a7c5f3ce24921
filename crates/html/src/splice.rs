//! Section splicing: pull one slide out as a standalone document for
//! external regeneration, and splice the replacement back at the exact
//! original byte offsets.
//!
//! Offsets are tied to one specific string instance. Callers that change or
//! re-parse the document must re-run boundary detection before splicing;
//! the checks here are a best-effort guard, not a guarantee.

use deck_core::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

use crate::section::HtmlSection;

/// The document head interior.
static HEAD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<head\b[^>]*>(.*?)</head\s*>").unwrap());

/// The first style block, for documents without a proper head.
static STYLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());

/// Build a minimal standalone document containing only the given section,
/// with the full document's head content carried along so the regeneration
/// step sees the same fonts and shared styles without the other slides.
pub fn extract_for_refinement(full_html: &str, section: &HtmlSection) -> Result<String> {
    verify_section(full_html, section)?;

    let head_inner = HEAD_REGEX
        .captures(full_html)
        .and_then(|c| c.get(1))
        .map(|g| g.as_str().to_string())
        .or_else(|| {
            STYLE_REGEX
                .find(full_html)
                .map(|m| m.as_str().to_string())
        })
        .unwrap_or_else(|| "<meta charset=\"utf-8\">".to_string());

    let mut out = String::with_capacity(head_inner.len() + section.len() + 128);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str(&head_inner);
    out.push_str("\n</head>\n<body>\n");
    out.push_str(&section.markup);
    out.push_str("\n</body>\n</html>\n");
    Ok(out)
}

/// Replace the section's byte range with the regenerated markup, leaving
/// every other byte of the document identical.
pub fn splice_back(full_html: &str, section: &HtmlSection, replacement: &str) -> Result<String> {
    if replacement.trim().is_empty() {
        return Err(Error::RefinementFailed(
            "replacement markup is empty".to_string(),
        ));
    }

    verify_section(full_html, section)?;

    let mut out =
        String::with_capacity(full_html.len() - section.len() + replacement.len());
    out.push_str(&full_html[..section.start]);
    out.push_str(replacement);
    out.push_str(&full_html[section.end..]);
    Ok(out)
}

/// Best-effort staleness check: the recorded range must be in bounds and
/// still hold the exact markup the section was produced from.
fn verify_section(full_html: &str, section: &HtmlSection) -> Result<()> {
    let stale = || Error::StaleSection {
        start: section.start,
        end: section.end,
        len: full_html.len(),
    };

    if section.start > section.end || section.end > full_html.len() {
        return Err(stale());
    }

    match full_html.get(section.range()) {
        Some(slice) if slice == section.markup => Ok(()),
        _ => {
            log::warn!(
                "section {} no longer matches its recorded range {}..{}",
                section.id,
                section.start,
                section.end
            );
            Err(stale())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BoundaryDetector;

    const DOC: &str = "<html><head><style>.slide{color:#111}</style></head><body>\
<section><h1>One</h1></section><section><h1>Two</h1></section>\
<section><h1>Three</h1></section></body></html>";

    fn sections() -> Vec<HtmlSection> {
        BoundaryDetector::new().detect(DOC)
    }

    #[test]
    fn test_extract_carries_head_and_only_that_section() {
        let sections = sections();
        let standalone = extract_for_refinement(DOC, &sections[1]).unwrap();

        assert!(standalone.contains("<style>.slide{color:#111}</style>"));
        assert!(standalone.contains("<h1>Two</h1>"));
        assert!(!standalone.contains("<h1>One</h1>"));
        assert!(!standalone.contains("<h1>Three</h1>"));
    }

    #[test]
    fn test_extract_without_head_falls_back() {
        let doc = "<section><h1>A</h1></section>";
        let sections = BoundaryDetector::new().detect(doc);
        let standalone = extract_for_refinement(doc, &sections[0]).unwrap();

        assert!(standalone.contains("charset"));
        assert!(standalone.contains("<h1>A</h1>"));
    }

    #[test]
    fn test_splice_back_exact_length() {
        let sections = sections();
        let section = &sections[1];
        let replacement = "<section><h1>2!</h1></section>";

        let result = splice_back(DOC, section, replacement).unwrap();
        assert_eq!(
            result.len(),
            DOC.len() - section.len() + replacement.len()
        );
        assert_eq!(&result[..section.start], &DOC[..section.start]);
        assert_eq!(
            &result[section.start + replacement.len()..],
            &DOC[section.end..]
        );
        assert!(result.contains("<h1>2!</h1>"));
        assert!(!result.contains("<h1>Two</h1>"));
    }

    #[test]
    fn test_splice_shorter_replacement_length_arithmetic() {
        let sections = sections();
        let section = &sections[2];
        let shorter = &section.markup[..section.len() - 10];
        // not valid markup, but the splice contract is purely byte-level
        let result = splice_back(DOC, section, shorter).unwrap();
        assert_eq!(result.len(), DOC.len() - 10);
    }

    #[test]
    fn test_splice_rejects_empty_replacement() {
        let sections = sections();
        let err = splice_back(DOC, &sections[0], "   \n  ").unwrap_err();
        assert!(matches!(err, Error::RefinementFailed(_)));
    }

    #[test]
    fn test_splice_rejects_out_of_bounds_range() {
        let sections = sections();
        let err = splice_back("<p>tiny</p>", &sections[0], "<p>x</p>").unwrap_err();
        assert!(matches!(err, Error::StaleSection { .. }));
    }

    #[test]
    fn test_splice_rejects_changed_document() {
        let sections = sections();
        let mutated = DOC.replace("One", "Uno");
        let err = splice_back(&mutated, &sections[0], "<p>x</p>").unwrap_err();
        assert!(matches!(err, Error::StaleSection { .. }));
    }

    #[test]
    fn test_refine_then_splice_round_trip() {
        let sections = sections();
        let section = &sections[1];

        let standalone = extract_for_refinement(DOC, section).unwrap();
        assert!(standalone.contains(&section.markup));

        // splice the unchanged markup back: document must be identical
        let result = splice_back(DOC, section, &section.markup).unwrap();
        assert_eq!(result, DOC);
    }
}
