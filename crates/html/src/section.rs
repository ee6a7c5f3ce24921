//! Boundary detector output records.

use deck_core::types::new_id;
use serde::{Deserialize, Serialize};

/// How a boundary was identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// An element explicitly marked as a slide.
    Slide,
    /// A generic sectioning container.
    Section,
    /// A heading-driven or whole-document boundary.
    Custom,
}

/// One detected slide boundary.
///
/// `start`/`end` are byte offsets into the exact document string the
/// detector ran over, and `markup` is that substring verbatim. The offsets
/// stay valid only until the source string changes; the splicer checks the
/// slice still matches before acting on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtmlSection {
    pub id: String,
    pub kind: SectionKind,
    pub title: String,
    pub markup: String,
    pub start: usize,
    pub end: usize,
}

impl HtmlSection {
    /// Create a section covering `source[start..end]`.
    pub fn new(
        kind: SectionKind,
        title: impl Into<String>,
        source: &str,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            id: new_id(),
            kind,
            title: title.into(),
            markup: source[start..end].to_string(),
            start,
            end,
        }
    }

    /// Length of the covered range in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the covered range is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The covered byte range.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_captures_slice() {
        let source = "aaa<section>x</section>bbb";
        let s = HtmlSection::new(SectionKind::Section, "t", source, 3, 23);
        assert_eq!(s.markup, "<section>x</section>");
        assert_eq!(s.len(), 20);
        assert!(!s.is_empty());
        assert_eq!(s.range(), 3..23);
    }
}
