//! Domain types for the slide document model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::text;

/// Generate a fresh identity string.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Represents an entire presentation: identity, metadata, and an ordered
/// list of slides it exclusively owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presentation {
    /// Stable identity, preserved across export/import cycles.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Topic the deck was generated for, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    /// Intended audience, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,

    /// Opaque theme reference; resolved by the rendering layer.
    pub theme: String,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last-modified timestamp, refreshed by every structural mutation.
    pub updated_at: DateTime<Utc>,
}

impl Presentation {
    /// Create an empty presentation with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            title: title.into(),
            topic: None,
            audience: None,
            theme: "default".to_string(),
            slides: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the topic metadata.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Set the audience metadata.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Get a slide by index.
    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    /// Get a mutable slide by index.
    pub fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    /// Refresh the last-modified timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A single slide: ordered elements plus display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// Stable identity, preserved across export/import cycles.
    pub id: String,

    /// Zero-based position in the deck; always equal to the slide's index.
    pub order: usize,

    /// Display title, derived from the first heading or synthesized.
    pub title: String,

    /// Content elements in reading order.
    pub elements: Vec<SlideElement>,

    /// Free-text speaker notes.
    #[serde(default)]
    pub notes: String,

    /// Optional background descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,

    /// Optional thumbnail reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl Slide {
    /// Create an empty slide with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            order: 0,
            title: title.into(),
            elements: Vec::new(),
            notes: String::new(),
            background: None,
            thumbnail: None,
        }
    }

    /// Title derived from the first heading-like element, if any.
    pub fn heading_title(&self) -> Option<String> {
        self.elements
            .iter()
            .find(|e| matches!(e.kind, ElementType::Heading | ElementType::Subheading))
            .map(|e| text::clean_title(e.content.lines().next().unwrap_or_default()))
            .filter(|t| !t.is_empty())
    }

    /// Get an element by id.
    pub fn element(&self, id: &str) -> Option<&SlideElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Get a mutable element by id.
    pub fn element_mut(&mut self, id: &str) -> Option<&mut SlideElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }
}

/// One positioned content element on a slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideElement {
    /// Stable identity, preserved across export/import cycles.
    pub id: String,

    /// Closed content classification.
    pub kind: ElementType,

    /// Plain text content. Lists keep one item per line; images store the
    /// source URL.
    pub content: String,

    /// Placement as percentages of the slide area.
    pub position: Position,

    /// Optional styling; unset fields fall back to the theme at render time.
    #[serde(default, skip_serializing_if = "ElementStyle::is_empty")]
    pub style: ElementStyle,
}

impl SlideElement {
    /// Create an element with the given classification, content, and position.
    pub fn new(kind: ElementType, content: impl Into<String>, position: Position) -> Self {
        Self {
            id: new_id(),
            kind,
            content: content.into(),
            position,
            style: ElementStyle::default(),
        }
    }

    /// Attach styling.
    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = style;
        self
    }
}

/// The closed set of element classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementType {
    Heading,
    Subheading,
    Paragraph,
    BulletList,
    NumberedList,
    Image,
    Quote,
    CodeBlock,
    Divider,
}

impl ElementType {
    /// Wire name used in round-trip metadata attributes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Subheading => "subheading",
            Self::Paragraph => "paragraph",
            Self::BulletList => "bullet-list",
            Self::NumberedList => "numbered-list",
            Self::Image => "image",
            Self::Quote => "quote",
            Self::CodeBlock => "code-block",
            Self::Divider => "divider",
        }
    }

    /// Parse a wire name back into a classification.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "heading" => Some(Self::Heading),
            "subheading" => Some(Self::Subheading),
            "paragraph" => Some(Self::Paragraph),
            "bullet-list" => Some(Self::BulletList),
            "numbered-list" => Some(Self::NumberedList),
            "image" => Some(Self::Image),
            "quote" => Some(Self::Quote),
            "code-block" => Some(Self::CodeBlock),
            "divider" => Some(Self::Divider),
            _ => None,
        }
    }
}

/// Placement of an element as percentages of the slide area.
///
/// Coordinates are resolution-independent: `x`/`y` are the top-left corner
/// and `width`/`height` the extent, all in `[0, 100]`. Out-of-range values
/// are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Position {
    /// Create a position, clamping all fields into the slide area so that
    /// `x + width` and `y + height` never exceed 100. Non-finite values
    /// (possible when parsing attributes) collapse to zero.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        let x = finite_or_zero(x).clamp(0.0, 100.0);
        let y = finite_or_zero(y).clamp(0.0, 100.0);
        let width = finite_or_zero(width).clamp(0.0, 100.0 - x);
        let height = finite_or_zero(height).clamp(0.0, 100.0 - y);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Re-apply the clamping rules in place.
    pub fn clamp(&mut self) {
        *self = Self::new(self.x, self.y, self.width, self.height);
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(10.0, 10.0, 80.0, 20.0)
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Optional per-element styling overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    /// Font size in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    /// CSS color value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,

    /// Opacity in `[0, 1]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl ElementStyle {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.font_family.is_none()
            && self.font_size.is_none()
            && self.color.is_none()
            && self.align.is_none()
            && self.opacity.is_none()
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    /// CSS keyword for this alignment.
    pub fn as_css(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }

    /// Parse a CSS keyword.
    pub fn from_css(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

/// Slide background descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background {
    pub kind: BackgroundKind,

    /// Kind-dependent value: a color, gradient spec, URL, or pattern name.
    pub value: String,
}

/// The kind of background a slide carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    Solid,
    Gradient,
    Image,
    Pattern,
}

impl BackgroundKind {
    /// Wire name used in round-trip metadata attributes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Gradient => "gradient",
            Self::Image => "image",
            Self::Pattern => "pattern",
        }
    }

    /// Parse a wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "solid" => Some(Self::Solid),
            "gradient" => Some(Self::Gradient),
            "image" => Some(Self::Image),
            "pattern" => Some(Self::Pattern),
            _ => None,
        }
    }
}
