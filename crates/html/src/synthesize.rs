//! Render a structured presentation back to a complete HTML document.
//!
//! The inverse of detection + extraction, restricted to the structured
//! path: every slide and element carries round-trip metadata so a later
//! import restores the model exactly. The emitted document is always
//! self-contained (doctype, inline style block, body), independent of
//! whatever markup the presentation was originally imported from.

use deck_core::text;
use deck_core::types::{
    BackgroundKind, ElementStyle, ElementType, Position, Presentation, Slide, SlideElement,
};

/// Style block shared by every synthesized document. Layout comes from the
/// per-element inline declarations; this covers the frame and type scale.
const BASE_STYLE: &str = "\
* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: #1a1a2e; font-family: 'Segoe UI', Helvetica, Arial, sans-serif; }
.slide { position: relative; width: 960px; height: 540px; margin: 24px auto; background: #ffffff; overflow: hidden; border-radius: 4px; }
.slide [data-element-id] { position: absolute; }
.slide h1 { font-size: 40px; }
.slide h2 { font-size: 28px; color: #444; }
.slide p, .slide li { font-size: 20px; line-height: 1.4; }
.slide ul, .slide ol { padding-left: 28px; }
.slide blockquote { border-left: 4px solid #889; padding-left: 14px; font-style: italic; }
.slide pre { font-family: 'Courier New', monospace; font-size: 16px; background: #f4f4f8; padding: 10px; overflow: auto; }
.slide img { max-width: 100%; max-height: 100%; object-fit: contain; }
.slide hr { border: none; border-top: 2px solid #ccd; }
";

/// Renderer from the structured model to a complete HTML document.
pub struct HtmlSynthesizer;

impl HtmlSynthesizer {
    /// Create a new synthesizer.
    pub fn new() -> Self {
        Self
    }

    /// Render the presentation as a complete, self-contained document.
    pub fn synthesize(&self, presentation: &Presentation) -> String {
        let mut out = String::with_capacity(4096);

        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str(&format!(
            "<title>{}</title>\n",
            text::escape_text(&presentation.title)
        ));
        out.push_str("<style>\n");
        out.push_str(BASE_STYLE);
        out.push_str("</style>\n</head>\n");

        out.push_str(&format!(
            "<body data-presentation-id=\"{}\" data-presentation-title=\"{}\" data-theme=\"{}\"",
            text::escape_attr(&presentation.id),
            text::escape_attr(&presentation.title),
            text::escape_attr(&presentation.theme),
        ));
        if let Some(topic) = &presentation.topic {
            out.push_str(&format!(" data-topic=\"{}\"", text::escape_attr(topic)));
        }
        if let Some(audience) = &presentation.audience {
            out.push_str(&format!(" data-audience=\"{}\"", text::escape_attr(audience)));
        }
        out.push_str(">\n");

        for slide in &presentation.slides {
            self.write_slide(&mut out, slide);
        }

        out.push_str("</body>\n</html>\n");
        out
    }

    fn write_slide(&self, out: &mut String, slide: &Slide) {
        out.push_str(&format!(
            "<section class=\"slide\" data-slide-id=\"{}\" data-slide-order=\"{}\" data-slide-title=\"{}\"",
            text::escape_attr(&slide.id),
            slide.order,
            text::escape_attr(&slide.title),
        ));

        if !slide.notes.is_empty() {
            out.push_str(&format!(
                " data-notes=\"{}\"",
                text::escape_attr(&slide.notes)
            ));
        }

        if let Some(background) = &slide.background {
            out.push_str(&format!(
                " data-background-kind=\"{}\" data-background-value=\"{}\"",
                background.kind.as_str(),
                text::escape_attr(&background.value),
            ));
            let css = match background.kind {
                BackgroundKind::Solid | BackgroundKind::Gradient => {
                    format!("background:{}", background.value)
                }
                BackgroundKind::Image => format!(
                    "background-image:url('{}');background-size:cover",
                    background.value
                ),
                // patterns are resolved by the theme
                BackgroundKind::Pattern => String::new(),
            };
            if !css.is_empty() {
                out.push_str(&format!(" style=\"{}\"", text::escape_attr(&css)));
            }
        }

        if let Some(thumbnail) = &slide.thumbnail {
            out.push_str(&format!(
                " data-thumbnail=\"{}\"",
                text::escape_attr(thumbnail)
            ));
        }

        out.push_str(">\n");

        for element in &slide.elements {
            self.write_element(out, element);
            out.push('\n');
        }

        out.push_str("</section>\n");
    }

    fn write_element(&self, out: &mut String, element: &SlideElement) {
        let meta = element_attrs(element);
        match element.kind {
            ElementType::Heading => write_text_tag(out, "h1", &meta, &element.content),
            ElementType::Subheading => write_text_tag(out, "h2", &meta, &element.content),
            ElementType::Paragraph => write_text_tag(out, "p", &meta, &element.content),
            ElementType::Quote => write_text_tag(out, "blockquote", &meta, &element.content),
            ElementType::CodeBlock => write_text_tag(out, "pre", &meta, &element.content),
            ElementType::BulletList => write_list_tag(out, "ul", &meta, &element.content),
            ElementType::NumberedList => write_list_tag(out, "ol", &meta, &element.content),
            ElementType::Image => out.push_str(&format!(
                "<img{} src=\"{}\" alt=\"\"/>",
                meta,
                text::escape_attr(&element.content)
            )),
            ElementType::Divider => out.push_str(&format!("<hr{}/>", meta)),
        }
    }
}

impl Default for HtmlSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

fn write_text_tag(out: &mut String, tag: &str, meta: &str, content: &str) {
    out.push_str(&format!(
        "<{}{}>{}</{}>",
        tag,
        meta,
        text::escape_text(content),
        tag
    ));
}

/// Lists re-split their newline-delimited content into items. `split` keeps
/// empty segments so blank items survive the round trip.
fn write_list_tag(out: &mut String, tag: &str, meta: &str, content: &str) {
    out.push_str(&format!("<{}{}>", tag, meta));
    for item in content.split('\n') {
        out.push_str(&format!("<li>{}</li>", text::escape_text(item)));
    }
    out.push_str(&format!("</{}>", tag));
}

/// Round-trip metadata attributes plus the inline style declaration.
fn element_attrs(element: &SlideElement) -> String {
    format!(
        " data-element-id=\"{}\" data-element-type=\"{}\" data-x=\"{}\" data-y=\"{}\" data-w=\"{}\" data-h=\"{}\" style=\"{}\"",
        text::escape_attr(&element.id),
        element.kind.as_str(),
        element.position.x,
        element.position.y,
        element.position.width,
        element.position.height,
        text::escape_attr(&inline_style(&element.position, &element.style)),
    )
}

/// Inline CSS: percentage placement plus whichever style fields are set.
/// Unset fields fall back to the theme's stylesheet, never baked in here.
fn inline_style(position: &Position, style: &ElementStyle) -> String {
    let mut css = format!(
        "left:{}%;top:{}%;width:{}%;height:{}%",
        position.x, position.y, position.width, position.height
    );
    if let Some(font_family) = &style.font_family {
        css.push_str(&format!(";font-family:{}", font_family));
    }
    if let Some(font_size) = style.font_size {
        css.push_str(&format!(";font-size:{}px", font_size));
    }
    if let Some(color) = &style.color {
        css.push_str(&format!(";color:{}", color));
    }
    if let Some(align) = style.align {
        css.push_str(&format!(";text-align:{}", align.as_css()));
    }
    if let Some(opacity) = style.opacity {
        css.push_str(&format!(";opacity:{}", opacity));
    }
    css
}
