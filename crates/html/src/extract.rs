//! Element extraction: decompose one slide boundary's markup into typed,
//! positioned content elements.
//!
//! Two paths. Markup written by the synthesizer carries round-trip metadata
//! and is read back verbatim. Anything else goes through the lossy
//! heuristic classification table, with positions synthesized top-to-bottom
//! since generic markup carries no percentage layout.

use deck_core::text;
use deck_core::types::{ElementStyle, ElementType, Position, SlideElement, TextAlign};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

const TOP_MARGIN: f64 = 6.0;
const LEFT_MARGIN: f64 = 8.0;
const CONTENT_WIDTH: f64 = 84.0;
const ELEMENT_GAP: f64 = 2.0;

/// The running vertical offset never starts an element below this line.
const MAX_OFFSET: f64 = 96.0;

/// Fixed height estimate (percent of slide area) per classification.
fn estimated_height(kind: ElementType) -> f64 {
    match kind {
        ElementType::Heading => 14.0,
        ElementType::Subheading => 10.0,
        ElementType::Paragraph => 12.0,
        ElementType::BulletList | ElementType::NumberedList => 20.0,
        ElementType::Image => 32.0,
        ElementType::Quote => 14.0,
        ElementType::CodeBlock => 24.0,
        ElementType::Divider => 4.0,
    }
}

/// Decompose one boundary's markup into content elements.
///
/// Selects the structured path when round-trip metadata is present, the
/// heuristic path otherwise. Never fails: unreadable input degrades to
/// fewer (or zero) elements.
pub fn extract_elements(markup: &str) -> Vec<SlideElement> {
    if markup.contains("data-element-id") {
        let elements = extract_structured(markup);
        if !elements.is_empty() {
            return elements;
        }
        log::warn!("round-trip metadata present but unreadable, falling back to heuristics");
    }
    extract_heuristic(markup)
}

/// Round-trip metadata carried by a structured element's start tag.
struct StructuredMeta {
    id: String,
    kind: ElementType,
    position: Position,
    style: ElementStyle,
    src: Option<String>,
}

impl StructuredMeta {
    fn into_element(self, content: String) -> SlideElement {
        SlideElement {
            id: self.id,
            kind: self.kind,
            content,
            position: self.position,
            style: self.style,
        }
    }
}

/// Read an element's metadata attributes, if it is a structured element.
fn structured_meta(e: &BytesStart) -> Option<StructuredMeta> {
    let mut id = None;
    let mut kind = None;
    let (mut x, mut y, mut w, mut h) = (None, None, None, None);
    let mut style = ElementStyle::default();
    let mut src = None;

    for attr in e.attributes().flatten() {
        let value = attr_value(&attr);
        match attr.key.as_ref() {
            b"data-element-id" => id = Some(value),
            b"data-element-type" => kind = ElementType::from_name(&value),
            b"data-x" => x = value.parse().ok(),
            b"data-y" => y = value.parse().ok(),
            b"data-w" => w = value.parse().ok(),
            b"data-h" => h = value.parse().ok(),
            b"style" => style = parse_inline_style(&value),
            b"src" => src = Some(value),
            _ => {}
        }
    }

    Some(StructuredMeta {
        id: id?,
        kind: kind?,
        position: Position::new(
            x.unwrap_or(0.0),
            y.unwrap_or(0.0),
            w.unwrap_or(100.0),
            h.unwrap_or(20.0),
        ),
        style,
        src,
    })
}

/// Structured path: restore elements exactly as the synthesizer wrote them.
fn extract_structured(markup: &str) -> Vec<SlideElement> {
    let mut reader = Reader::from_str(markup);
    reader.check_end_names(false);

    let mut elements = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let meta = match structured_meta(e) {
                    Some(meta) => meta,
                    None => continue,
                };
                let tag = local_name(e.name().as_ref()).to_ascii_lowercase();
                let content = match meta.kind {
                    ElementType::BulletList | ElementType::NumberedList => {
                        read_list_items(&mut reader, &tag, false).join("\n")
                    }
                    ElementType::Image => meta.src.clone().unwrap_or_default(),
                    ElementType::Divider => String::new(),
                    _ => read_plain_text(&mut reader, &tag),
                };
                elements.push(meta.into_element(content));
            }
            Ok(Event::Empty(ref e)) => {
                let meta = match structured_meta(e) {
                    Some(meta) => meta,
                    None => continue,
                };
                let content = meta.src.clone().unwrap_or_default();
                elements.push(meta.into_element(content));
            }
            Ok(Event::Eof) => break,
            Err(err) => log::warn!("markup tokenization error (continuing): {}", err),
            _ => {}
        }
    }
    elements
}

/// Heuristic path: the fixed tag classification table over arbitrary markup.
fn extract_heuristic(markup: &str) -> Vec<SlideElement> {
    let mut reader = Reader::from_str(markup);
    reader.check_end_names(false);

    let mut elements = Vec::new();
    let mut offset = TOP_MARGIN;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let tag = local_name(e.name().as_ref()).to_ascii_lowercase();
                match tag.as_slice() {
                    // non-content subtrees
                    b"script" | b"style" | b"head" | b"svg" | b"template" => {
                        skip_subtree(&mut reader, &tag)
                    }
                    b"h1" => {
                        let content = text::collapse_lines(&read_plain_text(&mut reader, &tag));
                        push_classified(&mut elements, &mut offset, ElementType::Heading, content);
                    }
                    b"h2" | b"h3" | b"h4" | b"h5" | b"h6" => {
                        let content = text::collapse_lines(&read_plain_text(&mut reader, &tag));
                        push_classified(
                            &mut elements,
                            &mut offset,
                            ElementType::Subheading,
                            content,
                        );
                    }
                    b"p" => {
                        let content = text::collapse_lines(&read_plain_text(&mut reader, &tag));
                        push_classified(&mut elements, &mut offset, ElementType::Paragraph, content);
                    }
                    b"blockquote" => {
                        let content = text::collapse_lines(&read_plain_text(&mut reader, &tag));
                        push_classified(&mut elements, &mut offset, ElementType::Quote, content);
                    }
                    b"pre" => {
                        let content = read_plain_text(&mut reader, &tag)
                            .trim_matches('\n')
                            .to_string();
                        push_classified(&mut elements, &mut offset, ElementType::CodeBlock, content);
                    }
                    b"ul" => {
                        let content = read_list_items(&mut reader, &tag, true).join("\n");
                        push_classified(
                            &mut elements,
                            &mut offset,
                            ElementType::BulletList,
                            content,
                        );
                    }
                    b"ol" => {
                        let content = read_list_items(&mut reader, &tag, true).join("\n");
                        push_classified(
                            &mut elements,
                            &mut offset,
                            ElementType::NumberedList,
                            content,
                        );
                    }
                    // void elements; never read a subtree for these
                    b"img" => {
                        let content = src_attr(e).unwrap_or_default();
                        push_classified(&mut elements, &mut offset, ElementType::Image, content);
                    }
                    b"hr" => {
                        push_classified(
                            &mut elements,
                            &mut offset,
                            ElementType::Divider,
                            String::new(),
                        );
                    }
                    // unknown containers: keep walking into them
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let tag = local_name(e.name().as_ref()).to_ascii_lowercase();
                match tag.as_slice() {
                    b"img" => {
                        let content = src_attr(e).unwrap_or_default();
                        push_classified(&mut elements, &mut offset, ElementType::Image, content);
                    }
                    b"hr" => {
                        push_classified(
                            &mut elements,
                            &mut offset,
                            ElementType::Divider,
                            String::new(),
                        );
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => log::warn!("markup tokenization error (continuing): {}", err),
            _ => {}
        }
    }

    elements
}

/// Append a heuristic element, advancing the running vertical offset.
/// Empty leaves are dropped (dividers are the one legitimately empty kind).
fn push_classified(
    elements: &mut Vec<SlideElement>,
    offset: &mut f64,
    kind: ElementType,
    content: String,
) {
    if kind != ElementType::Divider && content.trim().is_empty() {
        return;
    }

    let height = estimated_height(kind);
    let position = Position::new(LEFT_MARGIN, *offset, CONTENT_WIDTH, height);
    *offset = (*offset + height + ELEMENT_GAP).min(MAX_OFFSET);
    elements.push(SlideElement::new(kind, content, position));
}

/// Collect the text inside an element, to the matching close tag.
/// `<br>` becomes a newline; nested inline markup contributes its text.
fn read_plain_text(reader: &mut Reader<&[u8]>, tag: &[u8]) -> String {
    let mut depth = 1usize;
    let mut out = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e.name().as_ref()).to_ascii_lowercase();
                if name == tag {
                    depth += 1;
                } else if name == b"br" {
                    out.push('\n');
                }
            }
            Ok(Event::Empty(ref e)) => {
                if local_name(e.name().as_ref()).to_ascii_lowercase() == b"br" {
                    out.push('\n');
                }
            }
            Ok(Event::Text(ref e)) => out.push_str(&text_of(e)),
            Ok(Event::CData(e)) => out.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Ok(Event::End(ref e)) => {
                if local_name(e.name().as_ref()).to_ascii_lowercase() == tag {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => log::warn!("markup tokenization error (continuing): {}", err),
            _ => {}
        }
    }

    out
}

/// Collect list item texts up to the list's matching close tag.
///
/// With `tidy` set (heuristic path), item text is whitespace-collapsed and
/// empty items are dropped; without it (structured path), items are kept
/// verbatim so list content round-trips exactly. Unclosed `<li>` items are
/// finalized when the next one starts.
fn read_list_items(reader: &mut Reader<&[u8]>, list_tag: &[u8], tidy: bool) -> Vec<String> {
    let mut depth = 1usize;
    let mut items = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e.name().as_ref()).to_ascii_lowercase();
                if name == list_tag {
                    depth += 1;
                } else if name == b"li" {
                    finish_item(&mut items, &mut current, tidy);
                    current = Some(String::new());
                } else if name == b"br" {
                    // keep the item on one line; items are newline-delimited
                    if let Some(cur) = current.as_mut() {
                        cur.push(' ');
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                if local_name(e.name().as_ref()).to_ascii_lowercase() == b"br" {
                    if let Some(cur) = current.as_mut() {
                        cur.push(' ');
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(cur) = current.as_mut() {
                    cur.push_str(&text_of(e));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(cur) = current.as_mut() {
                    cur.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(ref e)) => {
                let name = local_name(e.name().as_ref()).to_ascii_lowercase();
                if name == list_tag {
                    depth -= 1;
                    if depth == 0 {
                        finish_item(&mut items, &mut current, tidy);
                        break;
                    }
                } else if name == b"li" {
                    finish_item(&mut items, &mut current, tidy);
                }
            }
            Ok(Event::Eof) => {
                finish_item(&mut items, &mut current, tidy);
                break;
            }
            Err(err) => log::warn!("markup tokenization error (continuing): {}", err),
            _ => {}
        }
    }

    items
}

fn finish_item(items: &mut Vec<String>, current: &mut Option<String>, tidy: bool) {
    if let Some(item) = current.take() {
        if tidy {
            let cleaned = text::collapse_whitespace(&item);
            if !cleaned.is_empty() {
                items.push(cleaned);
            }
        } else {
            items.push(item);
        }
    }
}

/// Skip everything up to the matching close tag.
fn skip_subtree(reader: &mut Reader<&[u8]>, tag: &[u8]) {
    let mut depth = 1usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if local_name(e.name().as_ref()).to_ascii_lowercase() == tag {
                    depth += 1;
                }
            }
            Ok(Event::End(ref e)) => {
                if local_name(e.name().as_ref()).to_ascii_lowercase() == tag {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => log::warn!("markup tokenization error (continuing): {}", err),
            _ => {}
        }
    }
}

/// Tolerantly decode a text event.
fn text_of(e: &BytesText) -> String {
    match e.unescape() {
        Ok(t) => t.into_owned(),
        Err(_) => text::decode_entities(&String::from_utf8_lossy(e)),
    }
}

/// Tolerantly decode an attribute value.
fn attr_value(attr: &Attribute) -> String {
    match attr.unescape_value() {
        Ok(v) => v.into_owned(),
        Err(_) => text::decode_entities(&String::from_utf8_lossy(&attr.value)),
    }
}

/// The `src` attribute of an image tag, if present.
fn src_attr(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"src")
        .map(|a| attr_value(&a))
}

/// Parse the inline CSS declarations the synthesizer emits for styling.
/// Position declarations (left/top/width/height) are ignored here; exact
/// placement travels in the `data-x`..`data-h` attributes.
fn parse_inline_style(style: &str) -> ElementStyle {
    let mut out = ElementStyle::default();
    for declaration in style.split(';') {
        let (property, value) = match declaration.split_once(':') {
            Some((p, v)) => (p.trim(), v.trim()),
            None => continue,
        };
        match property {
            "font-family" => out.font_family = Some(value.to_string()),
            "font-size" => {
                out.font_size = value
                    .strip_suffix("px")
                    .map(str::trim)
                    .unwrap_or(value)
                    .parse()
                    .ok()
            }
            "color" => out.color = Some(value.to_string()),
            "text-align" => out.align = TextAlign::from_css(value),
            "opacity" => out.opacity = value.parse().ok(),
            _ => {}
        }
    }
    out
}

/// Extract the local name from a potentially namespaced element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_table() {
        let markup = concat!(
            "<h1>Title</h1>",
            "<h2>Sub</h2>",
            "<p>Body text</p>",
            "<ul><li>a</li><li>b</li></ul>",
            "<ol><li>first</li></ol>",
            "<img src=\"https://example.org/pic.png\">",
            "<blockquote>wise words</blockquote>",
            "<pre>let x = 1;</pre>",
            "<hr>",
        );
        let elements = extract_elements(markup);
        let kinds: Vec<ElementType> = elements.iter().map(|e| e.kind).collect();

        assert_eq!(
            kinds,
            vec![
                ElementType::Heading,
                ElementType::Subheading,
                ElementType::Paragraph,
                ElementType::BulletList,
                ElementType::NumberedList,
                ElementType::Image,
                ElementType::Quote,
                ElementType::CodeBlock,
                ElementType::Divider,
            ]
        );
        assert_eq!(elements[3].content, "a\nb");
        assert_eq!(elements[5].content, "https://example.org/pic.png");
        assert_eq!(elements[7].content, "let x = 1;");
    }

    #[test]
    fn test_positions_flow_top_to_bottom() {
        let markup = "<h1>T</h1><p>a</p><p>b</p>";
        let elements = extract_elements(markup);

        assert_eq!(elements.len(), 3);
        assert!(elements[0].position.y < elements[1].position.y);
        assert!(elements[1].position.y < elements[2].position.y);
        for e in &elements {
            assert!(e.position.y + e.position.height <= 100.0);
        }
    }

    #[test]
    fn test_nested_containers_recursed() {
        let markup = "<div><div><p>deep</p></div><p>shallow</p></div>";
        let elements = extract_elements(markup);

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].content, "deep");
        assert_eq!(elements[1].content, "shallow");
    }

    #[test]
    fn test_empty_leaves_dropped() {
        let markup = "<p>   </p><p>kept</p><h2></h2>";
        let elements = extract_elements(markup);

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].content, "kept");
    }

    #[test]
    fn test_script_and_style_skipped() {
        let markup = "<script>var x = '<p>not content</p>';</script><style>p { color: red }</style><p>real</p>";
        let elements = extract_elements(markup);

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].content, "real");
    }

    #[test]
    fn test_inline_markup_contributes_text() {
        let markup = "<p>one <em>two</em> three</p>";
        let elements = extract_elements(markup);
        assert_eq!(elements[0].content, "one two three");
    }

    #[test]
    fn test_br_becomes_newline_in_paragraph() {
        let markup = "<p>first<br>second</p>";
        let elements = extract_elements(markup);
        assert_eq!(elements[0].content, "first\nsecond");
    }

    #[test]
    fn test_entities_decoded() {
        let markup = "<p>salt &amp; pepper</p>";
        let elements = extract_elements(markup);
        assert_eq!(elements[0].content, "salt & pepper");
    }

    #[test]
    fn test_unclosed_list_items_tolerated() {
        let markup = "<ul><li>one<li>two<li>three</ul>";
        let elements = extract_elements(markup);

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].content, "one\ntwo\nthree");
    }

    #[test]
    fn test_image_without_src_dropped() {
        let markup = "<img alt=\"no source\"><p>text</p>";
        let elements = extract_elements(markup);
        assert_eq!(elements.len(), 1);
    }

    #[test]
    fn test_structured_element_read_back() {
        let markup = concat!(
            "<section class=\"slide\" data-slide-id=\"s1\">",
            "<h1 data-element-id=\"e1\" data-element-type=\"heading\" ",
            "data-x=\"10\" data-y=\"8\" data-w=\"80\" data-h=\"14\" ",
            "style=\"font-size:32px;color:#224488;text-align:center\">Exact Title</h1>",
            "<hr data-element-id=\"e2\" data-element-type=\"divider\" ",
            "data-x=\"10\" data-y=\"30\" data-w=\"80\" data-h=\"4\"/>",
            "</section>",
        );
        let elements = extract_elements(markup);

        assert_eq!(elements.len(), 2);
        let heading = &elements[0];
        assert_eq!(heading.id, "e1");
        assert_eq!(heading.kind, ElementType::Heading);
        assert_eq!(heading.content, "Exact Title");
        assert_eq!(heading.position.x, 10.0);
        assert_eq!(heading.position.height, 14.0);
        assert_eq!(heading.style.font_size, Some(32.0));
        assert_eq!(heading.style.color.as_deref(), Some("#224488"));
        assert_eq!(heading.style.align, Some(TextAlign::Center));

        assert_eq!(elements[1].kind, ElementType::Divider);
        assert_eq!(elements[1].id, "e2");
    }

    #[test]
    fn test_structured_list_preserves_blank_items() {
        let markup = concat!(
            "<ul data-element-id=\"e1\" data-element-type=\"bullet-list\" ",
            "data-x=\"10\" data-y=\"10\" data-w=\"80\" data-h=\"20\">",
            "<li>a</li><li></li><li>b</li></ul>",
        );
        let elements = extract_elements(markup);
        assert_eq!(elements[0].content, "a\n\nb");
    }

    #[test]
    fn test_parse_inline_style() {
        let style = parse_inline_style(
            "left:10%;top:8%;font-family:Georgia;font-size:24px;color:#fff;text-align:right;opacity:0.8",
        );
        assert_eq!(style.font_family.as_deref(), Some("Georgia"));
        assert_eq!(style.font_size, Some(24.0));
        assert_eq!(style.color.as_deref(), Some("#fff"));
        assert_eq!(style.align, Some(TextAlign::Right));
        assert_eq!(style.opacity, Some(0.8));
    }

    #[test]
    fn test_malformed_markup_degrades_quietly() {
        let markup = "<p>ok</p><div><span>loose</div><p>also ok</p>";
        let elements = extract_elements(markup);
        let contents: Vec<&str> = elements.iter().map(|e| e.content.as_str()).collect();
        assert!(contents.contains(&"ok"));
        assert!(contents.contains(&"also ok"));
    }
}
