//! Text utilities shared by the format boundary.
//!
//! Handles entity escaping for synthesized markup, tolerant entity decoding
//! for imported markup, tag stripping, and title cleanup.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex matching any markup tag, including across newlines.
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

/// Regex to collapse whitespace runs into one space.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Longest title kept after cleanup, in characters.
const MAX_TITLE_CHARS: usize = 120;

/// Escape free text for use as element content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape free text for use inside a double-quoted attribute value.
///
/// Newlines are encoded numerically so multi-line values (speaker notes)
/// survive an attribute round trip.
pub fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode character references: the five XML entities, `&nbsp;`, and
/// decimal/hex numeric references. Unrecognized references pass through
/// unchanged rather than erroring, since imported markup is untrusted.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        // Entity names are short; cap the scan window. Byte search keeps
        // the cut safe even when multi-byte text follows the ampersand.
        let window = &rest.as_bytes()[..rest.len().min(32)];
        match window.iter().position(|&b| b == b';') {
            Some(semi) if semi > 1 => match decode_entity(&rest[1..semi]) {
                Some(c) => {
                    out.push(c);
                    rest = &rest[semi + 1..];
                }
                None => {
                    out.push('&');
                    rest = &rest[1..];
                }
            },
            _ => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Decode a single reference body (the part between `&` and `;`).
fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)
        }
    }
}

/// Drop all markup tags, keeping the text between them.
pub fn strip_tags(markup: &str) -> String {
    TAG_REGEX.replace_all(markup, "").into_owned()
}

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_COLLAPSE_REGEX
        .replace_all(text, " ")
        .trim()
        .to_string()
}

/// Collapse whitespace within each line, dropping lines left empty.
///
/// Preserves intentional line structure (explicit breaks) while cleaning up
/// indentation and formatting whitespace from the source markup.
pub fn collapse_lines(text: &str) -> String {
    text.lines()
        .map(collapse_whitespace)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalize a derived title: NFC form, collapsed whitespace, bounded length.
pub fn clean_title(text: &str) -> String {
    let normalized: String = text.nfc().collect();
    let collapsed = collapse_whitespace(&normalized);

    if collapsed.chars().count() > MAX_TITLE_CHARS {
        collapsed
            .chars()
            .take(MAX_TITLE_CHARS)
            .collect::<String>()
            .trim_end()
            .to_string()
    } else {
        collapsed
    }
}

/// Positional fallback title for slide `n` (1-based).
pub fn default_slide_title(n: usize) -> String {
    format!("Slide {}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text_basic() {
        assert_eq!(
            escape_text("<script>alert('x')</script>"),
            "&lt;script&gt;alert('x')&lt;/script&gt;"
        );
        assert_eq!(escape_text("a & b"), "a &amp; b");
    }

    #[test]
    fn test_escape_attr_quotes_and_newlines() {
        assert_eq!(escape_attr("say \"hi\""), "say &quot;hi&quot;");
        assert_eq!(escape_attr("line one\nline two"), "line one&#10;line two");
    }

    #[test]
    fn test_decode_entities_named() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;p&gt;"), "<p>");
        assert_eq!(decode_entities("it&apos;s"), "it's");
        assert_eq!(decode_entities("a&nbsp;b"), "a\u{a0}b");
    }

    #[test]
    fn test_decode_entities_numeric() {
        assert_eq!(decode_entities("line&#10;break"), "line\nbreak");
        assert_eq!(decode_entities("&#x41;&#66;"), "AB");
    }

    #[test]
    fn test_decode_entities_unknown_passes_through() {
        assert_eq!(decode_entities("&bogus; stays"), "&bogus; stays");
        assert_eq!(decode_entities("AT&T"), "AT&T");
        assert_eq!(decode_entities("trailing &"), "trailing &");
    }

    #[test]
    fn test_decode_entities_multibyte_neighbours() {
        assert_eq!(decode_entities("😀 &amp; ✓"), "😀 & ✓");
        // ampersand followed by multi-byte text and no terminator
        assert_eq!(decode_entities("&日本語のテキストが続いていく場合"), "&日本語のテキストが続いていく場合");
    }

    #[test]
    fn test_escape_then_decode_round_trip() {
        let original = "5 < 6 & \"quotes\"\nnext";
        assert_eq!(decode_entities(&escape_attr(original)), original);
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<h1>Title <em>here</em></h1>"), "Title here");
        assert_eq!(strip_tags("no markup"), "no markup");
        assert_eq!(strip_tags("<br>line<hr/>"), "line");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \t b\n\nc  "), "a b c");
    }

    #[test]
    fn test_collapse_lines_keeps_breaks() {
        assert_eq!(
            collapse_lines("  first  line \n\n  second   line "),
            "first line\nsecond line"
        );
    }

    #[test]
    fn test_clean_title_collapses_and_trims() {
        assert_eq!(clean_title("  Cardiac \n Cycle  "), "Cardiac Cycle");
    }

    #[test]
    fn test_clean_title_bounds_length() {
        let long = "word ".repeat(60);
        let cleaned = clean_title(&long);
        assert!(cleaned.chars().count() <= 120);
        assert!(!cleaned.ends_with(' '));
    }

    #[test]
    fn test_default_slide_title() {
        assert_eq!(default_slide_title(3), "Slide 3");
    }
}
