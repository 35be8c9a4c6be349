//! Markup tokenizer for card text.
//!
//! Recognised, in precedence order at every scan position:
//! - paired `<strong>`/`<em>` tags (an opening tag without a later closing
//!   tag, or a closing tag without an open span, is literal text)
//! - the `→` and `♦` glyphs
//! - bracketed icon tokens `[a-z-]+`
//!
//! Newlines are doubled before scanning so every hard break renders as a
//! paragraph break. The scan is a single forward pass: each step consumes at
//! least one character, so termination is bounded by the input length.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static ICON_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\[([a-z-]+)\]").expect("valid icon token regex"));

const BOLD_OPEN: &str = "<strong>";
const BOLD_CLOSE: &str = "</strong>";
const ITALIC_OPEN: &str = "<em>";
const ITALIC_CLOSE: &str = "</em>";

pub const ARROW_GLYPH: char = '→';
pub const UNIQUE_GLYPH: char = '♦';

/// Characters that may directly follow an icon without a separating space.
const ICON_TRAILERS: [char; 3] = [' ', ',', '.'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanStyle {
    Bold,
    Italic,
}

impl SpanStyle {
    fn open_tag(self) -> &'static str {
        match self {
            SpanStyle::Bold => BOLD_OPEN,
            SpanStyle::Italic => ITALIC_OPEN,
        }
    }

    fn close_tag(self) -> &'static str {
        match self {
            SpanStyle::Bold => BOLD_CLOSE,
            SpanStyle::Italic => ITALIC_CLOSE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialGlyph {
    Arrow,
    Unique,
}

impl SpecialGlyph {
    pub fn as_char(self) -> char {
        match self {
            SpecialGlyph::Arrow => ARROW_GLYPH,
            SpecialGlyph::Unique => UNIQUE_GLYPH,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            ARROW_GLYPH => Some(SpecialGlyph::Arrow),
            UNIQUE_GLYPH => Some(SpecialGlyph::Unique),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkupToken {
    Text(String),
    StyleOpen(SpanStyle),
    StyleClose(SpanStyle),
    SpecialGlyph(SpecialGlyph),
    /// Icon name with the brackets stripped.
    IconToken(String),
}

/// Splits raw card text into an ordered token sequence. Never fails.
pub fn tokenize(raw: &str) -> Vec<MarkupToken> {
    let text = raw.replace('\n', "\n\n");
    let mut scanner = Scanner::default();
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];

        if let Some((style, consumed)) = scanner.match_style_tag(rest) {
            scanner.push(style);
            pos += consumed;
            continue;
        }

        let Some(c) = rest.chars().next() else { break };

        if let Some(glyph) = SpecialGlyph::from_char(c) {
            scanner.push(MarkupToken::SpecialGlyph(glyph));
            pos += c.len_utf8();
            continue;
        }

        if c == '[' {
            if let Some(caps) = ICON_TOKEN_RE.captures(rest) {
                let whole = caps.get(0).map_or(0, |m| m.len());
                let name = caps.get(1).map_or("", |m| m.as_str());
                scanner.push(MarkupToken::IconToken(name.to_string()));
                pos += whole;
                continue;
            }
        }

        scanner.push_char(c);
        pos += c.len_utf8();
    }

    scanner.finish()
}

/// Reassembles the visible text of a token stream, dropping style tags.
///
/// Glyphs are rendered as their characters and icons as their bracketed
/// names, which makes this the inverse of [`tokenize`] up to two rewrites:
/// newlines come back doubled, and a space appears after an icon wherever
/// the tokenizer inserted one.
pub fn plain_text(tokens: &[MarkupToken]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            MarkupToken::Text(t) => out.push_str(t),
            MarkupToken::SpecialGlyph(g) => out.push(g.as_char()),
            MarkupToken::IconToken(name) => {
                out.push('[');
                out.push_str(name);
                out.push(']');
            }
            MarkupToken::StyleOpen(_) | MarkupToken::StyleClose(_) => {}
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Scanner state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Scanner {
    tokens: Vec<MarkupToken>,
    pending: String,
    bold_depth: usize,
    italic_depth: usize,
    after_icon: bool,
}

enum StyleTag {
    Open(SpanStyle),
    Close(SpanStyle),
}

impl Scanner {
    /// Returns the tag at the start of `rest` if it forms part of a valid
    /// span, with its byte length.
    fn match_style_tag(&self, rest: &str) -> Option<(StyleTag, usize)> {
        for style in [SpanStyle::Bold, SpanStyle::Italic] {
            let open = style.open_tag();
            let close = style.close_tag();
            if rest.starts_with(open) && rest[open.len()..].contains(close) {
                return Some((StyleTag::Open(style), open.len()));
            }
            if rest.starts_with(close) && self.depth(style) > 0 {
                return Some((StyleTag::Close(style), close.len()));
            }
        }
        None
    }

    fn depth(&self, style: SpanStyle) -> usize {
        match style {
            SpanStyle::Bold => self.bold_depth,
            SpanStyle::Italic => self.italic_depth,
        }
    }

    fn depth_mut(&mut self, style: SpanStyle) -> &mut usize {
        match style {
            SpanStyle::Bold => &mut self.bold_depth,
            SpanStyle::Italic => &mut self.italic_depth,
        }
    }

    fn push_char(&mut self, c: char) {
        if self.after_icon {
            if !ICON_TRAILERS.contains(&c) {
                self.pending.push(' ');
            }
            self.after_icon = false;
        }
        self.pending.push(c);
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.tokens
                .push(MarkupToken::Text(std::mem::take(&mut self.pending)));
        }
    }

    fn push(&mut self, token: impl Into<ScannedToken>) {
        self.flush();
        match token.into() {
            ScannedToken::Tag(StyleTag::Open(style)) => {
                *self.depth_mut(style) += 1;
                self.tokens.push(MarkupToken::StyleOpen(style));
            }
            ScannedToken::Tag(StyleTag::Close(style)) => {
                let depth = self.depth_mut(style);
                *depth = depth.saturating_sub(1);
                self.tokens.push(MarkupToken::StyleClose(style));
            }
            ScannedToken::Token(token) => {
                if self.after_icon && matches!(token, MarkupToken::SpecialGlyph(_)) {
                    self.tokens.push(MarkupToken::Text(" ".to_string()));
                }
                self.after_icon = matches!(token, MarkupToken::IconToken(_));
                self.tokens.push(token);
            }
        }
    }

    fn finish(mut self) -> Vec<MarkupToken> {
        self.flush();
        self.tokens
    }
}

enum ScannedToken {
    Tag(StyleTag),
    Token(MarkupToken),
}

impl From<StyleTag> for ScannedToken {
    fn from(tag: StyleTag) -> Self {
        ScannedToken::Tag(tag)
    }
}

impl From<MarkupToken> for ScannedToken {
    fn from(token: MarkupToken) -> Self {
        ScannedToken::Token(token)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> MarkupToken {
        MarkupToken::Text(s.to_string())
    }

    fn icon(s: &str) -> MarkupToken {
        MarkupToken::IconToken(s.to_string())
    }

    // ── plain text and paragraphs ───────────────────────────────────────────

    #[test]
    fn test_tokenize_empty_returns_no_tokens() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_tokenize_plain_text_single_token() {
        assert_eq!(tokenize("Gain 5 credits."), vec![text("Gain 5 credits.")]);
    }

    #[test]
    fn test_tokenize_doubles_newlines() {
        assert_eq!(tokenize("a\nb"), vec![text("a\n\nb")]);
    }

    // ── style tags ──────────────────────────────────────────────────────────

    #[test]
    fn test_tokenize_bold_span() {
        assert_eq!(
            tokenize("<strong>Program</strong> - Icebreaker"),
            vec![
                MarkupToken::StyleOpen(SpanStyle::Bold),
                text("Program"),
                MarkupToken::StyleClose(SpanStyle::Bold),
                text(" - Icebreaker"),
            ]
        );
    }

    #[test]
    fn test_tokenize_nested_spans() {
        assert_eq!(
            tokenize("<em>a <strong>b</strong></em>"),
            vec![
                MarkupToken::StyleOpen(SpanStyle::Italic),
                text("a "),
                MarkupToken::StyleOpen(SpanStyle::Bold),
                text("b"),
                MarkupToken::StyleClose(SpanStyle::Bold),
                MarkupToken::StyleClose(SpanStyle::Italic),
            ]
        );
    }

    #[test]
    fn test_tokenize_unmatched_open_tag_is_literal() {
        assert_eq!(tokenize("<strong>oops"), vec![text("<strong>oops")]);
    }

    #[test]
    fn test_tokenize_stray_close_tag_is_literal() {
        assert_eq!(tokenize("oops</em> here"), vec![text("oops</em> here")]);
    }

    #[test]
    fn test_tokenize_partial_tag_is_literal() {
        assert_eq!(tokenize("<stron>x</strong>"), vec![text("<stron>x</strong>")]);
    }

    #[test]
    fn test_style_stripping_round_trip() {
        let samples = [
            "<strong>When you install</strong> this program, gain 1 credit.",
            "<em>Flavor text</em> and <strong>bold <em>nested</em> text</strong>",
            "No markup at all",
            "<strong></strong>empty span",
        ];
        for raw in samples {
            let stripped = raw
                .replace("<strong>", "")
                .replace("</strong>", "")
                .replace("<em>", "")
                .replace("</em>", "");
            assert_eq!(plain_text(&tokenize(raw)), stripped, "round trip of {raw:?}");
        }
    }

    #[test]
    fn test_round_trip_doubles_newlines() {
        let raw = "<strong>Line one.</strong>\nLine two.";
        assert_eq!(plain_text(&tokenize(raw)), "Line one.\n\nLine two.");
    }

    #[test]
    fn test_round_trip_keeps_icons_and_adds_space_after_them() {
        assert_eq!(
            plain_text(&tokenize("<em>Gain 2[credit].</em>")),
            "Gain 2[credit]."
        );
        assert_eq!(
            plain_text(&tokenize("<strong>[click]</strong>: Gain 1[credit]")),
            "[click] : Gain 1[credit]"
        );
        assert_eq!(
            plain_text(&tokenize("[trash]Draw 1 card.")),
            "[trash] Draw 1 card."
        );
    }

    // ── glyphs ──────────────────────────────────────────────────────────────

    #[test]
    fn test_tokenize_arrow_and_unique_glyphs() {
        assert_eq!(
            tokenize("♦ Title → more"),
            vec![
                MarkupToken::SpecialGlyph(SpecialGlyph::Unique),
                text(" Title "),
                MarkupToken::SpecialGlyph(SpecialGlyph::Arrow),
                text(" more"),
            ]
        );
    }

    // ── icon tokens ─────────────────────────────────────────────────────────

    #[test]
    fn test_tokenize_icon_followed_by_period_no_space() {
        assert_eq!(
            tokenize("Gain 5 [credit]."),
            vec![text("Gain 5 "), icon("credit"), text(".")]
        );
    }

    #[test]
    fn test_tokenize_icon_followed_by_word_gets_space() {
        assert_eq!(
            tokenize("[click]: Draw 1 card."),
            vec![icon("click"), text(" : Draw 1 card.")]
        );
    }

    #[test]
    fn test_tokenize_glyph_after_icon_gets_space() {
        assert_eq!(
            tokenize("[click]→Gain 1"),
            vec![
                icon("click"),
                text(" "),
                MarkupToken::SpecialGlyph(SpecialGlyph::Arrow),
                text("Gain 1"),
            ]
        );
        assert_eq!(plain_text(&tokenize("[click]→Gain 1")), "[click] →Gain 1");
    }

    #[test]
    fn test_tokenize_icon_at_end_adds_nothing() {
        assert_eq!(tokenize("Pay 1[credit]"), vec![text("Pay 1"), icon("credit")]);
    }

    #[test]
    fn test_tokenize_consecutive_icons() {
        assert_eq!(
            tokenize("[click][click][click]"),
            vec![icon("click"), icon("click"), icon("click")]
        );
    }

    #[test]
    fn test_tokenize_hyphenated_icon_name() {
        assert_eq!(
            tokenize("2[recurring-credit]"),
            vec![text("2"), icon("recurring-credit")]
        );
    }

    #[test]
    fn test_tokenize_unknown_bracket_still_icon_token() {
        assert_eq!(tokenize("[wibble]"), vec![icon("wibble")]);
    }

    #[test]
    fn test_tokenize_non_matching_brackets_are_literal() {
        assert_eq!(tokenize("[Mu] [1] []"), vec![text("[Mu] [1] []")]);
    }

    #[test]
    fn test_tokenize_icon_inside_bold_span() {
        assert_eq!(
            tokenize("<strong>[trash]</strong> it"),
            vec![
                MarkupToken::StyleOpen(SpanStyle::Bold),
                icon("trash"),
                MarkupToken::StyleClose(SpanStyle::Bold),
                text(" it"),
            ]
        );
    }

    #[test]
    fn test_mu_icons_counted_in_order() {
        let tokens = tokenize("+1[mu] and another [mu], then [credit]");
        let names: Vec<&str> = tokens
            .iter()
            .filter_map(|t| match t {
                MarkupToken::IconToken(n) => Some(n.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["mu", "mu", "credit"]);
    }
}
