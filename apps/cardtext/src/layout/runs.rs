//! Run builder: turns markup tokens into a styled rich text document.

use serde::Serialize;
use tracing::error;

use crate::layout::icons::{self, ResolvedIcon};
use crate::layout::markup::{tokenize, MarkupToken, SpanStyle};

/// Visual style of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RunStyle {
    Regular,
    Bold,
    Italic,
    /// Dedicated heavyweight face for `→` and `♦`, independent of spans.
    Heavy,
    IconGlyph(ResolvedIcon),
}

impl From<SpanStyle> for RunStyle {
    fn from(style: SpanStyle) -> Self {
        match style {
            SpanStyle::Bold => RunStyle::Bold,
            SpanStyle::Italic => RunStyle::Italic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledRun {
    /// Empty for icon glyphs.
    pub text: String,
    pub style: RunStyle,
}

impl StyledRun {
    pub fn icon(&self) -> Option<&ResolvedIcon> {
        match &self.style {
            RunStyle::IconGlyph(icon) => Some(icon),
            _ => None,
        }
    }
}

/// Runs in reading order, built for one font size.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RichTextDocument {
    pub runs: Vec<StyledRun>,
    pub font_size: f32,
}

impl RichTextDocument {
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty() && r.icon().is_none())
    }

    pub fn icon_count(&self) -> usize {
        self.runs.iter().filter(|r| r.icon().is_some()).count()
    }

    /// Visible text with icons shown as their bracketed names.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for run in &self.runs {
            match run.icon() {
                Some(icon) => {
                    out.push('[');
                    out.push_str(icon.spec.name);
                    out.push(']');
                }
                None => out.push_str(&run.text),
            }
        }
        out
    }
}

/// Builds the document for `tokens` at `font_size`.
///
/// Icon tokens missing from the icon table degrade to their literal bracket
/// text in the current style. Unbalanced closes are ignored.
pub fn build(tokens: &[MarkupToken], font_size: f32) -> RichTextDocument {
    let mut stack: Vec<SpanStyle> = Vec::new();
    let mut runs: Vec<StyledRun> = Vec::new();

    for token in tokens {
        let current = stack.last().map_or(RunStyle::Regular, |s| RunStyle::from(*s));
        match token {
            MarkupToken::Text(text) => push_text(&mut runs, text, current),
            MarkupToken::StyleOpen(style) => stack.push(*style),
            MarkupToken::StyleClose(style) => {
                if let Some(idx) = stack.iter().rposition(|s| s == style) {
                    stack.remove(idx);
                }
            }
            MarkupToken::SpecialGlyph(glyph) => {
                push_text(&mut runs, &glyph.as_char().to_string(), RunStyle::Heavy)
            }
            MarkupToken::IconToken(name) => match icons::resolve(name, font_size) {
                Some(icon) => runs.push(StyledRun {
                    text: String::new(),
                    style: RunStyle::IconGlyph(icon),
                }),
                None => push_text(&mut runs, &format!("[{name}]"), current),
            },
        }
    }

    RichTextDocument { runs, font_size }
}

fn push_text(runs: &mut Vec<StyledRun>, text: &str, style: RunStyle) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = runs.last_mut() {
        if last.style == style && last.icon().is_none() {
            last.text.push_str(text);
            return;
        }
    }
    runs.push(StyledRun {
        text: text.to_string(),
        style,
    });
}

// ────────────────────────────────────────────────────────────────────────────
// Prepared text
// ────────────────────────────────────────────────────────────────────────────

/// Raw text tokenized once for a whole layout call.
///
/// Autofit rebuilds the document at every font size; tokenizing and
/// reporting unknown icons happen only here.
#[derive(Debug, Clone)]
pub struct PreparedText {
    raw: String,
    tokens: Vec<MarkupToken>,
    unknown_icons: Vec<String>,
}

impl PreparedText {
    pub fn new(raw: &str) -> Self {
        let tokens = tokenize(raw);
        let mut unknown_icons: Vec<String> = Vec::new();
        for token in &tokens {
            if let MarkupToken::IconToken(name) = token {
                if icons::lookup(name).is_none() && !unknown_icons.contains(name) {
                    error!(icon = %name, "Unknown icon token; rendering literal text");
                    unknown_icons.push(name.clone());
                }
            }
        }
        PreparedText {
            raw: raw.to_string(),
            tokens,
            unknown_icons,
        }
    }

    /// Tokenizes text already reported through [`PreparedText::new`], such
    /// as a line-aligned slice of it.
    pub(crate) fn without_diagnostics(raw: &str) -> Self {
        PreparedText {
            raw: raw.to_string(),
            tokens: tokenize(raw),
            unknown_icons: Vec::new(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[MarkupToken] {
        &self.tokens
    }

    /// Icon names with no table entry, each listed once.
    pub fn unknown_icons(&self) -> &[String] {
        &self.unknown_icons
    }

    pub fn build(&self, font_size: f32) -> RichTextDocument {
        build(&self.tokens, font_size)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
