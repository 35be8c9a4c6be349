//! Text measurement contract and a static font-metric implementation.
//!
//! The fitting algorithms treat the measurer as an oracle: same document, same
//! width, same alignment → same line breaks and heights. Any shaping backend
//! that honours that contract can replace [`MetricTableMeasurer`].
//!
//! The static table approximates a humanist sans-serif. Character widths are
//! in em units; bold/italic/heavy faces are modelled as uniform width
//! multipliers. Line breaking is greedy on spaces; `\n` forces a break.

use serde::{Deserialize, Serialize};

use crate::errors::LayoutError;
use crate::layout::icons::{IconAssetTable, IconAssets};
use crate::layout::runs::{RichTextDocument, RunStyle};

// ────────────────────────────────────────────────────────────────────────────
// Measurement contract
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Part of one run placed on a line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineFragment {
    /// Index into `RichTextDocument::runs`.
    pub run: usize,
    /// Empty for icon glyphs.
    pub text: String,
    /// Offset from the box's left edge, alignment applied.
    pub x: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasuredLine {
    pub fragments: Vec<LineFragment>,
    pub width: f32,
    pub height: f32,
    /// Offset of the line's top from the box top.
    pub top: f32,
}

impl MeasuredLine {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Line-broken output of one measurement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeasuredText {
    pub lines: Vec<MeasuredLine>,
    /// Widest line.
    pub width: f32,
    pub total_height: f32,
}

impl MeasuredText {
    /// Distance from the box top to the bottom of the last line.
    pub fn last_line_height(&self) -> f32 {
        self.lines.last().map_or(0.0, MeasuredLine::bottom)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// External shaping/layout service.
///
/// `max_width` may be `f32::INFINITY` to disable wrapping. Implementations
/// must be deterministic.
pub trait TextMeasurer: Send + Sync {
    fn measure(
        &self,
        document: &RichTextDocument,
        max_width: f32,
        align: TextAlign,
    ) -> Result<MeasuredText, LayoutError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table.
///
/// `widths[i]` = width of ASCII character `(i + 32)` in em units, covering
/// 0x20 (space) through 0x7E (~).
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters.
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    pub fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        }
    }

    /// Width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }
}

/// Humanist sans-serif approximation used for card text.
pub static CARD_SANS: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
        // [     \     ]     ^     _     `
        0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.33, 0.26, 0.33, 0.59,
    ],
    average_char_width: 0.60,
    space_width: 0.25,
};

/// Width multiplier of each face relative to the regular table.
fn face_factor(style: &RunStyle) -> f32 {
    match style {
        RunStyle::Regular => 1.0,
        RunStyle::Bold => 1.06,
        RunStyle::Italic => 0.97,
        RunStyle::Heavy => 1.12,
        RunStyle::IconGlyph(_) => 1.0,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static measurer
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic measurer backed by a [`FontMetricTable`].
pub struct MetricTableMeasurer<A = IconAssetTable> {
    metrics: &'static FontMetricTable,
    assets: A,
    /// Line height as a multiple of font size.
    line_spacing: f32,
}

impl MetricTableMeasurer<IconAssetTable> {
    /// Card sans table with nominal one-em icons.
    pub fn card_default(line_spacing: f32) -> Self {
        MetricTableMeasurer::new(&CARD_SANS, IconAssetTable::nominal(), line_spacing)
    }
}

impl<A: IconAssets> MetricTableMeasurer<A> {
    pub fn new(metrics: &'static FontMetricTable, assets: A, line_spacing: f32) -> Self {
        MetricTableMeasurer {
            metrics,
            assets,
            line_spacing,
        }
    }

    fn pieces(&self, document: &RichTextDocument) -> Result<Vec<Piece>, LayoutError> {
        let size = document.font_size;
        let mut pieces = Vec::new();

        for (idx, run) in document.runs.iter().enumerate() {
            if let Some(icon) = run.icon() {
                let bounds = self.assets.glyph_bounds(icon.spec.asset_id)?.scaled(icon);
                pieces.push(Piece::Word {
                    run: idx,
                    text: String::new(),
                    width: bounds.width,
                    height: bounds.height,
                });
                continue;
            }

            let factor = face_factor(&run.style) * size;
            let mut word = String::new();
            for c in run.text.chars() {
                if c == ' ' || c == '\n' {
                    if !word.is_empty() {
                        pieces.push(Piece::Word {
                            run: idx,
                            width: self.metrics.measure_str(&word) * factor,
                            text: std::mem::take(&mut word),
                            height: 0.0,
                        });
                    }
                    pieces.push(if c == ' ' {
                        Piece::Space(self.metrics.space_width * factor)
                    } else {
                        Piece::Break
                    });
                } else {
                    word.push(c);
                }
            }
            if !word.is_empty() {
                pieces.push(Piece::Word {
                    run: idx,
                    width: self.metrics.measure_str(&word) * factor,
                    text: word,
                    height: 0.0,
                });
            }
        }

        Ok(pieces)
    }
}

enum Piece {
    Word {
        run: usize,
        text: String,
        width: f32,
        height: f32,
    },
    Space(f32),
    Break,
}

/// Words glued together without spaces, possibly spanning runs.
#[derive(Default)]
struct Cluster {
    parts: Vec<(usize, String, f32)>,
    width: f32,
    height: f32,
}

struct LineBuilder {
    line_height: f32,
    max_width: f32,
    align: TextAlign,
    lines: Vec<MeasuredLine>,
    fragments: Vec<LineFragment>,
    width: f32,
    height: f32,
    pending_space: f32,
    top: f32,
}

impl LineBuilder {
    fn place(&mut self, cluster: Cluster) {
        if cluster.parts.is_empty() {
            return;
        }
        let space = if self.fragments.is_empty() {
            0.0
        } else {
            self.pending_space
        };
        if !self.fragments.is_empty() && self.width + space + cluster.width > self.max_width {
            self.finish_line();
            return self.place(cluster);
        }
        let mut x = self.width + space;
        for (run, text, width) in cluster.parts {
            self.fragments.push(LineFragment { run, text, x, width });
            x += width;
        }
        self.width = x;
        self.height = self.height.max(cluster.height);
        self.pending_space = 0.0;
    }

    fn finish_line(&mut self) {
        let offset = match self.align {
            _ if !self.max_width.is_finite() => 0.0,
            TextAlign::Left => 0.0,
            TextAlign::Center => ((self.max_width - self.width) / 2.0).max(0.0),
            TextAlign::Right => (self.max_width - self.width).max(0.0),
        };
        let mut fragments = std::mem::take(&mut self.fragments);
        for fragment in &mut fragments {
            fragment.x += offset;
        }
        let height = self.line_height.max(self.height);
        self.lines.push(MeasuredLine {
            fragments,
            width: self.width,
            height,
            top: self.top,
        });
        self.top += height;
        self.width = 0.0;
        self.height = 0.0;
        self.pending_space = 0.0;
    }
}

impl<A: IconAssets> TextMeasurer for MetricTableMeasurer<A> {
    fn measure(
        &self,
        document: &RichTextDocument,
        max_width: f32,
        align: TextAlign,
    ) -> Result<MeasuredText, LayoutError> {
        if document.runs.is_empty() {
            return Ok(MeasuredText::default());
        }

        let mut builder = LineBuilder {
            line_height: document.font_size * self.line_spacing,
            max_width,
            align,
            lines: Vec::new(),
            fragments: Vec::new(),
            width: 0.0,
            height: 0.0,
            pending_space: 0.0,
            top: 0.0,
        };
        let mut cluster = Cluster::default();

        for piece in self.pieces(document)? {
            match piece {
                Piece::Word {
                    run,
                    text,
                    width,
                    height,
                } => {
                    cluster.parts.push((run, text, width));
                    cluster.width += width;
                    cluster.height = cluster.height.max(height);
                }
                Piece::Space(width) => {
                    builder.place(std::mem::take(&mut cluster));
                    if !builder.fragments.is_empty() {
                        builder.pending_space += width;
                    }
                }
                Piece::Break => {
                    builder.place(std::mem::take(&mut cluster));
                    builder.finish_line();
                }
            }
        }
        builder.place(cluster);
        builder.finish_line();

        let width = builder
            .lines
            .iter()
            .map(|l| l.width)
            .fold(0.0_f32, f32::max);
        Ok(MeasuredText {
            total_height: builder.top,
            lines: builder.lines,
            width,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
