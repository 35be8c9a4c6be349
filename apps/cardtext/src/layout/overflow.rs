//! Overflow splitter: moves trailing source lines into a continuation.
//!
//! Splitting is done on the raw text's `\n` boundaries, never inside a line,
//! so the head and the leftover each re-tokenize to valid markup as long as
//! no span crosses a hard line break.

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::LayoutError;
use crate::layout::autofit::{AutofitController, FitBox, FitResult};
use crate::layout::runs::PreparedText;

/// Text that did not fit the primary box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overflow {
    /// Trailing source lines, joined with `\n`.
    pub text: String,
    /// Left indent the continuation starts at.
    pub insertion_indent: f32,
    pub lines_moved: usize,
}

/// Result of laying out one region: what fits, plus the leftover if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutOutcome {
    pub primary: FitResult,
    pub overflow: Option<Overflow>,
}

impl LayoutOutcome {
    /// True when nothing fit and every line moved to the continuation.
    pub fn is_exhausted(&self) -> bool {
        self.overflow.is_some() && self.primary.is_empty()
    }
}

impl<'a> AutofitController<'a> {
    /// Splits `raw` at `font_size` so the head's last line stays at or above
    /// `fit_box.indent_cutoff_height`.
    ///
    /// Lines are removed from the end one at a time. If no head fits, every
    /// line becomes overflow; the caller decides whether that is fatal.
    pub fn split(
        &self,
        raw: &str,
        font_size: f32,
        fit_box: &FitBox,
        indent: f32,
    ) -> Result<LayoutOutcome, LayoutError> {
        let full = PreparedText::new(raw);
        let primary = self.measure_at(&full, font_size, fit_box.width_limit, fit_box.alignment)?;
        self.split_measured(raw, primary, fit_box, indent)
    }

    /// Fits `raw` (autofit) and then splits it at the converged size.
    pub fn layout(
        &self,
        raw: &str,
        initial_font_size: f32,
        fit_box: &FitBox,
        indent: f32,
    ) -> Result<LayoutOutcome, LayoutError> {
        let prepared = PreparedText::new(raw);
        let fitted = self.fit_prepared(&prepared, initial_font_size, fit_box)?;
        self.split_measured(raw, fitted, fit_box, indent)
    }

    fn split_measured(
        &self,
        raw: &str,
        primary: FitResult,
        fit_box: &FitBox,
        indent: f32,
    ) -> Result<LayoutOutcome, LayoutError> {
        if primary.last_line_height <= fit_box.indent_cutoff_height {
            return Ok(LayoutOutcome {
                primary,
                overflow: None,
            });
        }

        let font_size = primary.font_size;
        let iterations = primary.iterations;
        let lines: Vec<&str> = raw.split('\n').collect();
        let total = lines.len();

        let mut head_fit = primary;
        let mut removed = 0;
        while head_fit.last_line_height > fit_box.indent_cutoff_height && removed < total {
            removed += 1;
            let head = lines[..total - removed].join("\n");
            head_fit = self.measure_at(
                &PreparedText::without_diagnostics(&head),
                font_size,
                fit_box.width_limit,
                fit_box.alignment,
            )?;
        }
        head_fit.iterations = iterations;

        let leftover = lines[total - removed..].join("\n");
        if removed == total {
            warn!(
                lines = total,
                cutoff = fit_box.indent_cutoff_height,
                "Overflow: no line fits above the indent cutoff; all text moved to continuation"
            );
        } else {
            info!(
                lines_moved = removed,
                font_size, "Overflow: trailing lines moved to continuation"
            );
        }

        Ok(LayoutOutcome {
            primary: head_fit,
            overflow: Some(Overflow {
                text: leftover,
                insertion_indent: indent,
                lines_moved: removed,
            }),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
