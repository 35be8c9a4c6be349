//! Autofit controller: shrinks the font until text fits its box.
//!
//! Glyph metrics are opaque at this layer, so there is no closed-form fit:
//! the measurer is queried as an oracle while the font size walks down in
//! fixed steps. The step is the layout's stroke width.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LayoutConfig;
use crate::errors::LayoutError;
use crate::layout::font_metrics::{MeasuredText, TextAlign, TextMeasurer};
use crate::layout::runs::{PreparedText, RichTextDocument};

/// Constraints for one layout pass, supplied by frame geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitBox {
    pub width_limit: f32,
    pub height_limit: f32,
    /// Last-line height above which trailing lines move to a continuation.
    pub indent_cutoff_height: f32,
    #[serde(default)]
    pub alignment: TextAlign,
}

/// Output of one fitting pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    pub document: RichTextDocument,
    pub measured: MeasuredText,
    pub measured_height: f32,
    pub last_line_height: f32,
    /// Bounding width of the widest line.
    pub width: f32,
    pub font_size: f32,
    /// Number of font-size decrements taken.
    pub iterations: u32,
}

impl FitResult {
    fn from_measure(document: RichTextDocument, measured: MeasuredText) -> Self {
        FitResult {
            font_size: document.font_size,
            measured_height: measured.total_height,
            last_line_height: measured.last_line_height(),
            width: measured.width,
            document,
            measured,
            iterations: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.measured.lines.is_empty()
    }
}

/// Fitting entry points bound to one measurer and one layout policy.
pub struct AutofitController<'a> {
    pub(crate) measurer: &'a dyn TextMeasurer,
    pub(crate) config: &'a LayoutConfig,
}

impl<'a> AutofitController<'a> {
    pub fn new(measurer: &'a dyn TextMeasurer, config: &'a LayoutConfig) -> Self {
        AutofitController { measurer, config }
    }

    /// Builds and measures `text` at exactly `font_size`.
    pub fn measure_at(
        &self,
        text: &PreparedText,
        font_size: f32,
        max_width: f32,
        align: TextAlign,
    ) -> Result<FitResult, LayoutError> {
        let document = text.build(font_size);
        let measured = self.measurer.measure(&document, max_width, align)?;
        Ok(FitResult::from_measure(document, measured))
    }

    /// Fits raw markup into `fit_box`, starting at `initial_font_size`.
    pub fn fit(
        &self,
        raw: &str,
        initial_font_size: f32,
        fit_box: &FitBox,
    ) -> Result<FitResult, LayoutError> {
        self.fit_prepared(&PreparedText::new(raw), initial_font_size, fit_box)
    }

    /// Shrinks until the last line sits within `fill_threshold` of the box
    /// height. Fails instead of going below the minimum font size.
    pub fn fit_prepared(
        &self,
        text: &PreparedText,
        initial_font_size: f32,
        fit_box: &FitBox,
    ) -> Result<FitResult, LayoutError> {
        let step = self.validated_step(initial_font_size)?;
        let threshold = fit_box.height_limit * self.config.fill_threshold;

        let mut font_size = initial_font_size;
        let mut iterations = 0u32;
        let mut result =
            self.measure_at(text, font_size, fit_box.width_limit, fit_box.alignment)?;

        while result.last_line_height > threshold {
            let next = self.next_size(initial_font_size, font_size, step)?;
            debug!(
                from = font_size,
                to = next,
                last_line_height = result.last_line_height,
                threshold,
                "Autofit: shrinking font"
            );
            font_size = next;
            iterations += 1;
            result = self.measure_at(text, font_size, fit_box.width_limit, fit_box.alignment)?;
        }

        result.iterations = iterations;
        Ok(result)
    }

    /// Checks the starting size and returns the decrement step.
    pub(crate) fn validated_step(&self, initial_font_size: f32) -> Result<f32, LayoutError> {
        if !(initial_font_size.is_finite() && initial_font_size > 0.0) {
            return Err(LayoutError::InvalidFontSize(initial_font_size));
        }
        let step = self.config.stroke_width;
        if !(step.is_finite() && step > 0.0) {
            return Err(LayoutError::InvalidFontSize(step));
        }
        Ok(step)
    }

    /// The next size down, or `NonConvergent` if it would be degenerate.
    pub(crate) fn next_size(
        &self,
        initial: f32,
        current: f32,
        step: f32,
    ) -> Result<f32, LayoutError> {
        let next = current - step;
        if next <= 0.0 || next < self.config.min_font_size {
            return Err(LayoutError::NonConvergent {
                initial,
                reached: next,
            });
        }
        Ok(next)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
