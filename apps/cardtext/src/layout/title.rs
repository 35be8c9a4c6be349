//! Title shrink-to-fit. Titles never wrap; they only get smaller.

use tracing::debug;

use crate::errors::LayoutError;
use crate::layout::autofit::{AutofitController, FitResult};
use crate::layout::font_metrics::TextAlign;
use crate::layout::markup::UNIQUE_GLYPH;
use crate::layout::runs::PreparedText;
use crate::models::card::CardRecord;

/// Title as printed: unique cards carry the `♦` prefix.
pub fn display_title(card: &CardRecord) -> String {
    if card.is_unique {
        format!("{UNIQUE_GLYPH} {}", card.title)
    } else {
        card.title.clone()
    }
}

impl<'a> AutofitController<'a> {
    /// Lays `title` out on one left-aligned line, shrinking by the stroke
    /// width until its bounding width is at most `max_width`. Hard breaks in
    /// the title are read as spaces.
    pub fn fit_title(
        &self,
        title: &str,
        initial_font_size: f32,
        max_width: f32,
    ) -> Result<FitResult, LayoutError> {
        let step = self.validated_step(initial_font_size)?;
        let text = PreparedText::new(&title.replace('\n', " "));

        let mut font_size = initial_font_size;
        let mut iterations = 0u32;
        let mut result = self.measure_at(&text, font_size, f32::INFINITY, TextAlign::Left)?;

        while result.width > max_width {
            let next = self.next_size(initial_font_size, font_size, step)?;
            debug!(
                from = font_size,
                to = next,
                width = result.width,
                max_width,
                "Title: shrinking font"
            );
            font_size = next;
            iterations += 1;
            result = self.measure_at(&text, font_size, f32::INFINITY, TextAlign::Left)?;
        }

        result.iterations = iterations;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::font_metrics::MetricTableMeasurer;

    fn config() -> LayoutConfig {
        let mut config = LayoutConfig::for_canvas(1000.0, 1000.0);
        config.stroke_width = 0.5;
        config.min_font_size = 1.0;
        config
    }

    fn card(title: &str, unique: bool) -> CardRecord {
        CardRecord {
            title: title.to_string(),
            is_unique: unique,
            text: String::new(),
            type_id: "event".to_string(),
            display_subtypes: None,
        }
    }

    #[test]
    fn test_display_title_plain() {
        assert_eq!(display_title(&card("Sure Gamble", false)), "Sure Gamble");
    }

    #[test]
    fn test_display_title_unique_prefix() {
        assert_eq!(display_title(&card("Kati Jones", true)), "♦ Kati Jones");
    }

    #[test]
    fn test_fit_title_unchanged_when_it_fits() {
        let measurer = MetricTableMeasurer::card_default(1.2);
        let config = config();
        let controller = AutofitController::new(&measurer, &config);
        let result = controller.fit_title("Sure Gamble", 10.0, 200.0).unwrap();
        assert_eq!(result.font_size, 10.0);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.document.plain_text(), "Sure Gamble");
        assert!(result.width <= 200.0);
    }

    #[test]
    fn test_fit_title_narrow_width_forces_decrement() {
        let measurer = MetricTableMeasurer::card_default(1.2);
        let config = config();
        let controller = AutofitController::new(&measurer, &config);
        let result = controller.fit_title("Sure Gamble", 10.0, 50.0).unwrap();
        assert!(result.iterations >= 1);
        assert!(result.font_size < 10.0);
        assert!(result.width <= 50.0);
    }

    #[test]
    fn test_fit_title_never_wraps() {
        let measurer = MetricTableMeasurer::card_default(1.2);
        let config = config();
        let controller = AutofitController::new(&measurer, &config);
        let result = controller
            .fit_title("The Very Long Title Of An Extremely Verbose Card", 12.0, 120.0)
            .unwrap();
        assert_eq!(result.measured.line_count(), 1);
    }

    #[test]
    fn test_fit_title_hard_break_stays_on_one_line() {
        let measurer = MetricTableMeasurer::card_default(1.2);
        let config = config();
        let controller = AutofitController::new(&measurer, &config);
        let result = controller.fit_title("Sure\nGamble", 10.0, 200.0).unwrap();
        assert_eq!(result.measured.line_count(), 1);
        assert_eq!(result.document.plain_text(), "Sure Gamble");
    }

    #[test]
    fn test_fit_title_impossible_width_is_error() {
        let measurer = MetricTableMeasurer::card_default(1.2);
        let config = config();
        let controller = AutofitController::new(&measurer, &config);
        assert!(matches!(
            controller.fit_title("Sure Gamble", 10.0, 1.0),
            Err(LayoutError::NonConvergent { .. })
        ));
    }

    #[test]
    fn test_fit_title_unique_glyph_is_heavy_run() {
        let measurer = MetricTableMeasurer::card_default(1.2);
        let config = config();
        let controller = AutofitController::new(&measurer, &config);
        let title = display_title(&card("Kati Jones", true));
        let result = controller.fit_title(&title, 10.0, 500.0).unwrap();
        assert_eq!(
            result.document.runs[0].style,
            crate::layout::runs::RunStyle::Heavy
        );
    }
}
