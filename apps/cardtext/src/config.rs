use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Batch configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Overrides the derived minimum font size when set.
    pub min_font_size: Option<f32>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            canvas_width: parse_env_or("CARDTEXT_CANVAS_WIDTH", 1500.0)?,
            canvas_height: parse_env_or("CARDTEXT_CANVAS_HEIGHT", 2100.0)?,
            min_font_size: match std::env::var("CARDTEXT_MIN_FONT_SIZE") {
                Ok(raw) => Some(
                    raw.parse::<f32>()
                        .context("CARDTEXT_MIN_FONT_SIZE must be a number")?,
                ),
                Err(_) => None,
            },
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Layout policy for the configured canvas.
    pub fn layout_config(&self) -> LayoutConfig {
        let mut layout = LayoutConfig::for_canvas(self.canvas_width, self.canvas_height);
        if let Some(min) = self.min_font_size {
            layout.min_font_size = min;
        }
        layout
    }
}

fn parse_env_or(key: &str, default: f32) -> Result<f32> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<f32>()
            .with_context(|| format!("Environment variable '{key}' must be a number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout policy
// ────────────────────────────────────────────────────────────────────────────

/// Layout policy passed explicitly into every layout call.
///
/// All lengths are in canvas units. Ratios are fractions of the value named
/// in the field doc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Font-size decrement per autofit iteration.
    pub stroke_width: f32,
    /// Smallest font size autofit may settle on. Reaching below it is fatal.
    pub min_font_size: f32,
    /// Fraction of the box height the last line may reach before shrinking.
    pub fill_threshold: f32,
    /// Line height as a multiple of font size.
    pub line_spacing: f32,
    /// Horizontal text padding, fraction of canvas width.
    pub padding_lr_ratio: f32,
    /// Vertical text padding, fraction of canvas width.
    pub padding_tb_ratio: f32,
    /// How many horizontal paddings the rules text box loses to its frame.
    pub padding_lr_factor: f32,
    /// Gap between head text and continuation, multiple of font size.
    pub continuation_gap: f32,
    /// Width removed from the continuation box, fraction of the text width.
    pub continuation_trim: f32,
    pub canvas_width: f32,
}

impl LayoutConfig {
    /// Derives the layout policy from the canvas size.
    ///
    /// The stroke width scales with canvas height so the same card renders
    /// identically at any resolution.
    pub fn for_canvas(width: f32, height: f32) -> Self {
        let stroke_width = height * 0.0023;
        LayoutConfig {
            stroke_width,
            min_font_size: stroke_width,
            fill_threshold: 0.75,
            line_spacing: 1.2,
            padding_lr_ratio: 0.03,
            padding_tb_ratio: 0.02,
            padding_lr_factor: 2.5,
            continuation_gap: 0.4,
            continuation_trim: 0.03,
            canvas_width: width,
        }
    }

    pub fn padding_lr(&self) -> f32 {
        self.canvas_width * self.padding_lr_ratio
    }

    pub fn padding_tb(&self) -> f32 {
        self.canvas_width * self.padding_tb_ratio
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig::for_canvas(1500.0, 2100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_canvas_derives_stroke_width_from_height() {
        let config = LayoutConfig::for_canvas(1000.0, 1000.0);
        assert!((config.stroke_width - 2.3).abs() < 1e-4);
        assert!((config.min_font_size - config.stroke_width).abs() < 1e-6);
        assert!((config.fill_threshold - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_padding_scales_with_canvas_width() {
        let config = LayoutConfig::for_canvas(1000.0, 1400.0);
        assert!((config.padding_lr() - 30.0).abs() < 1e-3);
        assert!((config.padding_tb() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_config_min_font_override_applies() {
        let config = Config {
            canvas_width: 1500.0,
            canvas_height: 2100.0,
            min_font_size: Some(9.0),
            rust_log: "info".to_string(),
        };
        assert_eq!(config.layout_config().min_font_size, 9.0);
    }
}
