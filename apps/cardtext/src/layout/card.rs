//! Card-level layout: title, type line and rules text placed into the
//! regions of a frame template.
//!
//! # Coordinates
//! Region and placement coordinates share the frame's system: `x` grows to
//! the right and `y` grows downward from the region's top edge.
//!
//! # Batches
//! Cards are independent. `layout_batch` runs each card on the blocking pool
//! via `tokio::task::spawn_blocking` and returns results in input order; a
//! failing card does not abort the others.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::LayoutConfig;
use crate::errors::LayoutError;
use crate::layout::autofit::{AutofitController, FitBox, FitResult};
use crate::layout::font_metrics::{TextAlign, TextMeasurer};
use crate::layout::runs::PreparedText;
use crate::layout::title::display_title;
use crate::models::card::CardRecord;

// ────────────────────────────────────────────────────────────────────────────
// Frame and output types
// ────────────────────────────────────────────────────────────────────────────

/// One rectangular text region of a frame template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub height: f32,
    #[serde(default)]
    pub alignment: TextAlign,
}

/// Regions and text policy of one frame template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardFrame {
    pub title: TextRegion,
    pub title_font_size: f32,
    pub type_line: TextRegion,
    pub rules: TextRegion,
    /// Starting size for type line and rules text.
    pub text_font_size: f32,
    /// Last-line height of the rules head above which lines overflow.
    pub indent_cutoff: f32,
    /// Left indent of the continuation relative to the rules text.
    pub indent: f32,
}

/// Fitted text and where to draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedText {
    pub x: f32,
    pub y: f32,
    pub fit: FitResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardLayout {
    pub title: PlacedText,
    pub type_line: PlacedText,
    /// Head text first, continuation second when present.
    pub rules: Vec<PlacedText>,
}

// ────────────────────────────────────────────────────────────────────────────
// Type line
// ────────────────────────────────────────────────────────────────────────────

/// Printed name for a card type id; unknown ids pass through.
pub fn type_name(type_id: &str) -> &str {
    match type_id {
        "program" => "Program",
        "resource" => "Resource",
        "hardware" => "Hardware",
        "event" => "Event",
        "runner_identity" | "corp_identity" => "Identity",
        "ice" => "Ice",
        "asset" => "Asset",
        "upgrade" => "Upgrade",
        other => other,
    }
}

/// Type line markup: bold type name, then subtypes when present.
pub fn type_line_markup(card: &CardRecord) -> String {
    let name = type_name(&card.type_id);
    match card.display_subtypes.as_deref() {
        Some(subtypes) if !subtypes.is_empty() => format!("<strong>{name}</strong> - {subtypes}"),
        _ => format!("<strong>{name}</strong>"),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Shared, read-only layout state. Cheap to clone.
#[derive(Clone)]
pub struct CardLayoutEngine {
    measurer: Arc<dyn TextMeasurer>,
    config: LayoutConfig,
}

impl CardLayoutEngine {
    pub fn new(measurer: Arc<dyn TextMeasurer>, config: LayoutConfig) -> Self {
        CardLayoutEngine { measurer, config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn controller(&self) -> AutofitController<'_> {
        AutofitController::new(self.measurer.as_ref(), &self.config)
    }

    /// Lays out one card into `frame`.
    pub fn layout_card(
        &self,
        card: &CardRecord,
        frame: &CardFrame,
    ) -> Result<CardLayout, LayoutError> {
        let controller = self.controller();
        let title = self.place_title(&controller, card, frame)?;
        let type_line = self.place_type_line(&controller, card, frame)?;
        let rules = self.place_rules(&controller, card, frame)?;
        Ok(CardLayout {
            title,
            type_line,
            rules,
        })
    }

    fn place_title(
        &self,
        controller: &AutofitController<'_>,
        card: &CardRecord,
        frame: &CardFrame,
    ) -> Result<PlacedText, LayoutError> {
        let region = &frame.title;
        let fit = controller.fit_title(
            &display_title(card),
            frame.title_font_size,
            region.right - region.left,
        )?;
        Ok(PlacedText {
            x: region.left,
            y: region.top,
            fit,
        })
    }

    fn place_type_line(
        &self,
        controller: &AutofitController<'_>,
        card: &CardRecord,
        frame: &CardFrame,
    ) -> Result<PlacedText, LayoutError> {
        let region = &frame.type_line;
        let padding_lr = self.config.padding_lr();
        let width = region.right - region.left - padding_lr * 2.0;
        let fit = controller.measure_at(
            &PreparedText::new(&type_line_markup(card)),
            frame.text_font_size,
            width,
            region.alignment,
        )?;
        Ok(PlacedText {
            x: region.left + padding_lr,
            y: region.top + self.config.padding_tb(),
            fit,
        })
    }

    fn place_rules(
        &self,
        controller: &AutofitController<'_>,
        card: &CardRecord,
        frame: &CardFrame,
    ) -> Result<Vec<PlacedText>, LayoutError> {
        let region = &frame.rules;
        let padding_lr = self.config.padding_lr();
        let x = region.left + padding_lr;
        let y = region.top + self.config.padding_tb();
        let width = region.right - region.left - padding_lr * self.config.padding_lr_factor;

        let fit_box = FitBox {
            width_limit: width,
            height_limit: region.height,
            indent_cutoff_height: frame.indent_cutoff,
            alignment: region.alignment,
        };
        let outcome = controller.layout(&card.text, frame.text_font_size, &fit_box, frame.indent)?;

        let head_bottom = outcome.primary.last_line_height;
        let font_size = outcome.primary.font_size;
        if font_size < frame.text_font_size {
            info!(
                title = %card.title,
                from = frame.text_font_size,
                to = font_size,
                "Rules text shrunk to fit"
            );
        }

        let mut placed = Vec::with_capacity(2);
        let head_empty = outcome.primary.is_empty();
        if !head_empty {
            placed.push(PlacedText {
                x,
                y,
                fit: outcome.primary,
            });
        }

        if let Some(overflow) = outcome.overflow {
            let offset = if head_empty {
                0.0
            } else {
                head_bottom + font_size * self.config.continuation_gap
            };
            let cont_width =
                width - overflow.insertion_indent - width * self.config.continuation_trim;
            let fit = controller.measure_at(
                &PreparedText::without_diagnostics(&overflow.text),
                font_size,
                cont_width,
                region.alignment,
            )?;

            let needed = offset + fit.last_line_height;
            if needed > region.height {
                warn!(
                    title = %card.title,
                    needed,
                    available = region.height,
                    "Continuation does not fit the rules region"
                );
                return Err(LayoutError::OverflowExhausted {
                    region: "rules".to_string(),
                    needed,
                    available: region.height,
                });
            }

            placed.push(PlacedText {
                x: x + overflow.insertion_indent,
                y: y + offset,
                fit,
            });
        }

        Ok(placed)
    }

    /// Lays out every card on the blocking pool, preserving input order.
    pub async fn layout_batch(
        self: &Arc<Self>,
        frame: Arc<CardFrame>,
        cards: Vec<CardRecord>,
    ) -> Vec<Result<CardLayout, LayoutError>> {
        let handles: Vec<_> = cards
            .into_iter()
            .map(|card| {
                let engine = Arc::clone(self);
                let frame = Arc::clone(&frame);
                tokio::task::spawn_blocking(move || engine.layout_card(&card, &frame))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let result = handle.await.unwrap_or_else(|e| {
                Err(LayoutError::Internal(anyhow::anyhow!(
                    "spawn_blocking failed in card layout: {e}"
                )))
            });
            results.push(result);
        }

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!(failed, total = results.len(), "Card batch finished with failures");
        }
        results
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
