// Card text layout: markup tokens, styled runs, measurement, autofit,
// overflow splitting and title fitting.
// Layout is CPU-bound; batch callers run it inside tokio::task::spawn_blocking.

pub mod autofit;
pub mod card;
pub mod font_metrics;
pub mod icons;
pub mod markup;
pub mod overflow;
pub mod runs;
pub mod title;

// Re-export the public API consumed by the binary and library users.
pub use autofit::{AutofitController, FitBox, FitResult};
pub use card::{CardFrame, CardLayout, CardLayoutEngine, PlacedText, TextRegion};
pub use font_metrics::{MeasuredText, MetricTableMeasurer, TextAlign, TextMeasurer};
pub use icons::{GlyphBounds, IconAssetTable, IconAssets};
pub use overflow::{LayoutOutcome, Overflow};
pub use runs::{PreparedText, RichTextDocument, RunStyle, StyledRun};
