use std::io::{Read, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardtext::layout::MetricTableMeasurer;
use cardtext::{CardFrame, CardLayoutEngine, CardRecord, Config};

/// Batch request read from stdin.
#[derive(Debug, Deserialize)]
struct BatchRequest {
    frame: CardFrame,
    cards: Vec<CardRecord>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging (stderr, so stdout stays pure JSON)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting cardtext v{}", env!("CARGO_PKG_VERSION"));

    let layout_config = config.layout_config();
    info!(
        canvas_width = config.canvas_width,
        canvas_height = config.canvas_height,
        stroke_width = layout_config.stroke_width,
        min_font_size = layout_config.min_font_size,
        "Layout config loaded"
    );

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read batch request from stdin")?;
    let request: BatchRequest =
        serde_json::from_str(&input).context("Batch request is not valid JSON")?;
    info!(cards = request.cards.len(), "Batch request parsed");

    let measurer = Arc::new(MetricTableMeasurer::card_default(layout_config.line_spacing));
    let engine = Arc::new(CardLayoutEngine::new(measurer, layout_config));

    let titles: Vec<String> = request.cards.iter().map(|c| c.title.clone()).collect();
    let results = engine
        .layout_batch(Arc::new(request.frame), request.cards)
        .await;

    let mut failed = 0usize;
    let report: Vec<Value> = titles
        .into_iter()
        .zip(results)
        .map(|(title, result)| match result {
            Ok(layout) => json!({ "title": title, "layout": layout }),
            Err(e) => {
                failed += 1;
                warn!(title = %title, code = e.code(), "Card layout failed: {e}");
                json!({
                    "title": title,
                    "error": { "code": e.code(), "message": e.to_string() }
                })
            }
        })
        .collect();

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report)?;
    writeln!(stdout)?;

    info!(total = report.len(), failed, "Batch complete");
    Ok(())
}
