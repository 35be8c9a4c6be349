use thiserror::Error;

/// Failure reported by the icon asset service.
///
/// Always a configuration problem (missing or unreadable asset), never a
/// per-card content problem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssetError {
    #[error("Icon asset not found: {0}")]
    Missing(String),

    #[error("Icon asset {asset_id} has an unusable bounding box ({width}x{height})")]
    DegenerateBounds {
        asset_id: String,
        width: f32,
        height: f32,
    },
}

/// Layout-level error type.
///
/// Markup problems never reach this type: unknown tags and icon names are
/// recovered locally with a literal-text fallback. Everything here is a hard
/// failure for the card being laid out; the caller decides whether to skip
/// the card or abort the batch.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Autofit did not converge: started at {initial}, next step would reach {reached}")]
    NonConvergent { initial: f32, reached: f32 },

    #[error("Invalid font size or step: {0}")]
    InvalidFontSize(f32),

    #[error("Overflow does not fit the {region} region: needs {needed:.2}, has {available:.2}")]
    OverflowExhausted {
        region: String,
        needed: f32,
        available: f32,
    },

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Internal layout error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LayoutError {
    /// Short machine-readable code, used by the batch report.
    pub fn code(&self) -> &'static str {
        match self {
            LayoutError::NonConvergent { .. } => "NON_CONVERGENT",
            LayoutError::InvalidFontSize(_) => "INVALID_FONT_SIZE",
            LayoutError::OverflowExhausted { .. } => "OVERFLOW_EXHAUSTED",
            LayoutError::Asset(_) => "ASSET_ERROR",
            LayoutError::Internal(e) => {
                tracing::error!("Internal layout error: {e:?}");
                "INTERNAL_ERROR"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_error_converts_into_layout_error() {
        let err: LayoutError = AssetError::Missing("CLICK".to_string()).into();
        assert!(matches!(err, LayoutError::Asset(AssetError::Missing(ref id)) if id == "CLICK"));
        assert_eq!(err.code(), "ASSET_ERROR");
    }

    #[test]
    fn test_non_convergent_message_names_sizes() {
        let err = LayoutError::NonConvergent {
            initial: 12.0,
            reached: -0.5,
        };
        let msg = err.to_string();
        assert!(msg.contains("12"), "message should contain initial size: {msg}");
        assert!(msg.contains("-0.5"), "message should contain reached size: {msg}");
        assert_eq!(err.code(), "NON_CONVERGENT");
    }
}
