//! Inline icon table and the icon asset service contract.
//!
//! Icon geometry is expressed relative to the current font size, so an icon
//! must be resolved again whenever autofit changes the size.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::AssetError;

/// One entry of the static icon table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IconSpec {
    /// Token name as written between brackets, e.g. `credit`.
    pub name: &'static str,
    /// Vector asset identifier handed to the asset service.
    pub asset_id: &'static str,
    /// Asset scale per unit of font size.
    pub scale_factor: f32,
    /// Downward baseline shift per unit of font size.
    pub baseline_offset_factor: f32,
}

/// Process-wide icon table. Read-only.
pub static ICON_TABLE: [IconSpec; 6] = [
    IconSpec {
        name: "mu",
        asset_id: "Mu",
        scale_factor: 0.0002,
        baseline_offset_factor: 0.8,
    },
    IconSpec {
        name: "credit",
        asset_id: "CREDIT",
        scale_factor: 0.000025,
        baseline_offset_factor: 0.8,
    },
    IconSpec {
        name: "recurring-credit",
        asset_id: "RECURRING_CREDIT",
        scale_factor: 0.00014,
        baseline_offset_factor: 0.8,
    },
    IconSpec {
        name: "click",
        asset_id: "CLICK",
        scale_factor: 0.0002,
        baseline_offset_factor: 1.0,
    },
    IconSpec {
        name: "subroutine",
        asset_id: "SUBROUTINE",
        scale_factor: 0.0002,
        baseline_offset_factor: 1.0,
    },
    IconSpec {
        name: "trash",
        asset_id: "TRASH_ABILITY",
        scale_factor: 0.0002,
        baseline_offset_factor: 1.0,
    },
];

/// Looks up an icon by token name.
pub fn lookup(name: &str) -> Option<&'static IconSpec> {
    ICON_TABLE.iter().find(|spec| spec.name == name)
}

/// An icon sized for one font size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedIcon {
    pub spec: &'static IconSpec,
    /// Uniform scale to apply to the asset's intrinsic box.
    pub scale: f32,
    /// Downward shift from the text baseline.
    pub baseline_offset: f32,
}

/// Resolves `name` at `font_size`. `None` means the table has no such icon,
/// which is a configuration error for the caller to report.
pub fn resolve(name: &str, font_size: f32) -> Option<ResolvedIcon> {
    lookup(name).map(|spec| ResolvedIcon {
        spec,
        scale: font_size * spec.scale_factor,
        baseline_offset: font_size * spec.baseline_offset_factor,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Asset service
// ────────────────────────────────────────────────────────────────────────────

/// Intrinsic bounding box of a vector glyph, in asset units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlyphBounds {
    pub width: f32,
    pub height: f32,
}

impl GlyphBounds {
    /// Rendered box of this glyph for a resolved icon.
    pub fn scaled(&self, icon: &ResolvedIcon) -> GlyphBounds {
        GlyphBounds {
            width: self.width * icon.scale,
            height: self.height * icon.scale,
        }
    }
}

/// Source of icon vector glyphs. Loading is the implementor's concern; the
/// layout engine only needs the intrinsic bounds.
pub trait IconAssets: Send + Sync {
    fn glyph_bounds(&self, asset_id: &str) -> Result<GlyphBounds, AssetError>;
}

/// Asset bounds held in memory, keyed by asset id.
#[derive(Debug, Clone, Default)]
pub struct IconAssetTable {
    bounds: HashMap<String, GlyphBounds>,
}

impl IconAssetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset_id: impl Into<String>, bounds: GlyphBounds) {
        self.bounds.insert(asset_id.into(), bounds);
    }

    /// Square boxes sized so every icon renders exactly one em tall.
    pub fn nominal() -> Self {
        let mut table = Self::new();
        for spec in &ICON_TABLE {
            let side = 1.0 / spec.scale_factor;
            table.insert(
                spec.asset_id,
                GlyphBounds {
                    width: side,
                    height: side,
                },
            );
        }
        table
    }
}

impl IconAssets for IconAssetTable {
    fn glyph_bounds(&self, asset_id: &str) -> Result<GlyphBounds, AssetError> {
        let bounds = self
            .bounds
            .get(asset_id)
            .copied()
            .ok_or_else(|| AssetError::Missing(asset_id.to_string()))?;
        if !(bounds.width > 0.0 && bounds.height > 0.0) {
            return Err(AssetError::DegenerateBounds {
                asset_id: asset_id.to_string(),
                width: bounds.width,
                height: bounds.height,
            });
        }
        Ok(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_all_table_names() {
        for name in ["mu", "credit", "recurring-credit", "click", "subroutine", "trash"] {
            assert!(lookup(name).is_some(), "{name} should be in the icon table");
        }
    }

    #[test]
    fn test_lookup_unknown_returns_none() {
        assert!(lookup("wibble").is_none());
        assert!(resolve("wibble", 10.0).is_none());
    }

    #[test]
    fn test_resolve_scales_with_font_size() {
        let small = resolve("click", 10.0).unwrap();
        let large = resolve("click", 20.0).unwrap();
        assert!((large.scale - 2.0 * small.scale).abs() < 1e-7);
        assert!((small.baseline_offset - 10.0).abs() < 1e-6);
        assert!((large.baseline_offset - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_table_names_are_bracket_safe() {
        // Resolved icons render as vector paths; names must never contain
        // bracket syntax that could be re-matched as another token.
        for spec in &ICON_TABLE {
            assert!(
                spec.name.chars().all(|c| c.is_ascii_lowercase() || c == '-'),
                "{} must match the token grammar",
                spec.name
            );
            assert!(!spec.asset_id.contains('[') && !spec.asset_id.contains(']'));
        }
    }

    #[test]
    fn test_nominal_assets_render_one_em() {
        let assets = IconAssetTable::nominal();
        for spec in &ICON_TABLE {
            let icon = resolve(spec.name, 12.0).unwrap();
            let bounds = assets.glyph_bounds(spec.asset_id).unwrap().scaled(&icon);
            assert!((bounds.width - 12.0).abs() < 1e-2, "{} width {}", spec.name, bounds.width);
        }
    }

    #[test]
    fn test_missing_asset_is_error() {
        let assets = IconAssetTable::new();
        assert_eq!(
            assets.glyph_bounds("CLICK"),
            Err(AssetError::Missing("CLICK".to_string()))
        );
    }

    #[test]
    fn test_degenerate_asset_is_error() {
        let mut assets = IconAssetTable::new();
        assets.insert(
            "CLICK",
            GlyphBounds {
                width: 0.0,
                height: 10.0,
            },
        );
        assert!(matches!(
            assets.glyph_bounds("CLICK"),
            Err(AssetError::DegenerateBounds { .. })
        ));
    }
}
