//! Shared constants for page composition
//!
//! This module centralizes magic numbers used by the layout and
//! rendering steps.

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// =============================================================================
// Tile Placement
// =============================================================================

/// Fraction of the cell a tile may occupy; the remaining 2% is padding
pub const TILE_FILL_RATIO: f32 = 0.98;

// =============================================================================
// Auto Paper Selection
// =============================================================================

/// Penalty applied when a candidate paper would upscale the source
pub const UPSCALE_PENALTY: f32 = 0.5;

/// Below this scale a candidate is penalized by the scale itself
pub const MIN_LEGIBLE_SCALE: f32 = 0.3;

// =============================================================================
// Borders
// =============================================================================

/// Border stroke color (RGB, neutral gray)
pub const BORDER_GRAY: (f32, f32, f32) = (0.3, 0.3, 0.3);

// =============================================================================
// Output
// =============================================================================

/// PDF version written to composed documents
pub const OUTPUT_PDF_VERSION: &str = "1.7";
