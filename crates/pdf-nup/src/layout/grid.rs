//! Grid layout calculation
//!
//! This module maps a pages-per-sheet setting to a grid shape and computes
//! the bounds of individual cells on a sheet.

use super::{GridConfig, PaperDimensions, Rect};

// =============================================================================
// Grid Resolution
// =============================================================================

/// Resolve the grid shape for a pages-per-sheet setting.
///
/// Small counts favor taller-than-wide grids so pages keep reading order
/// top to bottom. Values outside the table fall back to a single tile per
/// sheet rather than failing.
pub fn resolve_grid(pages_per_sheet: u32) -> GridConfig {
    match pages_per_sheet {
        1 => GridConfig::new(1, 1),
        2 => GridConfig::new(1, 2),
        4 => GridConfig::new(2, 2),
        6 => GridConfig::new(2, 3),
        8 => GridConfig::new(2, 4),
        other => {
            log::warn!("Unsupported pages per sheet {other}, using one page per sheet");
            GridConfig::new(1, 1)
        }
    }
}

// =============================================================================
// Cell Calculations
// =============================================================================

/// Map a tile index (row-major reading order) to its cell bounds.
///
/// Tile 0 is the top-left cell. PDF user space has its origin at the bottom
/// edge, so the reading-order row is flipped.
pub fn cell_bounds(grid: GridConfig, paper: PaperDimensions, tile_index: usize) -> Rect {
    let (cell_width, cell_height) = paper.cell_size(grid);

    let col = tile_index % grid.columns;
    let visual_row = grid.rows - 1 - tile_index / grid.columns;

    Rect::new(
        col as f32 * cell_width,
        visual_row as f32 * cell_height,
        cell_width,
        cell_height,
    )
}

/// Bounds of every cell on a sheet, in reading order
pub fn all_cells(grid: GridConfig, paper: PaperDimensions) -> Vec<Rect> {
    (0..grid.tiles_per_sheet())
        .map(|t| cell_bounds(grid, paper, t))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
