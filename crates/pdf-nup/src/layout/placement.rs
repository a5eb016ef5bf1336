//! Tile placement within cells
//!
//! This module computes, for every source page, the sheet it lands on,
//! the cell it occupies and the transform that fits it into that cell.

use crate::constants::{DEFAULT_PAGE_DIMENSIONS, TILE_FILL_RATIO};
use crate::types::Rotation;

use super::{GridConfig, PaperDimensions, Rect, SheetLayout, TilePlacement, cell_bounds};

/// Plan every output sheet for a document.
///
/// Pages are consumed in order, one grid's worth per sheet. The final sheet
/// may be partially filled; its remaining cells stay empty.
///
/// # Arguments
/// * `page_dimensions` - (width, height) of every source page in points
/// * `grid` - The grid shape
/// * `paper` - Output sheet dimensions
/// * `rotation` - Rotation applied to every tile
pub fn plan_sheets(
    page_dimensions: &[(f32, f32)],
    grid: GridConfig,
    paper: PaperDimensions,
    rotation: Rotation,
) -> Vec<SheetLayout> {
    let tiles_per_sheet = grid.tiles_per_sheet().max(1);

    page_dimensions
        .chunks(tiles_per_sheet)
        .enumerate()
        .map(|(sheet_index, group)| {
            let placements = group
                .iter()
                .enumerate()
                .map(|(tile, &(src_width, src_height))| {
                    let cell = cell_bounds(grid, paper, tile);
                    place_tile(
                        sheet_index * tiles_per_sheet + tile,
                        cell,
                        src_width,
                        src_height,
                        rotation,
                    )
                })
                .collect();

            SheetLayout {
                sheet_index,
                placements,
            }
        })
        .collect()
}

/// Fit one source page into its cell.
///
/// The page is scaled uniformly to fit the cell with 2% padding and
/// centered. The rotation turns the tile about its placement origin.
pub fn place_tile(
    source_page: usize,
    cell: Rect,
    source_width: f32,
    source_height: f32,
    rotation: Rotation,
) -> TilePlacement {
    let (source_width, source_height) = if source_width > 0.0 && source_height > 0.0 {
        (source_width, source_height)
    } else {
        DEFAULT_PAGE_DIMENSIONS
    };

    let scale = tile_scale(&cell, source_width, source_height);

    TilePlacement {
        source_page,
        cell,
        x: cell.center_x() - source_width * scale / 2.0,
        y: cell.center_y() - source_height * scale / 2.0,
        scale,
        rotation,
    }
}

/// Uniform scale that fits a source page into a cell with padding
pub fn tile_scale(cell: &Rect, source_width: f32, source_height: f32) -> f32 {
    (cell.width / source_width).min(cell.height / source_height) * TILE_FILL_RATIO
}

// =============================================================================
// Tests
// =============================================================================
