//! Cell borders
//!
//! Every cell of the grid is framed, whether or not it holds a tile, so a
//! partially filled final sheet keeps the same frame pattern as the others.

use crate::constants::BORDER_GRAY;
use crate::layout::{GridConfig, PaperDimensions, all_cells};

/// Generate content stream operations that stroke every cell of a sheet.
///
/// Returns an empty string when `border_width` is zero or negative.
pub fn draw_borders(grid: GridConfig, paper: PaperDimensions, border_width: f32) -> String {
    if border_width <= 0.0 {
        return String::new();
    }

    let (r, g, b) = BORDER_GRAY;
    let mut ops = String::new();

    ops.push_str("q\n");
    ops.push_str(&format!("{} {} {} RG\n", r, g, b));
    ops.push_str(&format!("{} w\n", border_width));

    for cell in all_cells(grid, paper) {
        ops.push_str(&format!(
            "{} {} {} {} re S\n",
            cell.x, cell.y, cell.width, cell.height
        ));
    }

    ops.push_str("Q\n");
    ops
}
