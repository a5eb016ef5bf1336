//! Output paper selection
//!
//! Fixed modes only decide orientation. Auto mode scores every known size
//! in both orientations and keeps the best one. The score is a heuristic
//! trade-off between sheet utilization and tile legibility; it does not
//! guarantee a globally optimal choice.

use crate::constants::{
    DEFAULT_PAGE_DIMENSIONS, MIN_LEGIBLE_SCALE, TILE_FILL_RATIO, UPSCALE_PENALTY,
};
use crate::types::{Orientation, PaperMode, PaperSize};

use super::{GridConfig, PaperDimensions};

const ORIENTATIONS: [Orientation; 2] = [Orientation::Portrait, Orientation::Landscape];

/// Select the output paper for a document.
///
/// `source_width`/`source_height` are the first page's dimensions; other
/// pages do not influence the choice.
pub fn select_paper(
    mode: PaperMode,
    source_width: f32,
    source_height: f32,
    grid: GridConfig,
) -> PaperDimensions {
    let (source_width, source_height) = if source_width > 0.0 && source_height > 0.0 {
        (source_width, source_height)
    } else {
        DEFAULT_PAGE_DIMENSIONS
    };

    match mode.fixed_size() {
        Some(size) => {
            let orientation = closest_orientation(size, source_width, source_height, grid);
            let (width, height) = size.dimensions_with_orientation(orientation);
            PaperDimensions::new(width, height)
        }
        None => auto_select(source_width, source_height, grid),
    }
}

/// Pick the orientation whose cell aspect ratio is closest to the source
/// aspect ratio. An exact tie keeps portrait.
pub fn closest_orientation(
    size: PaperSize,
    source_width: f32,
    source_height: f32,
    grid: GridConfig,
) -> Orientation {
    let source_aspect = source_width / source_height;
    let distance = |orientation: Orientation| {
        let (w, h) = size.dimensions_with_orientation(orientation);
        let (cell_w, cell_h) = PaperDimensions::new(w, h).cell_size(grid);
        (cell_w / cell_h - source_aspect).abs()
    };

    if distance(Orientation::Landscape) < distance(Orientation::Portrait) {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    }
}

/// Utilization score of one candidate paper, higher is better.
pub fn score_candidate(
    paper: PaperDimensions,
    source_width: f32,
    source_height: f32,
    grid: GridConfig,
) -> f32 {
    let (cell_w, cell_h) = paper.cell_size(grid);
    let scale =
        (cell_w * TILE_FILL_RATIO / source_width).min(cell_h * TILE_FILL_RATIO / source_height);

    let used_width = source_width * scale * grid.columns as f32;
    let used_height = source_height * scale * grid.rows as f32;
    let utilization = (used_width * used_height) / (paper.width * paper.height);

    let penalty = if scale > 1.0 {
        UPSCALE_PENALTY
    } else if scale < MIN_LEGIBLE_SCALE {
        scale
    } else {
        1.0
    };

    utilization * penalty
}

fn auto_select(source_width: f32, source_height: f32, grid: GridConfig) -> PaperDimensions {
    let mut best: Option<(PaperDimensions, f32)> = None;

    for size in PaperSize::ALL {
        for orientation in ORIENTATIONS {
            let (w, h) = size.dimensions_with_orientation(orientation);
            let candidate = PaperDimensions::new(w, h);
            let score = score_candidate(candidate, source_width, source_height, grid);
            log::trace!("Paper candidate {size:?} {orientation:?}: score {score:.4}");

            // Strictly greater: ties keep the earlier candidate
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }
    }

    match best {
        Some((paper, score)) => {
            log::debug!(
                "Auto-selected {}x{} paper (score {score:.4})",
                paper.width,
                paper.height
            );
            paper
        }
        None => {
            let (w, h) = PaperSize::Letter.dimensions_pt();
            PaperDimensions::new(w, h)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
