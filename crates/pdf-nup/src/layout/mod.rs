//! Layout calculation modules for composition
//!
//! This module handles all the geometric calculations:
//! - Grid shape for a pages-per-sheet setting
//! - Output paper selection (fixed orientation or auto scoring)
//! - Tile placement (cell, scale, centering, rotation)

mod grid;
mod paper;
mod placement;
mod types;

pub use grid::*;
pub use paper::*;
pub use placement::*;
pub use types::*;
