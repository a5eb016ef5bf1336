//! Layout data types for composition
//!
//! These types represent the intermediate layout calculations between
//! settings resolution and PDF rendering.

use crate::types::Rotation;

/// Columns × rows arrangement of cells on a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    pub columns: usize,
    pub rows: usize,
}

impl GridConfig {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }

    /// Number of tiles that fit on one sheet
    pub fn tiles_per_sheet(&self) -> usize {
        self.columns * self.rows
    }
}

/// Output sheet size in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperDimensions {
    pub width: f32,
    pub height: f32,
}

impl PaperDimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width and height of one grid cell
    pub fn cell_size(&self, grid: GridConfig) -> (f32, f32) {
        (
            self.width / grid.columns as f32,
            self.height / grid.rows as f32,
        )
    }
}

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center x coordinate
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Center y coordinate
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Final placement of a source page on an output sheet
#[derive(Debug, Clone, PartialEq)]
pub struct TilePlacement {
    /// Index of the source page in document order
    pub source_page: usize,
    /// Full bounds of the cell that holds the tile
    pub cell: Rect,
    /// Placement origin x (where the page's lower-left corner lands)
    pub x: f32,
    /// Placement origin y
    pub y: f32,
    /// Uniform scale factor applied to the source page
    pub scale: f32,
    /// Rotation about the placement origin
    pub rotation: Rotation,
}

/// All placements for one output sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    /// Sheet position in the output document
    pub sheet_index: usize,
    /// Tiles on this sheet, in reading order
    pub placements: Vec<TilePlacement>,
}
