//! N-up page composition for PDF documents.
//!
//! Source pages are tiled onto new output sheets according to a grid,
//! optionally rotated and framed, on a fixed or automatically selected
//! paper size.

pub mod compose;
pub mod constants;
pub mod layout;
mod options;
pub mod render;
mod stats;
mod types;

pub use compose::{
    CompositionPlan, compose_document, load_source, plan_document, run, run_preview, serialize,
};
pub use layout::{
    GridConfig, PaperDimensions, Rect, SheetLayout, TilePlacement, plan_sheets, resolve_grid,
    select_paper,
};
pub use options::*;
pub use stats::calculate_statistics;
pub use types::*;
