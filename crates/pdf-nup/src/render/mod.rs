//! PDF rendering modules for composition
//!
//! This module handles all PDF-specific operations:
//! - Creating XObjects from source pages
//! - Building output sheets with tile transforms
//! - Stroking cell borders
//! - Deep copying PDF objects

mod borders;
mod sheet;
mod xobject;

pub use borders::draw_borders;
pub use sheet::{placement_command, render_sheet};
pub use xobject::{copy_object_deep, create_page_xobject, get_page_dimensions};
