use crate::layout::resolve_grid;
use crate::options::Settings;
use crate::types::*;
use lopdf::Document;

/// Calculate statistics for composing `document` under `settings`
pub fn calculate_statistics(
    document: &Document,
    settings: &Settings,
) -> Result<CompositionStatistics> {
    let source_pages = document.get_pages().len();

    if source_pages == 0 {
        return Err(ComposeError::EmptyDocument);
    }

    let tiles_per_sheet = resolve_grid(settings.pages_per_sheet).tiles_per_sheet();
    let output_sheets = source_pages.div_ceil(tiles_per_sheet);
    let blank_cells = output_sheets * tiles_per_sheet - source_pages;

    Ok(CompositionStatistics {
        source_pages,
        tiles_per_sheet,
        output_sheets,
        blank_cells,
    })
}
