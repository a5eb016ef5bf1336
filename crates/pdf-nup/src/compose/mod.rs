//! Composition pipeline
//!
//! This module orchestrates one composition:
//! 1. Validate settings and load the source document
//! 2. Resolve the grid and select paper from the first page
//! 3. Plan tile placements for every sheet
//! 4. Render sheets (tiles, then borders) and serialize
//!
//! Each step runs on the calling task and yields between steps, so
//! compositions sharing a current-thread runtime interleave without ever
//! computing in parallel. Any failure aborts the whole composition; partial
//! output is dropped.

mod io;

pub use io::{load_source, serialize};

use crate::constants::OUTPUT_PDF_VERSION;
use crate::layout::{
    GridConfig, PaperDimensions, SheetLayout, plan_sheets, resolve_grid, select_paper,
};
use crate::options::Settings;
use crate::render::{draw_borders, get_page_dimensions, render_sheet};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

/// Geometry of a composition, computed before any PDF object is written
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionPlan {
    /// Source page object IDs in document order
    pub page_ids: Vec<ObjectId>,
    pub grid: GridConfig,
    pub paper: PaperDimensions,
    pub sheets: Vec<SheetLayout>,
}

/// Compose a source PDF under `settings` and return the output bytes.
pub async fn run(source_bytes: Vec<u8>, settings: Settings) -> Result<Vec<u8>> {
    run_limited(source_bytes, settings, None).await
}

/// Compose only the first `max_sheets` sheets, for quick previews.
pub async fn run_preview(
    source_bytes: Vec<u8>,
    settings: Settings,
    max_sheets: usize,
) -> Result<Vec<u8>> {
    run_limited(source_bytes, settings, Some(max_sheets.max(1))).await
}

async fn run_limited(
    source_bytes: Vec<u8>,
    settings: Settings,
    max_sheets: Option<usize>,
) -> Result<Vec<u8>> {
    settings.validate()?;

    let source = load_source(source_bytes).await?;
    let output = compose_document(&source, &settings, max_sheets)?;
    tokio::task::yield_now().await;

    serialize(output).await
}

/// Plan the layout of a parsed source document.
pub fn plan_document(source: &Document, settings: &Settings) -> Result<CompositionPlan> {
    let page_ids = source_page_ids(source)?;

    let page_dimensions: Vec<(f32, f32)> = page_ids
        .iter()
        .map(|&id| get_page_dimensions(source, id))
        .collect();

    let grid = resolve_grid(settings.pages_per_sheet);
    let (first_width, first_height) = page_dimensions[0];
    let paper = select_paper(settings.paper_size, first_width, first_height, grid);
    let sheets = plan_sheets(&page_dimensions, grid, paper, settings.rotation);

    log::debug!(
        "Planned {} sheet(s): {} pages, {}x{} grid, {}x{} paper",
        sheets.len(),
        page_ids.len(),
        grid.columns,
        grid.rows,
        paper.width,
        paper.height
    );

    Ok(CompositionPlan {
        page_ids,
        grid,
        paper,
        sheets,
    })
}

/// Build the composed document synchronously.
///
/// `max_sheets` limits the output to the first sheets of the plan.
pub fn compose_document(
    source: &Document,
    settings: &Settings,
    max_sheets: Option<usize>,
) -> Result<Document> {
    let mut plan = plan_document(source, settings)?;
    if let Some(limit) = max_sheets {
        plan.sheets.truncate(limit);
    }

    let border_ops = draw_borders(plan.grid, plan.paper, settings.border_width);

    let mut output = Document::with_version(OUTPUT_PDF_VERSION);
    let pages_tree_id = output.new_object_id();
    let mut page_refs = Vec::new();
    let mut xobject_cache: HashMap<ObjectId, ObjectId> = HashMap::new();

    for layout in &plan.sheets {
        let page_id = render_sheet(
            &mut output,
            source,
            &plan.page_ids,
            layout,
            plan.paper,
            pages_tree_id,
            &border_ops,
            &mut xobject_cache,
        )?;
        page_refs.push(Object::Reference(page_id));
    }

    // Create pages tree
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    // Create catalog
    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));

    output.trailer.set("Root", catalog_id);

    Ok(output)
}

/// Source page object IDs in document order; errors on an empty document.
fn source_page_ids(source: &Document) -> Result<Vec<ObjectId>> {
    let page_ids: Vec<ObjectId> = source.get_pages().values().copied().collect();
    if page_ids.is_empty() {
        return Err(ComposeError::EmptyDocument);
    }
    Ok(page_ids)
}
