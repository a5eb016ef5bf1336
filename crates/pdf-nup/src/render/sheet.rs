//! Output sheet rendering
//!
//! Builds one output page per planned sheet: each tile becomes a Form
//! XObject drawn through a `cm` transform, followed by the cell borders.

use crate::layout::{PaperDimensions, SheetLayout, TilePlacement};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

use super::xobject::create_page_xobject;

/// Render one output sheet into `output` and return its page object ID.
///
/// # Arguments
/// * `output` - The output document
/// * `source` - The source document containing the pages
/// * `source_page_ids` - Object IDs of all source pages, in order
/// * `layout` - Planned placements for this sheet
/// * `paper` - Output sheet dimensions
/// * `parent_pages_id` - The parent Pages object ID
/// * `border_ops` - Pre-generated border operations (may be empty)
/// * `xobject_cache` - Object copy cache shared across the whole output
#[allow(clippy::too_many_arguments)]
pub fn render_sheet(
    output: &mut Document,
    source: &Document,
    source_page_ids: &[ObjectId],
    layout: &SheetLayout,
    paper: PaperDimensions,
    parent_pages_id: ObjectId,
    border_ops: &str,
    xobject_cache: &mut HashMap<ObjectId, ObjectId>,
) -> crate::types::Result<ObjectId> {
    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(paper.width),
            Object::Real(paper.height),
        ]),
    );

    let mut content_ops = Vec::new();
    let mut xobjects = Dictionary::new();

    for (idx, placement) in layout.placements.iter().enumerate() {
        let Some(&source_page_id) = source_page_ids.get(placement.source_page) else {
            continue;
        };

        let xobject_name = format!("P{}", idx);
        let xobject_id = create_page_xobject(output, source, source_page_id, xobject_cache)?;
        xobjects.set(xobject_name.as_bytes(), Object::Reference(xobject_id));

        content_ops.push(placement_command(&xobject_name, placement));
    }

    content_ops.push(border_ops.to_string());

    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let content = content_ops.join("");
    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(output.add_object(page_dict))
}

/// Generate the PDF content stream command to place a tile.
///
/// The matrix translates to the placement origin, rotates, then scales:
/// `[s·cos, s·sin, -s·sin, s·cos, x, y]`.
pub fn placement_command(xobject_name: &str, placement: &TilePlacement) -> String {
    let (cos, sin) = placement.rotation.cos_sin();
    let s = placement.scale;
    // Adding 0.0 turns -0 into 0 so quarter turns print cleanly
    format!(
        "q {} {} {} {} {} {} cm /{} Do Q\n",
        s * cos,
        s * sin,
        -(s * sin) + 0.0,
        s * cos,
        placement.x,
        placement.y,
        xobject_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Rect;
    use crate::types::Rotation;

    fn placement(rotation: Rotation) -> TilePlacement {
        TilePlacement {
            source_page: 0,
            cell: Rect::new(0.0, 0.0, 100.0, 100.0),
            x: 10.0,
            y: 20.0,
            scale: 0.5,
            rotation,
        }
    }

    #[test]
    fn test_unrotated_command() {
        let cmd = placement_command("P0", &placement(Rotation::None));
        assert_eq!(cmd, "q 0.5 0 0 0.5 10 20 cm /P0 Do Q\n");
    }

    #[test]
    fn test_quarter_turn_command() {
        let cmd = placement_command("P1", &placement(Rotation::Degrees90));
        assert_eq!(cmd, "q 0 0.5 -0.5 0 10 20 cm /P1 Do Q\n");
    }

    #[test]
    fn test_half_turn_command() {
        let cmd = placement_command("P2", &placement(Rotation::Degrees180));
        assert_eq!(cmd, "q -0.5 0 0 -0.5 10 20 cm /P2 Do Q\n");
    }
}
