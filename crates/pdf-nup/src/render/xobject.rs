//! XObject creation for composition
//!
//! This module handles creating Form XObjects from source PDF pages,
//! which are then placed onto output sheets with transformations. Page
//! content is carried over as-is, so vector, text and image content stay
//! lossless.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Maximum depth followed when looking up inherited page attributes
const MAX_INHERITANCE_DEPTH: usize = 32;

// =============================================================================
// XObject Creation
// =============================================================================

/// Create an XObject from a source page.
///
/// # Arguments
/// * `output` - The output document to add the XObject to
/// * `source` - The source document containing the page
/// * `page_id` - The object ID of the source page
/// * `cache` - Maps source object IDs to copies already made in `output`,
///   so resources shared between pages are copied once
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;

    let media_box = inherited_attribute(source, page_id, b"MediaBox")
        .and_then(|obj| obj.as_array().ok())
        .cloned()
        .unwrap_or_else(default_media_box);

    let content = get_page_content(source, page_dict)?;

    // Shift the page so its lower-left corner sits at the form origin
    let (x0, y0) = media_box_origin(&media_box);

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("BBox", Object::Array(media_box));
    xobject_dict.set(
        "Matrix",
        Object::Array(vec![
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(1),
            Object::Real(-x0 + 0.0),
            Object::Real(-y0 + 0.0),
        ]),
    );
    xobject_dict.set("FormType", Object::Integer(1));

    // Encoded content keeps the filter entries needed to decode it
    let encoded = content.filter.is_some();
    if let Some(filter) = content.filter {
        xobject_dict.set("Filter", copy_object_deep(output, source, &filter, cache)?);
    }
    if let Some(parms) = content.decode_parms {
        xobject_dict.set(
            "DecodeParms",
            copy_object_deep(output, source, &parms, cache)?,
        );
    }

    // Resources may live on an ancestor Pages node
    if let Some(resources) = inherited_attribute(source, page_id, b"Resources") {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, resources, cache)?,
        );
    }

    let mut stream = Stream::new(xobject_dict, content.data);
    if encoded {
        stream.allows_compression = false;
    }
    Ok(output.add_object(stream))
}

/// Get default MediaBox for US Letter size
fn default_media_box() -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(DEFAULT_PAGE_DIMENSIONS.0 as i64),
        Object::Integer(DEFAULT_PAGE_DIMENSIONS.1 as i64),
    ]
}

/// Lower-left corner of a MediaBox; boxes may list their corners in any order
fn media_box_origin(media_box: &[Object]) -> (f32, f32) {
    let coords: Vec<f32> = media_box.iter().filter_map(extract_number).collect();
    if coords.len() != 4 {
        return (0.0, 0.0);
    }
    (coords[0].min(coords[2]), coords[1].min(coords[3]))
}

/// Look up a page attribute, walking up the page tree for inheritable keys.
fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = current.get(key) {
            return match value {
                Object::Reference(id) => doc.get_object(*id).ok(),
                other => Some(other),
            };
        }
        let parent_id = current.get(b"Parent").and_then(|p| p.as_reference()).ok()?;
        current = doc.get_dictionary(parent_id).ok()?;
    }

    None
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Page content ready to become a Form XObject body
struct PageContent {
    data: Vec<u8>,
    filter: Option<Object>,
    decode_parms: Option<Object>,
}

impl PageContent {
    fn plain(data: Vec<u8>) -> Self {
        Self {
            data,
            filter: None,
            decode_parms: None,
        }
    }
}

/// Get the content stream data from a page.
///
/// A single stream is carried over still encoded, together with its
/// `Filter` and `DecodeParms`. Several streams have to be decoded before
/// they can be joined.
fn get_page_content(doc: &Document, page_dict: &Dictionary) -> Result<PageContent> {
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(PageContent::plain(Vec::new())), // No content = blank page
    };

    let refs = match contents {
        Object::Reference(id) => match doc.get_object(*id)? {
            // Contents may be a reference to an array of stream references
            Object::Array(arr) => arr.as_slice(),
            _ => return get_single_content_stream(doc, *id),
        },
        Object::Array(arr) => arr.as_slice(),
        _ => return Ok(PageContent::plain(Vec::new())),
    };

    match refs {
        [Object::Reference(id)] => get_single_content_stream(doc, *id),
        _ => get_concatenated_content_streams(doc, refs).map(PageContent::plain),
    }
}

/// Get content from a single content stream reference, leaving it encoded
fn get_single_content_stream(doc: &Document, id: ObjectId) -> Result<PageContent> {
    let Ok(stream) = doc.get_object(id)?.as_stream() else {
        return Ok(PageContent::plain(Vec::new()));
    };

    Ok(PageContent {
        data: stream.content.clone(),
        filter: stream.dict.get(b"Filter").ok().cloned(),
        decode_parms: stream.dict.get(b"DecodeParms").ok().cloned(),
    })
}

/// Concatenate multiple content streams, decoding each one
fn get_concatenated_content_streams(doc: &Document, refs: &[Object]) -> Result<Vec<u8>> {
    let mut result = Vec::new();

    for obj in refs {
        if let Object::Reference(id) = obj {
            if let Ok(stream) = doc.get_object(*id)?.as_stream() {
                // A filter lopdf cannot decode fails the page rather than
                // embedding bytes nothing can read
                if stream.dict.get(b"Filter").is_ok() {
                    result.extend_from_slice(&stream.decompressed_content()?);
                } else {
                    result.extend_from_slice(&stream.content);
                }
                result.push(b'\n');
            }
        }
    }

    Ok(result)
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// Uses a cache to avoid copying the same object multiple times. Page tree
/// back-references (`Parent`) are skipped so copying annotations or other
/// page-linked objects does not drag the whole source tree along.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            // Reserve the ID first so reference cycles resolve to it
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            // A reference to a missing object is equivalent to null
            let copied = match source.get_object(*id) {
                Ok(referenced) => copy_object_deep(output, source, referenced, cache)?,
                Err(_) => {
                    log::warn!("Dangling reference {:?} copied as null", id);
                    Object::Null
                }
            };
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => {
            let new_dict = copy_dictionary(output, source, &stream.dict, cache)?;
            let mut copied = Stream::new(new_dict, stream.content.clone());
            copied.allows_compression = stream.allows_compression;
            Ok(Object::Stream(copied))
        }
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        if key.as_slice() == b"Parent" {
            continue;
        }
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

// =============================================================================
// Page Dimensions
// =============================================================================

/// Get source page dimensions (width, height) in points.
///
/// The MediaBox may be inherited from an ancestor; a missing or degenerate
/// box falls back to US Letter.
pub fn get_page_dimensions(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox");
    let Some(mb) = media_box.and_then(|obj| obj.as_array().ok()) else {
        return DEFAULT_PAGE_DIMENSIONS;
    };

    let coords: Vec<f32> = mb.iter().filter_map(extract_number).collect();
    if coords.len() != 4 {
        return DEFAULT_PAGE_DIMENSIONS;
    }

    let width = (coords[2] - coords[0]).abs();
    let height = (coords[3] - coords[1]).abs();
    if width > 0.0 && height > 0.0 {
        (width, height)
    } else {
        DEFAULT_PAGE_DIMENSIONS
    }
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
