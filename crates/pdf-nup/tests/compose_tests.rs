use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_nup::*;

fn create_test_pdf(num_pages: usize, width: i64, height: i64) -> Document {
    let mut doc = Document::with_version("1.7");

    // Create page tree root ID
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for i in 0..num_pages {
        let content = format!("BT /F1 12 Tf 20 20 Td (Page {}) Tj ET", i + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(width),
                    Object::Integer(height),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

fn to_bytes(mut doc: Document) -> Vec<u8> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

fn number(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        other => panic!("Expected a number, got {:?}", other),
    }
}

fn media_box(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let mb = doc
        .get_dictionary(page_id)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap();
    (number(&mb[2]), number(&mb[3]))
}

fn page_contents(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .values()
        .map(|&id| String::from_utf8(doc.get_page_content(id).unwrap()).unwrap())
        .collect()
}

fn settings(pages_per_sheet: u32, paper_size: PaperMode) -> Settings {
    Settings {
        pages_per_sheet,
        paper_size,
        ..Default::default()
    }
}

#[test]
fn test_four_up_letter_scenario() {
    let source = create_test_pdf(4, 300, 400);
    let settings = settings(4, PaperMode::Letter);

    let plan = plan_document(&source, &settings).unwrap();
    assert_eq!(plan.grid, GridConfig::new(2, 2));
    assert_eq!(plan.paper, PaperDimensions::new(612.0, 792.0));
    assert_eq!(plan.sheets.len(), 1);

    let expected_scale = (306.0_f32 / 300.0).min(396.0 / 400.0) * 0.98;
    assert!((expected_scale - 0.9702).abs() < 1e-4);

    let placements = &plan.sheets[0].placements;
    assert_eq!(placements.len(), 4);
    for p in placements {
        assert!((p.scale - expected_scale).abs() < 1e-5);
        let center_x = p.x + 300.0 * p.scale / 2.0;
        let center_y = p.y + 400.0 * p.scale / 2.0;
        assert!((center_x - p.cell.center_x()).abs() < 1e-3);
        assert!((center_y - p.cell.center_y()).abs() < 1e-3);
    }

    // First tile lands in the top-left quadrant
    assert!((placements[0].x - (153.0 - 150.0 * expected_scale)).abs() < 1e-3);
    assert!((placements[0].y - (594.0 - 200.0 * expected_scale)).abs() < 1e-3);

    let output = compose_document(&source, &settings, None).unwrap();
    let pages = output.get_pages();
    assert_eq!(pages.len(), 1);
    let page_id = *pages.values().next().unwrap();
    assert_eq!(media_box(&output, page_id), (612.0, 792.0));
}

#[test]
fn test_sheet_count_for_all_settings() {
    for pps in Settings::SUPPORTED_PAGES_PER_SHEET {
        for pages in 1..=9usize {
            let source = create_test_pdf(pages, 612, 792);
            let output = compose_document(&source, &settings(pps, PaperMode::Auto), None).unwrap();
            assert_eq!(
                output.get_pages().len(),
                pages.div_ceil(pps as usize),
                "pps = {pps}, pages = {pages}"
            );
        }
    }
}

#[test]
fn test_unknown_pages_per_sheet_is_one_up() {
    let source = create_test_pdf(3, 612, 792);
    let output = compose_document(&source, &settings(5, PaperMode::Auto), None).unwrap();
    assert_eq!(output.get_pages().len(), 3);
}

#[test]
fn test_planning_is_idempotent() {
    let source = create_test_pdf(7, 420, 595);
    let settings = Settings {
        pages_per_sheet: 6,
        rotation: Rotation::Degrees90,
        border_width: 1.0,
        paper_size: PaperMode::Auto,
    };

    let first = plan_document(&source, &settings).unwrap();
    let second = plan_document(&source, &settings).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_no_borders_when_width_is_zero() {
    for pps in Settings::SUPPORTED_PAGES_PER_SHEET {
        let source = create_test_pdf(5, 612, 792);
        let output = compose_document(&source, &settings(pps, PaperMode::Letter), None).unwrap();
        for content in page_contents(&output) {
            assert!(!content.contains(" re"), "pps = {pps}");
        }
    }
}

#[test]
fn test_borders_frame_every_cell() {
    // 3 pages on a 2x2 grid: the final cell is empty but still framed
    let source = create_test_pdf(3, 612, 792);
    let settings = Settings {
        border_width: 2.0,
        ..settings(4, PaperMode::Letter)
    };
    let output = compose_document(&source, &settings, None).unwrap();

    let contents = page_contents(&output);
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0].matches(" re S").count(), 4);
    assert_eq!(contents[0].matches(" Do Q").count(), 3);
    assert!(contents[0].contains("2 w"));
}

#[test]
fn test_rotation_applies_to_every_tile() {
    let source = create_test_pdf(2, 612, 792);
    let settings = Settings {
        rotation: Rotation::Degrees180,
        ..settings(2, PaperMode::Letter)
    };
    let output = compose_document(&source, &settings, None).unwrap();

    let content = &page_contents(&output)[0];
    let rotated = content
        .lines()
        .filter(|line| line.ends_with("Do Q"))
        .filter(|line| line.starts_with("q -"))
        .count();
    assert_eq!(rotated, 2);
}

#[test]
fn test_tiles_embedded_as_form_xobjects() {
    let source = create_test_pdf(2, 612, 792);
    let output = compose_document(&source, &settings(2, PaperMode::Letter), None).unwrap();

    let forms = output
        .objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .filter(|stream| {
            stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .map(|name| name == b"Form")
                .unwrap_or(false)
        })
        .collect::<Vec<_>>();
    assert_eq!(forms.len(), 2);
    assert!(
        forms
            .iter()
            .any(|f| String::from_utf8_lossy(&f.content).contains("(Page 2) Tj"))
    );
}

#[test]
fn test_inherited_media_box() {
    let mut source = create_test_pdf(2, 612, 792);

    // Move the MediaBox from the pages onto the page tree root
    let page_ids: Vec<ObjectId> = source.get_pages().values().copied().collect();
    for id in &page_ids {
        source
            .get_dictionary_mut(*id)
            .unwrap()
            .remove(b"MediaBox");
    }
    let root_id = source
        .get_dictionary(page_ids[0])
        .unwrap()
        .get(b"Parent")
        .unwrap()
        .as_reference()
        .unwrap();
    source.get_dictionary_mut(root_id).unwrap().set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(300),
            Object::Integer(400),
        ]),
    );

    let plan = plan_document(&source, &settings(1, PaperMode::Letter)).unwrap();
    let p = &plan.sheets[0].placements[0];
    let expected = (612.0_f32 / 300.0).min(792.0 / 400.0) * 0.98;
    assert!((p.scale - expected).abs() < 1e-5);
}

#[tokio::test]
async fn test_run_produces_parseable_pdf() {
    let bytes = to_bytes(create_test_pdf(6, 612, 792));
    let output = run(bytes, settings(4, PaperMode::Auto)).await.unwrap();

    let doc = Document::load_mem(&output).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
}

#[tokio::test]
async fn test_run_twice_same_page_count() {
    let bytes = to_bytes(create_test_pdf(5, 500, 700));
    let settings = settings(2, PaperMode::A4);

    let first = run(bytes.clone(), settings).await.unwrap();
    let second = run(bytes, settings).await.unwrap();

    let first = Document::load_mem(&first).unwrap();
    let second = Document::load_mem(&second).unwrap();
    assert_eq!(first.get_pages().len(), second.get_pages().len());
    assert_eq!(page_contents(&first), page_contents(&second));
}

#[tokio::test]
async fn test_run_preview_limits_sheets() {
    let bytes = to_bytes(create_test_pdf(10, 612, 792));
    let output = run_preview(bytes, Settings::default(), 3).await.unwrap();

    let doc = Document::load_mem(&output).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
}

#[tokio::test]
async fn test_run_empty_document() {
    let bytes = to_bytes(create_test_pdf(0, 612, 792));
    let result = run(bytes, Settings::default()).await;
    match result {
        Err(ComposeError::EmptyDocument) => {}
        other => panic!("Expected EmptyDocument error, got {:?}", other.map(|b| b.len())),
    }
}

#[tokio::test]
async fn test_run_garbage_bytes() {
    let result = run(b"definitely not a pdf".to_vec(), Settings::default()).await;
    match result {
        Err(ComposeError::SourceLoad(_)) => {}
        other => panic!("Expected SourceLoad error, got {:?}", other.map(|b| b.len())),
    }
}

#[tokio::test]
async fn test_run_rejects_negative_border() {
    let bytes = to_bytes(create_test_pdf(1, 612, 792));
    let settings = Settings {
        border_width: -2.0,
        ..Default::default()
    };
    let result = run(bytes, settings).await;
    assert!(matches!(result, Err(ComposeError::Config(_))));
}

/// One-page document with an explicit MediaBox, content streams and resources
fn create_custom_pdf(
    media_box: [i64; 4],
    contents: Vec<Stream>,
    resources: Dictionary,
) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let content_refs: Vec<Object> = contents
        .into_iter()
        .map(|stream| Object::Reference(doc.add_object(stream)))
        .collect();

    let page_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(media_box.iter().map(|&v| Object::Integer(v)).collect()),
        ),
        ("Resources", Object::Dictionary(resources)),
        ("Contents", Object::Array(content_refs)),
    ]));

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ("Count", Object::Integer(1)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}

fn form_xobjects(doc: &Document) -> Vec<&Stream> {
    doc.objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .filter(|stream| {
            stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .map(|name| name == b"Form")
                .unwrap_or(false)
        })
        .collect()
}

#[test]
fn test_offset_media_box_tile_stays_in_cell() {
    let fill = Stream::new(Dictionary::new(), b"0 0 1 rg 100 100 300 400 re f".to_vec());
    let source = create_custom_pdf([100, 100, 400, 500], vec![fill], Dictionary::new());
    let settings = settings(1, PaperMode::Letter);

    let plan = plan_document(&source, &settings).unwrap();
    let p = &plan.sheets[0].placements[0];

    let output = compose_document(&source, &settings, None).unwrap();
    let forms = form_xobjects(&output);
    assert_eq!(forms.len(), 1);
    let matrix: Vec<f32> = forms[0]
        .dict
        .get(b"Matrix")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(number)
        .collect();
    assert_eq!(matrix, vec![1.0, 0.0, 0.0, 1.0, -100.0, -100.0]);

    // MediaBox corners mapped through the form matrix and the tile placement
    let left = p.x + p.scale * (100.0 + matrix[4]);
    let right = p.x + p.scale * (400.0 + matrix[4]);
    let bottom = p.y + p.scale * (100.0 + matrix[5]);
    let top = p.y + p.scale * (500.0 + matrix[5]);

    assert!(left >= p.cell.x && right <= p.cell.x + p.cell.width);
    assert!(bottom >= p.cell.y && top <= p.cell.y + p.cell.height);
    assert!(((left + right) / 2.0 - p.cell.center_x()).abs() < 1e-3);
    assert!(((bottom + top) / 2.0 - p.cell.center_y()).abs() < 1e-3);
}

#[test]
fn test_zero_origin_media_box_has_identity_matrix() {
    let source = create_test_pdf(1, 612, 792);
    let output = compose_document(&source, &settings(1, PaperMode::Letter), None).unwrap();

    let matrix: Vec<f32> = form_xobjects(&output)[0]
        .dict
        .get(b"Matrix")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(number)
        .collect();
    assert_eq!(matrix, vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
}

#[test]
fn test_filtered_content_keeps_filter() {
    let text = "0 0 1 rg 0 0 100 100 re f\n";
    let mut hex: String = text.bytes().map(|b| format!("{:02X}", b)).collect();
    hex.push('>');

    let encoded = Stream::new(
        Dictionary::from_iter(vec![("Filter", Object::Name(b"ASCIIHexDecode".to_vec()))]),
        hex.clone().into_bytes(),
    );
    let source = create_custom_pdf([0, 0, 200, 200], vec![encoded], Dictionary::new());
    let output = compose_document(&source, &settings(1, PaperMode::Letter), None).unwrap();

    let forms = form_xobjects(&output);
    assert_eq!(forms.len(), 1);
    assert_eq!(
        forms[0].dict.get(b"Filter").unwrap().as_name().unwrap(),
        b"ASCIIHexDecode"
    );
    assert_eq!(forms[0].content, hex.into_bytes());
}

#[test]
fn test_multiple_compressed_streams_are_decoded() {
    let body = "0 0 m 10 10 l S\n".repeat(40);
    let mut compressed = Stream::new(Dictionary::new(), body.clone().into_bytes());
    compressed.compress().unwrap();
    assert!(compressed.dict.get(b"Filter").is_ok());
    let plain = Stream::new(Dictionary::new(), b"BT (tail) Tj ET".to_vec());

    let source = create_custom_pdf(
        [0, 0, 612, 792],
        vec![compressed, plain],
        Dictionary::new(),
    );
    let output = compose_document(&source, &settings(1, PaperMode::Letter), None).unwrap();

    let forms = form_xobjects(&output);
    assert!(forms[0].dict.get(b"Filter").is_err());
    let content = String::from_utf8(forms[0].content.clone()).unwrap();
    assert!(content.starts_with(&body));
    assert!(content.contains("BT (tail) Tj ET"));
}

#[test]
fn test_dangling_resource_reference_becomes_null() {
    let fonts = Dictionary::from_iter(vec![("F1", Object::Reference((999, 0)))]);
    let resources = Dictionary::from_iter(vec![("Font", Object::Dictionary(fonts))]);
    let text = Stream::new(Dictionary::new(), b"BT /F1 12 Tf (hi) Tj ET".to_vec());
    let source = create_custom_pdf([0, 0, 612, 792], vec![text], resources);

    let output = compose_document(&source, &settings(1, PaperMode::Letter), None).unwrap();

    let forms = form_xobjects(&output);
    let font_ref = forms[0]
        .dict
        .get(b"Resources")
        .and_then(|r| r.as_dict())
        .and_then(|r| r.get(b"Font"))
        .and_then(|f| f.as_dict())
        .and_then(|f| f.get(b"F1"))
        .and_then(|f| f.as_reference())
        .unwrap();
    assert!(matches!(output.get_object(font_ref), Ok(Object::Null)));
}

#[test]
fn test_plan_carries_page_ids_in_order() {
    let source = create_test_pdf(5, 612, 792);
    let plan = plan_document(&source, &settings(2, PaperMode::Auto)).unwrap();

    let expected: Vec<ObjectId> = source.get_pages().values().copied().collect();
    assert_eq!(plan.page_ids, expected);
    let placed: Vec<usize> = plan
        .sheets
        .iter()
        .flat_map(|s| s.placements.iter().map(|p| p.source_page))
        .collect();
    assert_eq!(placed, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_concurrent_runs_interleave_on_current_thread() {
    let first = to_bytes(create_test_pdf(5, 612, 792));
    let second = to_bytes(create_test_pdf(3, 612, 792));

    let (first, second) = tokio::join!(
        run(first, settings(2, PaperMode::Auto)),
        run(second, settings(2, PaperMode::Auto))
    );

    let first = Document::load_mem(&first.unwrap()).unwrap();
    let second = Document::load_mem(&second.unwrap()).unwrap();
    assert_eq!(first.get_pages().len(), 3);
    assert_eq!(second.get_pages().len(), 2);
}
