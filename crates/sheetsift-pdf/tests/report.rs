use lopdf::content::Content;
use lopdf::{Document, Object};
use pretty_assertions::assert_eq;
use sheetsift_core::{CellValue, Table};
use sheetsift_pdf::{PdfWriter, ReportLayout};

/// Text shown on one page, with the font resource it was shown in
struct Page {
    media_box: Vec<f32>,
    text: Vec<(String, Vec<u8>)>,
    grid_boxes: usize,
}

fn render(table: &Table) -> (Document, Vec<Page>) {
    let bytes = PdfWriter::to_bytes(table, &ReportLayout::default()).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.4"));
    let doc = Document::load_mem(&bytes).unwrap();

    let mut pages = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let media_box = doc
            .get_object(page_id)
            .and_then(Object::as_dict)
            .and_then(|d| d.get(b"MediaBox"))
            .and_then(Object::as_array)
            .unwrap()
            .iter()
            .map(|v| v.as_float().unwrap())
            .collect();

        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let mut font = String::new();
        let mut text = Vec::new();
        let mut grid_boxes = 0;
        for op in &content.operations {
            match op.operator.as_str() {
                "Tf" => {
                    font = String::from_utf8_lossy(op.operands[0].as_name().unwrap()).into_owned();
                }
                "Tj" => {
                    if let Object::String(bytes, _) = &op.operands[0] {
                        text.push((font.clone(), bytes.clone()));
                    }
                }
                "S" => grid_boxes += 1,
                _ => {}
            }
        }
        pages.push(Page {
            media_box,
            text,
            grid_boxes,
        });
    }
    (doc, pages)
}

fn shown(page: &Page) -> Vec<String> {
    page.text
        .iter()
        .map(|(_, bytes)| String::from_utf8_lossy(bytes).into_owned())
        .collect()
}

#[test]
fn test_cell_text_is_broken_at_newlines() {
    let table = Table::new(
        vec!["note".into()],
        vec![vec![CellValue::from("first line\nsecond line")]],
    )
    .unwrap();

    let (_, pages) = render(&table);
    let text = shown(&pages[0]);
    assert!(text.contains(&"first line".to_string()));
    assert!(text.contains(&"second line".to_string()));
}

#[test]
fn test_header_is_bold_and_body_regular() {
    let table = Table::new(vec!["Header".into()], vec![vec![CellValue::from("body")]]).unwrap();

    let (doc, pages) = render(&table);
    assert_eq!(
        pages[0].text,
        vec![
            ("F2".to_string(), b"Filtered Data Report".to_vec()),
            ("F2".to_string(), b"Header".to_vec()),
            ("F1".to_string(), b"body".to_vec()),
        ]
    );

    let base_fonts: Vec<Vec<u8>> = doc
        .objects
        .values()
        .filter_map(|o| o.as_dict().ok())
        .filter_map(|d| d.get(b"BaseFont").ok())
        .filter_map(|n| n.as_name().ok().map(<[u8]>::to_vec))
        .collect();
    assert!(base_fonts.contains(&b"Helvetica".to_vec()));
    assert!(base_fonts.contains(&b"Helvetica-Bold".to_vec()));
}

#[test]
fn test_unencodable_characters_are_replaced() {
    let table = Table::new(vec!["symbol".into()], vec![vec![CellValue::from("café ✓ 漢")]]).unwrap();

    let (_, pages) = render(&table);
    // é is WinAnsi 0xE9
    assert_eq!(pages[0].text[2].1, b"caf\xE9 ? ?".to_vec());
}

#[test]
fn test_values_render_as_display_text() {
    let table = Table::new(
        vec!["n".into(), "b".into(), "e".into()],
        vec![vec![CellValue::from(3), CellValue::from(true), CellValue::Empty]],
    )
    .unwrap();

    let (_, pages) = render(&table);
    assert_eq!(shown(&pages[0]), vec!["Filtered Data Report", "n", "b", "e", "3", "TRUE"]);
    // Header row plus one body row of three cells, each with a grid box
    assert_eq!(pages[0].grid_boxes, 6);
}

#[test]
fn test_page_count_and_size() {
    let table = Table::new(
        vec!["id".into()],
        (0..60).map(|i| vec![CellValue::from(i)]),
    )
    .unwrap();

    let (_, pages) = render(&table);
    assert_eq!(pages.len(), 3);
    for page in &pages {
        assert_eq!(page.media_box, vec![0.0, 0.0, 792.0, 612.0]);
    }
    assert!(shown(&pages[2]).contains(&"59".to_string()));
}

#[test]
fn test_wide_table_widens_page() {
    let columns: Vec<String> = (0..10).map(|i| format!("c{i}")).collect();
    let row: Vec<CellValue> = (0..10).map(CellValue::from).collect();
    let table = Table::new(columns, vec![row]).unwrap();

    let (_, pages) = render(&table);
    assert_eq!(pages[0].media_box, vec![0.0, 0.0, 1152.0, 612.0]);
}

#[test]
fn test_header_only_table_renders() {
    let table = Table::new(vec!["a".into()], Vec::<Vec<CellValue>>::new()).unwrap();
    let (_, pages) = render(&table);
    assert_eq!(pages.len(), 1);
    assert_eq!(shown(&pages[0]), vec!["Filtered Data Report", "a"]);
}
