//! End-to-end conversion tests over the stages that need no native pdfium.
//!
//! The pdfium-backed legs (PDF rasterisation, text extraction, HTML → PDF)
//! are exercised by their pure halves here: positioned runs go in where the
//! extractor would produce them, and the reconstruction plus assembly output
//! is verified with the same reader crates the decode paths use.

use picshift::pipeline::layout::{self, PositionedTextRun};
use picshift::pipeline::{office, table};
use picshift::{
    assemble, convert, ConversionRequest, ConvertError, Geometry, SizeUnit, SourceDocument,
    SourceKind, TargetFormat,
};
use std::io::Cursor;

fn run(text: &str, x: f32, y: f32, width: f32) -> PositionedTextRun {
    PositionedTextRun {
        text: text.to_string(),
        x,
        y,
        width,
        page_index: 0,
    }
}

fn png_fixture(w: u32, h: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        w,
        h,
        image::Rgb([40, 90, 160]),
    ));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode fixture");
    buf
}

// ── image legs ───────────────────────────────────────────────────────────

#[tokio::test]
async fn original_size_conversion_preserves_dimensions() {
    // No geometry on the request: the output keeps the source's pixels.
    let request = ConversionRequest::new(
        SourceDocument::new(png_fixture(123, 45), SourceKind::Image),
        TargetFormat::Png,
    );
    let output = convert(request).await.expect("convert");
    let image = image::load_from_memory(&output.bytes).expect("decode output");
    assert_eq!((image.width(), image.height()), (123, 45));
}

#[tokio::test]
async fn image_to_png_at_ten_centimetres_square() {
    let request = ConversionRequest::new(
        SourceDocument::new(png_fixture(500, 500), SourceKind::Image),
        TargetFormat::Png,
    )
    .with_geometry(Geometry {
        width: "10".into(),
        height: "10".into(),
        unit: SizeUnit::Cm,
    });

    let output = convert(request).await.expect("convert");
    let image = image::load_from_memory(&output.bytes).expect("decode output");
    // 10 cm at 118.11 px/cm, rounded.
    assert_eq!((image.width(), image.height()), (1181, 1181));
}

#[tokio::test]
async fn oversized_request_is_clamped_with_aspect_kept() {
    let request = ConversionRequest::new(
        SourceDocument::new(png_fixture(64, 32), SourceKind::Image),
        TargetFormat::Png,
    )
    .with_geometry(Geometry {
        width: "20".into(),
        height: "10".into(),
        unit: SizeUnit::Inch,
    });

    let output = convert(request).await.expect("convert");
    let image = image::load_from_memory(&output.bytes).expect("decode output");
    assert_eq!((image.width(), image.height()), (4096, 2048));
}

#[tokio::test]
async fn output_lands_on_disk_under_the_suggested_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let request = ConversionRequest::new(
        SourceDocument::new(png_fixture(8, 8), SourceKind::Image),
        TargetFormat::Jpg,
    );
    let output = convert(request).await.expect("convert");

    let path = dir.path().join(&output.filename);
    std::fs::write(&path, &output.bytes).expect("write output");
    let back = std::fs::read(&path).expect("read back");
    assert_eq!(&back[..2], &[0xFF, 0xD8]);
    assert!(output.filename.starts_with("PicShift_jpg_"));
}

#[tokio::test]
async fn unsupported_pair_is_rejected_without_decoding() {
    // Bytes are garbage on purpose: validation must fire first.
    let request = ConversionRequest::new(
        SourceDocument::new(b"\x00\x01\x02".to_vec(), SourceKind::Excel),
        TargetFormat::Png,
    );
    assert!(matches!(
        convert(request).await,
        Err(ConvertError::UnsupportedConversion {
            from: SourceKind::Excel,
            target: TargetFormat::Png,
        })
    ));
}

// ── PDF → Word reconstruction + assembly ─────────────────────────────────

#[test]
fn scattered_runs_come_out_in_reading_order() {
    // Two lines delivered out of order, each split mid-word; the second
    // line starts deep enough to open an indented paragraph.
    let runs = vec![
        run("world", 80.0, 700.0, 40.0),
        run("Second", 150.0, 680.0, 50.0),
        run("Hello", 20.0, 700.2, 40.0),
        run("line", 215.0, 680.3, 30.0),
    ];

    let paragraphs = layout::reconstruct_page(&runs);
    let texts: Vec<&str> = paragraphs
        .iter()
        .flat_map(|p| p.lines.iter().map(|l| l.text.as_str()))
        .collect();
    assert_eq!(texts, vec!["Hello world", "Second line"]);

    let flags: Vec<bool> = paragraphs
        .iter()
        .flat_map(|p| p.lines.iter().map(|l| l.indented))
        .collect();
    assert_eq!(flags, vec![false, true]);

    let bytes = assemble::word::assemble(&paragraphs).expect("assemble docx");
    let json = docx_rs::read_docx(&bytes).expect("read docx back").json();
    assert!(json.contains("Hello world"));
    assert!(json.contains("Second line"));
}

#[test]
fn thai_lines_style_differently_from_latin_ones() {
    let runs = vec![
        run("Latin line", 20.0, 700.0, 80.0),
        run("\u{0E2A}\u{0E27}\u{0E31}\u{0E2A}\u{0E14}\u{0E35}", 20.0, 650.0, 60.0),
    ];
    let paragraphs = layout::reconstruct_page(&runs);
    assert_eq!(paragraphs.len(), 2);
    assert!(!paragraphs[0].lines[0].thai);
    assert!(paragraphs[1].lines[0].thai);

    let bytes = assemble::word::assemble(&paragraphs).expect("assemble docx");
    let json = docx_rs::read_docx(&bytes).expect("read docx back").json();
    assert!(json.contains("TH Sarabun New"));
    assert!(json.contains("Calibri"));
}

// ── PDF → Excel bucketing + assembly ─────────────────────────────────────

#[test]
fn bucketed_rows_survive_the_workbook_round_trip() {
    use calamine::{Reader, Xlsx};

    // Two pages of a running table; jittered baselines merge per row.
    let pages = vec![
        vec![
            run("Qty", 200.0, 700.2, 30.0),
            run("Name", 20.0, 700.4, 40.0),
            run("12", 200.0, 650.0, 20.0),
            run("bolt", 20.0, 650.1, 30.0),
        ],
        vec![run("nut", 20.0, 700.0, 25.0), run("7", 200.0, 700.3, 10.0)],
    ];

    let grid = table::grid_from_pages(&pages);
    assert_eq!(grid.rows.len(), 3);

    let bytes = assemble::sheet::assemble(&grid).expect("assemble xlsx");
    assert_eq!(&bytes[..2], b"PK");

    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).expect("open workbook");
    let range = workbook.worksheet_range("Sheet1").expect("worksheet");
    assert_eq!(range.get_value((0, 0)).unwrap().to_string(), "Name");
    assert_eq!(range.get_value((0, 1)).unwrap().to_string(), "Qty");
    assert_eq!(range.get_value((1, 0)).unwrap().to_string(), "bolt");
    assert_eq!(range.get_value((2, 1)).unwrap().to_string(), "7");
}

// ── office decode halves of the Word/Excel → PDF legs ────────────────────

#[test]
fn docx_body_decodes_to_paragraph_fragments() {
    use docx_rs::{Docx, Paragraph, Run};
    let mut buf = Cursor::new(Vec::new());
    Docx::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("First paragraph")))
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Second & last")))
        .build()
        .pack(&mut buf)
        .expect("pack docx");

    let html = office::docx_to_html(buf.get_ref()).expect("decode");
    assert!(html.contains("<p>First paragraph</p>"));
    assert!(html.contains("Second &amp; last"));
}

#[test]
fn xlsx_worksheet_decodes_to_a_table_fragment() {
    // The sheet assembler writes the same container calamine reads, so a
    // grid makes a convenient xlsx fixture.
    let grid = table::TableGrid {
        rows: vec![table::TableRow {
            row_key: 700,
            cells: vec!["a".into(), "b<c>".into()],
        }],
    };
    let bytes = assemble::sheet::assemble(&grid).expect("assemble fixture");

    let html = office::xlsx_to_html(&bytes).expect("decode");
    assert!(html.contains("<table>"));
    assert!(html.contains("<td>a</td>"));
    assert!(html.contains("b&lt;c&gt;"));
}
