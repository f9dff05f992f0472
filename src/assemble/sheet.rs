//! Spreadsheet assembly: a table grid into a .xlsx workbook.
//!
//! Writes the OOXML container directly: one worksheet, every cell an
//! inline string. Inline strings keep the writer free of a shared-strings
//! table and keep cell text verbatim, matching the extraction side which
//! never parses values back into numbers or dates.

use crate::error::ConvertError;
use crate::pipeline::table::TableGrid;
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

/// Spreadsheet column reference for a zero-based index: 0 → A, 25 → Z,
/// 26 → AA.
fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ASCII letters")
}

fn worksheet_xml(grid: &TableGrid) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>"#,
    );
    for (row_index, row) in grid.rows.iter().enumerate() {
        let row_ref = row_index + 1;
        xml.push_str(&format!("<row r=\"{row_ref}\">"));
        for (col_index, cell) in row.cells.iter().enumerate() {
            xml.push_str(&format!(
                "<c r=\"{}{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                column_letters(col_index),
                row_ref,
                escape(cell)
            ));
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData>\n</worksheet>");
    xml
}

/// Assemble a reconstructed grid into .xlsx bytes.
pub fn assemble(grid: &TableGrid) -> Result<Vec<u8>, ConvertError> {
    let render_err = |detail: String| ConvertError::Render {
        stage: "sheet-assemble".into(),
        detail,
    };

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, String); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", WORKBOOK.to_string()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/worksheets/sheet1.xml", worksheet_xml(grid)),
    ];
    for (name, content) in parts {
        writer
            .start_file(name, options)
            .map_err(|e| render_err(e.to_string()))?;
        writer
            .write_all(content.as_bytes())
            .map_err(|e| render_err(e.to_string()))?;
    }

    let cursor = writer.finish().map_err(|e| render_err(e.to_string()))?;
    debug!("Assembled {} row(s) into .xlsx", grid.rows.len());
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::table::TableRow;

    fn grid(rows: &[&[&str]]) -> TableGrid {
        TableGrid {
            rows: rows
                .iter()
                .enumerate()
                .map(|(i, cells)| TableRow {
                    row_key: 1000 - i as i64,
                    cells: cells.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn column_letters_cover_the_rollover() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn output_is_a_zip_container() {
        let bytes = assemble(&grid(&[&["a", "b"]])).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn workbook_reads_back_through_the_extractor_side() {
        // calamine is the same reader the Excel decode path uses.
        use calamine::{Reader, Xlsx};
        let bytes = assemble(&grid(&[&["Name", "Qty"], &["bolt <M5>", "12"]])).unwrap();

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).expect("open workbook");
        let range = workbook.worksheet_range("Sheet1").expect("worksheet");
        assert_eq!(range.get_value((0, 0)).unwrap().to_string(), "Name");
        assert_eq!(range.get_value((1, 0)).unwrap().to_string(), "bolt <M5>");
        assert_eq!(range.get_value((1, 1)).unwrap().to_string(), "12");
    }

    #[test]
    fn ragged_rows_are_preserved() {
        let bytes = assemble(&grid(&[&["a", "b", "c"], &["only"]])).unwrap();
        use calamine::{Reader, Xlsx};
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).expect("open workbook");
        let range = workbook.worksheet_range("Sheet1").expect("worksheet");
        assert_eq!(range.get_value((0, 2)).unwrap().to_string(), "c");
        assert_eq!(range.get_value((1, 0)).unwrap().to_string(), "only");
    }

    #[test]
    fn empty_grid_is_still_a_valid_workbook() {
        let bytes = assemble(&TableGrid::default()).unwrap();
        use calamine::{Reader, Xlsx};
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).expect("open workbook");
        assert_eq!(
            workbook.sheet_names().first().map(|s| s.as_str()),
            Some("Sheet1")
        );
    }
}
