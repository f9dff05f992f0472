//! Office-container decoding: .docx and .xlsx into HTML fragments.
//!
//! The HTML-to-PDF renderer consumes a neutral HTML fragment, so both office
//! decoders target that contract: a word-processing body becomes a sequence
//! of `<p>` elements, a spreadsheet's first worksheet becomes one `<table>`.
//! Formatting beyond text content is intentionally not carried — the
//! renderer re-styles everything uniformly anyway.

use crate::error::ConvertError;
use crate::request::SourceKind;
use docx_rs::{DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild};
use quick_xml::escape::escape;
use std::io::Cursor;
use tracing::debug;

fn decode_err(kind: SourceKind) -> impl Fn(String) -> ConvertError {
    move |detail| ConvertError::Decode { kind, detail }
}

/// Decode a .docx body into a `<p>`-per-paragraph HTML fragment.
pub fn docx_to_html(bytes: &[u8]) -> Result<String, ConvertError> {
    let err = decode_err(SourceKind::Word);
    let docx = docx_rs::read_docx(bytes).map_err(|e| err(format!("{e:?}")))?;

    let mut html = String::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => {
                let text = paragraph_text(p);
                html.push_str("<p>");
                html.push_str(&escape(&text));
                html.push_str("</p>\n");
            }
            DocumentChild::Table(table) => {
                html.push_str("<table>\n");
                for row in &table.rows {
                    let TableChild::TableRow(row) = row;
                    html.push_str("<tr>");
                    for cell in &row.cells {
                        let TableRowChild::TableCell(cell) = cell;
                        html.push_str("<td>");
                        let mut first = true;
                        for content in &cell.children {
                            if let TableCellContent::Paragraph(p) = content {
                                if !first {
                                    html.push(' ');
                                }
                                html.push_str(&escape(&paragraph_text(p)));
                                first = false;
                            }
                        }
                        html.push_str("</td>");
                    }
                    html.push_str("</tr>\n");
                }
                html.push_str("</table>\n");
            }
            _ => {}
        }
    }

    debug!("Decoded .docx body → {} bytes of HTML", html.len());
    Ok(html)
}

fn paragraph_text(p: &docx_rs::Paragraph) -> String {
    let mut out = String::new();
    for child in &p.children {
        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                match rc {
                    RunChild::Text(t) => out.push_str(&t.text),
                    RunChild::Tab(_) => out.push('\t'),
                    RunChild::Break(_) => out.push(' '),
                    _ => {}
                }
            }
        }
    }
    out
}

/// Decode the first worksheet of a .xlsx into an HTML `<table>` fragment.
///
/// Cell values are rendered verbatim as display strings; no type inference.
pub fn xlsx_to_html(bytes: &[u8]) -> Result<String, ConvertError> {
    use calamine::{Reader, Xlsx};

    let err = decode_err(SourceKind::Excel);
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes.to_vec())).map_err(|e| err(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| err("workbook contains no worksheets".into()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| err(e.to_string()))?;

    let mut html = String::from("<table>\n");
    for row in range.rows() {
        html.push_str("<tr>");
        for cell in row {
            html.push_str("<td>");
            html.push_str(&escape(&cell.to_string()));
            html.push_str("</td>");
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");

    debug!(
        "Decoded worksheet '{}' ({} rows) → HTML table",
        sheet_name,
        range.height()
    );
    Ok(html)
}
