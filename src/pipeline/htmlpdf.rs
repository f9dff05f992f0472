//! HTML-to-PDF rendering: lay an HTML fragment out offscreen, paginate it
//! into an A4 document.
//!
//! The fragment comes from the office decoders, so only two shapes matter:
//! prose (`<p>`/heading/list elements) and one table. Layout happens in an
//! offscreen container of fixed logical width — 500 units for prose, 800 for
//! tables so wide column sets fit before shrink-to-fit pagination — and the
//! laid-out lines are then flowed onto 595×842 pt pages with a 40 pt margin.
//! Page breaks are text-aware: they fall only between laid-out lines (or
//! whole table rows), never mid-glyph.
//!
//! The container is a plain value scoped to one call; it is never shared
//! or pooled across conversions.

use crate::error::ConvertError;
use crate::fonts;
use pdfium_render::prelude::*;
use scraper::{Html, Selector};
use tracing::{debug, info};

/// A4 page, in points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
/// Content box: x=40, y=40, width 515.
const MARGIN: f32 = 40.0;
const CONTENT_WIDTH: f32 = 515.0;

const LINE_HEIGHT_FACTOR: f32 = 1.6;
/// Uniform cell padding applied to every table cell, replacing whatever
/// styling the source carried.
const CELL_PADDING: f32 = 4.0;
/// Crude average-advance metric; good enough for wrap estimation with the
/// bundled face.
const AVG_GLYPH_FACTOR: f32 = 0.5;

/// What the fragment contains and how wide the offscreen container is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Prose: paragraphs and headings at 14 pt in a 500-unit container.
    Document,
    /// Tabular: one normalised table at 10 pt in an 800-unit container.
    Table,
}

impl RenderMode {
    fn window_width(&self) -> f32 {
        match self {
            RenderMode::Document => 515.0,
            RenderMode::Table => 850.0,
        }
    }

    fn font_size(&self) -> f32 {
        match self {
            RenderMode::Document => 14.0,
            RenderMode::Table => 10.0,
        }
    }
}

/// One piece of text placed within a flow unit, relative to the unit's top.
#[derive(Debug, Clone, PartialEq)]
struct PlacedText {
    x: f32,
    /// Baseline offset measured down from the unit's top edge.
    baseline: f32,
    text: String,
}

/// The smallest unbreakable slice of output: one prose line or one whole
/// table row. Pagination only ever breaks between units.
#[derive(Debug, Clone, PartialEq)]
struct FlowUnit {
    height: f32,
    texts: Vec<PlacedText>,
}

/// The offscreen layout container: fixed logical width, uniform font, and
/// the flow units produced from one fragment. Created, measured, and
/// dropped within a single render call.
struct LayoutContainer {
    font_size: f32,
    units: Vec<FlowUnit>,
}

impl LayoutContainer {
    fn new(html: &str, mode: RenderMode) -> Self {
        // Shrink-to-fit: the container lays out at window width and the
        // result is scaled onto the 515 pt content box.
        let scale = CONTENT_WIDTH / mode.window_width();
        let font_size = mode.font_size() * scale;
        let line_height = font_size * LINE_HEIGHT_FACTOR;

        let units = match mode {
            RenderMode::Document => {
                Self::layout_blocks(&parse_blocks(html), font_size, line_height)
            }
            RenderMode::Table => Self::layout_table(&parse_table(html), font_size, line_height),
        };

        Self { font_size, units }
    }

    fn layout_blocks(blocks: &[String], font_size: f32, line_height: f32) -> Vec<FlowUnit> {
        let max_chars = max_chars_for(CONTENT_WIDTH, font_size);
        let mut units = Vec::new();
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                // Inter-paragraph gap.
                units.push(FlowUnit {
                    height: line_height * 0.5,
                    texts: Vec::new(),
                });
            }
            for line in wrap(block, max_chars) {
                units.push(FlowUnit {
                    height: line_height,
                    texts: vec![PlacedText {
                        x: 0.0,
                        baseline: font_size,
                        text: line,
                    }],
                });
            }
        }
        units
    }

    fn layout_table(rows: &[Vec<String>], font_size: f32, line_height: f32) -> Vec<FlowUnit> {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return Vec::new();
        }
        // Collapsed borders, even column division: source styling never
        // distorts alignment.
        let column_width = CONTENT_WIDTH / columns as f32;
        let inner_width = (column_width - 2.0 * CELL_PADDING).max(1.0);
        let max_chars = max_chars_for(inner_width, font_size);

        let mut units = Vec::new();
        for row in rows {
            let wrapped: Vec<Vec<String>> = row.iter().map(|c| wrap(c, max_chars)).collect();
            let tallest = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
            let mut texts = Vec::new();
            for (col, lines) in wrapped.iter().enumerate() {
                for (i, line) in lines.iter().enumerate() {
                    if line.is_empty() {
                        continue;
                    }
                    texts.push(PlacedText {
                        x: col as f32 * column_width + CELL_PADDING,
                        baseline: CELL_PADDING + i as f32 * line_height + font_size,
                        text: line.clone(),
                    });
                }
            }
            units.push(FlowUnit {
                height: tallest as f32 * line_height + 2.0 * CELL_PADDING,
                texts,
            });
        }
        units
    }
}

fn max_chars_for(width: f32, font_size: f32) -> usize {
    ((width / (font_size * AVG_GLYPH_FACTOR)).floor() as usize).max(1)
}

/// Greedy word wrap. Words longer than the line limit occupy a line alone
/// rather than being sliced mid-glyph.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return vec![String::new()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in trimmed.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Pull prose blocks out of the fragment, one per paragraph-level element.
fn parse_blocks(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);
    let selector =
        Selector::parse("p, h1, h2, h3, h4, h5, h6, li").expect("static selector parses");

    let mut blocks: Vec<String> = fragment
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    // A fragment with no block elements still renders as one run of text.
    if blocks.is_empty() {
        let all = fragment.root_element().text().collect::<String>();
        let all = all.trim().to_string();
        if !all.is_empty() {
            blocks.push(all);
        }
    }
    blocks
}

/// Pull the first table's rows out of the fragment.
fn parse_table(html: &str) -> Vec<Vec<String>> {
    let fragment = Html::parse_fragment(html);
    let row_sel = Selector::parse("tr").expect("static selector parses");
    let cell_sel = Selector::parse("td, th").expect("static selector parses");

    fragment
        .select(&row_sel)
        .map(|row| {
            row.select(&cell_sel)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|cells: &Vec<String>| !cells.is_empty())
        .collect()
}

/// Render an HTML fragment into an in-memory PDF.
///
/// Layout and pagination are CPU-bound pdfium work, so the whole render
/// runs under `spawn_blocking`; the caller awaits completion before the
/// output exists.
pub async fn render(html: String, mode: RenderMode) -> Result<Vec<u8>, ConvertError> {
    tokio::task::spawn_blocking(move || render_blocking(&html, mode))
        .await
        .map_err(|e| ConvertError::Internal(format!("render task panicked: {e}")))?
}

fn render_blocking(html: &str, mode: RenderMode) -> Result<Vec<u8>, ConvertError> {
    let render_err = |detail: String| ConvertError::Render {
        stage: "html-to-pdf".into(),
        detail,
    };

    let container = LayoutContainer::new(html, mode);
    debug!(
        "Laid out {} flow unit(s) in {:?} mode",
        container.units.len(),
        mode
    );

    let pdfium = crate::pipeline::pdf::bind_pdfium()?;
    let mut document = pdfium.create_new_pdf().map_err(|e| render_err(format!("{e:?}")))?;

    // Uniform face for the whole document: the embedded Unicode payload
    // when valid, the built-in default otherwise.
    let font = match fonts::thai_font() {
        Some(bytes) => document
            .fonts_mut()
            .load_true_type_from_bytes(bytes, true)
            .map_err(|e| render_err(format!("font load: {e:?}")))?,
        None => document.fonts_mut().helvetica(),
    };

    let paper = PdfPagePaperSize::Custom(PdfPoints::new(PAGE_WIDTH), PdfPoints::new(PAGE_HEIGHT));
    let mut page = document
        .pages_mut()
        .create_page_at_end(paper.clone())
        .map_err(|e| render_err(format!("{e:?}")))?;
    let mut cursor = PAGE_HEIGHT - MARGIN;
    let mut page_count = 1;

    for unit in &container.units {
        if cursor - unit.height < MARGIN {
            page = document
                .pages_mut()
                .create_page_at_end(paper.clone())
                .map_err(|e| render_err(format!("{e:?}")))?;
            cursor = PAGE_HEIGHT - MARGIN;
            page_count += 1;
        }
        for placed in &unit.texts {
            page.objects_mut()
                .create_text_object(
                    PdfPoints::new(MARGIN + placed.x),
                    PdfPoints::new(cursor - placed.baseline),
                    &placed.text,
                    font,
                    PdfPoints::new(container.font_size),
                )
                .map_err(|e| render_err(format!("{e:?}")))?;
        }
        cursor -= unit.height;
    }

    let bytes = document
        .save_to_bytes()
        .map_err(|e| render_err(format!("{e:?}")))?;
    info!("Rendered {} page(s) of PDF ({} bytes)", page_count, bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_blocks_finds_paragraphs_and_headings() {
        let blocks = parse_blocks("<h1>Title</h1><p>First.</p><p>Second.</p><p>  </p>");
        assert_eq!(blocks, vec!["Title", "First.", "Second."]);
    }

    #[test]
    fn bare_text_fragment_becomes_one_block() {
        let blocks = parse_blocks("just loose text");
        assert_eq!(blocks, vec!["just loose text"]);
    }

    #[test]
    fn parse_table_extracts_rows_and_cells() {
        let rows =
            parse_table("<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>");
        assert_eq!(rows, vec![vec!["A", "B"], vec!["1", "2"]]);
    }

    #[test]
    fn wrap_respects_limit_and_keeps_long_words_whole() {
        let lines = wrap("alpha beta gamma", 11);
        assert_eq!(lines, vec!["alpha beta", "gamma"]);

        let lines = wrap("supercalifragilistic", 5);
        assert_eq!(lines, vec!["supercalifragilistic"]);
    }

    #[test]
    fn document_container_uses_full_scale() {
        // Prose: window width 515 → scale 1.0, font stays 14 pt.
        let c = LayoutContainer::new("<p>hello</p>", RenderMode::Document);
        assert!((c.font_size - 14.0).abs() < 1e-4);
        assert_eq!(c.units.len(), 1);
    }

    #[test]
    fn table_container_shrinks_to_fit() {
        // Table: window width 850 → scale 515/850.
        let c = LayoutContainer::new("<table><tr><td>x</td></tr></table>", RenderMode::Table);
        let expected = 10.0 * (515.0 / 850.0);
        assert!((c.font_size - expected).abs() < 1e-4, "got {}", c.font_size);
    }

    #[test]
    fn table_rows_are_single_flow_units() {
        let c = LayoutContainer::new(
            "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>",
            RenderMode::Table,
        );
        assert_eq!(c.units.len(), 2);
        assert_eq!(c.units[0].texts.len(), 2);
        // Second column starts one column width in.
        assert!(c.units[0].texts[1].x > c.units[0].texts[0].x);
    }

    #[test]
    fn empty_fragment_lays_out_nothing() {
        let c = LayoutContainer::new("", RenderMode::Document);
        assert!(c.units.is_empty());
        let c = LayoutContainer::new("", RenderMode::Table);
        assert!(c.units.is_empty());
    }

    #[test]
    fn long_prose_produces_multiple_lines() {
        let text = "word ".repeat(200);
        let html = format!("<p>{text}</p>");
        let c = LayoutContainer::new(&html, RenderMode::Document);
        assert!(c.units.len() > 1);
        for unit in &c.units {
            assert!(unit.height > 0.0);
        }
    }
}
