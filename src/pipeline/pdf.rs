//! PDF decoding: page rasterisation and positioned-text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a C++ library with thread-local state and is not safe to call
//! from async contexts. Each operation here moves the whole document walk
//! onto a blocking-pool thread, keeping the async workers free. Pages are
//! processed strictly sequentially inside one blocking call: the decoder
//! holds one page's resources at a time and output ordering must match
//! decode ordering.
//!
//! The document handle is scoped to the blocking closure and released on
//! every exit path.

use crate::error::ConvertError;
use crate::pipeline::layout::PositionedTextRun;
use crate::request::SourceKind;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Scale applied when rasterising a PDF page to an image (2× the page's
/// point size, roughly 144 DPI — sharp enough for screen use without the
/// memory cost of print density).
const RASTER_SCALE: f32 = 2.0;

/// Bind to the pdfium library, mapping an absent library to the typed
/// environment error rather than a panic.
pub(crate) fn bind_pdfium() -> Result<Pdfium, ConvertError> {
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| ConvertError::ServiceUnavailable {
            service: "pdfium".into(),
            hint: format!(
                "could not bind to a pdfium library: {e:?}. \
                 Install pdfium or point PDFIUM_DYNAMIC_LIB_PATH at it."
            ),
        })
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    bytes: &'a [u8],
) -> Result<PdfDocument<'a>, ConvertError> {
    pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| ConvertError::Decode {
            kind: SourceKind::Pdf,
            detail: format!("{e:?}"),
        })
}

/// Number of pages in the document.
pub async fn page_count(bytes: Vec<u8>) -> Result<usize, ConvertError> {
    tokio::task::spawn_blocking(move || {
        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, &bytes)?;
        Ok(document.pages().len() as usize)
    })
    .await
    .map_err(|e| ConvertError::Internal(format!("page count task panicked: {e}")))?
}

/// Rasterise the first page into a pixel buffer at [`RASTER_SCALE`].
pub async fn rasterize_first_page(bytes: Vec<u8>) -> Result<DynamicImage, ConvertError> {
    tokio::task::spawn_blocking(move || rasterize_first_page_blocking(&bytes))
        .await
        .map_err(|e| ConvertError::Internal(format!("raster task panicked: {e}")))?
}

fn rasterize_first_page_blocking(bytes: &[u8]) -> Result<DynamicImage, ConvertError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, bytes)?;

    let page = document.pages().get(0).map_err(|e| ConvertError::Decode {
        kind: SourceKind::Pdf,
        detail: format!("document has no first page: {e:?}"),
    })?;

    let width = (page.width().value * RASTER_SCALE) as i32;
    let height = (page.height().value * RASTER_SCALE) as i32;
    let render_config = PdfRenderConfig::new()
        .set_target_width(width)
        .set_maximum_height(height);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| ConvertError::Render {
            stage: "pdf-rasterise".into(),
            detail: format!("{e:?}"),
        })?;

    let image = bitmap.as_image();
    debug!("Rasterised page 1 → {}x{} px", image.width(), image.height());
    Ok(image)
}

/// Extract every page's positioned text runs, in strict page order.
///
/// Each run carries the text of one pdfium text object together with its
/// baseline position and measured width in PDF user space (origin
/// bottom-left). Runs within a page carry no guaranteed order — the layout
/// and table reconstructors impose one.
pub async fn extract_runs(bytes: Vec<u8>) -> Result<Vec<Vec<PositionedTextRun>>, ConvertError> {
    tokio::task::spawn_blocking(move || extract_runs_blocking(&bytes))
        .await
        .map_err(|e| ConvertError::Internal(format!("extract task panicked: {e}")))?
}

fn extract_runs_blocking(bytes: &[u8]) -> Result<Vec<Vec<PositionedTextRun>>, ConvertError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, bytes)?;

    let mut pages = Vec::new();
    for (page_index, page) in document.pages().iter().enumerate() {
        let mut runs = Vec::new();
        for object in page.objects().iter() {
            let Some(text_object) = object.as_text_object() else {
                continue;
            };
            let text = text_object.text();
            let bounds = text_object.bounds().map_err(|e| ConvertError::Decode {
                kind: SourceKind::Pdf,
                detail: format!("text object bounds on page {}: {e:?}", page_index + 1),
            })?;
            runs.push(PositionedTextRun {
                text,
                x: bounds.left().value,
                y: bounds.bottom().value,
                width: bounds.width().value,
                page_index,
            });
        }
        debug!("Page {}: {} text run(s)", page_index + 1, runs.len());
        pages.push(runs);
    }

    info!(
        "Extracted {} run(s) across {} page(s)",
        pages.iter().map(Vec::len).sum::<usize>(),
        pages.len()
    );
    Ok(pages)
}
