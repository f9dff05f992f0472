//! The conversion dispatcher: one validated request in, one output blob out.
//!
//! Dispatch is a closed table over `(source kind, target format)`. Every leg
//! reuses the same pipeline stages; nothing here touches bytes itself beyond
//! routing them. Each call is independent — no state is shared between
//! conversions, and a failed leg leaves nothing behind.

use crate::assemble;
use crate::error::ConvertError;
use crate::output::ConversionOutput;
use crate::pipeline::{htmlpdf, layout, office, pdf, raster, table};
use crate::request::{ConversionRequest, Geometry, SourceKind, TargetFormat};
use std::time::Instant;
use tracing::info;

/// Run one conversion end to end.
///
/// Validates the `(source, target)` pair first, so unsupported combinations
/// fail before any decode work. CPU-heavy stages run on the blocking pool;
/// the future resolves only once the output bytes exist in full.
pub async fn convert(request: ConversionRequest) -> Result<ConversionOutput, ConvertError> {
    request.validate()?;

    let start = Instant::now();
    let kind = request.source.kind();
    let target = request.target;
    info!("Converting {:?} → {}", kind, target);

    let bytes = match (kind, target) {
        (SourceKind::Image, TargetFormat::Jpg | TargetFormat::Png) => {
            image_to_raster(request.source.into_bytes(), target, request.geometry).await?
        }
        (SourceKind::Image, TargetFormat::Pdf) => {
            image_to_pdf(request.source.into_bytes(), request.geometry).await?
        }
        (SourceKind::Pdf, TargetFormat::Jpg | TargetFormat::Png) => {
            pdf_to_raster(request.source.into_bytes(), target).await?
        }
        (SourceKind::Pdf, TargetFormat::Word) => {
            pdf_to_word(request.source.into_bytes()).await?
        }
        (SourceKind::Pdf, TargetFormat::Excel) => {
            pdf_to_excel(request.source.into_bytes()).await?
        }
        (SourceKind::Word, TargetFormat::Pdf) => {
            word_to_pdf(request.source.into_bytes()).await?
        }
        (SourceKind::Excel, TargetFormat::Pdf) => {
            excel_to_pdf(request.source.into_bytes()).await?
        }
        // validate() already rejected these; keep the table total.
        (from, target) => return Err(ConvertError::UnsupportedConversion { from, target }),
    };

    info!(
        "Converted {:?} → {} ({} bytes) in {:.2?}",
        kind,
        target,
        bytes.len(),
        start.elapsed()
    );
    Ok(ConversionOutput::new(bytes, target))
}

/// Image → JPEG/PNG: decode, size, re-encode, all on the blocking pool.
async fn image_to_raster(
    bytes: Vec<u8>,
    target: TargetFormat,
    geometry: Option<Geometry>,
) -> Result<Vec<u8>, ConvertError> {
    tokio::task::spawn_blocking(move || {
        let decoded = raster::decode(&bytes)?;
        let (w, h) = raster::target_dimensions(decoded.width(), decoded.height(), geometry.as_ref())?;
        raster::encode(&raster::resize(decoded, w, h), target)
    })
    .await
    .map_err(|e| ConvertError::Internal(format!("raster task panicked: {e}")))?
}

/// Image → PDF: size the pixels the same way the raster legs do, then wrap
/// them in a single page.
async fn image_to_pdf(
    bytes: Vec<u8>,
    geometry: Option<Geometry>,
) -> Result<Vec<u8>, ConvertError> {
    let sized = tokio::task::spawn_blocking(move || {
        let decoded = raster::decode(&bytes)?;
        let (w, h) = raster::target_dimensions(decoded.width(), decoded.height(), geometry.as_ref())?;
        Ok::<_, ConvertError>(raster::resize(decoded, w, h))
    })
    .await
    .map_err(|e| ConvertError::Internal(format!("raster task panicked: {e}")))??;
    assemble::pdf::from_image(sized).await
}

/// PDF → JPEG/PNG: rasterise the first page, clamp, encode.
async fn pdf_to_raster(bytes: Vec<u8>, target: TargetFormat) -> Result<Vec<u8>, ConvertError> {
    let page = pdf::rasterize_first_page(bytes).await?;
    let (w, h) = raster::target_dimensions(page.width(), page.height(), None)?;
    raster::encode(&raster::resize(page, w, h), target)
}

/// PDF → Word: extract positioned runs, rebuild reading order per page,
/// assemble the lot into one document.
async fn pdf_to_word(bytes: Vec<u8>) -> Result<Vec<u8>, ConvertError> {
    let pages = pdf::extract_runs(bytes).await?;
    let paragraphs: Vec<layout::LogicalParagraph> = pages
        .iter()
        .flat_map(|runs| layout::reconstruct_page(runs))
        .collect();
    assemble::word::assemble(&paragraphs)
}

/// PDF → Excel: extract positioned runs, bucket them into a grid, write the
/// workbook.
async fn pdf_to_excel(bytes: Vec<u8>) -> Result<Vec<u8>, ConvertError> {
    let pages = pdf::extract_runs(bytes).await?;
    let grid = table::grid_from_pages(&pages);
    assemble::sheet::assemble(&grid)
}

/// Word → PDF: decode the container off the async workers, then render.
async fn word_to_pdf(bytes: Vec<u8>) -> Result<Vec<u8>, ConvertError> {
    let html = tokio::task::spawn_blocking(move || office::docx_to_html(&bytes))
        .await
        .map_err(|e| ConvertError::Internal(format!("decode task panicked: {e}")))??;
    htmlpdf::render(html, htmlpdf::RenderMode::Document).await
}

/// Excel → PDF: decode the workbook off the async workers, then render.
async fn excel_to_pdf(bytes: Vec<u8>) -> Result<Vec<u8>, ConvertError> {
    let html = tokio::task::spawn_blocking(move || office::xlsx_to_html(&bytes))
        .await
        .map_err(|e| ConvertError::Internal(format!("decode task panicked: {e}")))??;
    htmlpdf::render(html, htmlpdf::RenderMode::Table).await
}
