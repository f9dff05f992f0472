//! PDF assembly: a pixel buffer into a single-page PDF.
//!
//! The page is sized to the image, one point per pixel, so the picture
//! fills it exactly with no margins and no resampling at view time. The
//! pixels are re-encoded through the fixed-quality JPEG step first, which
//! bounds the embedded payload the same way the raster targets are bounded.

use crate::error::ConvertError;
use crate::pipeline::{pdf::bind_pdfium, raster};
use crate::request::{SourceKind, TargetFormat};
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::debug;

/// Wrap a decoded image into single-page PDF bytes.
pub async fn from_image(image: DynamicImage) -> Result<Vec<u8>, ConvertError> {
    tokio::task::spawn_blocking(move || from_image_blocking(image))
        .await
        .map_err(|e| ConvertError::Internal(format!("assemble task panicked: {e}")))?
}

fn from_image_blocking(image: DynamicImage) -> Result<Vec<u8>, ConvertError> {
    let render_err = |detail: String| ConvertError::Render {
        stage: "pdf-assemble".into(),
        detail,
    };

    // Bake the fixed JPEG quality into the pixels before embedding.
    let jpeg = raster::encode(&image, TargetFormat::Jpg)?;
    let baked = image::load_from_memory(&jpeg).map_err(|e| ConvertError::Decode {
        kind: SourceKind::Image,
        detail: format!("re-encoded JPEG did not decode: {e}"),
    })?;

    let (width, height) = (baked.width() as f32, baked.height() as f32);

    let pdfium = bind_pdfium()?;
    let mut document = pdfium
        .create_new_pdf()
        .map_err(|e| render_err(format!("{e:?}")))?;
    let mut page = document
        .pages_mut()
        .create_page_at_end(PdfPagePaperSize::Custom(
            PdfPoints::new(width),
            PdfPoints::new(height),
        ))
        .map_err(|e| render_err(format!("{e:?}")))?;

    page.objects_mut()
        .create_image_object(
            PdfPoints::new(0.0),
            PdfPoints::new(0.0),
            &baked,
            Some(PdfPoints::new(width)),
            Some(PdfPoints::new(height)),
        )
        .map_err(|e| render_err(format!("{e:?}")))?;

    let bytes = document
        .save_to_bytes()
        .map_err(|e| render_err(format!("{e:?}")))?;
    debug!(
        "Assembled {}x{} image into a {} byte PDF page",
        width, height, bytes.len()
    );
    Ok(bytes)
}
