//! Raster engine: decode, constrained resize, re-encode.
//!
//! Sizing follows a fixed 300 DPI rasterisation density: a physical size
//! request is converted at 300 px/inch or 118.11 px/cm, then both dimensions
//! are clamped by a single ratio so the larger never exceeds
//! [`MAX_RESOLUTION`] and aspect ratio is preserved. Lossy output uses a
//! fixed quality factor to bound file size.
//!
//! HEIC inputs are normalised to JPEG before entering the pixel pipeline —
//! a mandatory pre-step, gated behind the `heic` cargo feature because it
//! needs the native libheif.

use crate::error::ConvertError;
use crate::request::{Geometry, SourceKind, TargetFormat};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Largest dimension a produced raster may have, in pixels.
pub const MAX_RESOLUTION: f32 = 4096.0;

/// Fixed JPEG quality factor (0.7) bounding lossy output size.
pub const JPEG_QUALITY: u8 = 70;

/// True when the bytes carry an ISO-BMFF `ftyp` box with a HEIC/HEIF brand.
pub fn is_heic(bytes: &[u8]) -> bool {
    if bytes.len() < 12 || &bytes[4..8] != b"ftyp" {
        return false;
    }
    matches!(&bytes[8..12], b"heic" | b"heix" | b"hevc" | b"mif1" | b"msf1")
}

/// Decode image bytes into a pixel buffer, normalising HEIC first.
///
/// The intermediate decode handles are scoped to this call and dropped on
/// every exit path.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ConvertError> {
    if is_heic(bytes) {
        let jpeg = normalize_heic(bytes)?;
        return image::load_from_memory(&jpeg).map_err(|e| ConvertError::Decode {
            kind: SourceKind::Image,
            detail: format!("normalised HEIC did not re-decode: {e}"),
        });
    }
    image::load_from_memory(bytes).map_err(|e| ConvertError::Decode {
        kind: SourceKind::Image,
        detail: e.to_string(),
    })
}

/// HEIC → JPEG normalisation via libheif.
#[cfg(feature = "heic")]
fn normalize_heic(bytes: &[u8]) -> Result<Vec<u8>, ConvertError> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let decode_err = |detail: String| ConvertError::Decode {
        kind: SourceKind::Image,
        detail,
    };

    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(bytes).map_err(|e| decode_err(e.to_string()))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| decode_err(e.to_string()))?;
    let decoded = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| decode_err(e.to_string()))?;

    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| decode_err("HEIC decode produced no interleaved RGB plane".into()))?;
    let (width, height, stride) = (plane.width, plane.height, plane.stride);

    let mut rgb = image::RgbImage::new(width, height);
    for (row_index, row) in plane.data.chunks(stride).take(height as usize).enumerate() {
        for col in 0..width as usize {
            let i = col * 3;
            rgb.put_pixel(
                col as u32,
                row_index as u32,
                image::Rgb([row[i], row[i + 1], row[i + 2]]),
            );
        }
    }

    debug!("Normalised HEIC input → {}x{} JPEG", width, height);
    encode(&DynamicImage::ImageRgb8(rgb), TargetFormat::Jpg)
}

#[cfg(not(feature = "heic"))]
fn normalize_heic(_bytes: &[u8]) -> Result<Vec<u8>, ConvertError> {
    Err(ConvertError::ServiceUnavailable {
        service: "heic-decoder".into(),
        hint: "rebuild with `--features heic` (requires the system libheif)".into(),
    })
}

/// Compute target pixel dimensions from an optional custom geometry.
///
/// `None` passes the original dimensions through; a geometry converts
/// physical size to pixels at 300 DPI. Either way the clamp then scales
/// both dimensions by `min(MAX/W, MAX/H)` when one exceeds the maximum.
pub fn target_dimensions(
    original_width: u32,
    original_height: u32,
    geometry: Option<&Geometry>,
) -> Result<(u32, u32), ConvertError> {
    let (mut w, mut h) = match geometry {
        None => (original_width as f32, original_height as f32),
        Some(g) => {
            let (pw, ph) = g.parse()?;
            let factor = g.unit.pixels_per_unit();
            (pw * factor, ph * factor)
        }
    };

    if w > MAX_RESOLUTION || h > MAX_RESOLUTION {
        let ratio = (MAX_RESOLUTION / w).min(MAX_RESOLUTION / h);
        debug!("Clamping {}x{} by ratio {:.4}", w, h, ratio);
        w *= ratio;
        h *= ratio;
    }

    Ok(((w.round() as u32).max(1), (h.round() as u32).max(1)))
}

/// Resize with a quality-biased filter; identity sizes pass through.
pub fn resize(image: DynamicImage, width: u32, height: u32) -> DynamicImage {
    if image.width() == width && image.height() == height {
        return image;
    }
    image.resize_exact(width, height, FilterType::Lanczos3)
}

/// Encode a pixel buffer to the requested raster format.
///
/// JPEG uses the fixed quality factor; PNG is lossless. Only raster targets
/// are valid here.
pub fn encode(image: &DynamicImage, target: TargetFormat) -> Result<Vec<u8>, ConvertError> {
    let render_err = |e: image::ImageError| ConvertError::Render {
        stage: "raster-encode".into(),
        detail: e.to_string(),
    };

    let mut buf = Vec::new();
    match target {
        TargetFormat::Jpg => {
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
            // JPEG has no alpha channel.
            image.to_rgb8().write_with_encoder(encoder).map_err(render_err)?;
        }
        TargetFormat::Png => {
            image
                .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
                .map_err(render_err)?;
        }
        other => {
            return Err(ConvertError::Render {
                stage: "raster-encode".into(),
                detail: format!("{other} is not a raster format"),
            })
        }
    }
    Ok(buf)
}
