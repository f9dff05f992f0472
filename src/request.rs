//! Request types: what to convert, into what, at what size.
//!
//! The source kind is decided exactly once, at ingestion, and carried as a
//! tagged enum from then on — no MIME or extension strings are compared
//! anywhere inside the pipeline. A [`SourceDocument`]'s kind is immutable
//! after construction.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared kind of an ingested document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Any raster image the codec stack can decode (JPEG, PNG, HEIC, …).
    Image,
    /// A PDF document.
    Pdf,
    /// A word-processing container (.docx).
    Word,
    /// A spreadsheet container (.xlsx).
    Excel,
}

impl SourceKind {
    /// Sniff the source kind from magic bytes, falling back to the file
    /// name extension for the office containers (both are ZIP archives,
    /// so magic bytes alone cannot tell them apart).
    ///
    /// Returns `None` when the bytes match nothing this pipeline accepts.
    pub fn detect(bytes: &[u8], filename: &str) -> Option<SourceKind> {
        if bytes.starts_with(b"%PDF") {
            return Some(SourceKind::Pdf);
        }
        let lower = filename.to_ascii_lowercase();
        if bytes.starts_with(b"PK\x03\x04") {
            if lower.ends_with(".docx") {
                return Some(SourceKind::Word);
            }
            if lower.ends_with(".xlsx") {
                return Some(SourceKind::Excel);
            }
            return None;
        }
        // HEIC carries an ISO-BMFF `ftyp` box rather than a codec magic
        // the image crate recognises.
        if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
            return Some(SourceKind::Image);
        }
        if image::guess_format(bytes).is_ok() {
            return Some(SourceKind::Image);
        }
        None
    }
}

/// Requested output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Jpg,
    Png,
    Pdf,
    Word,
    Excel,
}

impl TargetFormat {
    /// Lowercase format name as it appears in output filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetFormat::Jpg => "jpg",
            TargetFormat::Png => "png",
            TargetFormat::Pdf => "pdf",
            TargetFormat::Word => "word",
            TargetFormat::Excel => "excel",
        }
    }

    /// File extension for the output blob.
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Word => "docx",
            TargetFormat::Excel => "xlsx",
            other => other.as_str(),
        }
    }

    /// The targets a given source kind may convert into.
    pub fn allowed_for(kind: SourceKind) -> &'static [TargetFormat] {
        use TargetFormat::*;
        match kind {
            SourceKind::Image => &[Jpg, Png, Pdf],
            SourceKind::Pdf => &[Jpg, Png, Word, Excel],
            SourceKind::Word => &[Pdf],
            SourceKind::Excel => &[Pdf],
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical unit for custom-size requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    Cm,
    Inch,
}

impl SizeUnit {
    /// Pixels per unit at the assumed 300 DPI rasterisation density.
    /// 118.11 ≈ 300 dpi ÷ 2.54 cm per inch.
    pub fn pixels_per_unit(&self) -> f32 {
        match self {
            SizeUnit::Inch => 300.0,
            SizeUnit::Cm => 118.11,
        }
    }
}

/// Custom physical output size. Dimensions arrive as decimal strings,
/// exactly as a form surface supplies them; they are validated and parsed
/// when the request is dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    pub width: String,
    pub height: String,
    pub unit: SizeUnit,
}

impl Geometry {
    /// Parse both dimensions into physical sizes, rejecting anything that
    /// is not a positive finite decimal.
    pub fn parse(&self) -> Result<(f32, f32), ConvertError> {
        let dim = |label: &str, raw: &str| -> Result<f32, ConvertError> {
            let v: f32 = raw.trim().parse().map_err(|_| {
                ConvertError::InvalidGeometry(format!("{label} '{raw}' is not a decimal number"))
            })?;
            if !v.is_finite() || v <= 0.0 {
                return Err(ConvertError::InvalidGeometry(format!(
                    "{label} must be positive, got {raw}"
                )));
            }
            Ok(v)
        };
        Ok((dim("width", &self.width)?, dim("height", &self.height)?))
    }
}

/// An ingested document: opaque bytes plus the kind declared once at
/// ingestion. Immutable thereafter.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    bytes: Vec<u8>,
    kind: SourceKind,
}

impl SourceDocument {
    pub fn new(bytes: Vec<u8>, kind: SourceKind) -> Self {
        Self { bytes, kind }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// One conversion request: source document, target format, and an optional
/// custom output geometry (consulted only for image sources; absence means
/// "original size").
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source: SourceDocument,
    pub target: TargetFormat,
    pub geometry: Option<Geometry>,
}

impl ConversionRequest {
    pub fn new(source: SourceDocument, target: TargetFormat) -> Self {
        Self {
            source,
            target,
            geometry: None,
        }
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Reject pairs outside the allowed conversion set.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if !TargetFormat::allowed_for(self.source.kind()).contains(&self.target) {
            return Err(ConvertError::UnsupportedConversion {
                from: self.source.kind(),
                target: self.target,
            });
        }
        Ok(())
    }
}
