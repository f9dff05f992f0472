//! # picshift
//!
//! Local file conversion: images, PDF, Word and Excel, with no server
//! round-trip.
//!
//! ## Why this crate?
//!
//! Everyday document conversions usually mean uploading files to a web
//! service and trusting it with the contents. This crate does the whole job
//! in-process: raster resizing, PDF rasterisation, reading-order text
//! extraction, and office-container assembly all run locally, and the input
//! bytes never leave the machine.
//!
//! ## Pipeline Overview
//!
//! ```text
//! source bytes
//!  │
//!  ├─ 1. Ingest    sniff the source kind once (magic bytes + extension)
//!  ├─ 2. Validate  gate the (source, target) pair against the closed table
//!  ├─ 3. Decode    pixels, positioned text runs, or an HTML fragment
//!  ├─ 4. Reshape   resize/clamp, reading-order rebuild, or row bucketing
//!  ├─ 5. Assemble  encode JPEG/PNG, or pack .docx/.xlsx/PDF
//!  └─ 6. Output    one blob + a PicShift_<format>_<millis>.<ext> filename
//! ```
//!
//! Supported conversions: image → JPEG/PNG/PDF (with optional physical
//! sizing in cm or inches at 300 DPI), PDF → JPEG/PNG/Word/Excel, and
//! Word/Excel → PDF.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use picshift::{convert, ConversionRequest, SourceDocument, SourceKind, TargetFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("photo.heic")?;
//!     let kind = SourceKind::detect(&bytes, "photo.heic").expect("recognised input");
//!     let request = ConversionRequest::new(SourceDocument::new(bytes, kind), TargetFormat::Jpg);
//!     let output = convert(request).await?;
//!     std::fs::write(&output.filename, &output.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `picshift` binary (clap + anyhow + tracing-subscriber) |
//! | `heic`  | off     | HEIC/HEIF input decoding via the system libheif |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only
//! deps:
//! ```toml
//! picshift = { version = "0.1", default-features = false }
//! ```
//!
//! The PDF legs need a pdfium dynamic library at runtime; point
//! `PDFIUM_DYNAMIC_LIB_PATH` at it if it is not on the default search path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod convert;
pub mod error;
pub mod fonts;
pub mod output;
pub mod pipeline;
pub mod request;
pub mod state;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use convert::convert;
pub use error::ConvertError;
pub use output::{suggested_filename, ConversionOutput};
pub use request::{
    ConversionRequest, Geometry, SizeUnit, SourceDocument, SourceKind, TargetFormat,
};
pub use state::{ConverterState, StateEvent};
