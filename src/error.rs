//! Error types for the picshift library.
//!
//! Every failure inside the conversion pipeline is caught at the top-level
//! [`crate::convert`] boundary and surfaced as one of these typed variants
//! with a human-readable message. No partial output is ever returned: a
//! failure discards any partially built buffer, and the caller decides
//! presentation and whether to resubmit.

use crate::request::{SourceKind, TargetFormat};
use thiserror::Error;

/// All errors returned by the picshift library.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The requested (source, target) pair is not in the allowed set.
    ///
    /// Calling surfaces pre-filter targets with
    /// [`TargetFormat::allowed_for`]; the core rejects bad pairs again at
    /// dispatch.
    #[error("Unsupported conversion: {from:?} → {target}")]
    UnsupportedConversion {
        from: SourceKind,
        target: TargetFormat,
    },

    /// The source bytes could not be parsed as their declared kind
    /// (corrupt PDF, non-image bytes, unreadable office container).
    #[error("Failed to decode {kind:?} input: {detail}")]
    Decode { kind: SourceKind, detail: String },

    /// A required decoding/encoding collaborator could not be obtained.
    ///
    /// Signals an execution-environment setup problem, not a data problem
    /// (e.g. the pdfium library is missing, or a HEIC input arrived while
    /// the crate was built without the `heic` feature).
    #[error("Conversion service '{service}' is unavailable: {hint}")]
    ServiceUnavailable { service: String, hint: String },

    /// Layout, pagination or rasterisation failed partway through.
    #[error("Rendering failed during {stage}: {detail}")]
    Render { stage: String, detail: String },

    /// Reserved: a computed raster would exceed the resolution clamp.
    ///
    /// The clamp in the raster engine prevents this by construction; the
    /// variant exists so future enforcement has a typed home.
    #[error("Resource limit exceeded: {detail}")]
    ResourceLimit { detail: String },

    /// A custom-size request carried an unparsable or non-positive dimension.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}
