//! Conversion pipeline stages.
//!
//! Data flows one way through here: a source document is decoded into an
//! intermediate form (pixels, positioned text runs, or an HTML fragment),
//! reshaped, and handed to an assembler. Stages are pure where the format
//! allows it; only the pdfium-backed stages ([`pdf`] and [`htmlpdf`]) touch
//! native code, and they do so on the blocking pool.

pub mod htmlpdf;
pub mod layout;
pub mod office;
pub mod pdf;
pub mod raster;
pub mod table;
