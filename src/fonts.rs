//! The bundled Thai-capable typeface.
//!
//! The PDF renderer needs a Unicode font with Thai coverage (Sarabun) to
//! shape scripts the built-in PDF base fonts cannot. The payload is embedded
//! at compile time and decoded once at first use; a runtime override lets
//! deployments swap the face without rebuilding:
//!
//! 1. `PICSHIFT_FONT_PATH` — path to a TrueType file read at first use.
//! 2. The compiled-in `assets/fonts/Sarabun.ttf` payload.
//!
//! A payload shorter than [`MIN_VALID_LEN`] is treated as absent (the
//! repository ships a placeholder; drop the real face in before building to
//! enable Thai output) and the renderer silently falls back to Helvetica.

use once_cell::sync::Lazy;
use tracing::{debug, warn};

static EMBEDDED: &[u8] = include_bytes!("../assets/fonts/Sarabun.ttf");

/// Anything shorter cannot be a usable TrueType payload.
const MIN_VALID_LEN: usize = 100;

static THAI_FONT: Lazy<Option<Vec<u8>>> = Lazy::new(|| {
    if let Ok(path) = std::env::var("PICSHIFT_FONT_PATH") {
        match std::fs::read(&path) {
            Ok(bytes) if bytes.len() > MIN_VALID_LEN => {
                debug!("Loaded override font from {} ({} bytes)", path, bytes.len());
                return Some(bytes);
            }
            Ok(_) => warn!("Font at {} too small to be valid; ignoring", path),
            Err(e) => warn!("Could not read PICSHIFT_FONT_PATH={}: {}", path, e),
        }
    }
    if EMBEDDED.len() > MIN_VALID_LEN {
        debug!("Using embedded font payload ({} bytes)", EMBEDDED.len());
        Some(EMBEDDED.to_vec())
    } else {
        debug!("No usable embedded font payload; Helvetica fallback in effect");
        None
    }
});

/// The Thai-capable TrueType payload, if one is available.
///
/// Loaded once per process; `None` means the renderer should fall back to
/// the built-in default face.
pub fn thai_font() -> Option<&'static [u8]> {
    THAI_FONT.as_deref()
}

/// True when the text contains any character from the Thai Unicode block
/// (U+0E00–U+0E7F).
pub fn contains_thai(text: &str) -> bool {
    text.chars().any(|c| ('\u{0E00}'..='\u{0E7F}').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thai_detection() {
        assert!(contains_thai("สวัสดี"));
        assert!(contains_thai("mixed สวัสดี text"));
        assert!(!contains_thai("Hello World"));
        assert!(!contains_thai(""));
    }

    #[test]
    fn boundary_characters() {
        assert!(contains_thai("\u{0E00}"));
        assert!(contains_thai("\u{0E7F}"));
        assert!(!contains_thai("\u{0DFF}"));
        assert!(!contains_thai("\u{0E80}"));
    }
}
