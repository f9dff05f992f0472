//! Conversion results: one output blob plus a suggested filename.

use crate::request::TargetFormat;
use chrono::Utc;

/// A successful conversion: exactly one output byte buffer and a suggested
/// download filename. Transient — nothing here persists across requests.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// The converted document, ready to write as-is.
    pub bytes: Vec<u8>,
    /// Suggested filename of the form `PicShift_<format>_<millis>.<ext>`.
    pub filename: String,
    /// The format the bytes are encoded in.
    pub target: TargetFormat,
}

impl ConversionOutput {
    pub(crate) fn new(bytes: Vec<u8>, target: TargetFormat) -> Self {
        Self {
            bytes,
            filename: suggested_filename(target),
            target,
        }
    }
}

/// `PicShift_<format>_<timestamp-millis>.<extension>`.
pub fn suggested_filename(target: TargetFormat) -> String {
    format!(
        "PicShift_{}_{}.{}",
        target.as_str(),
        Utc::now().timestamp_millis(),
        target.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_shape() {
        let name = suggested_filename(TargetFormat::Word);
        assert!(name.starts_with("PicShift_word_"), "got: {name}");
        assert!(name.ends_with(".docx"), "got: {name}");

        let name = suggested_filename(TargetFormat::Png);
        assert!(name.starts_with("PicShift_png_"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn filename_timestamp_is_numeric() {
        let name = suggested_filename(TargetFormat::Excel);
        let middle = name
            .strip_prefix("PicShift_excel_")
            .and_then(|s| s.strip_suffix(".xlsx"))
            .expect("filename shape");
        assert!(middle.chars().all(|c| c.is_ascii_digit()), "got: {middle}");
    }
}
