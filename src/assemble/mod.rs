//! Output assemblers: intermediate forms into final document bytes.
//!
//! Each assembler owns one container format. They are the inverse of the
//! pipeline decoders and share their vocabulary: [`word`] consumes logical
//! paragraphs, [`sheet`] consumes a table grid, [`pdf`] consumes a pixel
//! buffer.

pub mod pdf;
pub mod sheet;
pub mod word;
