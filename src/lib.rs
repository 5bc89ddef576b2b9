#![forbid(unsafe_code)]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A PNG codec built around pixel blocks.
//!
//! A [`PixelBlock`] is a row-major byte buffer that describes its own layout:
//! a row pitch, a pixel size, and a byte offset for each of the red, green,
//! blue, and alpha channels. The decoder turns any legal PNG datastream into
//! such a block (8 bits per channel, grayscale or RGB, with or without alpha),
//! and the encoder turns any block into the smallest PNG colour type that can
//! hold it.
//!
//! ```no_run
//! use pngblock::png::*;
//! # fn main() -> Result<(), pngblock::PngError> {
//! let bytes: &[u8] = unimplemented!("data from somewhere");
//! if let Some((w, h)) = png_match(bytes) {
//!   println!("a {w}x{h} png");
//! }
//! let decoded = decode_png_bytes(bytes)?;
//! let again = encode_png_to_vec(&decoded.block, &TextAnnotations::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! The byte source and sink are plain [`std::io::Read`] and
//! [`std::io::Write`] values. A source that runs dry, or a sink that refuses
//! bytes, is reported as an error rather than retried.

pub mod error;
pub use error::*;

pub mod pixel_block;
pub use pixel_block::*;

pub mod png;

/// Used by various image formats that support sRGB colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
// Note: This doesn't have direct impls to parse to and from bytes because each
// format uses different bytes to mean each of these options.
pub enum SrgbIntent {
  /// for images preferring good adaptation to the output device gamut at the
  /// expense of colorimetric accuracy, such as photographs.
  Perceptual,
  /// for images requiring colour appearance matching (relative to the output
  /// device white point), such as logos.
  RelativeColorimetric,
  /// for images preferring preservation of saturation at the expense of hue and
  /// lightness, such as charts and graphs.
  Saturation,
  /// for images requiring preservation of absolute colorimetry, such as
  /// previews of images destined for a different output device (proofs).
  AbsoluteColorimetric,
}
