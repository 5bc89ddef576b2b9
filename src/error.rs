//! The crate error type.

use std::io;

use thiserror::Error;

use crate::png::PngRawChunkType;

/// Result alias used throughout the crate.
pub type PngResult<T> = Result<T, PngError>;

/// An error from the `pngblock` crate.
///
/// Probing (see [`png_match`](crate::png::png_match)) never produces one of
/// these: a non-PNG input is an expected negative result, not a failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PngError {
  /// The signature or the first chunk didn't mark this as PNG data.
  #[error("not a PNG datastream")]
  NotAPng,

  /// A chunk's declared CRC doesn't match its contents.
  #[error("CRC mismatch in {chunk:?} chunk (declared {declared:#010x}, computed {computed:#010x})")]
  CrcMismatch {
    /// The chunk that failed.
    chunk: PngRawChunkType,
    /// CRC stored in the datastream.
    declared: u32,
    /// CRC computed from the chunk bytes.
    computed: u32,
  },

  /// The byte source ran out (or failed) before a full read.
  #[error("byte source ended early: {0}")]
  TruncatedRead(#[source] io::Error),

  /// The byte sink didn't accept all the bytes of a write.
  #[error("byte sink refused a write: {0}")]
  ShortWrite(#[source] io::Error),

  /// The zlib primitive failed, or the image data stream ended early.
  #[error("compression failure: {0}")]
  CompressionFailure(String),

  /// Chunks are out of order, missing, or have impossible lengths.
  #[error("malformed chunk sequence: {0}")]
  MalformedChunkSequence(&'static str),

  /// The `IHDR` chunk holds values the PNG standard doesn't allow.
  #[error("invalid image header: {0}")]
  InvalidHeader(&'static str),

  /// The image can't be mapped into a pixel block with the active
  /// capabilities.
  #[error("unsupported feature: {0}")]
  UnsupportedFeature(&'static str),

  /// The image is larger than the decoder's configured limits.
  #[error("image dimensions {width}x{height} exceed the decoder limits")]
  DimensionsTooLarge {
    /// declared width
    width: u32,
    /// declared height
    height: u32,
  },

  /// A scanline starts with a filter type byte other than 0 through 4.
  #[error("illegal adaptive filter type {0}")]
  IllegalAdaptiveFilterType(u8),

  /// The decompressed data is shorter than the header's geometry requires.
  #[error("not enough decompressed data for the image geometry")]
  UnfilterWasNotGivenEnoughData,

  /// A pixel block given to the encoder is inconsistent with its own buffer.
  #[error("invalid pixel block: {0}")]
  InvalidPixelBlock(&'static str),

  /// A text annotation can't be stored in a PNG text chunk.
  #[error("invalid text annotation: {0}")]
  InvalidText(&'static str),
}
impl PngError {
  /// `true` for the errors that mean "this isn't PNG data at all".
  ///
  /// Hosts that try several codecs in turn use this to move on to the next
  /// codec instead of reporting a failure.
  #[inline]
  #[must_use]
  pub const fn is_not_png(&self) -> bool {
    matches!(self, Self::NotAPng)
  }
}
