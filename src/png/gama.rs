use super::*;

/// Image gamma
///
/// The value is the gamma times 100,000, so `45455` means a gamma of
/// `0.45455` (about `1/2.2`).
///
/// Spec: [gAMA](https://www.w3.org/TR/png/#11gAMA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(nonstandard_style)]
pub struct gAMA(pub u32);
impl gAMA {
  /// The value written by the encoder: a gamma of exactly 1.0.
  pub const IDENTITY: Self = Self(100_000);

  /// The gamma as a float.
  #[inline]
  #[must_use]
  pub fn gamma(self) -> f32 {
    self.0 as f32 / 100_000.0
  }

  /// Chunk data bytes.
  #[inline]
  #[must_use]
  pub const fn to_chunk_data(self) -> [u8; 4] {
    self.0.to_be_bytes()
  }
}
impl TryFrom<&[u8]> for gAMA {
  type Error = PngError;
  #[inline]
  fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
    match data {
      [a, b, c, d] => match u32::from_be_bytes([*a, *b, *c, *d]) {
        0 => Err(PngError::MalformedChunkSequence("gAMA of zero")),
        g => Ok(Self(g)),
      },
      _ => Err(PngError::MalformedChunkSequence("gAMA length is not 4")),
    }
  }
}
