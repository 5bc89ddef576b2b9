use super::*;

/// Standard RGB colour space
///
/// When this chunk is present the image samples are in the sRGB color space,
/// and the rendering intent says how to map them to an output device.
///
/// Spec: [sRGB](https://www.w3.org/TR/png/#11sRGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(nonstandard_style)]
pub struct sRGB(pub SrgbIntent);
impl TryFrom<&[u8]> for sRGB {
  type Error = PngError;
  #[inline]
  fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
    Ok(Self(match data {
      [0] => SrgbIntent::Perceptual,
      [1] => SrgbIntent::RelativeColorimetric,
      [2] => SrgbIntent::Saturation,
      [3] => SrgbIntent::AbsoluteColorimetric,
      _ => return Err(PngError::MalformedChunkSequence("illegal sRGB chunk data")),
    }))
  }
}
impl sRGB {
  /// The gamma that sRGB data is approximately stored with.
  pub const FILE_GAMMA: gAMA = gAMA(45455);
}

#[test]
fn test_srgb_parse() {
  assert_eq!(sRGB::try_from(&[2][..]).unwrap(), sRGB(SrgbIntent::Saturation));
  assert!(sRGB::try_from(&[4][..]).is_err());
  assert!(sRGB::try_from(&[0, 0][..]).is_err());
}
