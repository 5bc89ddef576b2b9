use super::*;

/// Palette data
///
/// Palette entries are always RGB, 8 bits per channel, and there's at most 256
/// of them.
///
/// If you want to have a paletted image with transparency then the transparency
/// info goes in a separate transparency chunk.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct PLTE(Vec<[u8; 3]>);
impl TryFrom<&[u8]> for PLTE {
  type Error = PngError;
  #[inline]
  fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
    let entries: &[[u8; 3]] = bytemuck::try_cast_slice(data)
      .map_err(|_| PngError::MalformedChunkSequence("PLTE length is not a multiple of 3"))?;
    if entries.is_empty() || entries.len() > 256 {
      return Err(PngError::MalformedChunkSequence("PLTE must have 1 to 256 entries"));
    }
    Ok(Self(entries.to_vec()))
  }
}
impl core::fmt::Debug for PLTE {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    // currently prints no more than 4 palette entries
    f.debug_tuple("PLTE").field(&&self.0[..self.0.len().min(4)]).field(&self.0.len()).finish()
  }
}
impl PLTE {
  /// Gets the entries as a slice.
  #[inline]
  #[must_use]
  pub fn entries(&self) -> &[[u8; 3]] {
    &self.0
  }

  /// Looks up a palette index.
  ///
  /// An index past the end of the palette is an error in the PNG, but it's
  /// treated as black rather than failing the whole decode.
  #[inline]
  #[must_use]
  pub fn rgb(&self, index: u8) -> [u8; 3] {
    self.0.get(usize::from(index)).copied().unwrap_or([0, 0, 0])
  }
}

#[test]
fn test_plte_parse() {
  let plte = PLTE::try_from(&[1, 2, 3, 4, 5, 6][..]).unwrap();
  assert_eq!(plte.entries(), &[[1, 2, 3], [4, 5, 6]]);
  assert_eq!(plte.rgb(1), [4, 5, 6]);
  assert_eq!(plte.rgb(2), [0, 0, 0]);
  //
  assert!(PLTE::try_from(&[1, 2, 3, 4][..]).is_err());
  assert!(PLTE::try_from(&[][..]).is_err());
  assert!(PLTE::try_from(&[0_u8; 257 * 3][..]).is_err());
}
