use super::*;

/// `tRNS`: Transparency
///
/// Stores additional transparency data for images without an alpha channel.
///
/// * `Y` and `RGB` each store a single color. All samples of that color in the
///   image are fully transparent (alpha 0), while the rest are fully opaque
///   (alpha maximum). The `tRNS` chunk always uses a `u16` to store the value,
///   even if the image's bit depth is less than 16.
/// * `Index` has an alpha value that goes along with the rest of the palette
///   data. The transparency slice length should be less than or equal to the
///   palette slice length. If the transparency slice is shorter, all missing
///   entries should be assumed to have an alpha value of 255.
///
/// Unlike a plain length check, parsing needs the color type, because a
/// palette image with 2 or 6 alpha entries would otherwise look like a key
/// color.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(nonstandard_style)]
pub enum tRNS {
  /// Transparent gray sample
  Y {
    /// the sample value
    y: u16,
  },
  /// Transparent RGB sample
  RGB {
    /// red sample value
    r: u16,
    /// green sample value
    g: u16,
    /// blue sample value
    b: u16,
  },
  /// Alpha for each palette entry
  Index {
    /// alpha values, in palette order
    alphas: Vec<u8>,
  },
}
impl tRNS {
  /// Parses chunk data for the given color type.
  ///
  /// Gives `None` when the data doesn't fit the color type, or the color type
  /// already has an alpha channel (in which case a `tRNS` isn't allowed).
  #[must_use]
  pub fn parse(color_type: PngColorType, data: &[u8]) -> Option<Self> {
    Some(match (color_type, data) {
      (PngColorType::Y, [y0, y1]) => Self::Y { y: u16::from_be_bytes([*y0, *y1]) },
      (PngColorType::RGB, [r0, r1, g0, g1, b0, b1]) => Self::RGB {
        r: u16::from_be_bytes([*r0, *r1]),
        g: u16::from_be_bytes([*g0, *g1]),
        b: u16::from_be_bytes([*b0, *b1]),
      },
      (PngColorType::Index, alphas) if alphas.len() <= 256 => {
        Self::Index { alphas: alphas.to_vec() }
      }
      _ => return None,
    })
  }

  /// Alpha for a raw gray sample (at the image's bit depth).
  #[inline]
  #[must_use]
  pub fn gray_alpha(&self, y: u16) -> u8 {
    match self {
      Self::Y { y: key } if *key == y => 0,
      _ => u8::MAX,
    }
  }

  /// Alpha for a raw RGB sample (at the image's bit depth).
  #[inline]
  #[must_use]
  pub fn rgb_alpha(&self, rgb: [u16; 3]) -> u8 {
    match self {
      Self::RGB { r, g, b } if [*r, *g, *b] == rgb => 0,
      _ => u8::MAX,
    }
  }

  /// Alpha for a palette index.
  #[inline]
  #[must_use]
  pub fn index_alpha(&self, index: u8) -> u8 {
    match self {
      Self::Index { alphas } => alphas.get(usize::from(index)).copied().unwrap_or(u8::MAX),
      _ => u8::MAX,
    }
  }
}

#[test]
fn test_trns_parse_by_color_type() {
  assert_eq!(tRNS::parse(PngColorType::Y, &[0, 7]), Some(tRNS::Y { y: 7 }));
  assert_eq!(
    tRNS::parse(PngColorType::RGB, &[0, 1, 0, 2, 1, 0]),
    Some(tRNS::RGB { r: 1, g: 2, b: 256 })
  );
  // two alpha entries for a palette image, not a gray key
  assert_eq!(
    tRNS::parse(PngColorType::Index, &[0, 7]),
    Some(tRNS::Index { alphas: vec![0, 7] })
  );
  assert_eq!(tRNS::parse(PngColorType::Y, &[0, 7, 1]), None);
  assert_eq!(tRNS::parse(PngColorType::RGBA, &[0, 7]), None);
  assert_eq!(tRNS::parse(PngColorType::YA, &[0, 7]), None);
  //
  let t = tRNS::parse(PngColorType::Index, &[0, 128]).unwrap();
  assert_eq!(t.index_alpha(0), 0);
  assert_eq!(t.index_alpha(1), 128);
  assert_eq!(t.index_alpha(2), 255);
  //
  let t = tRNS::RGB { r: 1, g: 2, b: 3 };
  assert_eq!(t.rgb_alpha([1, 2, 3]), 0);
  assert_eq!(t.rgb_alpha([1, 2, 4]), 255);
  assert_eq!(t.gray_alpha(1), 255);
}
