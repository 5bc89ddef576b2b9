use super::*;

/// The types of color that PNG supports.
///
/// The value is a small bitmask: `1` means "uses a palette", `2` means "has
/// color" and `4` means "has alpha".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  ///
  /// The palette will have RGB8 data. There may optionally be a transparency
  /// chunk.
  Index = 3,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// Bit set when the image uses a palette.
  pub const MASK_PALETTE: u8 = 1;
  /// Bit set when the image has color.
  pub const MASK_COLOR: u8 = 2;
  /// Bit set when the image has an alpha channel.
  pub const MASK_ALPHA: u8 = 4;

  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Y => 1,
      Self::RGB => 3,
      Self::Index => 1,
      Self::YA => 2,
      Self::RGBA => 4,
    }
  }
  /// If the color type has the "color" bit.
  #[inline]
  #[must_use]
  pub const fn has_color(self) -> bool {
    (self as u8 & Self::MASK_COLOR) != 0
  }
  /// If the color type has the "alpha" bit.
  #[inline]
  #[must_use]
  pub const fn has_alpha(self) -> bool {
    (self as u8 & Self::MASK_ALPHA) != 0
  }
  /// If the color type has the "palette" bit.
  #[inline]
  #[must_use]
  pub const fn is_palette(self) -> bool {
    (self as u8 & Self::MASK_PALETTE) != 0
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => PngColorType::Y,
      2 => PngColorType::RGB,
      3 => PngColorType::Index,
      4 => PngColorType::YA,
      6 => PngColorType::RGBA,
      _ => return Err(PngError::InvalidHeader("illegal color type")),
    })
  }
}

/// Image Header
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IHDR {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per channel
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: PngColorType,
  /// if the image data is stored with Adam7 interlacing.
  pub is_interlaced: bool,
}
impl IHDR {
  /// Bits used by a single pixel.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * self.color_type.channel_count()
  }

  /// The byte distance used by the filters to find the "previous" pixel.
  ///
  /// This is bytes per pixel rounded up, and at least 1. With a bit depth below
  /// 8 several pixels share a byte, and the filters work on whole bytes.
  #[inline]
  #[must_use]
  pub const fn filter_chunk_size(&self) -> usize {
    let bytes = (self.bits_per_pixel() + 7) / 8;
    if bytes == 0 {
      1
    } else {
      bytes
    }
  }

  /// Bytes in one scanline of the given width, not counting the filter byte.
  ///
  /// When pixels are less than 8 bits it's possible to end up with partial
  /// bytes on the end, so we must round up.
  #[inline]
  #[must_use]
  pub const fn bytes_per_scanline(&self, width: u32) -> usize {
    let bits_per_line = self.bits_per_pixel().saturating_mul(width as usize);
    (bits_per_line / 8) + (bits_per_line % 8 != 0) as usize
  }

  /// Gets the buffer size required to perform zlib decompression.
  ///
  /// * Interlaced images use all 7 reduced images, each line of which has its
  ///   own filter byte. Empty reduced images use no bytes.
  /// * Non-interlaced images are just one image at full size.
  #[must_use]
  pub fn get_zlib_decompression_requirement(&self) -> usize {
    image_passes(self.width, self.height, self.is_interlaced)
      .map(|pass| {
        let bytes_per_filterline = self.bytes_per_scanline(pass.width).saturating_add(1);
        bytes_per_filterline.saturating_mul(pass.height as usize)
      })
      .fold(0_usize, |total, bytes| total.saturating_add(bytes))
  }

  /// The 13 data bytes of this header as an `IHDR` chunk.
  #[inline]
  #[must_use]
  pub fn to_chunk_data(&self) -> [u8; 13] {
    let [w0, w1, w2, w3] = self.width.to_be_bytes();
    let [h0, h1, h2, h3] = self.height.to_be_bytes();
    [
      w0,
      w1,
      w2,
      w3,
      h0,
      h1,
      h2,
      h3,
      self.bit_depth,
      self.color_type as u8,
      0, // compression method: deflate
      0, // filter method: adaptive
      self.is_interlaced as u8,
    ]
  }
}
impl TryFrom<&[u8]> for IHDR {
  type Error = PngError;
  fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
    match value {
      [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] =>
      {
        let width = u32::from_be_bytes([*w0, *w1, *w2, *w3]);
        let height = u32::from_be_bytes([*h0, *h1, *h2, *h3]);
        if width == 0 || height == 0 {
          return Err(PngError::InvalidHeader("width or height is zero"));
        }
        if width > MAX_CHUNK_LEN || height > MAX_CHUNK_LEN {
          return Err(PngError::InvalidHeader("width or height exceeds 2^31-1"));
        }
        if *compression_method != 0 {
          return Err(PngError::InvalidHeader("unknown compression method"));
        }
        if *filter_method != 0 {
          return Err(PngError::InvalidHeader("unknown filter method"));
        }
        Ok(Self {
          width,
          height,
          bit_depth: match *color_type {
            0 if [1, 2, 4, 8, 16].contains(bit_depth) => *bit_depth,
            2 if [8, 16].contains(bit_depth) => *bit_depth,
            3 if [1, 2, 4, 8].contains(bit_depth) => *bit_depth,
            4 if [8, 16].contains(bit_depth) => *bit_depth,
            6 if [8, 16].contains(bit_depth) => *bit_depth,
            _ => return Err(PngError::InvalidHeader("illegal bit depth for the color type")),
          },
          color_type: PngColorType::try_from(*color_type)?,
          is_interlaced: match interlace_method {
            0 => false,
            1 => true,
            _ => return Err(PngError::InvalidHeader("unknown interlace method")),
          },
        })
      }
      _ => Err(PngError::MalformedChunkSequence("IHDR chunk length is not 13")),
    }
  }
}

#[test]
fn test_ihdr_parse_and_write() {
  let ihdr = IHDR {
    width: 300,
    height: 2,
    bit_depth: 4,
    color_type: PngColorType::Index,
    is_interlaced: true,
  };
  let bytes = ihdr.to_chunk_data();
  assert_eq!(bytes, [0, 0, 1, 44, 0, 0, 0, 2, 4, 3, 0, 0, 1]);
  assert_eq!(IHDR::try_from(&bytes[..]).unwrap(), ihdr);
  //
  let mut bad_depth = bytes;
  bad_depth[8] = 16;
  assert!(matches!(IHDR::try_from(&bad_depth[..]), Err(PngError::InvalidHeader(_))));
  let mut bad_color = bytes;
  bad_color[9] = 5;
  assert!(matches!(IHDR::try_from(&bad_color[..]), Err(PngError::InvalidHeader(_))));
  let mut zero_width = bytes;
  zero_width[..4].copy_from_slice(&[0; 4]);
  assert!(matches!(IHDR::try_from(&zero_width[..]), Err(PngError::InvalidHeader(_))));
  let mut bad_interlace = bytes;
  bad_interlace[12] = 2;
  assert!(matches!(IHDR::try_from(&bad_interlace[..]), Err(PngError::InvalidHeader(_))));
  assert!(IHDR::try_from(&bytes[..12]).is_err());
}

#[test]
fn test_ihdr_line_sizes() {
  let mut ihdr =
    IHDR { width: 10, height: 3, bit_depth: 1, color_type: PngColorType::Y, is_interlaced: false };
  assert_eq!(ihdr.filter_chunk_size(), 1);
  assert_eq!(ihdr.bytes_per_scanline(10), 2);
  assert_eq!(ihdr.get_zlib_decompression_requirement(), 3 * 3);
  //
  ihdr.bit_depth = 16;
  ihdr.color_type = PngColorType::RGBA;
  assert_eq!(ihdr.filter_chunk_size(), 8);
  assert_eq!(ihdr.bytes_per_scanline(10), 80);
  //
  ihdr.bit_depth = 8;
  ihdr.color_type = PngColorType::RGB;
  assert_eq!(ihdr.filter_chunk_size(), 3);
  //
  // 1x1 interlaced is a single line of a single pixel
  let tiny =
    IHDR { width: 1, height: 1, bit_depth: 8, color_type: PngColorType::YA, is_interlaced: true };
  assert_eq!(tiny.get_zlib_decompression_requirement(), 1 + 2);
}
