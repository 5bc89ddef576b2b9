//! Moving pixels between the PNG pixel formats and pixel blocks.
//!
//! Decoding always produces 8 bits per channel (unless 16-bit stripping is
//! turned off), with the channels in PNG order:
//!
//! | PNG color type | no `tRNS` | with `tRNS` |
//! |:-|:-|:-|
//! | Y | Y | Y A |
//! | YA | Y A | - |
//! | RGB | R G B | R G B A |
//! | RGBA | R G B A | - |
//! | Index | R G B | R G B A |

use std::borrow::Cow;

use bitfrob::u8_replicate_bits;

use super::*;

/// The gamma exponent applied when a stream has no `gAMA` or `sRGB` chunk.
pub const DEFAULT_GAMMA_EXPONENT: f32 = 0.45455;

/// Which pixel transformations the decoder may use.
///
/// An image that needs a transformation that's turned off either fails with
/// [`UnsupportedFeature`](PngError::UnsupportedFeature) or, for 16-bit
/// stripping, keeps its full samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capabilities {
  /// Expand bit depths below 8, palette indexes, and `tRNS` data.
  pub expand: bool,
  /// Reduce 16-bit samples to 8-bit by keeping the high byte.
  ///
  /// When this is off the samples are kept as 2 big-endian bytes and the
  /// channel offsets point at the high byte. This is a legacy mode.
  pub strip_16: bool,
  /// Use the `sRGB` chunk to pick the gamma.
  pub srgb: bool,
  /// Apply gamma correction at all.
  pub gamma: bool,
}
impl Capabilities {
  /// Every capability enabled.
  #[inline]
  #[must_use]
  pub const fn all() -> Self {
    Self { expand: true, strip_16: true, srgb: true, gamma: true }
  }
}
impl Default for Capabilities {
  #[inline]
  fn default() -> Self {
    Self::all()
  }
}

/// The pixel layout the decoder writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputLayout {
  /// bytes per pixel
  pub pixel_size: usize,
  /// bytes per sample (1, or 2 for kept 16-bit samples)
  pub sample_size: usize,
  /// red, green, blue, alpha offsets, in the [`PixelBlock`] convention
  pub offset: [usize; 4],
  /// if an alpha channel is made from `tRNS` data
  pub synthesize_alpha: bool,
}
impl OutputLayout {
  /// Picks the output layout for an image.
  pub fn for_image(header: &IHDR, has_trns: bool, caps: Capabilities) -> PngResult<Self> {
    let color_type = header.color_type;
    if !caps.expand {
      if color_type.is_palette() {
        return Err(PngError::UnsupportedFeature("palette expansion is disabled"));
      }
      if header.bit_depth < 8 {
        return Err(PngError::UnsupportedFeature("low bit depth expansion is disabled"));
      }
      if has_trns {
        return Err(PngError::UnsupportedFeature("transparency expansion is disabled"));
      }
    }
    let sample_size = if header.bit_depth == 16 && !caps.strip_16 { 2 } else { 1 };
    let color_channels = if color_type.has_color() || color_type.is_palette() { 3 } else { 1 };
    let synthesize_alpha = has_trns && !color_type.has_alpha();
    let has_alpha = color_type.has_alpha() || synthesize_alpha;
    let pixel_size = (color_channels + has_alpha as usize) * sample_size;
    let alpha = if has_alpha { pixel_size - sample_size } else { 0 };
    let offset = if color_channels == 3 {
      [0, sample_size, 2 * sample_size, alpha]
    } else {
      [0, 0, 0, alpha]
    };
    Ok(Self { pixel_size, sample_size, offset, synthesize_alpha })
  }

  /// The distinct byte offsets of the color samples.
  #[inline]
  fn color_offsets(&self) -> &[usize] {
    if self.offset[1] == self.offset[0] {
      &self.offset[..1]
    } else {
      &self.offset[..3]
    }
  }
}

/// Turns unfiltered PNG pixels into pixels of an [`OutputLayout`].
#[derive(Debug, Clone, Copy)]
pub struct PixelNormalizer<'s> {
  header: IHDR,
  layout: OutputLayout,
  palette: Option<&'s PLTE>,
  trns: Option<&'s tRNS>,
}
impl<'s> PixelNormalizer<'s> {
  /// Makes a normalizer.
  ///
  /// The palette is only used by indexed color images. Without one, every
  /// index is black.
  #[inline]
  #[must_use]
  pub const fn new(
    header: IHDR, layout: OutputLayout, palette: Option<&'s PLTE>, trns: Option<&'s tRNS>,
  ) -> Self {
    Self { header, layout, palette, trns }
  }

  /// Reads the raw value of sample `channel` from the unfiltered pixel data.
  #[inline]
  fn raw_sample(&self, data: &[u8], channel: usize) -> u16 {
    match self.header.bit_depth {
      16 => u16::from_be_bytes([data[channel * 2], data[channel * 2 + 1]]),
      _ => u16::from(data[channel]),
    }
  }

  /// Writes a raw sample into the output as 1 or 2 bytes.
  #[inline]
  fn put_sample(&self, out: &mut [u8], raw: u16) {
    let value = match self.header.bit_depth {
      16 => raw,
      8 => raw,
      depth => u16::from(u8_replicate_bits(u32::from(depth), raw as u8)),
    };
    if self.layout.sample_size == 2 {
      out[..2].copy_from_slice(&value.to_be_bytes());
    } else if self.header.bit_depth == 16 {
      out[0] = (value >> 8) as u8;
    } else {
      out[0] = value as u8;
    }
  }

  /// Converts one pixel.
  ///
  /// * `data` is one pixel as given by [`unfilter_decompressed_data`].
  /// * `out` is exactly `pixel_size` bytes.
  pub fn normalize(&self, data: &[u8], out: &mut [u8]) {
    let sample_size = self.layout.sample_size;
    if self.header.color_type == PngColorType::Index {
      let index = data[0];
      let rgb = self.palette.map_or([0, 0, 0], |plte| plte.rgb(index));
      out[..3].copy_from_slice(&rgb);
      if let Some(trns) = self.trns {
        out[3] = trns.index_alpha(index);
      }
      return;
    }
    let channels = self.header.color_type.channel_count();
    let mut raw = [0_u16; 4];
    for (channel, r) in raw.iter_mut().enumerate().take(channels) {
      *r = self.raw_sample(data, channel);
      self.put_sample(&mut out[channel * sample_size..], *r);
    }
    if self.layout.synthesize_alpha {
      let alpha = match self.trns {
        Some(trns) if channels == 1 => trns.gray_alpha(raw[0]),
        Some(trns) => trns.rgb_alpha([raw[0], raw[1], raw[2]]),
        None => u8::MAX,
      };
      out[self.layout.offset[3]..self.layout.pixel_size].fill(alpha);
    }
  }
}

/// Picks the gamma exponent for a decode, or `None` when no correction is
/// needed.
///
/// * An `sRGB` chunk uses the fixed sRGB gamma.
/// * Otherwise a `gAMA` chunk gives an exponent of `1 / file_gamma`.
/// * Otherwise the exponent is [`DEFAULT_GAMMA_EXPONENT`].
#[must_use]
pub fn gamma_exponent(srgb: Option<sRGB>, gama: Option<gAMA>, caps: Capabilities) -> Option<f32> {
  if !caps.gamma {
    return None;
  }
  let exponent = match (srgb, gama) {
    (Some(_), _) if caps.srgb => 1.0 / sRGB::FILE_GAMMA.gamma(),
    (_, Some(gama)) => 1.0 / gama.gamma(),
    _ => DEFAULT_GAMMA_EXPONENT,
  };
  if (exponent - 1.0).abs() < f32::EPSILON {
    None
  } else {
    Some(exponent)
  }
}

/// Gamma correction of the color samples of decoded pixels.
///
/// Each sample `s` becomes `round(max * (s / max) ^ exponent)`. Alpha is never
/// changed.
#[derive(Clone)]
pub struct GammaCorrection {
  exponent: f32,
  table: [u8; 256],
}
impl core::fmt::Debug for GammaCorrection {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("GammaCorrection").field("exponent", &self.exponent).finish()
  }
}
impl GammaCorrection {
  /// Builds the lookup table for an exponent.
  #[must_use]
  pub fn new(exponent: f32) -> Self {
    let mut table = [0_u8; 256];
    for (i, t) in table.iter_mut().enumerate() {
      *t = Self::correct(i as f32, 255.0, exponent) as u8;
    }
    Self { exponent, table }
  }

  #[inline]
  fn correct(sample: f32, max: f32, exponent: f32) -> f32 {
    (max * (sample / max).powf(exponent)).round().clamp(0.0, max)
  }

  /// Corrects one 8-bit sample.
  #[inline]
  #[must_use]
  pub fn apply_u8(&self, sample: u8) -> u8 {
    self.table[usize::from(sample)]
  }

  /// Corrects every color sample of a buffer of pixels in the layout.
  pub fn apply(&self, pixels: &mut [u8], layout: &OutputLayout) {
    let color_offsets = layout.color_offsets();
    for pixel in pixels.chunks_exact_mut(layout.pixel_size) {
      for &offset in color_offsets {
        if layout.sample_size == 2 {
          let s = u16::from_be_bytes([pixel[offset], pixel[offset + 1]]);
          let c = Self::correct(f32::from(s), 65535.0, self.exponent) as u16;
          pixel[offset..offset + 2].copy_from_slice(&c.to_be_bytes());
        } else {
          pixel[offset] = self.apply_u8(pixel[offset]);
        }
      }
    }
  }
}

/// How a pixel block is stored as PNG pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodeLayout {
  /// The PNG color type to write.
  pub color_type: PngColorType,
  /// Bytes (8-bit samples) per PNG pixel.
  pub samples: usize,
  /// Where the PNG pixel starts within a block pixel.
  pub first_offset: usize,
}
impl EncodeLayout {
  /// Works out the smallest PNG color type that holds the block.
  ///
  /// * If green or blue sit at a different offset than red, the block is RGB
  ///   (the three must be consecutive). Otherwise it's grayscale.
  /// * If there's a byte after the last color channel within the pixel, that
  ///   byte is taken as alpha.
  ///
  /// ## Failure
  /// * The block's sizes are zero or don't fit its pixel buffer.
  /// * The color channels don't fit in a pixel.
  pub fn derive(block: &PixelBlock<'_>) -> PngResult<Self> {
    if block.width == 0 || block.height == 0 {
      return Err(PngError::InvalidPixelBlock("width and height must be non-zero"));
    }
    if block.pixel_size == 0 {
      return Err(PngError::InvalidPixelBlock("pixel size must be non-zero"));
    }
    let [red, green, blue, _] = block.offset;
    if [red, green, blue].iter().any(|&offset| offset >= block.pixel_size) {
      return Err(PngError::InvalidPixelBlock("color offsets must be within the pixel size"));
    }
    let is_rgb = green != red || blue != red;
    if is_rgb && (Some(green) != red.checked_add(1) || Some(blue) != red.checked_add(2)) {
      return Err(PngError::InvalidPixelBlock("RGB channels must be consecutive"));
    }
    let color_samples = if is_rgb { 3 } else { 1 };
    // red and blue are both below the pixel size, so this can't overflow
    let candidate = red.max(blue) + 1;
    let has_alpha = candidate < block.pixel_size;
    let samples = color_samples + has_alpha as usize;
    if red.checked_add(samples).map_or(true, |end| end > block.pixel_size) {
      return Err(PngError::InvalidPixelBlock("channels don't fit within the pixel size"));
    }
    let row_bytes = (block.width as usize)
      .checked_mul(block.pixel_size)
      .ok_or(PngError::InvalidPixelBlock("row size overflows"))?;
    if block.pitch < row_bytes {
      return Err(PngError::InvalidPixelBlock("pitch is smaller than a row"));
    }
    let needed = (block.height as usize - 1)
      .checked_mul(block.pitch)
      .and_then(|n| n.checked_add(row_bytes))
      .ok_or(PngError::InvalidPixelBlock("image size overflows"))?;
    if block.pixels.len() < needed {
      return Err(PngError::InvalidPixelBlock("pixel buffer is too small"));
    }
    let color_type = match (is_rgb, has_alpha) {
      (false, false) => PngColorType::Y,
      (false, true) => PngColorType::YA,
      (true, false) => PngColorType::RGB,
      (true, true) => PngColorType::RGBA,
    };
    debug!("encoding {}x{} block as {color_type:?}", block.width, block.height);
    Ok(Self { color_type, samples, first_offset: red })
  }
}

/// Pixels in PNG sample order, one row after another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedPixels<'b> {
  /// bytes per row
  pub pitch: usize,
  /// bytes per pixel
  pub samples: usize,
  /// the pixel data
  pub data: Cow<'b, [u8]>,
}
impl<'b> PackedPixels<'b> {
  /// Gets the pixels of a block in the PNG sample order.
  ///
  /// When the block's pixel size already matches the PNG pixel size the block
  /// data is borrowed. Otherwise every row is repacked into a new tightly
  /// packed buffer.
  #[must_use]
  pub fn from_block(block: &'b PixelBlock<'_>, layout: &EncodeLayout) -> Self {
    if block.pixel_size == layout.samples {
      return Self {
        pitch: block.pitch,
        samples: layout.samples,
        data: Cow::Borrowed(&block.pixels),
      };
    }
    trace!("repacking pixels from {} to {} bytes", block.pixel_size, layout.samples);
    let width = block.width as usize;
    let mut data = Vec::with_capacity(width * layout.samples * block.height as usize);
    for row in block.pixels.chunks(block.pitch).take(block.height as usize) {
      for pixel in row[..width * block.pixel_size].chunks_exact(block.pixel_size) {
        data.extend_from_slice(&pixel[layout.first_offset..layout.first_offset + layout.samples]);
      }
    }
    Self { pitch: width * layout.samples, samples: layout.samples, data: Cow::Owned(data) }
  }

  /// Gets the bytes of one pixel.
  #[inline]
  #[must_use]
  pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
    let start = y as usize * self.pitch + x as usize * self.samples;
    &self.data[start..start + self.samples]
  }
}
