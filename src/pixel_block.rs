//! The pixel block: the in-memory image form exchanged with the host.

use std::borrow::Cow;

/// Index of the red channel within [`PixelBlock::offset`].
pub const RED: usize = 0;
/// Index of the green channel within [`PixelBlock::offset`].
pub const GREEN: usize = 1;
/// Index of the blue channel within [`PixelBlock::offset`].
///
/// For grayscale blocks this is also the gray channel.
pub const BLUE: usize = 2;
/// Index of the alpha channel within [`PixelBlock::offset`].
pub const ALPHA: usize = 3;

/// A row-major block of pixels that describes its own byte layout.
///
/// * `pitch` is the number of bytes from the start of one row to the start of
///   the next. It may be more than `width * pixel_size`.
/// * `pixel_size` is the number of bytes from one pixel to the next.
/// * `offset` is the byte offset within a pixel of red, green, blue, and alpha.
///   When green and blue have the same offset as red, the block is grayscale.
///   An alpha offset of 0 means "no alpha channel".
///
/// The decoder always hands back an owned block. The encoder accepts a
/// borrowed one, so a host can encode straight out of its own storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PixelBlock<'b> {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bytes per row
  pub pitch: usize,
  /// bytes per pixel
  pub pixel_size: usize,
  /// red, green, blue, alpha byte offsets within a pixel
  pub offset: [usize; 4],
  /// the sample bytes
  pub pixels: Cow<'b, [u8]>,
}
impl<'b> PixelBlock<'b> {
  /// Wraps borrowed pixel bytes as a block.
  #[inline]
  #[must_use]
  pub const fn borrowed(
    width: u32, height: u32, pitch: usize, pixel_size: usize, offset: [usize; 4],
    pixels: &'b [u8],
  ) -> Self {
    Self { width, height, pitch, pixel_size, offset, pixels: Cow::Borrowed(pixels) }
  }

  /// A tightly packed 8-bit grayscale block, without alpha.
  #[inline]
  #[must_use]
  pub const fn gray8(width: u32, height: u32, pixels: &'b [u8]) -> Self {
    Self::borrowed(width, height, width as usize, 1, [0, 0, 0, 0], pixels)
  }

  /// A tightly packed 8-bit RGB block.
  #[inline]
  #[must_use]
  pub const fn rgb8(width: u32, height: u32, pixels: &'b [u8]) -> Self {
    Self::borrowed(width, height, width as usize * 3, 3, [0, 1, 2, 0], pixels)
  }

  /// A tightly packed 8-bit RGBA block.
  #[inline]
  #[must_use]
  pub const fn rgba8(width: u32, height: u32, pixels: &'b [u8]) -> Self {
    Self::borrowed(width, height, width as usize * 4, 4, [0, 1, 2, 3], pixels)
  }

  /// If the block has no pixels at all.
  #[inline]
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.width == 0 || self.height == 0
  }

  /// If the block stores one sample per pixel for the color channels.
  #[inline]
  #[must_use]
  pub const fn is_grayscale(&self) -> bool {
    self.offset[GREEN] == self.offset[RED] && self.offset[BLUE] == self.offset[RED]
  }

  /// If the block carries an alpha channel.
  #[inline]
  #[must_use]
  pub const fn has_alpha(&self) -> bool {
    self.offset[ALPHA] != 0
  }

  /// Gets the bytes of the pixel at the position, or `None` if the position is
  /// out of bounds.
  #[inline]
  #[must_use]
  pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
    if x < self.width && y < self.height {
      let start = y as usize * self.pitch + x as usize * self.pixel_size;
      self.pixels.get(start..start + self.pixel_size)
    } else {
      None
    }
  }

  /// Gets the bytes of one row, or `None` if the row is out of bounds.
  #[inline]
  #[must_use]
  pub fn row(&self, y: u32) -> Option<&[u8]> {
    if y < self.height {
      let start = y as usize * self.pitch;
      self.pixels.get(start..start + self.width as usize * self.pixel_size)
    } else {
      None
    }
  }

  /// Clone the pixel data into a new, owned block.
  #[inline]
  #[must_use]
  pub fn into_owned(self) -> PixelBlock<'static> {
    PixelBlock {
      width: self.width,
      height: self.height,
      pitch: self.pitch,
      pixel_size: self.pixel_size,
      offset: self.offset,
      pixels: Cow::Owned(self.pixels.into_owned()),
    }
  }
}

#[test]
fn test_pixel_block_accessors() {
  let data = [1, 2, 3, 0, 4, 5, 6, 0];
  let block = PixelBlock::borrowed(1, 2, 4, 3, [0, 1, 2, 0], &data);
  assert!(!block.is_grayscale());
  assert!(!block.has_alpha());
  assert_eq!(block.pixel(0, 1), Some(&[4, 5, 6][..]));
  assert_eq!(block.pixel(1, 0), None);
  assert_eq!(block.row(0), Some(&[1, 2, 3][..]));
  assert_eq!(block.row(2), None);
  //
  let gray = PixelBlock::gray8(2, 1, &[7, 8]);
  assert!(gray.is_grayscale());
  assert_eq!(gray.into_owned().pixels.as_ref(), &[7, 8]);
}
