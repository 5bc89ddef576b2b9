//! Adam7 interlacing.
//!
//! An interlaced image is stored as 7 "reduced" images. Each one takes the
//! pixels at a fixed start position and step within every 8x8 block:
//!
//! ```txt
//! 1 6 4 6 2 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! 3 6 4 6 3 6 4 6
//! 7 7 7 7 7 7 7 7
//! 5 6 5 6 5 6 5 6
//! 7 7 7 7 7 7 7 7
//! ```
//!
//! A non-interlaced image is handled as a single reduced image with a step of
//! 1 in each direction, which is called "image level 0" here.

/// Where a reduced image's pixels sit within the full image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassGeometry {
  /// x of the first pixel
  pub x_start: u32,
  /// y of the first pixel
  pub y_start: u32,
  /// x distance between pixels
  pub x_step: u32,
  /// y distance between pixels
  pub y_step: u32,
}
impl PassGeometry {
  const fn new(x_start: u32, y_start: u32, x_step: u32, y_step: u32) -> Self {
    Self { x_start, y_start, x_step, y_step }
  }

  /// The size of this reduced image for a full image of the given size.
  ///
  /// Each dimension is `ceil((full - start) / step)`, or 0 if the start is
  /// outside the full image.
  #[inline]
  #[must_use]
  pub const fn reduced_size(self, full_width: u32, full_height: u32) -> (u32, u32) {
    const fn dim(full: u32, start: u32, step: u32) -> u32 {
      if start >= full {
        0
      } else {
        (full - start + step - 1) / step
      }
    }
    (dim(full_width, self.x_start, self.x_step), dim(full_height, self.y_start, self.y_step))
  }

  /// Converts a position within this reduced image into a full image position.
  #[inline]
  #[must_use]
  pub const fn full_pos(self, reduced_x: u32, reduced_y: u32) -> (u32, u32) {
    (self.x_start + reduced_x * self.x_step, self.y_start + reduced_y * self.y_step)
  }
}

/// The 7 Adam7 passes, in the order they're stored.
pub const ADAM7_PASSES: [PassGeometry; 7] = [
  PassGeometry::new(0, 0, 8, 8),
  PassGeometry::new(4, 0, 8, 8),
  PassGeometry::new(0, 4, 4, 8),
  PassGeometry::new(2, 0, 4, 4),
  PassGeometry::new(0, 2, 2, 4),
  PassGeometry::new(1, 0, 2, 2),
  PassGeometry::new(0, 1, 1, 2),
];

/// The whole image, as the single "pass" of a non-interlaced image.
pub const FULL_IMAGE_PASS: PassGeometry = PassGeometry::new(0, 0, 1, 1);

// index 0 is the full image, 1 through 7 are the Adam7 passes.
const IMAGE_LEVELS: [PassGeometry; 8] = [
  FULL_IMAGE_PASS,
  ADAM7_PASSES[0],
  ADAM7_PASSES[1],
  ADAM7_PASSES[2],
  ADAM7_PASSES[3],
  ADAM7_PASSES[4],
  ADAM7_PASSES[5],
  ADAM7_PASSES[6],
];

/// Given the dimensions of the full PNG image, computes the size of each
/// reduced image.
///
/// The output uses index 0 as the base image size, and indexes 1 through 7 for
/// the size of reduced images 1 through 7.
///
/// PS: Interlacing is terrible, don't interlace your images.
#[inline]
#[must_use]
pub const fn reduced_image_dimensions(full_width: u32, full_height: u32) -> [(u32, u32); 8] {
  let mut out = [(0, 0); 8];
  let mut level = 0;
  while level < 8 {
    out[level] = IMAGE_LEVELS[level].reduced_size(full_width, full_height);
    level += 1;
  }
  out
}

/// Converts a reduced image location into the full image location.
///
/// For consistency with [`reduced_image_dimensions`], an `image_level` of 0
/// gives back the input position.
///
/// ## Panics
/// * If the image level given exceeds 7.
#[inline]
#[must_use]
pub const fn interlaced_pos_to_full_pos(
  image_level: usize, reduced_x: u32, reduced_y: u32,
) -> (u32, u32) {
  IMAGE_LEVELS[image_level].full_pos(reduced_x, reduced_y)
}

/// One non-empty reduced image of a full image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReducedImage {
  /// 0 for a non-interlaced image, otherwise the Adam7 pass number (1 to 7).
  pub image_level: usize,
  /// placement within the full image
  pub geometry: PassGeometry,
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
}
impl ReducedImage {
  /// Converts a position within this reduced image into a full image position.
  #[inline]
  #[must_use]
  pub const fn full_pos(&self, reduced_x: u32, reduced_y: u32) -> (u32, u32) {
    self.geometry.full_pos(reduced_x, reduced_y)
  }
}

/// The reduced images that hold data for a full image, in storage order.
///
/// Reduced images with a width or height of 0 are skipped, since they don't
/// store any bytes (not even filter bytes).
pub fn image_passes(
  full_width: u32, full_height: u32, is_interlaced: bool,
) -> impl Iterator<Item = ReducedImage> {
  let levels = if is_interlaced { 1..8 } else { 0..1 };
  levels.filter_map(move |image_level| {
    let geometry = IMAGE_LEVELS[image_level];
    let (width, height) = geometry.reduced_size(full_width, full_height);
    if width == 0 || height == 0 {
      None
    } else {
      Some(ReducedImage { image_level, geometry, width, height })
    }
  })
}
