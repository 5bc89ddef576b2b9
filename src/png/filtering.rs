//! From the PNG spec:
//!
//! > Filters are applied to **bytes**, not to pixels, regardless of the bit
//! > depth or color type of the image.
//!
//! Each filter predicts a byte from up to three neighbors:
//! * `a`: the byte `bpp` bytes to the left (0 for the first pixel of a line).
//! * `b`: the byte directly above, in the previous line of the same reduced
//!   image (0 for the first line).
//! * `c`: the byte above `a` (0 when either of the above is missing).
//!
//! The filtered byte is the difference between the real byte and the
//! prediction, modulo 256.

use super::*;

/// The per-scanline filter types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FilterType {
  /// The bytes are stored as-is.
  #[default]
  None = 0,
  /// Predict from the left.
  Sub = 1,
  /// Predict from above.
  Up = 2,
  /// Predict from the average of left and above.
  Average = 3,
  /// Predict with the Paeth predictor.
  Paeth = 4,
}
impl FilterType {
  /// All filter types, in order.
  pub const ALL: [Self; 5] = [Self::None, Self::Sub, Self::Up, Self::Average, Self::Paeth];
}
impl TryFrom<u8> for FilterType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::None,
      1 => Self::Sub,
      2 => Self::Up,
      3 => Self::Average,
      4 => Self::Paeth,
      other => return Err(PngError::IllegalAdaptiveFilterType(other)),
    })
  }
}

/// How the encoder picks a filter for each scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterStrategy {
  /// Every line uses the same filter.
  Fixed(FilterType),
  /// Each line uses whichever filter gives the smallest sum of absolute
  /// differences (each filtered byte taken as an `i8`).
  Adaptive,
}
impl Default for FilterStrategy {
  #[inline]
  fn default() -> Self {
    Self::Fixed(FilterType::None)
  }
}

/// Reconstruct Filter Type 1
///
/// * `fx` filtered X
/// * `ra` reconstructed `a`
#[inline]
const fn reconstruct_sub(fx: u8, ra: u8) -> u8 {
  fx.wrapping_add(ra)
}

/// Reconstruct Filter Type 2
///
/// * `fx` filtered X
/// * `rb` reconstructed `b`
#[inline]
const fn reconstruct_up(fx: u8, rb: u8) -> u8 {
  fx.wrapping_add(rb)
}

/// Reconstruct Filter Type 3
///
/// * `fx` filtered X
/// * `ra` reconstructed `a`
/// * `rb` reconstructed `b`
#[inline]
const fn reconstruct_average(fx: u8, ra: u8, rb: u8) -> u8 {
  fx.wrapping_add(average_predictor(ra, rb))
}

/// Reconstruct Filter Type 4
///
/// * `fx` filtered X
/// * `ra` reconstructed `a`
/// * `rb` reconstructed `b`
/// * `rc` reconstructed `c`
#[inline]
const fn reconstruct_paeth(fx: u8, ra: u8, rb: u8, rc: u8) -> u8 {
  fx.wrapping_add(paeth_predictor(ra, rb, rc))
}

/// The sum of `a` and `b` is taken without overflow, then halved (rounding
/// down).
#[inline]
const fn average_predictor(a: u8, b: u8) -> u8 {
  ((a as u16 + b as u16) / 2) as u8
}

/// The Paeth filter function computes a simple linear function of the three
/// neighboring pixels (left `a`, above `b`, upper left `c`).
///
/// The output is the "predictor" of the neighboring pixel closest to the
/// computed value.
///
/// If any neighboring pixel isn't present because this is the top or left edge
/// of the image just substitute 0 in that postition.
#[inline]
#[must_use]
pub const fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
  // i32 math is wide enough to never overflow no matter what the u8 inputs are.
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // The order of these tests must not change: ties go to a, then b, then c.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// Reverses a filter on one scanline, in place.
///
/// * `bpp` is the byte distance to the "left" neighbor, see
///   [`IHDR::filter_chunk_size`].
/// * `prev` is the already reconstructed previous line of the same reduced
///   image. Pass an empty slice for the first line, it's read as all zeros.
pub fn unfilter_line(filter: FilterType, bpp: usize, prev: &[u8], line: &mut [u8]) {
  let up = |i: usize| prev.get(i).copied().unwrap_or(0);
  match filter {
    FilterType::None => (),
    FilterType::Sub => {
      for i in bpp..line.len() {
        line[i] = reconstruct_sub(line[i], line[i - bpp]);
      }
    }
    FilterType::Up => {
      for (i, x) in line.iter_mut().enumerate() {
        *x = reconstruct_up(*x, up(i));
      }
    }
    FilterType::Average => {
      for i in 0..line.len() {
        let a = if i >= bpp { line[i - bpp] } else { 0 };
        line[i] = reconstruct_average(line[i], a, up(i));
      }
    }
    FilterType::Paeth => {
      for i in 0..line.len() {
        let (a, c) = if i >= bpp { (line[i - bpp], up(i - bpp)) } else { (0, 0) };
        line[i] = reconstruct_paeth(line[i], a, up(i), c);
      }
    }
  }
}

/// Applies a filter to one scanline.
///
/// `line` and `prev` are raw (unfiltered) bytes, with the same rules as
/// [`unfilter_line`]. The filtered bytes are written to `out`, which must be the
/// same length as `line`.
pub fn filter_line(filter: FilterType, bpp: usize, prev: &[u8], line: &[u8], out: &mut [u8]) {
  debug_assert_eq!(line.len(), out.len());
  let up = |i: usize| prev.get(i).copied().unwrap_or(0);
  let left = |i: usize| if i >= bpp { line[i - bpp] } else { 0 };
  for (i, (x, f)) in line.iter().copied().zip(out.iter_mut()).enumerate() {
    let prediction = match filter {
      FilterType::None => 0,
      FilterType::Sub => left(i),
      FilterType::Up => up(i),
      FilterType::Average => average_predictor(left(i), up(i)),
      FilterType::Paeth => {
        let c = if i >= bpp { up(i - bpp) } else { 0 };
        paeth_predictor(left(i), up(i), c)
      }
    };
    *f = x.wrapping_sub(prediction);
  }
}

/// Filters one scanline with the strategy, appending the filter type byte and
/// then the filtered bytes to `out`.
pub fn filter_line_with_strategy(
  strategy: FilterStrategy, bpp: usize, prev: &[u8], line: &[u8], out: &mut Vec<u8>,
) {
  let start = out.len();
  out.resize(start + 1 + line.len(), 0);
  match strategy {
    FilterStrategy::Fixed(filter) => {
      out[start] = filter as u8;
      filter_line(filter, bpp, prev, line, &mut out[start + 1..]);
    }
    FilterStrategy::Adaptive => {
      let mut scratch = vec![0_u8; line.len()];
      let mut best_score = u64::MAX;
      for filter in FilterType::ALL {
        filter_line(filter, bpp, prev, line, &mut scratch);
        let score: u64 = scratch.iter().map(|&f| u64::from((f as i8).unsigned_abs())).sum();
        if score < best_score {
          best_score = score;
          out[start] = filter as u8;
          out[start + 1..].copy_from_slice(&scratch);
        }
      }
    }
  }
}

#[test]
fn test_paeth_tie_order() {
  // all distances equal, so `a` wins
  assert_eq!(paeth_predictor(7, 7, 7), 7);
  // p = 10 + 20 - 10 = 20, so `b` is exact
  assert_eq!(paeth_predictor(10, 20, 10), 20);
  // p = 10 + 10 - 20 = 0, pa = 10, pb = 10, pc = 20: tie between a and b
  assert_eq!(paeth_predictor(10, 10, 20), 10);
  // p = 255 + 255 - 0 = 510: closest is a
  assert_eq!(paeth_predictor(255, 255, 0), 255);
  // p = 0 + 0 - 255 = -255: pa = pb = 255, pc = 510
  assert_eq!(paeth_predictor(0, 0, 255), 0);
  // p = 100 + 0 - 100 = 0: pa = 100, pb = 0
  assert_eq!(paeth_predictor(100, 0, 100), 0);
  // p = 50 + 60 - 55 = 55: pa = 5, pb = 5, pc = 0
  assert_eq!(paeth_predictor(50, 60, 55), 55);
}

#[test]
fn test_average_does_not_overflow() {
  // 200 + 200 overflows a u8, the average must still be 200
  let mut line = [0, 0];
  unfilter_line(FilterType::Average, 1, &[200, 200], &mut line);
  assert_eq!(line, [100, 150]);
  let mut line = [1];
  unfilter_line(FilterType::Average, 1, &[255], &mut line);
  assert_eq!(line, [128]);
}

#[test]
fn test_adaptive_picks_cheap_filter() {
  // a smooth ramp is all 1s with Sub
  let line: Vec<u8> = (0..16).collect();
  let mut out = Vec::new();
  filter_line_with_strategy(FilterStrategy::Adaptive, 1, &[], &line, &mut out);
  assert_eq!(out[0], FilterType::Sub as u8);
  // identical to the line above is all 0s with Up
  let mut out = Vec::new();
  filter_line_with_strategy(FilterStrategy::Adaptive, 1, &line, &line, &mut out);
  assert_eq!(out[0], FilterType::Up as u8);
  assert!(out[1..].iter().all(|&b| b == 0));
}
