use super::*;

/// Unpacks one pixel from a reconstructed scanline.
///
/// Bit-packed pixels come out as a single byte with the value in the lowest
/// bits. Other pixels come out as their full bytes.
#[inline]
fn pixel_bytes<'a>(
  header: &IHDR, line: &'a [u8], reduced_x: u32, scratch: &'a mut [u8; 1],
) -> &'a [u8] {
  let bit_depth = usize::from(header.bit_depth);
  if bit_depth < 8 {
    let bit_index = reduced_x as usize * bit_depth;
    let down_shift = 8 - bit_depth - (bit_index % 8);
    let mask = (1_u8 << bit_depth) - 1;
    scratch[0] = (line[bit_index / 8] >> down_shift) & mask;
    &scratch[..]
  } else {
    let pixel_size = header.bits_per_pixel() / 8;
    let start = reduced_x as usize * pixel_size;
    &line[start..start + pixel_size]
  }
}

/// Given the `header`, `decompressed` buffer, and a per-pixel `op`, unfilters
/// the data and passes each pixel output to the `op` as the unfiltering occurs.
///
/// Each call to the `op` gets `|x, y, data|` as arguments, where `x` and `y`
/// are the position of the pixel (in the full image, relative to the top
/// left), and `data` is a slice of bytes representing the unfiltered pixel
/// value at that location. Bit-packed pixel data will be unpacked and have the
/// callback called once per pixel, with the data in the lowest bits of a
/// single byte. Interlaced images are de-interlaced this way: every pixel of
/// every pass is sent to its full image position.
///
/// The data is unfiltered in place, and also each filter byte is reset to the
/// "no filter" setting as well. Thus, it's perfectly fine to call this more
/// than once on the same decompressed data if you just want to iterate the data
/// a second time for some reason.
///
/// ## Failure
/// * You **are** allowed to pass a `decompressed` buffer larger than just the
///   decompressed data itself. The function will use only the correct number of
///   bytes from the start of the buffer.
/// * If the buffer is too small you get
///   [`UnfilterWasNotGivenEnoughData`](PngError::UnfilterWasNotGivenEnoughData)
///   (possibly after some amount of the unfiltering is done).
/// * A filter type byte other than 0 through 4 is
///   [`IllegalAdaptiveFilterType`](PngError::IllegalAdaptiveFilterType).
pub fn unfilter_decompressed_data<F>(
  header: &IHDR, mut decompressed: &mut [u8], mut op: F,
) -> PngResult<()>
where
  F: FnMut(u32, u32, &[u8]),
{
  let filter_chunk_size = header.filter_chunk_size();
  let mut scratch = [0_u8; 1];

  for pass in image_passes(header.width, header.height, header.is_interlaced) {
    let bytes_per_filterline = header.bytes_per_scanline(pass.width) + 1;
    let bytes_used_this_image = bytes_per_filterline.saturating_mul(pass.height as usize);
    if decompressed.len() < bytes_used_this_image {
      return Err(PngError::UnfilterWasNotGivenEnoughData);
    }
    let (these_bytes, more_bytes) =
      core::mem::take(&mut decompressed).split_at_mut(bytes_used_this_image);
    decompressed = more_bytes;
    trace!(
      "unfiltering image level {}: {}x{}, {} bytes",
      pass.image_level,
      pass.width,
      pass.height,
      bytes_used_this_image
    );

    // Each reduced image starts over with an all zero "previous line".
    let mut prev_line: &[u8] = &[];
    for (reduced_y, filterline) in
      these_bytes.chunks_exact_mut(bytes_per_filterline).enumerate()
    {
      let (f, line) = filterline.split_at_mut(1);
      let filter = FilterType::try_from(f[0])?;
      unfilter_line(filter, filter_chunk_size, prev_line, line);
      f[0] = FilterType::None as u8;
      for reduced_x in 0..pass.width {
        let (x, y) = pass.full_pos(reduced_x, reduced_y as u32);
        op(x, y, pixel_bytes(header, line, reduced_x, &mut scratch));
      }
      prev_line = line;
    }
  }

  Ok(())
}
