use miniz_oxide::inflate::TINFLStatus;

use super::*;

/// The encoder splits its zlib stream into `IDAT` chunks of at most this many
/// bytes.
pub const IDAT_CHUNK_SIZE: usize = 8192;

/// Decompresses the image data of a PNG.
///
/// * `idat_payloads` is each `IDAT` chunk's data, in order. They form a single
///   zlib stream, and the split points between chunks can fall anywhere.
/// * `expected_len` is the full size of the filtered image data, usually from
///   [`IHDR::get_zlib_decompression_requirement`].
///
/// ## Failure
/// * The zlib stream is corrupt.
/// * The stream ends before producing `expected_len` bytes.
///
/// Bytes past `expected_len` are not an error, they're ignored.
pub fn inflate_image_data<'a, I>(idat_payloads: I, expected_len: usize) -> PngResult<Vec<u8>>
where
  I: Iterator<Item = &'a [u8]>,
{
  let mut out: Vec<u8> = Vec::new();
  out.try_reserve_exact(expected_len).map_err(|_| {
    PngError::CompressionFailure(format!("can't allocate {expected_len} bytes of image data"))
  })?;
  out.resize(expected_len, 0);
  match miniz_oxide::inflate::decompress_slice_iter_to_slice(&mut out, idat_payloads, true, false)
  {
    Ok(n) if n == expected_len => {
      debug!("inflated {n} bytes of image data");
      Ok(out)
    }
    Ok(n) => {
      debug!("image data stream ended after {n} of {expected_len} bytes");
      Err(PngError::CompressionFailure(format!(
        "image data stream ended after {n} of {expected_len} bytes"
      )))
    }
    // the output buffer is full, so there was at least as much data as needed
    Err(TINFLStatus::HasMoreOutput) => Ok(out),
    Err(status) => Err(PngError::CompressionFailure(format!("{status:?}"))),
  }
}

/// Compresses filtered image data into a zlib stream.
///
/// `level` is `0` (store only) through `10` (slowest).
#[inline]
#[must_use]
pub fn deflate_image_data(raw: &[u8], level: u8) -> Vec<u8> {
  let out = miniz_oxide::deflate::compress_to_vec_zlib(raw, level);
  debug!("deflated {} bytes of image data to {}", raw.len(), out.len());
  out
}

/// Decompresses the text of a `zTXt` chunk.
pub fn inflate_text(compressed: &[u8]) -> PngResult<Vec<u8>> {
  miniz_oxide::inflate::decompress_to_vec_zlib(compressed)
    .map_err(|e| PngError::CompressionFailure(format!("{e:?}")))
}

/// Compresses the text of a `zTXt` chunk.
#[inline]
#[must_use]
pub fn deflate_text(text: &[u8], level: u8) -> Vec<u8> {
  miniz_oxide::deflate::compress_to_vec_zlib(text, level)
}

#[cfg(test)]
mod zlib_tests {
  use super::*;

  #[test]
  fn test_inflate_across_chunk_boundaries() {
    let raw: Vec<u8> = (0..5000_u32).map(|i| (i % 251) as u8).collect();
    let z = deflate_image_data(&raw, 6);
    // split the stream into odd sized pieces, including an empty one
    let pieces: Vec<&[u8]> = vec![&z[..1], &z[1..1], &z[1..7], &z[7..]];
    assert_eq!(inflate_image_data(pieces.into_iter(), raw.len()).unwrap(), raw);
  }

  #[test]
  fn test_inflate_short_stream_fails() {
    let raw = vec![3_u8; 100];
    let z = deflate_image_data(&raw, 6);
    assert!(matches!(
      inflate_image_data(core::iter::once(&z[..]), 101),
      Err(PngError::CompressionFailure(_))
    ));
    assert_eq!(inflate_image_data(core::iter::once(&z[..]), 50).unwrap(), vec![3_u8; 50]);
  }

  #[test]
  fn test_inflate_garbage_fails() {
    let garbage = [0xFF_u8; 20];
    assert!(matches!(
      inflate_image_data(core::iter::once(&garbage[..]), 10),
      Err(PngError::CompressionFailure(_))
    ));
    assert!(inflate_text(&garbage).is_err());
  }
}
